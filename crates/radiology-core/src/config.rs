//! 配置管理
//!
//! 内置默认值，之后依次叠加配置文件和环境变量。环境变量以 `RADIOLOGY` 为前缀，
//! 层级之间用 `__` 分隔，例如 `RADIOLOGY__PACS__HL7_PORT=2576`。

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 放射科模块完整配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadiologyProperties {
    pub logging: LoggingConfig,
    pub http: HttpConfig,
    pub dicom: DicomConfig,
    pub pacs: PacsConfig,
    pub order: OrderConfig,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 也可以通过 RUST_LOG 覆盖
    pub level: String,
}

/// REST接口监听配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub interface: String,
    pub port: u16,
}

/// DICOM 相关配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DicomConfig {
    /// 生成 Study Instance UID 使用的机构根
    pub uid_org_root: String,
    pub web_viewer: DicomWebViewerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DicomWebViewerConfig {
    pub address: String,
    pub port: u16,
    pub base_url: String,
    pub local_server_name: Option<String>,
}

/// PACS / 工作列表服务器 HL7 接口
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacsConfig {
    pub address: String,
    pub hl7_port: u16,
    pub timeout_secs: u64,
}

/// 医嘱配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfig {
    /// 检查号序列的起始值
    pub next_accession_number_seed: u64,
}

impl PacsConfig {
    pub fn hl7_endpoint(&self) -> String {
        format!("{}:{}", self.address, self.hl7_port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl RadiologyProperties {
    /// 加载配置；`config_path` 为空时只使用默认值和环境变量
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder().add_source(File::from_str(
            include_str!("defaults.toml"),
            FileFormat::Toml,
        ));

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path));
        }

        let settings = builder
            .add_source(Environment::with_prefix("RADIOLOGY").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        settings
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for RadiologyProperties {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            http: HttpConfig {
                interface: "0.0.0.0".to_string(),
                port: 8080,
            },
            dicom: DicomConfig {
                uid_org_root: "1.2.826.0.1.3680043.8.2186".to_string(),
                web_viewer: DicomWebViewerConfig {
                    address: "localhost".to_string(),
                    port: 8042,
                    base_url: "/weasis-pacs-connector/viewer".to_string(),
                    local_server_name: None,
                },
            },
            pacs: PacsConfig {
                address: "localhost".to_string(),
                hl7_port: 2575,
                timeout_secs: 10,
            },
            order: OrderConfig {
                next_accession_number_seed: 1,
            },
        }
    }
}
