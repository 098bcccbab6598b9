//! 放射科服务主程序

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use radiology_core::{RadiologyOrder, RadiologyProperties};
use radiology_dicom::{DicomUidGenerator, DicomUidValidator, DicomWebViewer, UuidDicomUidGenerator};
use radiology_integration::{CommonOrderPriority, Hl7Generator, MllpHl7Sender, OrderControlElement};
use radiology_web::{AppState, WebServer};
use radiology_workflow::{
    InMemoryMrrtReportTemplateRepository, InMemoryRadiologyModalityRepository,
    InMemoryRadiologyOrderRepository, InMemoryRadiologyReportRepository, InMemoryStudyRepository,
    MrrtReportTemplateService, RadiologyModalityService, RadiologyOrderService,
    RadiologyReportService, RadiologyStudyService, SequentialAccessionNumberGenerator,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "radiology-server")]
#[command(about = "放射科 HL7 / DICOM 集成服务")]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// 日志级别，覆盖配置文件
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 启动 REST 服务
    Serve,

    /// 将 JSON 格式的医嘱编码为 ORM^O01 并输出
    Encode {
        /// 医嘱 JSON 文件
        #[arg(short, long)]
        order: PathBuf,

        /// 医嘱控制码 NW / CA / XO
        #[arg(long, default_value = "NW")]
        control: String,

        /// 优先级 S / A / R / T，默认按紧急程度推导
        #[arg(short, long)]
        priority: Option<String>,
    },

    /// 生成 DICOM UID
    Uid {
        /// UID 根，最长 24 个字符
        #[arg(short, long)]
        root: Option<String>,

        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },

    /// 校验 DICOM UID
    ValidateUid { uid: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let properties = RadiologyProperties::load(cli.config.as_deref())?;

    // 初始化日志，RUST_LOG 优先
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| properties.logging.level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
    info!(
        "Configuration loaded from: {}",
        cli.config.as_deref().unwrap_or("<defaults>")
    );

    match cli.command {
        Command::Serve => serve(properties).await,
        Command::Encode {
            order,
            control,
            priority,
        } => encode(&order, &control, priority.as_deref()),
        Command::Uid { root, count } => generate_uids(root.as_deref(), count),
        Command::ValidateUid { uid } => validate_uid(&uid),
    }
}

async fn serve(properties: RadiologyProperties) -> Result<()> {
    info!("启动放射科服务...");
    info!("  PACS HL7 接口: {}", properties.pacs.hl7_endpoint());
    info!("  UID 机构根: {}", properties.dicom.uid_org_root);

    let study_service = Arc::new(RadiologyStudyService::new(
        Arc::new(InMemoryStudyRepository::new()),
        &properties.dicom.uid_org_root,
    ));
    let accession_numbers = Arc::new(SequentialAccessionNumberGenerator::new(
        properties.order.next_accession_number_seed,
    ));
    let order_service = RadiologyOrderService::new(
        Arc::new(InMemoryRadiologyOrderRepository::new()),
        study_service.clone(),
        Arc::new(MllpHl7Sender::from_config(&properties.pacs)),
    )
    .with_accession_number_generator(accession_numbers);

    let state = AppState {
        order_service: Arc::new(order_service),
        study_service,
        report_service: Arc::new(RadiologyReportService::new(Arc::new(
            InMemoryRadiologyReportRepository::new(),
        ))),
        modality_service: Arc::new(RadiologyModalityService::new(Arc::new(
            InMemoryRadiologyModalityRepository::new(),
        ))),
        template_service: Arc::new(MrrtReportTemplateService::new(Arc::new(
            InMemoryMrrtReportTemplateRepository::new(),
        ))),
        dicom_web_viewer: Arc::new(DicomWebViewer::new(properties.dicom.web_viewer.clone())),
    };

    let addr: SocketAddr = format!("{}:{}", properties.http.interface, properties.http.port)
        .parse()
        .context("Invalid HTTP listen address")?;

    if let Err(e) = WebServer::new(addr, state).run().await {
        error!("服务器启动失败: {}", e);
        return Err(e);
    }
    Ok(())
}

fn encode(order_path: &Path, control: &str, priority: Option<&str>) -> Result<()> {
    let json = std::fs::read_to_string(order_path)
        .with_context(|| format!("Failed to read {}", order_path.display()))?;
    let order: RadiologyOrder =
        serde_json::from_str(&json).context("Failed to parse radiology order JSON")?;

    let control = OrderControlElement::try_from(control)?;
    let priority = priority.map(CommonOrderPriority::try_from).transpose()?;

    let message = Hl7Generator::create_encoded_radiology_orm_o01_message(
        Some(&order),
        Some(control),
        priority,
    )?;
    for segment in message.split_terminator('\r') {
        println!("{}", segment);
    }
    Ok(())
}

fn generate_uids(root: Option<&str>, count: usize) -> Result<()> {
    let generator = UuidDicomUidGenerator::new();
    for _ in 0..count {
        println!("{}", generator.new_dicom_uid(root)?);
    }
    Ok(())
}

fn validate_uid(uid: &str) -> Result<()> {
    if DicomUidValidator::is_valid(uid) {
        println!("{} is a valid DICOM UID", uid);
        Ok(())
    } else {
        let reason = if !DicomUidValidator::is_length_valid(uid) {
            "length must be between 1 and 64"
        } else {
            "components must be digits without leading zeros, separated by dots"
        };
        Err(anyhow!("{} is not a valid DICOM UID: {}", uid, reason))
    }
}
