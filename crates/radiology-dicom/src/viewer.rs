//! DICOM Web 阅片器链接

use radiology_core::config::DicomWebViewerConfig;
use radiology_core::{RadiologyError, Result, Study};
use url::Url;

/// 根据配置为检查生成 Web 阅片器地址
#[derive(Debug, Clone)]
pub struct DicomWebViewer {
    config: DicomWebViewerConfig,
}

impl DicomWebViewer {
    pub fn new(config: DicomWebViewerConfig) -> Self {
        Self { config }
    }

    /// `http://<address>:<port><base_url>?studyUID=<uid>[&serverName=<name>]`
    pub fn dicom_viewer_url(&self, study: Option<&Study>) -> Result<String> {
        let study = study.ok_or_else(|| RadiologyError::illegal_argument("study cannot be null"))?;
        let study_instance_uid = study
            .study_instance_uid
            .as_deref()
            .ok_or_else(|| RadiologyError::illegal_argument("studyInstanceUid cannot be null"))?;

        let mut url = Url::parse(&format!("http://{}", self.config.address)).map_err(|e| {
            RadiologyError::Config(format!("invalid web viewer address: {}", e))
        })?;
        url.set_port(Some(self.config.port))
            .map_err(|_| RadiologyError::Config("web viewer address cannot carry a port".to_string()))?;
        url.set_path(&self.config.base_url);

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("studyUID", study_instance_uid);
            if let Some(server_name) = self
                .config
                .local_server_name
                .as_deref()
                .filter(|name| !name.trim().is_empty())
            {
                query.append_pair("serverName", server_name);
            }
        }

        Ok(url.to_string())
    }
}
