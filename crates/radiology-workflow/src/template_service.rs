//! MRRT 报告模板服务
//!
//! 模板以 `dcterms.identifier` 唯一标识，同一标识只能导入一次。

use crate::repository::MrrtReportTemplateRepository;
use crate::search::MrrtReportTemplateSearchCriteria;
use crate::template_parser::MrrtReportTemplateFileParser;
use radiology_core::{MrrtReportTemplate, RadiologyError, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

pub struct MrrtReportTemplateService {
    templates: Arc<dyn MrrtReportTemplateRepository>,
    parser: MrrtReportTemplateFileParser,
    // 标识查重到写入之间不允许并发保存
    save_lock: Mutex<()>,
}

impl MrrtReportTemplateService {
    pub fn new(templates: Arc<dyn MrrtReportTemplateRepository>) -> Self {
        Self {
            templates,
            parser: MrrtReportTemplateFileParser::new(),
            save_lock: Mutex::new(()),
        }
    }

    /// 解析模板 HTML 并保存
    pub async fn import_mrrt_report_template(&self, html: &str) -> Result<MrrtReportTemplate> {
        let template = self.parser.parse(html).map_err(|e| {
            warn!("Rejected MRRT report template: {}", e);
            e
        })?;
        self.save_mrrt_report_template(template).await
    }

    pub async fn save_mrrt_report_template(
        &self,
        template: MrrtReportTemplate,
    ) -> Result<MrrtReportTemplate> {
        let identifier = template
            .dc_terms_identifier
            .as_deref()
            .map(str::trim)
            .filter(|i| !i.is_empty())
            .ok_or_else(|| RadiologyError::null_argument("identifier cannot be null"))?
            .to_string();

        let _guard = self.save_lock.lock().await;
        if let Some(existing) = self.templates.find_by_identifier(&identifier).await? {
            if existing.template_id != template.template_id {
                return Err(RadiologyError::illegal_argument(format!(
                    "Template with identifier '{}' already exist in the system.",
                    identifier
                )));
            }
        }

        let saved = self.templates.save(template).await?;
        info!(
            "Saved MRRT report template {} ({:?})",
            identifier, saved.template_id
        );
        Ok(saved)
    }

    pub async fn purge_mrrt_report_template(&self, template: &MrrtReportTemplate) -> Result<()> {
        let template_id = template
            .template_id
            .ok_or_else(|| RadiologyError::illegal_argument("template is not persisted"))?;
        self.templates.delete(template_id).await?;
        info!("Purged MRRT report template {}", template.uuid);
        Ok(())
    }

    pub async fn get_mrrt_report_template(&self, id: i32) -> Result<Option<MrrtReportTemplate>> {
        self.templates.find_by_id(id).await
    }

    pub async fn get_mrrt_report_template_by_uuid(
        &self,
        uuid: &Uuid,
    ) -> Result<Option<MrrtReportTemplate>> {
        self.templates.find_by_uuid(uuid).await
    }

    pub async fn get_mrrt_report_template_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<MrrtReportTemplate>> {
        self.templates.find_by_identifier(identifier).await
    }

    pub async fn get_mrrt_report_templates(
        &self,
        criteria: &MrrtReportTemplateSearchCriteria,
    ) -> Result<Vec<MrrtReportTemplate>> {
        self.templates.search(criteria).await
    }

    pub fn get_mrrt_report_template_html_body(
        &self,
        template: &MrrtReportTemplate,
    ) -> Result<String> {
        self.parser.html_body(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryMrrtReportTemplateRepository;
    use crate::template_parser::tests::template_html;

    fn service() -> MrrtReportTemplateService {
        MrrtReportTemplateService::new(Arc::new(InMemoryMrrtReportTemplateRepository::new()))
    }

    #[tokio::test]
    async fn test_import_and_get_by_uuid() {
        let service = service();
        let imported = service
            .import_mrrt_report_template(&template_html("t-1", "CT Chest"))
            .await
            .unwrap();
        assert_eq!(imported.template_id, Some(1));

        let found = service
            .get_mrrt_report_template_by_uuid(&imported.uuid)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.dc_terms_title.as_deref(), Some("CT Chest"));
        assert!(service
            .get_mrrt_report_template_by_identifier("t-1")
            .await
            .unwrap()
            .is_some());

        let body = service.get_mrrt_report_template_html_body(&found).unwrap();
        assert!(body.contains("data-section-name=\"Findings\""));
    }

    #[tokio::test]
    async fn test_duplicate_identifier_is_rejected() {
        let service = service();
        let first = service
            .import_mrrt_report_template(&template_html("t-1", "CT Chest"))
            .await
            .unwrap();

        let err = service
            .import_mrrt_report_template(&template_html("t-1", "CT Chest v2"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Template with identifier 't-1' already exist in the system."
        );

        // 同一模板再次保存不算重复
        let mut renamed = first;
        renamed.dc_terms_title = Some("CT Thorax".to_string());
        let saved = service.save_mrrt_report_template(renamed).await.unwrap();
        assert_eq!(saved.template_id, Some(1));
    }

    #[tokio::test]
    async fn test_identifier_required() {
        let err = service()
            .save_mrrt_report_template(MrrtReportTemplate::new("<html></html>"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "identifier cannot be null");
    }

    #[tokio::test]
    async fn test_search_by_title_and_purge() {
        let service = service();
        for (identifier, title) in [("t-1", "CT Chest"), ("t-2", "MR Brain"), ("t-3", "CT Head")] {
            service
                .import_mrrt_report_template(&template_html(identifier, title))
                .await
                .unwrap();
        }

        let ct = service
            .get_mrrt_report_templates(&MrrtReportTemplateSearchCriteria::with_title("ct"))
            .await
            .unwrap();
        let titles: Vec<_> = ct.iter().filter_map(|t| t.dc_terms_title.as_deref()).collect();
        assert_eq!(titles, vec!["CT Chest", "CT Head"]);

        service.purge_mrrt_report_template(&ct[0]).await.unwrap();
        assert!(service.get_mrrt_report_template(1).await.unwrap().is_none());
        assert!(service
            .purge_mrrt_report_template(&MrrtReportTemplate::default())
            .await
            .is_err());
    }
}
