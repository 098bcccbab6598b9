//! 检查设备服务

use crate::modality_validator::RadiologyModalityValidator;
use crate::repository::RadiologyModalityRepository;
use chrono::Local;
use radiology_core::{RadiologyError, RadiologyModality, Result};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub struct RadiologyModalityService {
    modalities: Arc<dyn RadiologyModalityRepository>,
    validator: RadiologyModalityValidator,
}

impl RadiologyModalityService {
    pub fn new(modalities: Arc<dyn RadiologyModalityRepository>) -> Self {
        Self {
            modalities,
            validator: RadiologyModalityValidator::new(),
        }
    }

    /// 校验后保存
    pub async fn save_radiology_modality(
        &self,
        mut modality: RadiologyModality,
    ) -> Result<RadiologyModality> {
        let errors = self.validator.validate(&mut modality);
        if errors.has_errors() {
            warn!("Rejected radiology modality {}: {}", modality.ae_title, errors);
        }
        errors.into_result()?;

        let saved = self.modalities.save(modality).await?;
        info!("Saved radiology modality {} ({:?})", saved.ae_title, saved.modality_id);
        Ok(saved)
    }

    pub async fn retire_radiology_modality(
        &self,
        mut modality: RadiologyModality,
        reason: Option<&str>,
    ) -> Result<RadiologyModality> {
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| RadiologyError::illegal_argument("retireReason cannot be empty"))?;

        modality.retired = true;
        modality.retire_reason = Some(reason.to_string());
        modality.date_retired = Some(Local::now().naive_local());

        let retired = self.modalities.save(modality).await?;
        info!("Retired radiology modality {}: {}", retired.ae_title, reason);
        Ok(retired)
    }

    pub async fn get_radiology_modality(&self, id: i32) -> Result<Option<RadiologyModality>> {
        self.modalities.find_by_id(id).await
    }

    pub async fn get_radiology_modality_by_uuid(
        &self,
        uuid: &Uuid,
    ) -> Result<Option<RadiologyModality>> {
        self.modalities.find_by_uuid(uuid).await
    }

    pub async fn get_radiology_modalities(
        &self,
        include_retired: bool,
    ) -> Result<Vec<RadiologyModality>> {
        self.modalities.find_all(include_retired).await
    }
}
