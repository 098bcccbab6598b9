//! 影像检查服务

use crate::repository::StudyRepository;
use crate::state_machine::{PerformedProcedureStepStateMachine, ProcedureStepEvent};
use chrono::NaiveDateTime;
use radiology_core::{
    PerformedProcedureStepStatus, RadiologyError, Result, ScheduledProcedureStepStatus, Study,
};
use radiology_dicom::DicomUidValidator;
use std::sync::Arc;
use tracing::{info, warn};

/// Study Instance UID 中位于机构根与检查 id 之间的固定分段
const STUDY_UID_SLUG: &str = "1";

pub struct RadiologyStudyService {
    studies: Arc<dyn StudyRepository>,
    study_prefix: String,
    state_machine: PerformedProcedureStepStateMachine,
}

impl RadiologyStudyService {
    pub fn new(studies: Arc<dyn StudyRepository>, uid_org_root: &str) -> Self {
        Self {
            studies,
            study_prefix: format!("{}.{}.", uid_org_root, STUDY_UID_SLUG),
            state_machine: PerformedProcedureStepStateMachine::new(),
        }
    }

    /// Study Instance UID 前缀，形如 `<机构根>.1.`
    pub fn study_prefix(&self) -> &str {
        &self.study_prefix
    }

    /// 保存检查，首次保存时分配 Study Instance UID
    ///
    /// 医嘱带预约时间且检查尚无预约状态时，预约状态置为 SCHEDULED。
    pub async fn save_study(
        &self,
        mut study: Study,
        scheduled_date: Option<NaiveDateTime>,
    ) -> Result<Study> {
        if study.scheduled_status.is_none() && scheduled_date.is_some() {
            study.scheduled_status = Some(ScheduledProcedureStepStatus::Scheduled);
        }

        let mut saved = self.studies.save(study).await?;
        if saved.study_instance_uid.is_none() {
            let study_id = saved.study_id.ok_or_else(|| {
                RadiologyError::illegal_argument("study was saved without a studyId")
            })?;
            let uid = format!("{}{}", self.study_prefix, study_id);
            if !DicomUidValidator::is_valid(uid.as_str()) {
                warn!("Generated study instance uid {} is not a valid DICOM UID", uid);
                return Err(RadiologyError::illegal_argument(format!(
                    "{} is an invalid DICOM UID",
                    uid
                )));
            }
            saved.study_instance_uid = Some(uid);
            saved = self.studies.save(saved).await?;
            info!(
                "Assigned study instance uid {:?} to study {}",
                saved.study_instance_uid, study_id
            );
        }
        Ok(saved)
    }

    /// 按 MPPS 通知更新执行状态，只接受状态机允许的转换
    pub async fn update_study_performed_status(
        &self,
        study_instance_uid: Option<&str>,
        performed_status: Option<PerformedProcedureStepStatus>,
    ) -> Result<Study> {
        let study_instance_uid = study_instance_uid
            .ok_or_else(|| RadiologyError::illegal_argument("studyInstanceUid is required"))?;
        let performed_status = performed_status
            .ok_or_else(|| RadiologyError::illegal_argument("performedStatus is required"))?;

        let mut study = self
            .studies
            .find_by_study_instance_uid(study_instance_uid)
            .await?
            .ok_or_else(|| {
                RadiologyError::NotFound(format!("study with uid {}", study_instance_uid))
            })?;

        let next = self.state_machine.transition(
            study.performed_status,
            ProcedureStepEvent::for_status(performed_status),
        )?;
        info!(
            "Study {} performed status {} -> {}",
            study_instance_uid,
            PerformedProcedureStepStatus::name_or_unknown(study.performed_status),
            next.name()
        );
        study.performed_status = Some(next);
        self.studies.save(study).await
    }

    pub async fn get_study_by_study_id(&self, study_id: i32) -> Result<Option<Study>> {
        self.studies.find_by_id(study_id).await
    }

    /// 医嘱必定关联一个检查，找不到时返回 `NotFound`
    pub async fn get_study_by_order_id(&self, order_id: i32) -> Result<Study> {
        self.studies
            .find_by_order_id(order_id)
            .await?
            .ok_or_else(|| RadiologyError::NotFound(format!("study for order {}", order_id)))
    }

    pub async fn get_study_by_study_instance_uid(
        &self,
        study_instance_uid: &str,
    ) -> Result<Option<Study>> {
        self.studies
            .find_by_study_instance_uid(study_instance_uid)
            .await
    }

    pub async fn get_studies_by_radiology_orders(&self, order_ids: &[i32]) -> Result<Vec<Study>> {
        let mut studies = Vec::with_capacity(order_ids.len());
        for order_id in order_ids {
            if let Some(study) = self.studies.find_by_order_id(*order_id).await? {
                studies.push(study);
            }
        }
        Ok(studies)
    }
}
