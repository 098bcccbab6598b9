//! 核心数据模型定义

use crate::codes::*;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 姓名（HL7 XPN 的来源）
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PersonName {
    pub family_name: Option<String>,
    pub given_name: Option<String>,
    pub middle_name: Option<String>,
}

impl PersonName {
    pub fn new(family_name: &str, given_name: &str, middle_name: &str) -> Self {
        Self {
            family_name: Some(family_name.to_string()),
            given_name: Some(given_name.to_string()),
            middle_name: Some(middle_name.to_string()),
        }
    }
}

/// 患者基本信息
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Patient {
    pub patient_id: Option<i32>,
    pub uuid: Uuid,
    pub identifier: Option<String>,             // 首选患者标识
    pub gender: Option<String>,                 // M / F / O
    pub birthdate: Option<NaiveDateTime>,
    pub person_name: Option<PersonName>,
}

impl Default for Patient {
    fn default() -> Self {
        Self {
            patient_id: None,
            uuid: Uuid::new_v4(),
            identifier: None,
            gender: None,
            birthdate: None,
            person_name: None,
        }
    }
}

/// 医生 / 报告解读者
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Provider {
    pub provider_id: Option<i32>,
    pub uuid: Uuid,
    pub name: String,
}

impl Provider {
    pub fn new(name: &str) -> Self {
        Self {
            provider_id: None,
            uuid: Uuid::new_v4(),
            name: name.to_string(),
        }
    }
}

/// 影像检查
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Study {
    pub study_id: Option<i32>,
    pub study_instance_uid: Option<String>,     // DICOM Study Instance UID
    pub radiology_order_id: Option<i32>,
    pub modality: Option<Modality>,
    pub scheduled_status: Option<ScheduledProcedureStepStatus>,
    pub performed_status: Option<PerformedProcedureStepStatus>,
    pub priority: Option<RequestedProcedurePriority>,
    pub mwl_status: MwlStatus,
}

impl Study {
    pub fn new(modality: Modality) -> Self {
        Self {
            modality: Some(modality),
            ..Self::default()
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.performed_status == Some(PerformedProcedureStepStatus::InProgress)
    }

    pub fn is_completed(&self) -> bool {
        self.performed_status == Some(PerformedProcedureStepStatus::Completed)
    }

    /// 尚未有执行步骤的检查可以被预约
    pub fn is_scheduleable(&self) -> bool {
        self.performed_status.is_none()
    }
}

impl Default for Study {
    fn default() -> Self {
        Self {
            study_id: None,
            study_instance_uid: None,
            radiology_order_id: None,
            modality: None,
            scheduled_status: None,
            performed_status: None,
            priority: None,
            mwl_status: MwlStatus::Default,
        }
    }
}

/// 放射检查医嘱
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RadiologyOrder {
    pub order_id: Option<i32>,
    pub uuid: Uuid,
    pub order_number: Option<String>,
    pub accession_number: Option<String>,
    pub patient: Option<Patient>,
    pub orderer: Option<Provider>,
    pub instructions: Option<String>,
    pub urgency: Option<Urgency>,
    pub date_activated: Option<NaiveDateTime>,
    pub scheduled_date: Option<NaiveDateTime>,
    pub date_stopped: Option<NaiveDateTime>,
    pub discontinue_reason: Option<String>,
    pub voided: bool,
    pub study: Option<Study>,
}

impl Default for RadiologyOrder {
    fn default() -> Self {
        Self {
            order_id: None,
            uuid: Uuid::new_v4(),
            order_number: None,
            accession_number: None,
            patient: None,
            orderer: None,
            instructions: None,
            urgency: None,
            date_activated: None,
            scheduled_date: None,
            date_stopped: None,
            discontinue_reason: None,
            voided: false,
            study: None,
        }
    }
}

impl RadiologyOrder {
    /// 有预约时间时以预约时间为准，否则为激活时间
    pub fn effective_start_date(&self) -> Option<NaiveDateTime> {
        match (self.urgency, self.scheduled_date) {
            (Some(Urgency::OnScheduledDate), Some(scheduled)) => Some(scheduled),
            _ => self.date_activated,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.voided && !self.is_discontinued()
    }

    pub fn is_discontinued(&self) -> bool {
        self.date_stopped
            .is_some_and(|stopped| stopped <= Local::now().naive_local())
    }

    pub fn is_in_progress(&self) -> bool {
        self.study.as_ref().is_some_and(Study::is_in_progress)
    }

    pub fn is_completed(&self) -> bool {
        self.study.as_ref().is_some_and(Study::is_completed)
    }

    pub fn is_not_completed(&self) -> bool {
        !self.is_completed()
    }

    pub fn patient_uuid(&self) -> Option<Uuid> {
        self.patient.as_ref().map(|p| p.uuid)
    }
}

/// 放射报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadiologyReport {
    pub report_id: Option<i32>,
    pub uuid: Uuid,
    pub radiology_order_id: i32,
    pub date_created: NaiveDateTime,
    pub report_date: Option<NaiveDateTime>,
    pub principal_results_interpreter: Option<Provider>,
    pub report_status: RadiologyReportStatus,
    pub report_body: Option<String>,
    #[serde(default)]
    pub voided: bool,
}

impl RadiologyReport {
    /// 新报告总是以 CLAIMED 状态创建
    pub fn new(radiology_order_id: i32) -> Self {
        Self {
            report_id: None,
            uuid: Uuid::new_v4(),
            radiology_order_id,
            date_created: Local::now().naive_local(),
            report_date: None,
            principal_results_interpreter: None,
            report_status: RadiologyReportStatus::Claimed,
            report_body: None,
            voided: false,
        }
    }
}

/// 检查设备（DICOM 应用实体）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadiologyModality {
    pub modality_id: Option<i32>,
    pub uuid: Uuid,
    pub ae_title: String,
    pub name: String,
    pub description: Option<String>,
    pub retired: bool,
    pub retire_reason: Option<String>,
    pub date_retired: Option<NaiveDateTime>,
}

impl RadiologyModality {
    pub fn new(ae_title: &str, name: &str) -> Self {
        Self {
            modality_id: None,
            uuid: Uuid::new_v4(),
            ae_title: ae_title.to_string(),
            name: name.to_string(),
            description: None,
            retired: false,
            retire_reason: None,
            date_retired: None,
        }
    }
}

/// MRRT 报告模板，元数据来自模板 HTML 中的 Dublin Core `meta` 标签
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MrrtReportTemplate {
    pub template_id: Option<i32>,
    pub uuid: Uuid,
    pub charset: Option<String>,
    pub dc_terms_title: Option<String>,
    pub dc_terms_description: Option<String>,
    pub dc_terms_identifier: Option<String>,
    pub dc_terms_type: Option<String>,
    pub dc_terms_language: Option<String>,
    pub dc_terms_publisher: Option<String>,
    pub dc_terms_rights: Option<String>,
    pub dc_terms_license: Option<String>,
    pub dc_terms_date: Option<String>,
    pub dc_terms_creator: Option<String>,
    /// 模板原文
    #[serde(skip_serializing)]
    pub html: String,
}

impl Default for MrrtReportTemplate {
    fn default() -> Self {
        Self {
            template_id: None,
            uuid: Uuid::new_v4(),
            charset: None,
            dc_terms_title: None,
            dc_terms_description: None,
            dc_terms_identifier: None,
            dc_terms_type: None,
            dc_terms_language: None,
            dc_terms_publisher: None,
            dc_terms_rights: None,
            dc_terms_license: None,
            dc_terms_date: None,
            dc_terms_creator: None,
            html: String::new(),
        }
    }
}

impl MrrtReportTemplate {
    pub fn new(html: &str) -> Self {
        Self {
            html: html.to_string(),
            ..Default::default()
        }
    }
}
