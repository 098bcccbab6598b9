//! 查询条件
//!
//! 所有条件均为可选，未设置的条件不参与过滤。

use chrono::NaiveDateTime;
use radiology_core::{
    MrrtReportTemplate, RadiologyOrder, RadiologyReport, RadiologyReportStatus, Urgency,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 医嘱查询条件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RadiologyOrderSearchCriteria {
    pub patient_uuid: Option<Uuid>,
    pub include_voided: bool,
    pub urgency: Option<Urgency>,
    pub accession_number: Option<String>,
    pub from_effective_start_date: Option<NaiveDateTime>,
    pub to_effective_start_date: Option<NaiveDateTime>,
}

impl RadiologyOrderSearchCriteria {
    pub fn matches(&self, order: &RadiologyOrder) -> bool {
        if self.patient_uuid.is_some() && order.patient_uuid() != self.patient_uuid {
            return false;
        }
        if !self.include_voided && order.voided {
            return false;
        }
        if self.urgency.is_some() && order.urgency != self.urgency {
            return false;
        }
        if let Some(accession_number) = self.accession_number.as_deref() {
            if !accession_number.trim().is_empty()
                && order.accession_number.as_deref() != Some(accession_number)
            {
                return false;
            }
        }

        // 按预约日期下达的医嘱比较预约时间，其余比较激活时间
        let start = if order.urgency == Some(Urgency::OnScheduledDate) {
            order.scheduled_date
        } else {
            order.date_activated
        };
        if let Some(from) = self.from_effective_start_date {
            if !start.is_some_and(|s| s >= from) {
                return false;
            }
        }
        if let Some(to) = self.to_effective_start_date {
            if !start.is_some_and(|s| s <= to) {
                return false;
            }
        }
        true
    }
}

/// 报告查询条件，结果按报告日期升序
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RadiologyReportSearchCriteria {
    pub from_date: Option<NaiveDateTime>,
    pub to_date: Option<NaiveDateTime>,
    pub principal_results_interpreter: Option<Uuid>,
    pub include_voided: bool,
    pub status: Option<RadiologyReportStatus>,
}

impl RadiologyReportSearchCriteria {
    pub fn matches(&self, report: &RadiologyReport) -> bool {
        if !self.include_voided && report.voided {
            return false;
        }
        if let Some(from) = self.from_date {
            if !report.report_date.is_some_and(|d| d >= from) {
                return false;
            }
        }
        if let Some(to) = self.to_date {
            if !report.report_date.is_some_and(|d| d <= to) {
                return false;
            }
        }
        if let Some(interpreter) = self.principal_results_interpreter {
            let uuid = report.principal_results_interpreter.as_ref().map(|p| p.uuid);
            if uuid != Some(interpreter) {
                return false;
            }
        }
        self.status.map_or(true, |status| report.report_status == status)
    }
}

/// 报告模板查询条件，不区分大小写的部分匹配，结果按标题排序
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MrrtReportTemplateSearchCriteria {
    pub title: Option<String>,
    pub publisher: Option<String>,
    pub license: Option<String>,
    pub creator: Option<String>,
}

fn contains_ignore_case(value: Option<&str>, pattern: Option<&str>) -> bool {
    match pattern {
        None => true,
        Some(pattern) => value.is_some_and(|v| v.to_lowercase().contains(&pattern.to_lowercase())),
    }
}

impl MrrtReportTemplateSearchCriteria {
    pub fn with_title(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Self::default()
        }
    }

    pub fn matches(&self, template: &MrrtReportTemplate) -> bool {
        contains_ignore_case(template.dc_terms_title.as_deref(), self.title.as_deref())
            && contains_ignore_case(
                template.dc_terms_publisher.as_deref(),
                self.publisher.as_deref(),
            )
            && contains_ignore_case(template.dc_terms_license.as_deref(), self.license.as_deref())
            && contains_ignore_case(template.dc_terms_creator.as_deref(), self.creator.as_deref())
    }
}
