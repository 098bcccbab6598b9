//! 代码表
//!
//! 检查设备、检查步骤状态、优先级以及工作列表同步状态。

use crate::error::{RadiologyError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 检查设备类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Modality {
    CR,
    MR,
    CT,
    NM,
    US,
    XA,
}

impl Modality {
    pub fn full_name(&self) -> &'static str {
        match self {
            Modality::CR => "Computed Radiography",
            Modality::MR => "Magnetic Resonance",
            Modality::CT => "Computed Tomography",
            Modality::NM => "Nuclear Medicine",
            Modality::US => "Ultrasound",
            Modality::XA => "X-Ray Angiography",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Modality::CR => "CR",
            Modality::MR => "MR",
            Modality::CT => "CT",
            Modality::NM => "NM",
            Modality::US => "US",
            Modality::XA => "XA",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// 医嘱紧急程度
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    Routine,
    Stat,
    OnScheduledDate,
}

/// 预约检查步骤状态 (Scheduled Procedure Step Status)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduledProcedureStepStatus {
    Scheduled,
    Arrived,
    Ready,
    Started,
    Departed,
}

impl ScheduledProcedureStepStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Scheduled => "SCHEDULED",
            Self::Arrived => "ARRIVED",
            Self::Ready => "READY",
            Self::Started => "STARTED",
            Self::Departed => "DEPARTED",
        }
    }

    pub fn display_name_or_unknown(status: Option<Self>) -> &'static str {
        status.map_or("UNKNOWN", |s| s.display_name())
    }
}

/// 执行检查步骤状态 (Performed Procedure Step Status)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PerformedProcedureStepStatus {
    InProgress,
    Discontinued,
    Completed,
}

impl PerformedProcedureStepStatus {
    pub fn name(&self) -> &'static str {
        match self {
            Self::InProgress => "IN_PROGRESS",
            Self::Discontinued => "DISCONTINUED",
            Self::Completed => "COMPLETED",
        }
    }

    pub fn name_or_unknown(status: Option<Self>) -> &'static str {
        status.map_or("UNKNOWN", |s| s.name())
    }

    /// 按MPPS中的显示名匹配状态，不区分大小写；无法识别时返回 `None`
    pub fn match_for_display_name(display_name: Option<&str>) -> Result<Option<Self>> {
        let display_name = display_name
            .ok_or_else(|| RadiologyError::illegal_argument("displayName is required"))?;

        let matched = if display_name.eq_ignore_ascii_case("in progress") {
            Some(Self::InProgress)
        } else if display_name.eq_ignore_ascii_case("discontinued") {
            Some(Self::Discontinued)
        } else if display_name.eq_ignore_ascii_case("completed") {
            Some(Self::Completed)
        } else {
            None
        };
        Ok(matched)
    }
}

/// 申请检查优先级
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestedProcedurePriority {
    Stat,
    High,
    Routine,
    Medium,
    Low,
}

impl RequestedProcedurePriority {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Stat => "STAT",
            Self::High => "HIGH",
            Self::Routine => "ROUTINE",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

/// 会影响工作列表同步状态的医嘱操作
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MwlOperation {
    Save,
    Update,
    Void,
    Discontinue,
    Undiscontinue,
    Unvoid,
}

impl MwlOperation {
    fn verb(&self) -> &'static str {
        match self {
            Self::Save => "Save",
            Self::Update => "Update",
            Self::Void => "Void",
            Self::Discontinue => "Discontinue",
            Self::Undiscontinue => "Undiscontinue",
            Self::Unvoid => "Unvoid",
        }
    }
}

/// 工作列表 (MWL) 同步状态
///
/// 新检查处于 `Default`，此后只能通过 [`MwlStatus::after`] 变更。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MwlStatus {
    #[default]
    Default,
    InSync(MwlOperation),
    OutOfSync(MwlOperation),
}

impl MwlStatus {
    /// 一次发送操作完成后的同步状态，与之前的状态无关
    pub fn after(self, operation: MwlOperation, success: bool) -> Self {
        if success {
            MwlStatus::InSync(operation)
        } else {
            MwlStatus::OutOfSync(operation)
        }
    }

    pub fn is_in_sync(&self) -> bool {
        matches!(self, MwlStatus::InSync(_))
    }

    pub fn is_out_of_sync(&self) -> bool {
        matches!(self, MwlStatus::OutOfSync(_))
    }

    pub fn display_name(&self) -> String {
        match self {
            MwlStatus::Default => "Default".to_string(),
            MwlStatus::InSync(op) => {
                format!("In Sync : {} order successful.", op.verb())
            }
            MwlStatus::OutOfSync(op) => {
                format!("Out of Sync : {} order failed. Try again!", op.verb())
            }
        }
    }
}

/// 放射报告状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RadiologyReportStatus {
    Claimed,
    Completed,
    Discontinued,
}

impl std::str::FromStr for RadiologyReportStatus {
    type Err = RadiologyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "CLAIMED" => Ok(Self::Claimed),
            "COMPLETED" => Ok(Self::Completed),
            "DISCONTINUED" => Ok(Self::Discontinued),
            other => Err(RadiologyError::illegal_argument(format!(
                "unknown radiology report status: {}",
                other
            ))),
        }
    }
}
