//! HL7 v2.3.1 代码表：ORC-1 医嘱控制码和 TQ 优先级

use serde::{Deserialize, Serialize};

/// 医嘱控制码 (ORC-1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderControlElement {
    NewOrder,
    CancelOrder,
    ChangeOrder,
}

impl OrderControlElement {
    pub fn value(&self) -> &'static str {
        match self {
            Self::NewOrder => "NW",
            Self::CancelOrder => "CA",
            Self::ChangeOrder => "XO",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::NewOrder => "New order",
            Self::CancelOrder => "Cancel order request",
            Self::ChangeOrder => "Change order request",
        }
    }
}

impl TryFrom<&str> for OrderControlElement {
    type Error = super::Hl7Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "NW" => Ok(Self::NewOrder),
            "CA" => Ok(Self::CancelOrder),
            "XO" => Ok(Self::ChangeOrder),
            _ => Err(super::Hl7Error::UnsupportedCode(value.to_string())),
        }
    }
}

/// 时间/数量中的优先级组件 (TQ-6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommonOrderPriority {
    Stat,
    Asap,
    Routine,
    TimingCritical,
}

impl CommonOrderPriority {
    pub fn priority(&self) -> u8 {
        match self {
            Self::Stat => 0,
            Self::Asap => 1,
            Self::Routine => 2,
            Self::TimingCritical => 5,
        }
    }

    pub fn value(&self) -> &'static str {
        match self {
            Self::Stat => "S",
            Self::Asap => "A",
            Self::Routine => "R",
            Self::TimingCritical => "T",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Stat => "With highest priority",
            Self::Asap => "Fill after Stat orders",
            Self::Routine => "Default",
            Self::TimingCritical => "critical to come as close as possible to the requested time",
        }
    }
}

impl TryFrom<&str> for CommonOrderPriority {
    type Error = super::Hl7Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "S" => Ok(Self::Stat),
            "A" => Ok(Self::Asap),
            "R" => Ok(Self::Routine),
            "T" => Ok(Self::TimingCritical),
            _ => Err(super::Hl7Error::UnsupportedCode(value.to_string())),
        }
    }
}
