//! HL7 辅助函数：姓名 (XPN) 与优先级映射

use super::codes::CommonOrderPriority;
use super::encoding::{EncodingCharacters, Field, Segment};
use radiology_core::{PersonName, Urgency};

/// HL7 扩展姓名 (XPN)：family^given^middle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendedPersonName {
    pub family_name: Option<String>,
    pub given_name: Option<String>,
    pub middle_initial_or_name: Option<String>,
}

impl ExtendedPersonName {
    /// 写入段的指定字段，未设置的组件留空
    pub fn write_to(&self, segment: &mut Segment, field: usize) {
        let components = [
            &self.family_name,
            &self.given_name,
            &self.middle_initial_or_name,
        ];
        for (index, value) in components.into_iter().enumerate() {
            if let Some(value) = value {
                segment.set_component(field, index + 1, value);
            }
        }
    }

    pub fn encode(&self, encoding: &EncodingCharacters) -> String {
        let mut scratch = Segment::new("XPN");
        self.write_to(&mut scratch, 1);
        scratch
            .field(1)
            .map(|f: &Field| f.encode(encoding))
            .unwrap_or_default()
    }
}

/// 按字段构建 XPN，姓名缺失时返回空 XPN
pub fn extended_person_name_from(person_name: Option<&PersonName>) -> ExtendedPersonName {
    match person_name {
        Some(name) => ExtendedPersonName {
            family_name: name.family_name.clone(),
            given_name: name.given_name.clone(),
            middle_initial_or_name: name.middle_name.clone(),
        },
        None => ExtendedPersonName::default(),
    }
}

/// STAT→S，ON_SCHEDULED_DATE→T，ROUTINE 和未设置→R
pub fn convert_order_urgency_to_common_order_priority(
    urgency: Option<Urgency>,
) -> CommonOrderPriority {
    match urgency {
        Some(Urgency::Stat) => CommonOrderPriority::Stat,
        Some(Urgency::OnScheduledDate) => CommonOrderPriority::TimingCritical,
        Some(Urgency::Routine) | None => CommonOrderPriority::Routine,
    }
}
