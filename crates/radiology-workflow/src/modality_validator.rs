//! 检查设备校验

use radiology_core::{RadiologyModality, ValidationErrors};

pub const MAX_LENGTH_AE_TITLE: usize = 16;
pub const MAX_LENGTH_NAME: usize = 255;
pub const MAX_LENGTH_DESCRIPTION: usize = 255;
pub const MAX_LENGTH_RETIRE_REASON: usize = 255;

const ERROR_NULL: &str = "error.null";
const ERROR_MAX_LENGTH: &str = "error.exceededMaxLengthOfField";

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn exceeds(value: Option<&str>, max: usize) -> bool {
    value.is_some_and(|v| v.chars().count() > max)
}

/// 检查设备校验器
#[derive(Debug, Default, Clone, Copy)]
pub struct RadiologyModalityValidator;

impl RadiologyModalityValidator {
    pub fn new() -> Self {
        Self
    }

    /// 校验设备并返回全部字段错误
    ///
    /// 已停用但没有停用原因的设备会被重置为未停用。
    pub fn validate(&self, modality: &mut RadiologyModality) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        if is_blank(Some(&modality.ae_title)) {
            errors.reject("aeTitle", ERROR_NULL);
        }
        if is_blank(Some(&modality.name)) {
            errors.reject("name", ERROR_NULL);
        }
        if modality.retired && is_blank(modality.retire_reason.as_deref()) {
            modality.retired = false;
            errors.reject("retireReason", ERROR_NULL);
        }

        let lengths = [
            ("aeTitle", Some(modality.ae_title.as_str()), MAX_LENGTH_AE_TITLE),
            ("name", Some(modality.name.as_str()), MAX_LENGTH_NAME),
            ("description", modality.description.as_deref(), MAX_LENGTH_DESCRIPTION),
            ("retireReason", modality.retire_reason.as_deref(), MAX_LENGTH_RETIRE_REASON),
        ];
        for (field, value, max) in lengths {
            if exceeds(value, max) {
                errors.reject(field, ERROR_MAX_LENGTH);
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modality() -> RadiologyModality {
        RadiologyModality::new("CT01", "Siemens CT")
    }

    #[test]
    fn test_valid_modality() {
        let mut modality = modality();
        modality.description = Some("Emergency department scanner".to_string());
        assert!(!RadiologyModalityValidator.validate(&mut modality).has_errors());
    }

    #[test]
    fn test_blank_required_fields() {
        let mut modality = RadiologyModality::new("  ", "");
        let errors = RadiologyModalityValidator.validate(&mut modality);
        assert!(errors.has_field_error("aeTitle"));
        assert!(errors.has_field_error("name"));
        assert_eq!(errors.errors.len(), 2);
    }

    #[test]
    fn test_retired_without_reason_is_reset() {
        let mut modality = modality();
        modality.retired = true;
        modality.retire_reason = Some(" ".to_string());

        let errors = RadiologyModalityValidator.validate(&mut modality);
        assert!(errors.has_field_error("retireReason"));
        assert!(!modality.retired);

        modality.retired = true;
        modality.retire_reason = Some("replaced".to_string());
        assert!(!RadiologyModalityValidator.validate(&mut modality).has_errors());
        assert!(modality.retired);
    }

    #[test]
    fn test_field_lengths() {
        let mut modality = RadiologyModality::new(&"A".repeat(17), &"N".repeat(256));
        modality.description = Some("D".repeat(256));

        let errors = RadiologyModalityValidator.validate(&mut modality);
        assert!(errors.has_field_error("aeTitle"));
        assert!(errors.has_field_error("name"));
        assert!(errors.has_field_error("description"));
        assert!(errors
            .errors
            .iter()
            .all(|e| e.code == "error.exceededMaxLengthOfField"));

        let mut boundary = RadiologyModality::new(&"A".repeat(16), &"N".repeat(255));
        assert!(!RadiologyModalityValidator.validate(&mut boundary).has_errors());
    }
}
