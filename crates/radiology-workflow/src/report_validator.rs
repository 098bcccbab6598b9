//! 放射报告校验

use radiology_core::{RadiologyReport, ValidationErrors};

const ERROR_NULL: &str = "error.null";

/// 完成报告前要求解读者与报告正文
#[derive(Debug, Default, Clone, Copy)]
pub struct RadiologyReportValidator;

impl RadiologyReportValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, report: &RadiologyReport) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let interpreter_missing = report
            .principal_results_interpreter
            .as_ref()
            .map_or(true, |p| p.name.trim().is_empty());
        if interpreter_missing {
            errors.reject("principalResultsInterpreter", ERROR_NULL);
        }
        if report.report_body.as_deref().map_or(true, |b| b.trim().is_empty()) {
            errors.reject("body", ERROR_NULL);
        }
        errors
    }
}
