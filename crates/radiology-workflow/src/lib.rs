//! # Radiology工作流模块
//!
//! 提供放射科业务流程，包括：
//! - 医嘱下达、停止、检查号分配以及与 PACS 工作列表的 HL7 同步
//! - 检查保存、Study Instance UID 分配与执行步骤状态机
//! - 报告认领、取消认领与完成
//! - 检查设备维护与校验
//! - MRRT 报告模板导入与查询

pub mod accession;
pub mod modality_service;
pub mod modality_validator;
pub mod order_service;
pub mod order_validator;
pub mod report_service;
pub mod report_validator;
pub mod repository;
pub mod search;
pub mod state_machine;
pub mod study_service;
pub mod template_parser;
pub mod template_service;

// 重新导出主要类型
pub use accession::{AccessionNumberGenerator, SequentialAccessionNumberGenerator};
pub use modality_service::RadiologyModalityService;
pub use modality_validator::RadiologyModalityValidator;
pub use order_service::RadiologyOrderService;
pub use order_validator::{RadiologyDiscontinuedOrderValidator, RadiologyOrderValidator};
pub use report_service::RadiologyReportService;
pub use report_validator::RadiologyReportValidator;
pub use repository::{
    InMemoryMrrtReportTemplateRepository, InMemoryRadiologyModalityRepository,
    InMemoryRadiologyOrderRepository, InMemoryRadiologyReportRepository, InMemoryStudyRepository,
    MrrtReportTemplateRepository, RadiologyModalityRepository, RadiologyOrderRepository,
    RadiologyReportRepository, StudyRepository,
};
pub use search::{
    MrrtReportTemplateSearchCriteria, RadiologyOrderSearchCriteria, RadiologyReportSearchCriteria,
};
pub use state_machine::{PerformedProcedureStepStateMachine, ProcedureStepEvent};
pub use study_service::RadiologyStudyService;
pub use template_parser::MrrtReportTemplateFileParser;
pub use template_service::MrrtReportTemplateService;
