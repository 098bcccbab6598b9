//! 请求处理共享状态

use radiology_dicom::DicomWebViewer;
use radiology_workflow::{
    MrrtReportTemplateService, RadiologyModalityService, RadiologyOrderService,
    RadiologyReportService, RadiologyStudyService,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub order_service: Arc<RadiologyOrderService>,
    pub study_service: Arc<RadiologyStudyService>,
    pub report_service: Arc<RadiologyReportService>,
    pub modality_service: Arc<RadiologyModalityService>,
    pub template_service: Arc<MrrtReportTemplateService>,
    pub dicom_web_viewer: Arc<DicomWebViewer>,
}
