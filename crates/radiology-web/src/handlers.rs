//! HTTP处理器

use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use radiology_core::{
    MrrtReportTemplate, RadiologyError, RadiologyModality, RadiologyOrder, RadiologyReport,
    RadiologyReportStatus,
};
use radiology_workflow::MrrtReportTemplateSearchCriteria;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

/// REST 错误响应，包装领域错误
#[derive(Debug)]
pub struct ApiError(pub RadiologyError);

impl From<RadiologyError> for ApiError {
    fn from(err: RadiologyError) -> Self {
        Self(err)
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RadiologyError::NotFound(_) => StatusCode::NOT_FOUND,
            RadiologyError::IllegalArgument(_)
            | RadiologyError::NullArgument(_)
            | RadiologyError::UnsupportedOperation(_)
            | RadiologyError::InvalidStateTransition { .. }
            | RadiologyError::Validation(_)
            | RadiologyError::Hl7(_) => StatusCode::BAD_REQUEST,
            RadiologyError::Transport(_)
            | RadiologyError::Config(_)
            | RadiologyError::Io(_)
            | RadiologyError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }

        let mut body = json!({
            "error": true,
            "message": self.0.to_string(),
            "status": status.as_u16()
        });
        if let RadiologyError::Validation(errors) = &self.0 {
            body["field_errors"] = json!(errors.errors);
        }

        (status, Json(body)).into_response()
    }
}

fn not_found(what: &str, uuid: &Uuid) -> ApiError {
    ApiError(RadiologyError::NotFound(format!("{} {}", what, uuid)))
}

/// API根路径处理器
pub async fn api_root() -> impl IntoResponse {
    Json(json!({
        "service": "Radiology REST API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "health": "/health",
            "modalities": "/radiologymodality",
            "orders": "/radiologyorder",
            "reports": "/radiologyreport",
            "templates": "/mrrtreporttemplate"
        }
    }))
}

/// 健康检查处理器
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[derive(Debug, Deserialize)]
pub struct ModalityQueryParams {
    pub include_all: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct NewModalityRequest {
    pub ae_title: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RetireQueryParams {
    pub reason: Option<String>,
}

/// 检查设备列表
pub async fn get_modalities(
    State(state): State<AppState>,
    Query(params): Query<ModalityQueryParams>,
) -> ApiResult<Json<Vec<RadiologyModality>>> {
    let modalities = state
        .modality_service
        .get_radiology_modalities(params.include_all.unwrap_or(false))
        .await?;
    Ok(Json(modalities))
}

pub async fn create_modality(
    State(state): State<AppState>,
    Json(request): Json<NewModalityRequest>,
) -> ApiResult<(StatusCode, Json<RadiologyModality>)> {
    info!("Creating radiology modality {}", request.ae_title);

    let mut modality = RadiologyModality::new(&request.ae_title, &request.name);
    modality.description = request.description;
    let saved = state.modality_service.save_radiology_modality(modality).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn get_modality(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<Json<RadiologyModality>> {
    state
        .modality_service
        .get_radiology_modality_by_uuid(&uuid)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("radiology modality", &uuid))
}

/// 停用检查设备
pub async fn retire_modality(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
    Query(params): Query<RetireQueryParams>,
) -> ApiResult<Json<RadiologyModality>> {
    let modality = state
        .modality_service
        .get_radiology_modality_by_uuid(&uuid)
        .await?
        .ok_or_else(|| not_found("radiology modality", &uuid))?;
    let retired = state
        .modality_service
        .retire_radiology_modality(modality, params.reason.as_deref())
        .await?;
    Ok(Json(retired))
}

#[derive(Debug, Deserialize)]
pub struct OrderQueryParams {
    pub patient: Option<Uuid>,
}

/// 医嘱资源，附带阅片器地址
#[derive(Debug, Serialize)]
pub struct RadiologyOrderResource {
    #[serde(flatten)]
    pub order: RadiologyOrder,
    pub dicom_viewer_url: Option<String>,
}

fn order_resource(state: &AppState, order: RadiologyOrder) -> RadiologyOrderResource {
    let dicom_viewer_url = state
        .dicom_web_viewer
        .dicom_viewer_url(order.study.as_ref())
        .ok();
    RadiologyOrderResource {
        order,
        dicom_viewer_url,
    }
}

pub async fn get_orders(
    State(state): State<AppState>,
    Query(params): Query<OrderQueryParams>,
) -> ApiResult<Json<Vec<RadiologyOrderResource>>> {
    let patient = params
        .patient
        .ok_or_else(|| ApiError(RadiologyError::illegal_argument("patient is required")))?;
    let orders = state
        .order_service
        .get_radiology_orders_by_patient(&patient)
        .await?;
    Ok(Json(
        orders
            .into_iter()
            .map(|order| order_resource(&state, order))
            .collect(),
    ))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<Json<RadiologyOrderResource>> {
    let order = state
        .order_service
        .get_radiology_order_by_uuid(&uuid)
        .await?
        .ok_or_else(|| not_found("radiology order", &uuid))?;
    Ok(Json(order_resource(&state, order)))
}

#[derive(Debug, Deserialize)]
pub struct ReportQueryParams {
    pub order: Option<Uuid>,
    pub status: Option<String>,
}

pub async fn get_report(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<Json<RadiologyReport>> {
    state
        .report_service
        .get_radiology_report_by_uuid(&uuid)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("radiology report", &uuid))
}

/// 按医嘱查询报告，可按状态过滤
pub async fn get_reports(
    State(state): State<AppState>,
    Query(params): Query<ReportQueryParams>,
) -> ApiResult<Json<Vec<RadiologyReport>>> {
    let order_uuid = params
        .order
        .ok_or_else(|| ApiError(RadiologyError::illegal_argument("order is required")))?;
    let statuses = match params.status.as_deref() {
        Some(status) => vec![status.parse::<RadiologyReportStatus>()?],
        None => vec![
            RadiologyReportStatus::Claimed,
            RadiologyReportStatus::Completed,
            RadiologyReportStatus::Discontinued,
        ],
    };

    let order = state
        .order_service
        .get_radiology_order_by_uuid(&order_uuid)
        .await?
        .ok_or_else(|| not_found("radiology order", &order_uuid))?;
    let order_id = order
        .order_id
        .ok_or_else(|| ApiError(RadiologyError::illegal_argument("radiologyOrder is not persisted")))?;

    let mut reports = Vec::new();
    for status in statuses {
        reports.extend(
            state
                .report_service
                .get_radiology_reports_by_radiology_order_and_report_status(order_id, status)
                .await?,
        );
    }
    reports.sort_by_key(|r| r.report_id);
    Ok(Json(reports))
}

/// 报告模板列表，`title` 等参数不区分大小写部分匹配
pub async fn get_templates(
    State(state): State<AppState>,
    Query(criteria): Query<MrrtReportTemplateSearchCriteria>,
) -> ApiResult<Json<Vec<MrrtReportTemplate>>> {
    let templates = state
        .template_service
        .get_mrrt_report_templates(&criteria)
        .await?;
    Ok(Json(templates))
}

pub async fn get_template(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<Json<MrrtReportTemplate>> {
    state
        .template_service
        .get_mrrt_report_template_by_uuid(&uuid)
        .await?
        .map(Json)
        .ok_or_else(|| not_found("mrrt report template", &uuid))
}

/// 导入模板，请求体为模板 HTML 原文
pub async fn import_template(
    State(state): State<AppState>,
    html: String,
) -> ApiResult<(StatusCode, Json<MrrtReportTemplate>)> {
    let template = state
        .template_service
        .import_mrrt_report_template(&html)
        .await?;
    info!(
        "Imported MRRT report template {:?}",
        template.dc_terms_identifier
    );
    Ok((StatusCode::CREATED, Json(template)))
}
