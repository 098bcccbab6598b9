//! Web服务器

use crate::handlers::{
    api_root, create_modality, get_modalities, get_modality, get_order, get_orders, get_report,
    get_reports, get_template, get_templates, health, import_template, retire_modality,
};
use crate::state::AppState;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

pub struct WebServer {
    addr: SocketAddr,
    app: Router,
}

impl WebServer {
    pub fn new(addr: SocketAddr, state: AppState) -> Self {
        Self {
            addr,
            app: Self::create_app(state),
        }
    }

    pub fn create_app(state: AppState) -> Router {
        Router::new()
            .route("/", get(api_root))
            .route("/health", get(health))
            .route(
                "/radiologymodality",
                get(get_modalities).post(create_modality),
            )
            .route(
                "/radiologymodality/:uuid",
                get(get_modality).delete(retire_modality),
            )
            .route("/radiologyorder", get(get_orders))
            .route("/radiologyorder/:uuid", get(get_order))
            .route("/radiologyreport", get(get_reports))
            .route("/radiologyreport/:uuid", get(get_report))
            .route(
                "/mrrtreporttemplate",
                get(get_templates).post(import_template),
            )
            .route("/mrrtreporttemplate/:uuid", get(get_template))
            .with_state(state)
            // 全局中间件
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(
                        CorsLayer::new()
                            .allow_origin(Any)
                            .allow_methods(Any)
                            .allow_headers(Any),
                    ),
            )
    }

    pub async fn run(self) -> anyhow::Result<()> {
        info!("Starting web server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, self.app)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start web server: {}", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use radiology_core::config::DicomWebViewerConfig;
    use radiology_core::{
        Modality, Patient, PerformedProcedureStepStatus, Provider, RadiologyOrder, Study, Urgency,
    };
    use radiology_dicom::DicomWebViewer;
    use radiology_integration::MllpHl7Sender;
    use radiology_workflow::{
        InMemoryMrrtReportTemplateRepository, InMemoryRadiologyModalityRepository,
        InMemoryRadiologyOrderRepository, InMemoryRadiologyReportRepository,
        InMemoryStudyRepository, MrrtReportTemplateService, RadiologyModalityService,
        RadiologyOrderService, RadiologyReportService, RadiologyStudyService,
    };
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn state() -> AppState {
        let study_service = Arc::new(RadiologyStudyService::new(
            Arc::new(InMemoryStudyRepository::new()),
            "1.2.826.0.1.3680043.8.2186",
        ));
        let sender = Arc::new(MllpHl7Sender::new("127.0.0.1:1", Duration::from_millis(100)));
        AppState {
            order_service: Arc::new(RadiologyOrderService::new(
                Arc::new(InMemoryRadiologyOrderRepository::new()),
                study_service.clone(),
                sender,
            )),
            study_service,
            report_service: Arc::new(RadiologyReportService::new(Arc::new(
                InMemoryRadiologyReportRepository::new(),
            ))),
            modality_service: Arc::new(RadiologyModalityService::new(Arc::new(
                InMemoryRadiologyModalityRepository::new(),
            ))),
            template_service: Arc::new(MrrtReportTemplateService::new(Arc::new(
                InMemoryMrrtReportTemplateRepository::new(),
            ))),
            dicom_web_viewer: Arc::new(DicomWebViewer::new(DicomWebViewerConfig {
                address: "localhost".to_string(),
                port: 8081,
                base_url: "/weasis-pacs-connector/viewer".to_string(),
                local_server_name: None,
            })),
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn place_order(state: &AppState) -> RadiologyOrder {
        state
            .order_service
            .place_radiology_order(RadiologyOrder {
                patient: Some(Patient {
                    identifier: Some("100".to_string()),
                    ..Default::default()
                }),
                orderer: Some(Provider::new("Dr. House")),
                urgency: Some(Urgency::Routine),
                study: Some(Study::new(Modality::CT)),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = WebServer::create_app(state());
        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_modality_lifecycle() {
        let app = WebServer::create_app(state());

        let create = Request::builder()
            .method("POST")
            .uri("/radiologymodality")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"ae_title":"CT01","name":"CT Scanner"}"#))
            .unwrap();
        let (status, created) = send(&app, create).await;
        assert_eq!(status, StatusCode::CREATED);
        let uuid = created["uuid"].as_str().unwrap().to_string();

        let (status, list) = send(&app, get("/radiologymodality")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, modality) = send(&app, get(&format!("/radiologymodality/{}", uuid))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(modality["ae_title"], "CT01");

        let retire = |uri: String| {
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap()
        };
        let (status, _) = send(&app, retire(format!("/radiologymodality/{}", uuid))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, retired) =
            send(&app, retire(format!("/radiologymodality/{}?reason=broken", uuid))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(retired["retired"], true);

        let (_, list) = send(&app, get("/radiologymodality")).await;
        assert!(list.as_array().unwrap().is_empty());
        let (_, list) = send(&app, get("/radiologymodality?include_all=true")).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_modality_returns_field_errors() {
        let app = WebServer::create_app(state());
        let create = Request::builder()
            .method("POST")
            .uri("/radiologymodality")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"ae_title":"","name":"CT Scanner"}"#))
            .unwrap();

        let (status, body) = send(&app, create).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field_errors"][0]["field"], "aeTitle");
    }

    #[tokio::test]
    async fn test_orders() {
        let state = state();
        let order = place_order(&state).await;
        let app = WebServer::create_app(state);

        let (status, body) = send(&app, get(&format!("/radiologyorder/{}", order.uuid))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["order_number"], "ORD-1");
        assert_eq!(body["accession_number"], "1");
        assert_eq!(
            body["dicom_viewer_url"],
            "http://localhost:8081/weasis-pacs-connector/viewer?studyUID=1.2.826.0.1.3680043.8.2186.1.1"
        );

        let patient = order.patient_uuid().unwrap();
        let (status, body) = send(&app, get(&format!("/radiologyorder?patient={}", patient))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, _) = send(&app, get("/radiologyorder")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) =
            send(&app, get(&format!("/radiologyorder/{}", Uuid::new_v4()))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], 404);
    }

    #[tokio::test]
    async fn test_reports() {
        let state = state();
        let order = place_order(&state).await;
        let uid = order.study.as_ref().unwrap().study_instance_uid.clone();
        for status in [
            PerformedProcedureStepStatus::InProgress,
            PerformedProcedureStepStatus::Completed,
        ] {
            state
                .study_service
                .update_study_performed_status(uid.as_deref(), Some(status))
                .await
                .unwrap();
        }
        let order = state.order_service.get_radiology_order(1).await.unwrap().unwrap();
        let report = state
            .report_service
            .create_and_claim_radiology_report(&order)
            .await
            .unwrap();
        let app = WebServer::create_app(state);

        let (status, body) = send(&app, get(&format!("/radiologyreport/{}", report.uuid))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["report_status"], "CLAIMED");

        let uri = format!("/radiologyreport?order={}&status=claimed", order.uuid);
        let (status, body) = send(&app, get(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let uri = format!("/radiologyreport?order={}&status=COMPLETED", order.uuid);
        let (_, body) = send(&app, get(&uri)).await;
        assert!(body.as_array().unwrap().is_empty());

        let uri = format!("/radiologyreport?order={}&status=bogus", order.uuid);
        let (status, _) = send(&app, get(&uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    fn template_html(identifier: &str, title: &str) -> String {
        format!(
            r#"<html><head>
<meta charset="UTF-8"/>
<meta name="dcterms.title" content="{title}"/>
<meta name="dcterms.identifier" content="{identifier}"/>
<meta name="dcterms.publisher" content="RSNA"/>
<meta name="dcterms.date" content="2013-06-03"/>
</head><body><section data-section-name="Impression"></section></body></html>"#
        )
    }

    #[tokio::test]
    async fn test_templates() {
        let state = state();
        let chest = state
            .template_service
            .import_mrrt_report_template(&template_html("t-1", "CT Chest"))
            .await
            .unwrap();
        let app = WebServer::create_app(state);

        let import = Request::builder()
            .method("POST")
            .uri("/mrrtreporttemplate")
            .header("content-type", "text/html")
            .body(Body::from(template_html("t-2", "MR Brain")))
            .unwrap();
        let (status, created) = send(&app, import).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["dc_terms_identifier"], "t-2");
        assert!(created.get("html").is_none());

        let (status, list) = send(&app, get("/mrrtreporttemplate")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 2);

        let (_, list) = send(&app, get("/mrrtreporttemplate?title=chest")).await;
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["uuid"], chest.uuid.to_string());

        let (status, body) = send(&app, get(&format!("/mrrtreporttemplate/{}", chest.uuid))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dc_terms_title"], "CT Chest");
        assert_eq!(body["charset"], "UTF-8");

        let (status, _) =
            send(&app, get(&format!("/mrrtreporttemplate/{}", Uuid::new_v4()))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
