//! 放射检查医嘱服务
//!
//! 下达、停止医嘱，并通过 HL7 ORM^O01 将医嘱同步到 PACS 工作列表。
//! 每次同步的结果记录在检查的 MWL 状态上。

use crate::accession::{AccessionNumberGenerator, SequentialAccessionNumberGenerator};
use crate::order_validator::{RadiologyDiscontinuedOrderValidator, RadiologyOrderValidator};
use crate::repository::RadiologyOrderRepository;
use crate::search::RadiologyOrderSearchCriteria;
use crate::study_service::RadiologyStudyService;
use chrono::Local;
use radiology_core::{MwlOperation, Provider, RadiologyError, RadiologyOrder, Result};
use radiology_integration::{Hl7Sender, OrderControlElement, RadiologyOrmO01};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub struct RadiologyOrderService {
    orders: Arc<dyn RadiologyOrderRepository>,
    study_service: Arc<RadiologyStudyService>,
    hl7_sender: Arc<dyn Hl7Sender>,
    accession_numbers: Arc<dyn AccessionNumberGenerator>,
}

impl RadiologyOrderService {
    pub fn new(
        orders: Arc<dyn RadiologyOrderRepository>,
        study_service: Arc<RadiologyStudyService>,
        hl7_sender: Arc<dyn Hl7Sender>,
    ) -> Self {
        Self {
            orders,
            study_service,
            hl7_sender,
            accession_numbers: Arc::new(SequentialAccessionNumberGenerator::default()),
        }
    }

    pub fn with_accession_number_generator(
        mut self,
        accession_numbers: Arc<dyn AccessionNumberGenerator>,
    ) -> Self {
        self.accession_numbers = accession_numbers;
        self
    }

    /// 下达新医嘱：校验后分配 id、医嘱号 `ORD-<id>` 与检查号，保存关联检查
    pub async fn place_radiology_order(&self, mut order: RadiologyOrder) -> Result<RadiologyOrder> {
        if order.order_id.is_some() {
            return Err(RadiologyError::illegal_argument("Cannot edit an existing order!"));
        }
        let study = order
            .study
            .take()
            .ok_or_else(|| RadiologyError::illegal_argument("radiologyOrder.study is required"))?;
        if study.modality.is_none() {
            return Err(RadiologyError::illegal_argument(
                "radiologyOrder.study.modality is required",
            ));
        }

        if order.date_activated.is_none() {
            order.date_activated = Some(Local::now().naive_local());
        }
        let errors = RadiologyOrderValidator::new().validate(&order);
        if errors.has_errors() {
            warn!("Rejected radiology order: {}", errors);
        }
        errors.into_result()?;

        if order.accession_number.is_none() {
            order.accession_number = Some(self.accession_numbers.new_accession_number());
        }
        let mut order = self.orders.save(order).await?;
        let order_id = order
            .order_id
            .ok_or_else(|| RadiologyError::illegal_argument("radiologyOrder is not persisted"))?;
        order.order_number = Some(format!("ORD-{}", order_id));

        let mut study = study;
        study.radiology_order_id = Some(order_id);
        let study = self
            .study_service
            .save_study(study, order.scheduled_date)
            .await?;
        order.study = Some(study);

        let order = self.orders.save(order).await?;
        info!(
            "Placed radiology order {:?} for patient {:?}",
            order.order_number,
            order.patient_uuid()
        );
        Ok(order)
    }

    /// 停止医嘱，记录停止时间与原因
    pub async fn discontinue_radiology_order(
        &self,
        order: &RadiologyOrder,
        orderer: Option<&Provider>,
        non_coded_discontinue_reason: Option<&str>,
    ) -> Result<RadiologyOrder> {
        let order_id = order
            .order_id
            .ok_or_else(|| RadiologyError::illegal_argument("orderId is null"))?;
        if !order.is_active() {
            return Err(RadiologyError::illegal_argument("order is not active"));
        }
        if order.is_in_progress() {
            return Err(RadiologyError::illegal_argument("radiologyOrder is in progress"));
        }
        if order.is_completed() {
            return Err(RadiologyError::illegal_argument("radiologyOrder is completed"));
        }
        let orderer =
            orderer.ok_or_else(|| RadiologyError::illegal_argument("provider is required"))?;
        RadiologyDiscontinuedOrderValidator::new()
            .validate(Some(orderer), non_coded_discontinue_reason)
            .into_result()?;

        let mut discontinued = order.clone();
        discontinued.date_stopped = Some(Local::now().naive_local());
        discontinued.discontinue_reason = non_coded_discontinue_reason.map(str::to_string);
        let discontinued = self.orders.save(discontinued).await?;

        info!(
            "Radiology order {} discontinued by {}: {:?}",
            order_id, orderer.name, non_coded_discontinue_reason
        );
        Ok(discontinued)
    }

    /// 按 id 查询，检查信息以检查服务中的最新状态为准
    pub async fn get_radiology_order(&self, order_id: i32) -> Result<Option<RadiologyOrder>> {
        match self.orders.find_by_id(order_id).await? {
            Some(order) => Ok(Some(self.with_current_study(order).await?)),
            None => Ok(None),
        }
    }

    pub async fn get_radiology_order_by_uuid(&self, uuid: &Uuid) -> Result<Option<RadiologyOrder>> {
        match self.orders.find_by_uuid(uuid).await? {
            Some(order) => Ok(Some(self.with_current_study(order).await?)),
            None => Ok(None),
        }
    }

    pub async fn get_radiology_orders_by_patient(
        &self,
        patient_uuid: &Uuid,
    ) -> Result<Vec<RadiologyOrder>> {
        let orders = self.orders.find_by_patient(patient_uuid).await?;
        let mut result = Vec::with_capacity(orders.len());
        for order in orders {
            result.push(self.with_current_study(order).await?);
        }
        Ok(result)
    }

    /// 按条件查询医嘱
    pub async fn get_radiology_orders(
        &self,
        criteria: &RadiologyOrderSearchCriteria,
    ) -> Result<Vec<RadiologyOrder>> {
        let orders = self.orders.search(criteria).await?;
        let mut result = Vec::with_capacity(orders.len());
        for order in orders {
            result.push(self.with_current_study(order).await?);
        }
        Ok(result)
    }

    /// 发送 NW 消息
    pub async fn place_radiology_order_in_pacs(&self, order: &mut RadiologyOrder) -> Result<bool> {
        if order.study.is_none() {
            return Err(RadiologyError::illegal_argument("radiologyOrder.study is required"));
        }
        self.send_to_pacs(order, OrderControlElement::NewOrder, MwlOperation::Save)
            .await
    }

    /// 发送 CA 消息
    pub async fn discontinue_radiology_order_in_pacs(
        &self,
        order: &mut RadiologyOrder,
    ) -> Result<bool> {
        self.send_to_pacs(order, OrderControlElement::CancelOrder, MwlOperation::Discontinue)
            .await
    }

    /// 发送 XO 消息
    pub async fn change_radiology_order_in_pacs(&self, order: &mut RadiologyOrder) -> Result<bool> {
        self.send_to_pacs(order, OrderControlElement::ChangeOrder, MwlOperation::Update)
            .await
    }

    async fn send_to_pacs(
        &self,
        order: &mut RadiologyOrder,
        control: OrderControlElement,
        operation: MwlOperation,
    ) -> Result<bool> {
        if order.order_id.is_none() {
            return Err(RadiologyError::illegal_argument("radiologyOrder is not persisted"));
        }

        let message = RadiologyOrmO01::create_encoded_message(order, control)?;
        debug!("Created HL7 ORM^O01 message\n{}", message.replace('\r', "\n"));

        let in_sync = match self.hl7_sender.send(&message).await {
            Ok(ack) if ack.is_success() => true,
            Ok(ack) => {
                warn!(
                    "PACS rejected order {:?}: {} {:?}",
                    order.order_number,
                    ack.code.value(),
                    ack.text
                );
                false
            }
            Err(e) => {
                error!("Failed to send order {:?} to PACS: {}", order.order_number, e);
                false
            }
        };

        self.update_study_mwl_status(order, operation, in_sync).await?;
        Ok(in_sync)
    }

    async fn update_study_mwl_status(
        &self,
        order: &mut RadiologyOrder,
        operation: MwlOperation,
        in_sync: bool,
    ) -> Result<()> {
        let scheduled_date = order.scheduled_date;
        let study = order
            .study
            .as_mut()
            .ok_or_else(|| RadiologyError::illegal_argument("radiologyOrder.study is required"))?;
        study.mwl_status = study.mwl_status.after(operation, in_sync);
        info!(
            "Study {:?} mwl status: {}",
            study.study_instance_uid,
            study.mwl_status.display_name()
        );

        let saved = self
            .study_service
            .save_study(study.clone(), scheduled_date)
            .await?;
        *study = saved;
        Ok(())
    }

    async fn with_current_study(&self, mut order: RadiologyOrder) -> Result<RadiologyOrder> {
        let Some(order_id) = order.order_id else {
            return Ok(order);
        };
        match self.study_service.get_study_by_order_id(order_id).await {
            Ok(study) => order.study = Some(study),
            Err(RadiologyError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryRadiologyOrderRepository, InMemoryStudyRepository};
    use async_trait::async_trait;
    use radiology_core::{
        Modality, MwlStatus, Patient, PerformedProcedureStepStatus, PersonName, Study, Urgency,
    };
    use radiology_integration::hl7::{Acknowledgment, AcknowledgmentCode};
    use std::sync::Mutex;

    /// 记录发送内容并返回预设应答
    struct RecordingSender {
        accept: bool,
        sent: Mutex<Vec<String>>,
    }

    impl RecordingSender {
        fn new(accept: bool) -> Arc<Self> {
            Arc::new(Self {
                accept,
                sent: Mutex::new(Vec::new()),
            })
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Hl7Sender for RecordingSender {
        async fn send(&self, message: &str) -> Result<Acknowledgment> {
            self.sent.lock().unwrap().push(message.to_string());
            let code = if self.accept {
                AcknowledgmentCode::ApplicationAccept
            } else {
                AcknowledgmentCode::ApplicationReject
            };
            Ok(Acknowledgment {
                code,
                control_id: "1".to_string(),
                text: None,
            })
        }
    }

    struct FailingSender;

    #[async_trait]
    impl Hl7Sender for FailingSender {
        async fn send(&self, _message: &str) -> Result<Acknowledgment> {
            Err(RadiologyError::Transport("connection refused".to_string()))
        }
    }

    fn service_with(
        sender: Arc<dyn Hl7Sender>,
    ) -> (RadiologyOrderService, Arc<RadiologyStudyService>) {
        let study_service = Arc::new(RadiologyStudyService::new(
            Arc::new(InMemoryStudyRepository::new()),
            "1.2.826.0.1.3680043.8.2186",
        ));
        let service = RadiologyOrderService::new(
            Arc::new(InMemoryRadiologyOrderRepository::new()),
            study_service.clone(),
            sender,
        );
        (service, study_service)
    }

    fn new_order() -> RadiologyOrder {
        RadiologyOrder {
            instructions: Some("CT ABDOMEN PANCREAS WITH IV CONTRAST".to_string()),
            urgency: Some(Urgency::Stat),
            patient: Some(Patient {
                identifier: Some("100".to_string()),
                gender: Some("M".to_string()),
                person_name: Some(PersonName::new("Doe", "John", "Francis")),
                ..Default::default()
            }),
            orderer: Some(Provider::new("Dr. House")),
            study: Some(Study::new(Modality::CT)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_place_radiology_order() {
        let (service, _) = service_with(RecordingSender::new(true));
        let order = service.place_radiology_order(new_order()).await.unwrap();

        assert_eq!(order.order_id, Some(1));
        assert_eq!(order.order_number.as_deref(), Some("ORD-1"));
        assert_eq!(order.accession_number.as_deref(), Some("1"));
        assert!(order.date_activated.is_some());
        let study = order.study.as_ref().unwrap();
        assert_eq!(study.radiology_order_id, Some(1));
        assert_eq!(
            study.study_instance_uid.as_deref(),
            Some("1.2.826.0.1.3680043.8.2186.1.1")
        );
        assert_eq!(study.mwl_status, MwlStatus::Default);
    }

    #[tokio::test]
    async fn test_place_radiology_order_preconditions() {
        let (service, _) = service_with(RecordingSender::new(true));

        let mut existing = new_order();
        existing.order_id = Some(5);
        let err = service.place_radiology_order(existing).await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot edit an existing order!");

        let mut without_study = new_order();
        without_study.study = None;
        let err = service.place_radiology_order(without_study).await.unwrap_err();
        assert_eq!(err.to_string(), "radiologyOrder.study is required");

        let mut without_modality = new_order();
        without_modality.study = Some(Study::default());
        let err = service.place_radiology_order(without_modality).await.unwrap_err();
        assert_eq!(err.to_string(), "radiologyOrder.study.modality is required");

        let mut without_orderer = new_order();
        without_orderer.orderer = None;
        without_orderer.scheduled_date = Some(Local::now().naive_local());
        match service.place_radiology_order(without_orderer).await.unwrap_err() {
            RadiologyError::Validation(errors) => {
                assert!(errors.has_field_error("orderer"));
                assert!(errors.has_field_error("urgency"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(service.get_radiology_order(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_accession_numbers_follow_configured_seed() {
        let (service, _) = service_with(RecordingSender::new(true));
        let service = service.with_accession_number_generator(Arc::new(
            SequentialAccessionNumberGenerator::new(5000),
        ));

        let first = service.place_radiology_order(new_order()).await.unwrap();
        let second = service.place_radiology_order(new_order()).await.unwrap();
        assert_eq!(first.accession_number.as_deref(), Some("5000"));
        assert_eq!(second.accession_number.as_deref(), Some("5001"));

        let found = service
            .get_radiology_orders(&RadiologyOrderSearchCriteria {
                accession_number: Some("5001".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].order_id, second.order_id);
    }

    #[tokio::test]
    async fn test_place_order_in_pacs_records_mwl_status() {
        let sender = RecordingSender::new(true);
        let (service, study_service) = service_with(sender.clone());
        let mut order = service.place_radiology_order(new_order()).await.unwrap();

        assert!(service.place_radiology_order_in_pacs(&mut order).await.unwrap());
        assert_eq!(
            order.study.as_ref().unwrap().mwl_status,
            MwlStatus::InSync(MwlOperation::Save)
        );
        let stored = study_service.get_study_by_order_id(1).await.unwrap();
        assert!(stored.mwl_status.is_in_sync());

        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("\rORC|NW|ORD-1|||||^^^"));
        assert!(sent[0].ends_with("ZDS|1.2.826.0.1.3680043.8.2186.1.1^^Application^DICOM\r"));
    }

    #[tokio::test]
    async fn test_rejected_or_failed_send_is_out_of_sync() {
        let (service, _) = service_with(RecordingSender::new(false));
        let mut order = service.place_radiology_order(new_order()).await.unwrap();
        assert!(!service.change_radiology_order_in_pacs(&mut order).await.unwrap());
        assert_eq!(
            order.study.as_ref().unwrap().mwl_status,
            MwlStatus::OutOfSync(MwlOperation::Update)
        );

        let (service, _) = service_with(Arc::new(FailingSender));
        let mut order = service.place_radiology_order(new_order()).await.unwrap();
        assert!(!service.place_radiology_order_in_pacs(&mut order).await.unwrap());
        assert!(order.study.as_ref().unwrap().mwl_status.is_out_of_sync());
    }

    #[tokio::test]
    async fn test_discontinue_in_pacs_sends_cancel() {
        let sender = RecordingSender::new(true);
        let (service, _) = service_with(sender.clone());
        let mut order = service.place_radiology_order(new_order()).await.unwrap();

        assert!(service.discontinue_radiology_order_in_pacs(&mut order).await.unwrap());
        assert!(sender.sent()[0].contains("\rORC|CA|ORD-1|"));
        assert_eq!(
            order.study.as_ref().unwrap().mwl_status,
            MwlStatus::InSync(MwlOperation::Discontinue)
        );
    }

    #[tokio::test]
    async fn test_send_requires_persisted_order() {
        let (service, _) = service_with(RecordingSender::new(true));
        let mut order = new_order();
        let err = service.place_radiology_order_in_pacs(&mut order).await.unwrap_err();
        assert_eq!(err.to_string(), "radiologyOrder is not persisted");

        order.study = None;
        let err = service.place_radiology_order_in_pacs(&mut order).await.unwrap_err();
        assert_eq!(err.to_string(), "radiologyOrder.study is required");
    }

    #[tokio::test]
    async fn test_discontinue_radiology_order() {
        let (service, _) = service_with(RecordingSender::new(true));
        let order = service.place_radiology_order(new_order()).await.unwrap();
        let orderer = Provider::new("Dr. Wilson");

        let err = service
            .discontinue_radiology_order(&order, None, Some("duplicate"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "provider is required");

        let err = service
            .discontinue_radiology_order(&order, Some(&orderer), Some(" "))
            .await
            .unwrap_err();
        match err {
            RadiologyError::Validation(errors) => {
                assert!(errors.has_field_error("orderReasonNonCoded"))
            }
            other => panic!("unexpected error: {other}"),
        }

        let discontinued = service
            .discontinue_radiology_order(&order, Some(&orderer), Some("duplicate"))
            .await
            .unwrap();
        assert!(discontinued.is_discontinued());
        assert_eq!(discontinued.discontinue_reason.as_deref(), Some("duplicate"));

        let err = service
            .discontinue_radiology_order(&discontinued, Some(&orderer), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "order is not active");
    }

    #[tokio::test]
    async fn test_discontinue_rejects_started_orders() {
        let (service, study_service) = service_with(RecordingSender::new(true));
        let order = service.place_radiology_order(new_order()).await.unwrap();
        let orderer = Provider::new("Dr. Wilson");
        let uid = order.study.as_ref().unwrap().study_instance_uid.clone();

        study_service
            .update_study_performed_status(
                uid.as_deref(),
                Some(PerformedProcedureStepStatus::InProgress),
            )
            .await
            .unwrap();
        let order = service.get_radiology_order(1).await.unwrap().unwrap();
        let err = service
            .discontinue_radiology_order(&order, Some(&orderer), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "radiologyOrder is in progress");

        study_service
            .update_study_performed_status(
                uid.as_deref(),
                Some(PerformedProcedureStepStatus::Completed),
            )
            .await
            .unwrap();
        let order = service.get_radiology_order(1).await.unwrap().unwrap();
        let err = service
            .discontinue_radiology_order(&order, Some(&orderer), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "radiologyOrder is completed");

        let err = service
            .discontinue_radiology_order(&new_order(), Some(&orderer), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "orderId is null");
    }

    #[tokio::test]
    async fn test_queries() {
        let (service, _) = service_with(RecordingSender::new(true));
        let order = service.place_radiology_order(new_order()).await.unwrap();
        let patient_uuid = order.patient_uuid().unwrap();

        let by_uuid = service.get_radiology_order_by_uuid(&order.uuid).await.unwrap();
        assert_eq!(by_uuid.unwrap().order_id, Some(1));
        assert_eq!(
            service.get_radiology_orders_by_patient(&patient_uuid).await.unwrap().len(),
            1
        );
        assert!(service.get_radiology_order(42).await.unwrap().is_none());
        assert_eq!(order.effective_start_date(), order.date_activated);

        let activated = order.date_activated.unwrap();
        let in_range = service
            .get_radiology_orders(&RadiologyOrderSearchCriteria {
                patient_uuid: Some(patient_uuid),
                urgency: Some(Urgency::Stat),
                from_effective_start_date: Some(activated),
                to_effective_start_date: Some(activated),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(in_range.len(), 1);
        assert!(in_range[0].study.is_some());

        let routine = service
            .get_radiology_orders(&RadiologyOrderSearchCriteria {
                urgency: Some(Urgency::Routine),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(routine.is_empty());
    }
}
