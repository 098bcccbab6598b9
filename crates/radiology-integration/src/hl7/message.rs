//! ORM^O01 检查申请消息

use super::codes::{CommonOrderPriority, OrderControlElement};
use super::encoding::{encode_segments, EncodingCharacters, Segment};
use super::segment;
use super::utils::convert_order_urgency_to_common_order_priority;
use chrono::{Local, NaiveDateTime};
use radiology_core::{RadiologyError, RadiologyOrder, Result};
use tracing::debug;

/// 组装好的 ORM^O01 消息，段顺序为 MSH、PID、ORC、OBR、ZDS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrmO01Message {
    encoding: EncodingCharacters,
    segments: Vec<Segment>,
}

impl OrmO01Message {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, name: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.name() == name)
    }

    pub fn encode(&self) -> String {
        encode_segments(&self.segments, &self.encoding)
    }
}

/// ORM^O01 构建器
pub struct RadiologyOrmO01;

impl RadiologyOrmO01 {
    pub const SENDING_APPLICATION: &'static str = "OpenMRSRadiologyModule";
    pub const SENDING_FACILITY: &'static str = "OpenMRS";
    pub const MESSAGE_TYPE: &'static str = "ORM";
    pub const TRIGGER_EVENT: &'static str = "O01";

    /// 以当前时间作为 MSH-7 构建消息
    pub fn create_message(
        order: &RadiologyOrder,
        control: OrderControlElement,
    ) -> Result<OrmO01Message> {
        Self::create_message_at(order, control, None, Local::now().naive_local())
    }

    /// 构建消息；`priority` 为空时由医嘱紧急程度推导
    pub fn create_message_at(
        order: &RadiologyOrder,
        control: OrderControlElement,
        priority: Option<CommonOrderPriority>,
        sent_at: NaiveDateTime,
    ) -> Result<OrmO01Message> {
        if order.study.is_none() {
            return Err(RadiologyError::illegal_argument(
                "radiologyOrder.study cannot be null.",
            ));
        }
        let priority =
            priority.unwrap_or_else(|| convert_order_urgency_to_common_order_priority(order.urgency));

        let encoding = EncodingCharacters::default();
        let segments = vec![
            segment::message_header(
                &encoding,
                Self::SENDING_APPLICATION,
                Self::SENDING_FACILITY,
                sent_at,
                Self::MESSAGE_TYPE,
                Self::TRIGGER_EVENT,
            ),
            segment::patient_identifier(order.patient.as_ref())?,
            segment::common_order(order, control, priority),
            segment::observation_request(order)?,
            segment::study_reference(order.study.as_ref())?,
        ];

        debug!(
            "Built ORM^O01 for order {:?} with control {} and priority {}",
            order.order_number,
            control.value(),
            priority.value()
        );
        Ok(OrmO01Message { encoding, segments })
    }

    pub fn create_encoded_message(
        order: &RadiologyOrder,
        control: OrderControlElement,
    ) -> Result<String> {
        Ok(Self::create_message(order, control)?.encode())
    }
}
