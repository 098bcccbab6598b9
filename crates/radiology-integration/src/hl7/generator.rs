//! HL7 编码入口

use super::codes::{CommonOrderPriority, OrderControlElement};
use super::message::RadiologyOrmO01;
use chrono::Local;
use radiology_core::{RadiologyError, RadiologyOrder, Result};
use tracing::info;

/// 接受可空参数的 ORM^O01 编码入口
pub struct Hl7Generator;

impl Hl7Generator {
    /// 生成管道编码的 ORM^O01 消息
    ///
    /// `priority` 为空时按医嘱紧急程度推导。
    pub fn create_encoded_radiology_orm_o01_message(
        radiology_order: Option<&RadiologyOrder>,
        order_control: Option<OrderControlElement>,
        priority: Option<CommonOrderPriority>,
    ) -> Result<String> {
        let radiology_order = radiology_order
            .ok_or_else(|| RadiologyError::illegal_argument("radiologyOrder cannot be null."))?;
        let order_control = order_control
            .ok_or_else(|| RadiologyError::illegal_argument("orderControlElement cannot be null."))?;

        let message = RadiologyOrmO01::create_message_at(
            radiology_order,
            order_control,
            priority,
            Local::now().naive_local(),
        )?;
        let encoded = message.encode();

        info!(
            "Encoded ORM^O01 ({}) for order {:?}, {} bytes",
            order_control.value(),
            radiology_order.order_number,
            encoded.len()
        );
        Ok(encoded)
    }
}
