//! ORC 通用医嘱段

use crate::hl7::codes::{CommonOrderPriority, OrderControlElement};
use crate::hl7::encoding::Segment;
use radiology_core::utils::plain_date_time_from;
use radiology_core::RadiologyOrder;

/// ORC-1 控制码、ORC-2 申请方医嘱号、ORC-7 开始时间 (TQ-4) 与优先级 (TQ-6)
pub fn common_order(
    order: &RadiologyOrder,
    control: OrderControlElement,
    priority: CommonOrderPriority,
) -> Segment {
    let mut segment = Segment::new("ORC");
    segment
        .set_field(1, control.value())
        .set_component(2, 1, order.order_number.as_deref().unwrap_or(""))
        .set_component(7, 4, &plain_date_time_from(order.effective_start_date()))
        .set_component(7, 6, priority.value());
    segment
}
