//! OBR 检查申请段

use crate::hl7::encoding::Segment;
use radiology_core::{RadiologyError, RadiologyOrder, Result};

/// OBR-4.5 检查说明、OBR-19 医嘱号、OBR-20 检查号、OBR-24 设备类型、OBR-44.2 检查说明
pub fn observation_request(order: &RadiologyOrder) -> Result<Segment> {
    let study = order.study.as_ref().ok_or_else(|| {
        RadiologyError::illegal_argument("radiologyOrder.study cannot be null.")
    })?;

    let instructions = order.instructions.as_deref().unwrap_or("");
    let study_id = study.study_id.map(|id| id.to_string()).unwrap_or_default();
    let modality = study.modality.map(|m| m.code()).unwrap_or("");

    let mut segment = Segment::new("OBR");
    segment
        .set_component(4, 5, instructions)
        .set_field(19, order.order_number.as_deref().unwrap_or(""))
        .set_field(20, &study_id)
        .set_field(24, modality)
        .set_component(44, 2, instructions);
    Ok(segment)
}
