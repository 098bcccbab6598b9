//! ZDS 自定义段：Study Instance UID 引用指针 (RP)

use crate::hl7::encoding::Segment;
use radiology_core::{RadiologyError, Result, Study};

const TYPE_OF_DATA: &str = "Application";
const SUBTYPE: &str = "DICOM";

/// `ZDS|<uid>^^Application^DICOM`
pub fn study_reference(study: Option<&Study>) -> Result<Segment> {
    let study = study.ok_or_else(|| RadiologyError::illegal_argument("study cannot be null."))?;

    let mut segment = Segment::new("ZDS");
    segment
        .set_component(1, 1, study.study_instance_uid.as_deref().unwrap_or(""))
        .set_component(1, 3, TYPE_OF_DATA)
        .set_component(1, 4, SUBTYPE);
    Ok(segment)
}
