//! PID 患者标识段

use crate::hl7::encoding::Segment;
use crate::hl7::utils::extended_person_name_from;
use radiology_core::utils::plain_date_time_from;
use radiology_core::{Patient, RadiologyError, Result};

/// PID-3 标识、PID-5 姓名、PID-7 出生时间、PID-8 性别
pub fn patient_identifier(patient: Option<&Patient>) -> Result<Segment> {
    let patient =
        patient.ok_or_else(|| RadiologyError::illegal_argument("patient cannot be null."))?;
    let identifier = patient
        .identifier
        .as_deref()
        .ok_or_else(|| RadiologyError::illegal_argument("patient identifier cannot be null."))?;

    let mut segment = Segment::new("PID");
    segment.set_component(3, 1, identifier);
    extended_person_name_from(patient.person_name.as_ref()).write_to(&mut segment, 5);
    segment.set_field(7, &plain_date_time_from(patient.birthdate));
    segment.set_field(8, patient.gender.as_deref().unwrap_or(""));

    Ok(segment)
}
