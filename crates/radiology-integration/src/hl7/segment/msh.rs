//! MSH 消息头

use crate::hl7::encoding::{EncodingCharacters, Segment};
use chrono::NaiveDateTime;
use radiology_core::utils::plain_date_time_from;

const PROCESSING_ID: &str = "P";
const VERSION_ID: &str = "2.3.1";

/// 构建 MSH 段，时间格式为 `yyyyMMddHHmmss`
pub fn message_header(
    encoding: &EncodingCharacters,
    sending_application: &str,
    sending_facility: &str,
    date_time_of_message: NaiveDateTime,
    message_type: &str,
    trigger_event: &str,
) -> Segment {
    let mut segment = Segment::new("MSH");
    segment
        .set_field(1, &encoding.field_separator.to_string())
        .set_field(2, &encoding.encoding_characters_field())
        .set_field(3, sending_application)
        .set_field(4, sending_facility)
        .set_field(7, &plain_date_time_from(Some(date_time_of_message)))
        .set_component(9, 1, message_type)
        .set_component(9, 2, trigger_event)
        .set_field(11, PROCESSING_ID)
        .set_field(12, VERSION_ID);
    segment
}
