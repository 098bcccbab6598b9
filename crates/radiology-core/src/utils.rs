//! 通用工具函数
//!
//! HL7 与 DICOM 使用的无分隔符日期时间格式。

use chrono::{Local, NaiveDateTime};

const PLAIN_DATE_FORMAT: &str = "%Y%m%d";
const PLAIN_TIME_FORMAT: &str = "%H%M%S";
const PLAIN_DATE_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// `yyyyMMdd`，无日期时返回空串
pub fn plain_date_from(date: Option<NaiveDateTime>) -> String {
    format_or_empty(date, PLAIN_DATE_FORMAT)
}

/// `HHmmss`，无时间时返回空串
pub fn plain_time_from(date: Option<NaiveDateTime>) -> String {
    format_or_empty(date, PLAIN_TIME_FORMAT)
}

/// `yyyyMMddHHmmss`，无日期时返回空串
pub fn plain_date_time_from(date: Option<NaiveDateTime>) -> String {
    format_or_empty(date, PLAIN_DATE_TIME_FORMAT)
}

pub fn current_plain_date_time() -> String {
    plain_date_time_from(Some(Local::now().naive_local()))
}

fn format_or_empty(date: Option<NaiveDateTime>, pattern: &str) -> String {
    date.map(|d| d.format(pattern).to_string())
        .unwrap_or_default()
}
