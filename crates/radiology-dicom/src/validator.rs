//! DICOM UID 校验
//!
//! UID 由点分隔的数字组件构成，首组件为 0、1 或 2，
//! 组件不能有多余的前导零，总长度不超过 64 个字符。

use regex::Regex;
use std::sync::LazyLock;

const MAX_LENGTH: usize = 64;

static VALIDATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[012]((\.0)|(\.[1-9][0-9]*))+$").expect("valid UID pattern"));

/// DICOM UID 校验器，所有检查都只返回布尔值
pub struct DicomUidValidator;

impl DicomUidValidator {
    /// 长度和语法同时合法
    pub fn is_valid<'a>(uid: impl Into<Option<&'a str>>) -> bool {
        let uid = uid.into();
        Self::is_length_valid(uid) && Self::is_pattern_valid(uid)
    }

    /// 非空白且不超过 64 个字符
    pub fn is_length_valid<'a>(uid: impl Into<Option<&'a str>>) -> bool {
        match non_blank(uid.into()) {
            Some(uid) => uid.chars().count() <= MAX_LENGTH,
            None => false,
        }
    }

    pub fn is_pattern_valid<'a>(uid: impl Into<Option<&'a str>>) -> bool {
        match non_blank(uid.into()) {
            Some(uid) => VALIDATION_PATTERN.is_match(uid),
            None => false,
        }
    }
}

fn non_blank(uid: Option<&str>) -> Option<&str> {
    uid.filter(|u| !u.trim().is_empty())
}
