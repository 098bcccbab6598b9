//! DICOM UID 生成
//!
//! UID = 机构根 + "." + 随机 UUID 128 位值的十进制表示。
//! 128 位十进制最多 39 位，根限制为 24 个字符，保证总长不超过 64。

use crate::validator::DicomUidValidator;
use radiology_core::{RadiologyError, Result};
use tracing::debug;
use uuid::Uuid;

const MAX_ROOT_LENGTH: usize = 24;

const DICOM_UID_SEPARATOR: char = '.';

/// UID 生成器接口，实现必须可以在多个线程中并发调用
pub trait DicomUidGenerator: Send + Sync {
    /// 允许的机构根最大长度
    fn max_root_length(&self) -> usize;

    /// 在给定根下生成新的 UID
    fn new_dicom_uid(&self, root: Option<&str>) -> Result<String>;
}

/// 基于 v4 UUID 的生成器，无内部状态
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidDicomUidGenerator;

impl UuidDicomUidGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl DicomUidGenerator for UuidDicomUidGenerator {
    fn max_root_length(&self) -> usize {
        MAX_ROOT_LENGTH
    }

    fn new_dicom_uid(&self, root: Option<&str>) -> Result<String> {
        let root = root.ok_or_else(|| RadiologyError::null_argument("root is required"))?;

        if !DicomUidValidator::is_valid(root) {
            return Err(RadiologyError::illegal_argument(
                "root is an invalid DICOM UID",
            ));
        }

        if root.len() > MAX_ROOT_LENGTH {
            return Err(RadiologyError::illegal_argument(format!(
                "root length is > {}",
                MAX_ROOT_LENGTH
            )));
        }

        let suffix = decimal_uuid(Uuid::new_v4());
        let uid = format!("{}{}{}", root, DICOM_UID_SEPARATOR, suffix);
        debug!("Generated DICOM UID {}", uid);
        Ok(uid)
    }
}

/// UUID 的 128 位无符号十进制表示
fn decimal_uuid(uuid: Uuid) -> String {
    uuid.as_u128().to_string()
}
