//! 错误定义模块

use std::fmt;
use thiserror::Error;

/// 放射科模块统一错误类型
///
/// 前置条件错误（`IllegalArgument`、`NullArgument`、`UnsupportedOperation`）只显示消息本身，
/// 调用方可以直接比较消息文本。
#[derive(Error, Debug)]
pub enum RadiologyError {
    #[error("{0}")]
    IllegalArgument(String),

    #[error("{0}")]
    NullArgument(String),

    #[error("{0}")]
    UnsupportedOperation(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("无效状态转换: 从 {from} 到 {event}")]
    InvalidStateTransition { from: String, event: String },

    #[error("验证错误: {0}")]
    Validation(ValidationErrors),

    #[error("HL7错误: {0}")]
    Hl7(String),

    #[error("传输错误: {0}")]
    Transport(String),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("网络错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RadiologyError {
    pub fn illegal_argument(message: impl Into<String>) -> Self {
        Self::IllegalArgument(message.into())
    }

    pub fn null_argument(message: impl Into<String>) -> Self {
        Self::NullArgument(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedOperation(message.into())
    }
}

/// 单个字段的验证错误
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    pub field: String,
    pub code: String,
}

/// 对象验证收集到的全部字段错误
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject(&mut self, field: &str, code: &str) {
        self.errors.push(FieldError {
            field: field.to_string(),
            code: code.to_string(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_field_error(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// 有错误时转换为 `Err`
    pub fn into_result(self) -> Result<()> {
        if self.has_errors() {
            Err(RadiologyError::Validation(self))
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.code))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// 放射科模块统一结果类型
pub type Result<T> = std::result::Result<T, RadiologyError>;
