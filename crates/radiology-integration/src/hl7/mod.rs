//! HL7 v2.3.1 接口模块
//!
//! 构建放射检查申请消息 (ORM^O01) 并解析 PACS 返回的 ACK 应答：
//! - `encoding`：段模型与管道编码
//! - `segment`：MSH / PID / ORC / OBR / ZDS 各段的填充
//! - `message`：按固定顺序组装 ORM^O01
//! - `generator`：接受可空参数的编码入口
//! - `parser`：ACK 解析

mod codes;
mod encoding;
mod generator;
mod message;
mod parser;
pub mod segment;
mod utils;

use radiology_core::RadiologyError;
use thiserror::Error;

pub use codes::{CommonOrderPriority, OrderControlElement};
pub use encoding::{encode_segments, EncodingCharacters, Field, Segment};
pub use generator::Hl7Generator;
pub use message::{OrmO01Message, RadiologyOrmO01};
pub use parser::{Acknowledgment, AcknowledgmentCode, Hl7Parser};
pub use utils::{
    convert_order_urgency_to_common_order_priority, extended_person_name_from,
    ExtendedPersonName,
};

#[derive(Error, Debug)]
pub enum Hl7Error {
    #[error("Invalid HL7 message format: {0}")]
    InvalidFormat(String),
    #[error("Unsupported code: {0}")]
    UnsupportedCode(String),
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<Hl7Error> for RadiologyError {
    fn from(err: Hl7Error) -> Self {
        match err {
            Hl7Error::Io(io) => RadiologyError::Io(io),
            other => RadiologyError::Hl7(other.to_string()),
        }
    }
}
