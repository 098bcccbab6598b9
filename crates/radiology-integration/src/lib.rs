//! # Radiology集成模块
//!
//! 提供与外部影像系统的集成功能，包括：
//! - HL7 v2.3.1 ORM^O01 检查申请消息的构建与管道编码
//! - MLLP 帧编解码与 HL7 消息发送
//! - ACK 应答解析

pub mod hl7;
pub mod mllp;
pub mod sender;

pub use hl7::{
    Acknowledgment, CommonOrderPriority, EncodingCharacters, Hl7Error, Hl7Generator,
    Hl7Parser, OrderControlElement, OrmO01Message, RadiologyOrmO01, Segment,
};
pub use mllp::MllpCodec;
pub use sender::{Hl7Sender, MllpHl7Sender};
