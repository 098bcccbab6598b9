//! # Radiology DICOM模块
//!
//! 提供DICOM相关功能，包括：
//! - DICOM UID 语法校验 (PS3.5 §9.1)
//! - 基于随机UUID的 UID 生成
//! - DICOM Web 阅片器链接构建

pub mod generator;
pub mod validator;
pub mod viewer;

pub use generator::{DicomUidGenerator, UuidDicomUidGenerator};
pub use validator::DicomUidValidator;
pub use viewer::DicomWebViewer;
