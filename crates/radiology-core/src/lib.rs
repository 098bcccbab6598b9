//! # Radiology Core
//!
//! 放射科模块的核心部分，提供领域模型、代码表、错误定义、配置和通用工具。

pub mod codes;
pub mod config;
pub mod error;
pub mod models;
pub mod utils;

pub use codes::*;
pub use config::RadiologyProperties;
pub use error::{FieldError, RadiologyError, Result, ValidationErrors};
pub use models::*;
