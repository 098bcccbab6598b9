//! ORM^O01 各段的填充函数
//!
//! 每个函数独立检查自己需要的输入，缺失时返回带固定消息的 `IllegalArgument`。

mod msh;
mod obr;
mod orc;
mod pid;
mod zds;

pub use msh::message_header;
pub use obr::observation_request;
pub use orc::common_order;
pub use pid::patient_identifier;
pub use zds::study_reference;
