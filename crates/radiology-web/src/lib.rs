//! # Radiology Web模块
//!
//! 以 REST 形式暴露检查设备、医嘱与报告资源。

pub mod handlers;
pub mod server;
pub mod state;

pub use handlers::ApiError;
pub use server::WebServer;
pub use state::AppState;
