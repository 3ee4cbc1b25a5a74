#[cfg(feature = "desktop")]
pub mod camera;
pub mod classify;
pub mod config;
pub mod effect;
pub mod error;
pub mod gesture;
pub mod pose;
pub mod render;
pub mod replay;
pub mod sampler;
pub mod session;
