pub mod app;
pub mod config;
pub mod orchestration;
pub mod pipeline;
pub mod runtime;
pub mod shared;
