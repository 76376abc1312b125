//! Jobdeck Library
//!
//! Generates Nomad job templates through the deployment backend and drives
//! the step-by-step rollout pipeline.

pub mod app;
pub mod config;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod panel;
pub mod pipeline;
pub mod render;
pub mod server;
pub mod terminal;
pub mod utils;
