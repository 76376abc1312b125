//! Backend HTTP access

pub mod backend;
pub mod client;
pub mod retry;
