//! Application setup

pub mod options;
pub mod run;
