//! Job generation and the deployment pipeline

pub mod definition;
pub mod generator;
pub mod runner;
pub mod step;
