//! Request and response models for the job deployment backend.

pub mod models;
