//! Infrastructure layer - Process-level services

pub mod logging;
