//! Domain layer - Filter expressions and their compilation

pub mod error;
pub mod filter;

pub use error::FilterError;
