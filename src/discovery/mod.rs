//! Locating model weight files and the inference-server executable.

pub mod binary;
pub mod cache;
pub mod identity;
pub mod metadata;
pub mod scan;
