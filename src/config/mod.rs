//! Configuration synthesis for discovered models.

pub mod autodiscover;
pub mod generate;
