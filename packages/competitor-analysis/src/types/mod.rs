//! Domain data types.

pub mod analysis;
pub mod config;
pub mod content;
pub mod history;
pub mod text;
