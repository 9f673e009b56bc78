//! Core trait abstractions.

pub mod fetcher;
pub mod reasoning;
pub mod renderer;
