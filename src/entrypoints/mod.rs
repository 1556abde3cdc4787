// Shared modules
pub(crate) mod cli;
pub(crate) mod metadata;
pub(crate) mod profiling;
mod run;
pub(crate) mod runtime;

#[cfg(target_arch = "wasm32")]
pub mod web;

// Entry points
pub mod main;
