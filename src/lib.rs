//! Landmark Map: mark points of interest on an interactive map with a title,
//! a description and a photo. Landmarks survive restarts through local storage.

pub mod data;
pub mod storage;

mod app;
mod entrypoints;

/// Desktop entry point
#[cfg(not(target_arch = "wasm32"))]
pub use entrypoints::main::main;

/// Web entry point
#[cfg(target_arch = "wasm32")]
pub use entrypoints::web::WebHandle;
