//! Cross-platform task spawning
//!
//! Native builds run on the tokio runtime started by `main`; web builds hand
//! the future to the JavaScript event loop. Both report back to the UI thread
//! through channels, so spawned tasks never touch application state.

/// Spawn a background task on the tokio runtime.
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn<F>(future: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    tokio::spawn(future);
}

/// Spawn a background task on the JavaScript event loop.
///
/// Browser futures (file reads, geolocation callbacks) are not `Send`, so no
/// `Send` bound is required here.
#[cfg(target_arch = "wasm32")]
pub fn spawn<F>(future: F)
where
    F: std::future::Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}
