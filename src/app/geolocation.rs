//! "Where am I?" capability.
//!
//! On the web this asks `navigator.geolocation`; native builds have no
//! location service and report the position given with `--location`, if any.

use crate::data::Coordinates;
use std::future::Future;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeolocationError {
    #[error("Permission to access the location was denied")]
    PermissionDenied,

    #[error("The current position is unavailable")]
    Unavailable,

    #[error("Timed out while getting the current position")]
    Timeout,

    #[error("Geolocation is not supported on this platform")]
    Unsupported,
}

pub trait Geolocator {
    fn current_position(&self) -> impl Future<Output = Result<Coordinates, GeolocationError>>;
}

/// A fixed, configured position
#[derive(Clone, Debug)]
pub struct FixedLocation(pub Option<Coordinates>);

impl Geolocator for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        self.0.ok_or(GeolocationError::Unsupported)
    }
}

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::*;
    use tokio::sync::oneshot;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;

    /// `navigator.geolocation.getCurrentPosition`, wrapped in a future
    #[derive(Clone, Debug)]
    pub struct BrowserGeolocation;

    impl Geolocator for BrowserGeolocation {
        async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
            let geolocation = web_sys::window()
                .ok_or(GeolocationError::Unsupported)?
                .navigator()
                .geolocation()
                .map_err(|_| GeolocationError::Unsupported)?;

            let (tx, rx) = oneshot::channel::<Result<Coordinates, GeolocationError>>();
            let tx = std::rc::Rc::new(std::cell::RefCell::new(Some(tx)));

            let success_tx = tx.clone();
            let on_success = Closure::once(move |position: web_sys::Position| {
                let coords = position.coords();
                if let Some(tx) = success_tx.borrow_mut().take() {
                    let _ = tx.send(Ok(Coordinates::new(coords.latitude(), coords.longitude())));
                }
            });
            let on_error = Closure::once(move |error: web_sys::PositionError| {
                let error = match error.code() {
                    web_sys::PositionError::PERMISSION_DENIED => GeolocationError::PermissionDenied,
                    web_sys::PositionError::TIMEOUT => GeolocationError::Timeout,
                    _ => GeolocationError::Unavailable,
                };
                if let Some(tx) = tx.borrow_mut().take() {
                    let _ = tx.send(Err(error));
                }
            });

            geolocation
                .get_current_position_with_error_callback(
                    on_success.as_ref().unchecked_ref(),
                    Some(on_error.as_ref().unchecked_ref()),
                )
                .map_err(|_| GeolocationError::Unavailable)?;

            // Both closures must outlive the browser's callback
            let result = rx.await.unwrap_or(Err(GeolocationError::Unavailable));
            drop(on_success);
            drop(on_error);
            result
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserGeolocation;

/// The geolocator used by the application on this platform
#[cfg(target_arch = "wasm32")]
pub fn platform_geolocator(_configured: Option<Coordinates>) -> BrowserGeolocation {
    BrowserGeolocation
}

/// The geolocator used by the application on this platform
#[cfg(not(target_arch = "wasm32"))]
pub fn platform_geolocator(configured: Option<Coordinates>) -> FixedLocation {
    FixedLocation(configured)
}
