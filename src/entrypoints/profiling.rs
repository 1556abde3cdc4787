/*!
Logging and profiling integration.

- `setup_logging()` installs the tracing subscriber for the platform: a `fmt`
  layer filtered by `RUST_LOG` on native, the browser console on web (level
  from the `?envLOG_LEVEL=debug` GET parameter).
- `profiling_ui()` toggles a puffin HTTP server at runtime when the
  `profiling` feature is compiled in.
*/

use tracing_subscriber::prelude::*;

#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_FILTER_DEBUG: &str =
    "debug,eframe::native=warn,wgpu_core=warn,wgpu_hal=warn,naga=warn,hyper_util=info,reqwest::connect=info,walkers=info,egui::context=warn";

#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_FILTER_RELEASE: &str = "info,eframe::native=warn,egui::context=warn";

/// Install the global tracing subscriber. Calling it twice is harmless.
pub fn setup_logging() {
    #[cfg(not(target_arch = "wasm32"))]
    {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(if cfg!(debug_assertions) {
                DEFAULT_FILTER_DEBUG
            } else {
                DEFAULT_FILTER_RELEASE
            })
        });

        let _ = tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_filter(filter))
            .try_init();
    }
    #[cfg(target_arch = "wasm32")]
    {
        use tracing_wasm::WASMLayerConfigBuilder;

        let max_level = match super::cli::get_env::<String>("LOG_LEVEL") {
            Some(level) => level_from_name(&level),
            None if cfg!(debug_assertions) => tracing::Level::DEBUG,
            None => tracing::Level::INFO,
        };

        let mut builder = WASMLayerConfigBuilder::new();
        builder.set_max_level(max_level);
        let _ = tracing_subscriber::registry()
            .with(tracing_wasm::WASMLayer::new(builder.build()))
            .try_init();
    }
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn level_from_name(name: &str) -> tracing::Level {
    match name.to_uppercase().as_str() {
        "TRACE" => tracing::Level::TRACE,
        "DEBUG" => tracing::Level::DEBUG,
        "WARN" => tracing::Level::WARN,
        "ERROR" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}

#[cfg(feature = "profiling")]
mod server {
    use std::sync::Mutex;

    const PUFFIN_ADDR: &str = "127.0.0.1:8585";

    /// Running puffin server, `None` while profiling is off
    static SERVER: Mutex<Option<puffin_http::Server>> = Mutex::new(None);

    pub fn is_running() -> bool {
        SERVER.lock().map(|s| s.is_some()).unwrap_or(false)
    }

    pub fn start() {
        let Ok(mut server) = SERVER.lock() else {
            return;
        };
        if server.is_some() {
            return;
        }

        puffin::set_scopes_on(true);
        match puffin_http::Server::new(PUFFIN_ADDR) {
            Ok(puffin_server) => {
                tracing::info!(
                    "Profiling enabled, to view: cargo install puffin_viewer && ~/.cargo/bin/puffin_viewer --url {PUFFIN_ADDR}"
                );
                *server = Some(puffin_server);
            }
            Err(err) => {
                puffin::set_scopes_on(false);
                tracing::error!("Failed to start puffin server: {err}");
            }
        }
    }

    pub fn stop() {
        puffin::set_scopes_on(false);
        // Dropping the server closes it
        if let Ok(mut server) = SERVER.lock() {
            *server = None;
        }
    }
}

/// Checkbox starting/stopping the profiling server
pub fn profiling_ui(ui: &mut egui::Ui) {
    #[cfg(feature = "profiling")]
    {
        egui::warn_if_debug_build(ui);

        let mut enabled = server::is_running();
        if ui
            .checkbox(&mut enabled, "Enable Profiling Server")
            .changed()
        {
            if enabled {
                server::start();
            } else {
                server::stop();
            }
        }
    }
    #[cfg(not(feature = "profiling"))]
    {
        ui.label("Profiling feature is disabled in this build.");
    }
}
