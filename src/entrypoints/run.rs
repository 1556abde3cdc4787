use super::metadata::log_version_info;
use super::profiling::setup_logging;
use crate::app::LandmarkMapApp;
use crate::app::settings::Settings;

/// Boxed constructor handed to eframe once the window (or canvas) exists
pub type AppCreator = Box<dyn FnOnce(&eframe::CreationContext<'_>) -> Box<dyn eframe::App>>;

/// Setup logging, parse the settings and return the app constructor
pub fn setup_app() -> AppCreator {
    setup_logging();
    log_version_info();

    let settings = Settings::from_cli();
    tracing::debug!("Starting with {:?}", settings);

    Box::new(move |cc| Box::new(LandmarkMapApp::new(settings, cc)))
}

/// Native entry point
#[cfg(not(target_arch = "wasm32"))]
pub async fn native_main() {
    let app_creator = setup_app();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title("Landmark Map")
            .with_drag_and_drop(true),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "Landmark Map",
        native_options,
        Box::new(move |cc| Ok(app_creator(cc))),
    ) {
        tracing::error!("Failed to run the application: {e}");
    }
}
