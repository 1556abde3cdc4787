//! Application module
//!
//! This module provides the main application structure:
//! - Full-screen map view with landmark markers and popups
//! - Toggleable sidebar with tabs (Landmarks and Settings)
//! - Drag-and-drop of photos onto the window
//! - Responsive layout (sidebar from bottom on portrait displays)

mod events;
mod geolocation;
mod markers;
mod picker;
mod plugin;
pub(crate) mod settings;
mod state;
mod ui_panels;

use crate::app::events::{
    LocateReason, LocationReport, Mailbox, Session, Submission, apply_delete, apply_location,
    apply_map_event, apply_submission,
};
use crate::app::geolocation::{Geolocator, platform_geolocator};
use crate::app::markers::MarkerLayer;
use crate::app::picker::{SelectedImage, open_image_picker};
use crate::app::plugin::{MapEvents, MarkerPlugin};
use crate::app::settings::Settings;
use crate::app::state::{AppState, TilesProvider, UiSettings};
use crate::app::ui_panels::UiAction;
use crate::data::{
    IdGenerator, LandmarkController, LandmarkStore, StoreError, SystemClock, read_data_uri,
};
use crate::entrypoints::runtime;
use crate::storage::{MemoryStorage, StorageBackend, default_storage_backend};
use eframe::egui;
use std::sync::{Arc, Mutex};
use walkers::{
    HttpTiles, Map, TileId,
    sources::{Attribution, OpenStreetMap, TileSource},
};

/// eframe storage key of the UI settings
const PERSISTED_SETTINGS_KEY: &str = "persisted_settings";

/// Custom OpenTopoMap tile source
pub struct OpenTopoMap;

impl TileSource for OpenTopoMap {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://tile.opentopomap.org/{}/{}/{}.png",
            tile_id.zoom, tile_id.x, tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© OpenTopoMap (CC-BY-SA)",
            url: "https://opentopomap.org/",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        17
    }
}

/// Main application structure
pub struct LandmarkMapApp {
    settings: Settings,

    /// Landmarks and map markers, or the reason they could not be loaded
    session: Result<Session, StoreError>,

    /// Form, UI settings and status messages
    state: AppState,

    /// Map tiles provider (OpenStreetMap)
    tiles_osm: HttpTiles,

    /// Map tiles provider (OpenTopoMap)
    tiles_otm: HttpTiles,

    /// Show help overlay
    show_help: bool,

    /// Clicks collected by the marker plugin during the last frame
    map_events: MapEvents,

    picked_images: Mailbox<SelectedImage>,
    submissions: Mailbox<Submission>,
    locations: Mailbox<LocationReport>,
}

impl LandmarkMapApp {
    pub fn new(settings: Settings, cc: &eframe::CreationContext<'_>) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let ui_settings = if settings.ignore_persisted {
            tracing::info!("Ignoring persisted state (--ignore-persisted flag)");
            UiSettings::default()
        } else {
            cc.storage
                .map(Self::load_persisted_settings)
                .unwrap_or_default()
        };

        let session = Self::open_session(&settings);
        match &session {
            Ok(session) => tracing::info!("Loaded {} landmarks", session.landmarks().len()),
            Err(e) => tracing::error!("Cannot start: {}", e),
        }

        let mut app = Self {
            state: AppState::new(ui_settings),
            session,
            tiles_osm: HttpTiles::new(OpenStreetMap, cc.egui_ctx.clone()),
            tiles_otm: HttpTiles::new(OpenTopoMap, cc.egui_ctx.clone()),
            show_help: false,
            map_events: Arc::new(Mutex::new(Vec::new())),
            picked_images: Mailbox::new(),
            submissions: Mailbox::new(),
            locations: Mailbox::new(),
            settings,
        };

        if app.session.is_ok() && !app.settings.no_geolocate {
            app.request_location(LocateReason::Startup, &cc.egui_ctx);
        }

        app
    }

    /// Load persisted UI settings, falling back to defaults
    fn load_persisted_settings(storage: &dyn eframe::Storage) -> UiSettings {
        if let Some(json) = storage.get_string(PERSISTED_SETTINGS_KEY)
            && !json.is_empty()
        {
            match serde_json::from_str::<UiSettings>(&json) {
                Ok(settings) => {
                    tracing::info!("Restored UI settings");
                    return settings;
                }
                Err(e) => tracing::warn!("Ignoring unreadable UI settings: {}", e),
            }
        }

        tracing::info!("No persisted settings found, starting fresh");
        UiSettings::default()
    }

    /// Open storage, load the landmarks and show their markers
    fn open_session(settings: &Settings) -> Result<Session, StoreError> {
        let backend: Box<dyn StorageBackend> = if settings.in_memory {
            tracing::info!("Keeping landmarks in memory only (--in-memory flag)");
            Box::new(MemoryStorage::new())
        } else {
            default_storage_backend(settings.storage_file.clone())?
        };

        let store = LandmarkStore::load(backend)?;
        Ok(LandmarkController::start(
            store,
            MarkerLayer::new(),
            IdGenerator::new(Box::new(SystemClock)),
            settings.initial_view(),
        ))
    }

    /// Ask for the current position in the background
    fn request_location(&mut self, reason: LocateReason, ctx: &egui::Context) {
        if reason == LocateReason::Manual {
            self.state.locating = true;
        }

        let locator = platform_geolocator(self.settings.location);
        let tx = self.locations.sender();
        let ctx = ctx.clone();
        runtime::spawn(async move {
            let result = locator.current_position().await;
            let _ = tx.send(LocationReport { reason, result });
            ctx.request_repaint();
        });
    }

    /// Validate the form and start reading its photo; the landmark is created
    /// once the read reports back
    fn submit_form(&mut self, ctx: &egui::Context) {
        let draft = match self.state.form.draft() {
            Ok(draft) => draft,
            Err(e) => {
                self.state.report_error(e.to_string());
                return;
            }
        };
        let Some(image) = self.state.form.image.clone() else {
            self.state
                .report_error("Choose a photo for the landmark first".to_string());
            return;
        };

        self.state.pending_submissions += 1;
        let tx = self.submissions.sender();
        let ctx = ctx.clone();
        runtime::spawn(async move {
            let result = read_data_uri(image.as_ref()).await;
            let _ = tx.send(Submission { draft, result });
            ctx.request_repaint();
        });
    }

    /// Apply everything reported since the last frame
    fn drain_mailboxes(&mut self) {
        for image in self.picked_images.drain() {
            self.state.form.image = Some(Arc::new(image));
        }

        let Ok(session) = &mut self.session else {
            return;
        };
        for submission in self.submissions.drain() {
            apply_submission(&mut self.state, session, submission);
        }
        for report in self.locations.drain() {
            apply_location(&mut self.state, session, report);
        }
    }

    fn apply_actions(&mut self, actions: Vec<UiAction>, ctx: &egui::Context) {
        for action in actions {
            match action {
                UiAction::ChoosePhoto => open_image_picker(self.picked_images.sender(), ctx.clone()),
                UiAction::UseMyLocation => self.request_location(LocateReason::Manual, ctx),
                UiAction::Submit => self.submit_form(ctx),
                UiAction::Focus(id) => {
                    if let Ok(session) = &mut self.session {
                        session.focus(id);
                    }
                }
                UiAction::Delete(id) => {
                    if let Ok(session) = &mut self.session {
                        apply_delete(&mut self.state, session, id);
                    }
                }
            }
        }
    }

    fn take_map_events(&self) -> Vec<plugin::MapEvent> {
        self.map_events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

#[profiling::all_functions]
impl eframe::App for LandmarkMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let Ok(session) = &self.session else {
            if let Err(e) = &self.session {
                ui_panels::startup_error_screen(ctx, e);
            }
            return;
        };
        let entries = session.list_entries();
        let focused = session.map().open_popup_id();

        // Handle keyboard shortcuts
        ctx.input(|i| {
            if i.key_pressed(egui::Key::F1) || (i.key_pressed(egui::Key::H) && i.modifiers.ctrl) {
                self.show_help = !self.show_help;
            }
        });

        self.drain_mailboxes();
        ui_panels::handle_drag_and_drop(ctx, &mut self.state);

        if self.show_help {
            ui_panels::help_overlay(ctx, &mut self.show_help);
        }
        ui_panels::alert_window(ctx, &mut self.state);

        let mut actions = Vec::new();
        ui_panels::render_sidebar(ctx, &mut self.state, &entries, focused, &mut actions);

        let attribution_text = self.state.ui_settings.tiles_provider.attribution();
        let tiles: &mut HttpTiles = match self.state.ui_settings.tiles_provider {
            TilesProvider::OpenStreetMap => &mut self.tiles_osm,
            TilesProvider::OpenTopoMap => &mut self.tiles_otm,
        };

        // Central panel: Map view (full screen)
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                profiling::scope!("map_panel");

                let Ok(session) = &mut self.session else {
                    return;
                };
                let layer = session.map_mut();
                let marker_plugin = MarkerPlugin::new(
                    layer.markers(),
                    layer.open_popup_id(),
                    self.map_events.clone(),
                );
                let default_center = walkers::lat_lon(
                    self.settings.default_lat,
                    self.settings.default_lon,
                );
                let map = Map::new(Some(tiles), &mut layer.memory, default_center)
                    .with_plugin(marker_plugin);
                ui.add(map);

                ui_panels::sidebar_toggle_button(ui, &mut self.state);

                let painter = ui.painter();
                let screen_rect = ui.max_rect();
                painter.text(
                    screen_rect.center_bottom() + egui::vec2(0.0, -5.0),
                    egui::Align2::CENTER_BOTTOM,
                    attribution_text,
                    egui::FontId::proportional(10.0),
                    egui::Color32::from_black_alpha(180),
                );
            });

        let map_events = self.take_map_events();
        if let Ok(session) = &mut self.session {
            for event in map_events {
                apply_map_event(&mut self.state, session, event);
            }
        }
        self.apply_actions(actions, ctx);

        if let Ok(session) = &mut self.session {
            for uri in session.map_mut().take_released_images() {
                ctx.forget_image(&uri);
            }
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        match serde_json::to_string(&self.state.ui_settings) {
            Ok(json) => {
                storage.set_string(PERSISTED_SETTINGS_KEY, json);
                tracing::debug!("Saved UI settings");
            }
            Err(e) => tracing::warn!("Failed to save UI settings: {}", e),
        }
    }
}
