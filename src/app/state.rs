//! Application state management
//!
//! This module holds the UI-side state around the landmark controller: the
//! creation form, runtime UI settings and status messages.

use crate::app::picker::SelectedImage;
use crate::data::{Coordinates, DraftError, LandmarkDraft, format_coordinate};
use std::sync::Arc;

/// Main application state (everything except the landmarks themselves)
pub struct AppState {
    /// The landmark creation form
    pub form: LandmarkForm,

    /// Current UI settings
    pub ui_settings: UiSettings,

    /// Image reads that have not reported back yet
    pub pending_submissions: usize,

    /// Location request started from the form that has not reported back yet
    pub locating: bool,

    /// Message shown in a modal window (e.g. location unavailable)
    pub alert: Option<String>,

    /// Last non-fatal error, shown in the sidebar
    pub last_error: Option<String>,
}

/// UI-specific settings that can be adjusted at runtime
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Map tiles provider
    pub tiles_provider: TilesProvider,

    /// Whether sidebar is open
    pub sidebar_open: bool,

    /// Current active tab in sidebar
    pub active_tab: SidebarTab,

    /// Whether to show profiling in settings
    pub show_profiling: bool,
}

/// Sidebar tabs
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum SidebarTab {
    Landmarks,
    Settings,
}

/// Available map tile providers
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TilesProvider {
    OpenStreetMap,
    OpenTopoMap,
}

impl TilesProvider {
    pub fn attribution(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "© OpenStreetMap contributors",
            Self::OpenTopoMap => "© OpenTopoMap (CC-BY-SA)",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::OpenStreetMap, Self::OpenTopoMap]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "OpenStreetMap",
            Self::OpenTopoMap => "OpenTopoMap",
        }
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            tiles_provider: TilesProvider::OpenStreetMap,
            sidebar_open: true,
            active_tab: SidebarTab::Landmarks,
            show_profiling: false,
        }
    }
}

/// Raw contents of the landmark creation form
#[derive(Default)]
pub struct LandmarkForm {
    pub title: String,
    pub description: String,
    pub lat: String,
    pub lng: String,
    /// Shared with in-flight reads so the same photo can be submitted again
    pub image: Option<Arc<SelectedImage>>,
}

impl LandmarkForm {
    /// Write a coordinate into the latitude/longitude fields
    pub fn set_coordinates(&mut self, position: Coordinates) {
        self.lat = format_coordinate(position.lat);
        self.lng = format_coordinate(position.lng);
    }

    /// Parse the text fields
    pub fn draft(&self) -> Result<LandmarkDraft, DraftError> {
        LandmarkDraft::parse(&self.title, &self.description, &self.lat, &self.lng)
    }

    /// Clear every field
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl AppState {
    pub fn new(ui_settings: UiSettings) -> Self {
        Self {
            form: LandmarkForm::default(),
            ui_settings,
            pending_submissions: 0,
            locating: false,
            alert: None,
            last_error: None,
        }
    }

    /// Record an error for the status line
    pub fn report_error(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.last_error = Some(message);
    }
}
