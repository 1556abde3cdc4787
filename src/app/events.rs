//! Results reported back to the UI thread, and how each one changes the app.
//!
//! Background tasks (image reads, location requests) and the map plugin never
//! touch application state. They send one of these messages; the app drains
//! them once per frame and applies them here.

use crate::app::geolocation::GeolocationError;
use crate::app::markers::MarkerLayer;
use crate::app::plugin::MapEvent;
use crate::app::state::AppState;
use crate::data::{Coordinates, ImageError, LandmarkController, LandmarkDraft, LandmarkId};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// The landmark controller as driven by the UI
pub type Session = LandmarkController<MarkerLayer>;

/// A finished image read for a submitted form
pub struct Submission {
    pub draft: LandmarkDraft,
    pub result: Result<String, ImageError>,
}

/// Who asked for the current position
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LocateReason {
    /// Automatic request at startup
    Startup,
    /// The form's "use my location" button
    Manual,
}

pub struct LocationReport {
    pub reason: LocateReason,
    pub result: Result<Coordinates, GeolocationError>,
}

/// Both ends of an unbounded channel, owned by the app
pub struct Mailbox<T> {
    tx: UnboundedSender<T>,
    rx: UnboundedReceiver<T>,
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        let (tx, rx) = unbounded_channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> UnboundedSender<T> {
        self.tx.clone()
    }

    /// Everything received since the last call
    pub fn drain(&mut self) -> Vec<T> {
        let mut messages = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            messages.push(message);
        }
        messages
    }
}

pub fn apply_map_event(state: &mut AppState, session: &mut Session, event: MapEvent) {
    match event {
        MapEvent::Clicked(position) => {
            tracing::trace!("Map clicked at {:?}", position);
            state.form.set_coordinates(position);
        }
        MapEvent::MarkerClicked(id) => session.map_mut().toggle_popup(id),
        MapEvent::PopupClosed => session.map_mut().close_popup(),
    }
}

/// Create the landmark once its image is encoded. The form is reset only on success.
pub fn apply_submission(state: &mut AppState, session: &mut Session, submission: Submission) {
    state.pending_submissions = state.pending_submissions.saturating_sub(1);

    let created = submission
        .result
        .map_err(|e| e.to_string())
        .and_then(|uri| {
            session
                .create(submission.draft, uri)
                .map_err(|e| e.to_string())
        });

    match created {
        Ok(_) => {
            state.form.reset();
            state.last_error = None;
        }
        Err(message) => state.report_error(message),
    }
}

pub fn apply_location(state: &mut AppState, session: &mut Session, report: LocationReport) {
    match (report.reason, report.result) {
        (LocateReason::Startup, Ok(position)) => session.center_on(position),
        (LocateReason::Startup, Err(e)) => {
            tracing::debug!("Startup geolocation unavailable: {}", e);
        }
        (LocateReason::Manual, Ok(position)) => {
            state.locating = false;
            state.form.set_coordinates(position);
            session.center_on(position);
        }
        (LocateReason::Manual, Err(e)) => {
            state.locating = false;
            tracing::warn!("Geolocation failed: {}", e);
            state.alert = Some(format!("Could not get your location: {}", e));
        }
    }
}

pub fn apply_delete(state: &mut AppState, session: &mut Session, id: LandmarkId) {
    if let Err(e) = session.delete(id) {
        state.report_error(format!("Failed to delete landmark: {}", e));
    }
}
