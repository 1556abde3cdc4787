//! Walkers plugin drawing landmark markers and popups, and capturing map clicks.

use crate::app::markers::Marker;
use crate::data::{Coordinates, LandmarkId};
use egui::{Color32, Stroke};
use std::sync::{Arc, Mutex};
use walkers::{Plugin, Projector};

/// Click distance (in points) within which a click selects a marker
const MARKER_HIT_RADIUS: f32 = 14.0;

/// Marker pin radius in points
const MARKER_RADIUS: f32 = 8.0;

/// Width of the popup window and of its image
const POPUP_WIDTH: f32 = 220.0;

/// Something the user did on the map during the last frame
#[derive(Clone, Debug, PartialEq)]
pub enum MapEvent {
    /// Click on empty map
    Clicked(Coordinates),
    /// Click on a marker
    MarkerClicked(LandmarkId),
    /// The popup's close button
    PopupClosed,
}

/// Events collected by the plugin, drained by the app after the map is drawn
pub type MapEvents = Arc<Mutex<Vec<MapEvent>>>;

/// Plugin for rendering landmark markers on the map
pub struct MarkerPlugin {
    markers: Vec<Marker>,
    open_popup: Option<LandmarkId>,
    events: MapEvents,
}

impl MarkerPlugin {
    pub fn new<'a>(
        markers: impl Iterator<Item = &'a Marker>,
        open_popup: Option<LandmarkId>,
        events: MapEvents,
    ) -> Self {
        Self {
            markers: markers.cloned().collect(),
            open_popup,
            events,
        }
    }

    fn push(&self, event: MapEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    fn screen_position(projector: &Projector, marker: &Marker) -> egui::Pos2 {
        let screen_vec = projector.project(marker.position);
        egui::Pos2::new(screen_vec.x, screen_vec.y)
    }

    fn draw_marker(painter: &egui::Painter, at: egui::Pos2, highlighted: bool) {
        let fill = if highlighted {
            Color32::from_rgb(230, 120, 30)
        } else {
            Color32::from_rgb(50, 110, 220)
        };
        painter.circle_filled(at, MARKER_RADIUS, fill);
        painter.circle_stroke(at, MARKER_RADIUS, Stroke::new(2.0, Color32::WHITE));
    }

    fn show_popup(&self, ui: &egui::Ui, marker: &Marker, anchor: egui::Pos2) {
        let events = self.events.clone();
        egui::Area::new(egui::Id::new(("landmark_popup", marker.id.0)))
            .order(egui::Order::Foreground)
            .pivot(egui::Align2::CENTER_BOTTOM)
            .fixed_pos(anchor - egui::vec2(0.0, MARKER_RADIUS + 4.0))
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(POPUP_WIDTH);
                    ui.horizontal(|ui| {
                        ui.strong(&marker.title);
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button("✕").clicked()
                                && let Ok(mut events) = events.lock()
                            {
                                events.push(MapEvent::PopupClosed);
                            }
                        });
                    });
                    if !marker.description.is_empty() {
                        ui.label(&marker.description);
                    }
                    if let Some((uri, bytes)) = &marker.image {
                        ui.add(
                            egui::Image::from_bytes(uri.clone(), bytes.clone())
                                .max_width(POPUP_WIDTH)
                                .corner_radius(4.0),
                        );
                    }
                });
            });
    }
}

impl Plugin for MarkerPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        profiling::scope!("MarkerPlugin::run");

        let painter = ui.painter().with_clip_rect(response.rect);
        let click = if response.clicked() {
            response.interact_pointer_pos()
        } else {
            None
        };

        let mut hit: Option<(f32, LandmarkId)> = None;
        for marker in &self.markers {
            let at = Self::screen_position(projector, marker);
            Self::draw_marker(&painter, at, self.open_popup == Some(marker.id));

            if let Some(click) = click {
                let distance = at.distance(click);
                if distance <= MARKER_HIT_RADIUS && hit.is_none_or(|(best, _)| distance < best) {
                    hit = Some((distance, marker.id));
                }
            }
        }

        if let Some(click) = click {
            match hit {
                Some((_, id)) => self.push(MapEvent::MarkerClicked(id)),
                None => {
                    let position = projector.unproject(click.to_vec2());
                    self.push(MapEvent::Clicked(Coordinates::new(position.y(), position.x())));
                }
            }
        }

        if let Some(marker) = self
            .open_popup
            .and_then(|id| self.markers.iter().find(|marker| marker.id == id))
        {
            let anchor = Self::screen_position(projector, marker);
            if response.rect.contains(anchor) {
                self.show_popup(ui, marker, anchor);
            }
        }
    }
}
