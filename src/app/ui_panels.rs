//! UI panels for the application
//!
//! This module provides the sidebar (landmark form and list, settings), the
//! map overlays and drag-and-drop support. Panels never mutate landmarks
//! directly: they push [`UiAction`]s which the app applies after drawing.

use crate::app::picker::{SelectedImage, is_image_file};
use crate::app::state::{AppState, SidebarTab, TilesProvider};
use crate::data::{ImageSource, LandmarkId, ListEntry, StoreError};
use egui::{Color32, RichText, Ui};
use std::sync::Arc;

/// Requests from the sidebar, applied by the app once the frame is drawn
#[derive(Clone, Debug, PartialEq)]
pub enum UiAction {
    ChoosePhoto,
    UseMyLocation,
    Submit,
    Focus(LandmarkId),
    Delete(LandmarkId),
}

/// Render the sidebar toggle button (overlaid on top-right of map)
pub fn sidebar_toggle_button(ui: &mut Ui, state: &mut AppState) {
    let button_size = egui::vec2(40.0, 40.0);
    let margin = 10.0;

    let rect = ui.max_rect();
    let button_pos = rect.right_top() + egui::vec2(-button_size.x - margin, margin);
    let button_rect = egui::Rect::from_min_size(button_pos, button_size);

    let response = ui.allocate_rect(button_rect, egui::Sense::click());
    if response.clicked() {
        state.ui_settings.sidebar_open = !state.ui_settings.sidebar_open;
    }

    let bg_color = if response.hovered() {
        ui.visuals().widgets.hovered.bg_fill
    } else {
        ui.visuals().widgets.inactive.bg_fill
    };
    ui.painter().rect_filled(button_rect, 5.0, bg_color);

    let icon = if state.ui_settings.sidebar_open {
        "✕"
    } else {
        "☰"
    };
    ui.painter().text(
        button_rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(20.0),
        ui.visuals().text_color(),
    );
}

/// Render the main sidebar (responsive: side on landscape, bottom on portrait)
pub fn render_sidebar(
    ctx: &egui::Context,
    state: &mut AppState,
    entries: &[ListEntry],
    focused: Option<LandmarkId>,
    actions: &mut Vec<UiAction>,
) {
    if !state.ui_settings.sidebar_open {
        return;
    }

    let screen_size = ctx.viewport_rect().size();
    if screen_size.y > screen_size.x {
        egui::TopBottomPanel::bottom("main_sidebar")
            .default_height(320.0)
            .min_height(180.0)
            .max_height(ctx.viewport_rect().height() * 0.6)
            .resizable(true)
            .show(ctx, |ui| {
                render_sidebar_content(ui, state, entries, focused, actions);
            });
    } else {
        egui::SidePanel::right("main_sidebar")
            .default_width(320.0)
            .min_width(260.0)
            .max_width(450.0)
            .resizable(true)
            .show(ctx, |ui| {
                render_sidebar_content(ui, state, entries, focused, actions);
            });
    }
}

fn render_sidebar_content(
    ui: &mut Ui,
    state: &mut AppState,
    entries: &[ListEntry],
    focused: Option<LandmarkId>,
    actions: &mut Vec<UiAction>,
) {
    ui.horizontal(|ui| {
        ui.selectable_value(
            &mut state.ui_settings.active_tab,
            SidebarTab::Landmarks,
            "📍 Landmarks",
        );
        ui.selectable_value(
            &mut state.ui_settings.active_tab,
            SidebarTab::Settings,
            "⚙ Settings",
        );
    });

    ui.separator();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| match state.ui_settings.active_tab {
            SidebarTab::Landmarks => {
                render_form(ui, state, actions);
                ui.add_space(8.0);
                ui.separator();
                render_list(ui, entries, focused, actions);
            }
            SidebarTab::Settings => render_settings_tab(ui, state, entries.len()),
        });
}

/// The landmark creation form
fn render_form(ui: &mut Ui, state: &mut AppState, actions: &mut Vec<UiAction>) {
    ui.label(RichText::new("➕ New Landmark").strong());
    ui.add_space(6.0);

    egui::Grid::new("landmark_form_grid")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            ui.label("Title:");
            ui.text_edit_singleline(&mut state.form.title);
            ui.end_row();

            ui.label("Description:");
            ui.add(egui::TextEdit::multiline(&mut state.form.description).desired_rows(3));
            ui.end_row();

            ui.label("Latitude:");
            ui.add(egui::TextEdit::singleline(&mut state.form.lat).hint_text("43.653200"));
            ui.end_row();

            ui.label("Longitude:");
            ui.add(egui::TextEdit::singleline(&mut state.form.lng).hint_text("-79.383200"));
            ui.end_row();
        });

    ui.label(
        RichText::new("Click the map to fill in the coordinates")
            .small()
            .weak(),
    );
    ui.add_space(4.0);

    ui.horizontal(|ui| {
        if ui
            .add_enabled(!state.locating, egui::Button::new("📍 Use my location"))
            .clicked()
        {
            actions.push(UiAction::UseMyLocation);
        }
        if state.locating {
            ui.spinner();
        }
    });

    ui.horizontal(|ui| {
        if ui.button("🖼 Choose photo…").clicked() {
            actions.push(UiAction::ChoosePhoto);
        }
        match &state.form.image {
            Some(image) => {
                ui.label(RichText::new(image.file_name()).small());
                if ui.small_button("✕").on_hover_text("Remove photo").clicked() {
                    state.form.image = None;
                }
            }
            None => {
                ui.label(RichText::new("No photo (or drop one here)").small().weak());
            }
        }
    });

    ui.add_space(6.0);
    if ui.button("✔ Add landmark").clicked() {
        actions.push(UiAction::Submit);
    }

    if state.pending_submissions > 0 {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(
                RichText::new(format!("Reading {} photo(s)…", state.pending_submissions))
                    .small()
                    .color(ui.visuals().warn_fg_color),
            );
        });
    }

    if let Some(error) = state.last_error.clone() {
        ui.add_space(4.0);
        ui.horizontal_wrapped(|ui| {
            ui.label(RichText::new(format!("⚠ {}", error)).small().color(Color32::RED));
            if ui.small_button("Dismiss").clicked() {
                state.last_error = None;
            }
        });
    }
}

/// The landmark list, in insertion order
fn render_list(
    ui: &mut Ui,
    entries: &[ListEntry],
    focused: Option<LandmarkId>,
    actions: &mut Vec<UiAction>,
) {
    ui.label(RichText::new(format!("🗺 Landmarks ({})", entries.len())).strong());
    ui.add_space(4.0);

    if entries.is_empty() {
        ui.label(RichText::new("No landmarks yet").italics().weak());
        return;
    }

    for entry in entries {
        ui.horizontal(|ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("🗑").on_hover_text("Delete").clicked() {
                    actions.push(UiAction::Delete(entry.id));
                }
                ui.with_layout(egui::Layout::top_down(egui::Align::Min), |ui| {
                    let text = RichText::new(&entry.title).strong();
                    let mut clicked = ui
                        .selectable_label(focused == Some(entry.id), text)
                        .clicked();
                    if !entry.preview.is_empty() {
                        let preview = egui::Label::new(RichText::new(&entry.preview).small().weak())
                            .sense(egui::Sense::click());
                        clicked |= ui.add(preview).clicked();
                    }
                    if clicked {
                        actions.push(UiAction::Focus(entry.id));
                    }
                });
            });
        });
        ui.separator();
    }
}

/// Render the Settings tab
fn render_settings_tab(ui: &mut Ui, state: &mut AppState, landmark_count: usize) {
    ui.label(RichText::new("🗺 Map Tiles").strong());
    ui.add_space(6.0);

    for provider in TilesProvider::all() {
        let selected = state.ui_settings.tiles_provider == *provider;
        if ui.selectable_label(selected, provider.name()).clicked() {
            state.ui_settings.tiles_provider = *provider;
        }
    }

    ui.add_space(4.0);
    ui.label(
        RichText::new(state.ui_settings.tiles_provider.attribution())
            .small()
            .italics()
            .weak(),
    );

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);

    ui.label(RichText::new("🔧 Debug").strong());
    ui.add_space(6.0);

    ui.checkbox(&mut state.ui_settings.show_profiling, "Show profiling data");
    if state.ui_settings.show_profiling {
        ui.add_space(4.0);
        crate::entrypoints::profiling::profiling_ui(ui);
    }

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);

    ui.label(RichText::new("ℹ About").strong());
    ui.add_space(4.0);
    ui.label(RichText::new(crate::entrypoints::metadata::short_version_info()).small());
    ui.label(
        RichText::new(format!("{} landmarks saved on this device", landmark_count))
            .small()
            .weak(),
    );
    ui.add_space(4.0);
    ui.label(RichText::new("Keyboard shortcuts:").small());
    ui.label(RichText::new("  F1 / Ctrl+H - Toggle help").small().weak());
}

/// Help overlay
pub fn help_overlay(ctx: &egui::Context, show_help: &mut bool) {
    egui::Window::new("Help")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.heading("Landmark Map");
            ui.add_space(8.0);

            ui.label("Mark places on the map with a title, a description and a photo.");
            ui.add_space(12.0);

            ui.label(RichText::new("Adding Landmarks").strong());
            ui.label("• Click the map (or 'Use my location') to fill in the coordinates");
            ui.label("• Choose a photo, or drag and drop one onto the window");
            ui.label("• Press 'Add landmark'");
            ui.add_space(8.0);

            ui.label(RichText::new("Browsing").strong());
            ui.label("• Click a marker to show its popup");
            ui.label("• Click a list entry to fly to it");
            ui.label("• 🗑 deletes a landmark");
            ui.add_space(8.0);

            ui.label(RichText::new("Keyboard Shortcuts").strong());
            ui.label("• F1 or Ctrl+H - Toggle this help");
            ui.add_space(12.0);

            if ui.button("Close").clicked() {
                *show_help = false;
            }
        });
}

/// Modal message, e.g. when the location is unavailable
pub fn alert_window(ctx: &egui::Context, state: &mut AppState) {
    let Some(message) = state.alert.clone() else {
        return;
    };

    egui::Window::new("⚠ Notice")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(message);
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                state.alert = None;
            }
        });
}

/// Full-window screen shown instead of the app when the saved landmarks cannot be read
pub fn startup_error_screen(ctx: &egui::Context, error: &StoreError) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.3);
            ui.heading(RichText::new("⚠ Could not load saved landmarks").color(Color32::RED));
            ui.add_space(8.0);
            ui.label(error.to_string());
            ui.add_space(8.0);
            ui.label(
                RichText::new("Nothing was changed. Fix or remove the stored data and restart.")
                    .weak(),
            );
        });
    });
}

/// Handle drag and drop of image files
pub fn handle_drag_and_drop(ctx: &egui::Context, state: &mut AppState) {
    let hovered_files = ctx.input(|i| !i.raw.hovered_files.is_empty());
    let dropped_files: Vec<_> = ctx.input(|i| i.raw.dropped_files.clone());

    if hovered_files {
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("drop_preview"),
        ));
        let screen_rect = ctx.content_rect();
        let bg_rect = egui::Rect::from_center_size(screen_rect.center(), egui::vec2(340.0, 80.0));
        painter.rect_filled(bg_rect, 16.0, Color32::from_black_alpha(180));
        painter.text(
            screen_rect.center(),
            egui::Align2::CENTER_CENTER,
            "🖼 Drop a photo here",
            egui::FontId::proportional(32.0),
            Color32::WHITE,
        );
    }

    if dropped_files.is_empty() {
        return;
    }

    // Only one photo per landmark: the first image wins
    match dropped_files.into_iter().find(is_image_file) {
        Some(file) => {
            let image = SelectedImage::Dropped(file);
            tracing::debug!("Dropped {}", image.file_name());
            state.form.image = Some(Arc::new(image));
        }
        None => state.report_error("Only image files can be attached".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::epaint::{ClippedShape, Shape};
    use egui::{Event, PointerButton, Pos2, RawInput, Rect};

    fn tower_entry() -> ListEntry {
        ListEntry {
            id: LandmarkId(1),
            title: "Tower".to_string(),
            preview: "A tall tower".to_string(),
        }
    }

    /// Run one frame of the landmark list, returning the actions and painted shapes
    fn list_frame(ctx: &egui::Context, events: Vec<Event>) -> (Vec<UiAction>, Vec<ClippedShape>) {
        let mut actions = Vec::new();
        let input = RawInput {
            screen_rect: Some(Rect::from_min_size(Pos2::ZERO, egui::vec2(800.0, 600.0))),
            events,
            ..Default::default()
        };
        let output = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                render_list(ui, &[tower_entry()], None, &mut actions);
            });
        });
        (actions, output.shapes)
    }

    fn text_rect(shapes: &[ClippedShape], text: &str) -> Option<Rect> {
        shapes.iter().find_map(|clipped| match &clipped.shape {
            Shape::Text(shape) if shape.galley.text() == text => {
                Some(shape.galley.rect.translate(shape.pos.to_vec2()))
            }
            _ => None,
        })
    }

    fn click_at(ctx: &egui::Context, pos: Pos2) -> Vec<UiAction> {
        let button = |pressed| Event::PointerButton {
            pos,
            button: PointerButton::Primary,
            pressed,
            modifiers: Default::default(),
        };

        let mut actions = list_frame(ctx, vec![Event::PointerMoved(pos)]).0;
        actions.extend(list_frame(ctx, vec![button(true)]).0);
        actions.extend(list_frame(ctx, vec![button(false)]).0);
        actions
    }

    #[test]
    fn test_clicking_title_or_preview_focuses_entry() {
        let ctx = egui::Context::default();
        let (actions, shapes) = list_frame(&ctx, Vec::new());
        assert!(actions.is_empty());

        let title = text_rect(&shapes, "Tower").unwrap();
        let preview = text_rect(&shapes, "A tall tower").unwrap();

        assert_eq!(
            click_at(&ctx, title.center()),
            vec![UiAction::Focus(LandmarkId(1))]
        );
        assert_eq!(
            click_at(&ctx, preview.center()),
            vec![UiAction::Focus(LandmarkId(1))]
        );
    }
}
