//! Image selection: the file dialog and files dropped onto the window.

use crate::data::{ImageError, ImageSource};
use crate::entrypoints::runtime;
use tokio::sync::mpsc::UnboundedSender;

/// Extensions offered by the file dialog and accepted from drag-and-drop
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// The image attached to the form
pub enum SelectedImage {
    /// Chosen through the file dialog
    Picked(rfd::FileHandle),
    /// Dropped onto the window
    Dropped(egui::DroppedFile),
}

impl std::fmt::Debug for SelectedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SelectedImage").field(&self.file_name()).finish()
    }
}

impl ImageSource for SelectedImage {
    fn file_name(&self) -> String {
        match self {
            Self::Picked(handle) => handle.file_name(),
            Self::Dropped(file) => dropped_file_name(file),
        }
    }

    async fn read(&self) -> Result<Vec<u8>, ImageError> {
        match self {
            #[cfg(not(target_arch = "wasm32"))]
            Self::Picked(handle) => read_path(&handle.file_name(), handle.path()).await,
            #[cfg(target_arch = "wasm32")]
            Self::Picked(handle) => Ok(handle.read().await),
            Self::Dropped(file) => {
                if let Some(bytes) = &file.bytes {
                    return Ok(bytes.to_vec());
                }
                match &file.path {
                    #[cfg(not(target_arch = "wasm32"))]
                    Some(path) => read_path(&dropped_file_name(file), path).await,
                    _ => Err(ImageError::Read {
                        name: dropped_file_name(file),
                        reason: "dropped file has no contents".to_string(),
                    }),
                }
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
async fn read_path(name: &str, path: &std::path::Path) -> Result<Vec<u8>, ImageError> {
    tokio::fs::read(path).await.map_err(|e| ImageError::Read {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

fn dropped_file_name(file: &egui::DroppedFile) -> String {
    if !file.name.is_empty() {
        return file.name.clone();
    }
    file.path
        .as_ref()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Whether a dropped file looks like an image we can embed
pub fn is_image_file(file: &egui::DroppedFile) -> bool {
    let name = dropped_file_name(file).to_lowercase();
    let by_name = name
        .rsplit_once('.')
        .map(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext))
        .unwrap_or(false);
    by_name || file.mime.starts_with("image/")
}

/// Show the async file dialog; the chosen file is sent back through `picked`
pub fn open_image_picker(picked: UnboundedSender<SelectedImage>, ctx: egui::Context) {
    runtime::spawn(async move {
        let handle = rfd::AsyncFileDialog::new()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .set_title("Select a photo")
            .pick_file()
            .await;

        if let Some(handle) = handle {
            tracing::debug!("Picked {}", handle.file_name());
            let _ = picked.send(SelectedImage::Picked(handle));
            ctx.request_repaint();
        }
    });
}
