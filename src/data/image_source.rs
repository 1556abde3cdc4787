//! Reading a user-selected image file into a data URI

use crate::data::data_uri;
use std::future::Future;

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Failed to read {name}: {reason}")]
    Read { name: String, reason: String },
}

/// A file chosen by the user. Reading may suspend (browser file reader, async fs).
pub trait ImageSource {
    fn file_name(&self) -> String;

    fn read(&self) -> impl Future<Output = Result<Vec<u8>, ImageError>>;
}

/// Read `source` completely and encode it as a data URI
pub async fn read_data_uri<S: ImageSource>(source: &S) -> Result<String, ImageError> {
    let name = source.file_name();
    let started = instant::Instant::now();

    let bytes = source.read().await?;
    let uri = data_uri::encode(&name, &bytes);
    tracing::debug!(
        "Encoded {} ({} bytes) in {:?}",
        name,
        bytes.len(),
        started.elapsed()
    );
    Ok(uri)
}
