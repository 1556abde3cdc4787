use crate::data::{Coordinates, DEFAULT_CENTER, DEFAULT_ZOOM};
use crate::entrypoints::cli::parse_args;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Landmark Map - Mark points of interest on an interactive map with a title, description and photo
pub struct Settings {
    /// Storage file holding the saved landmarks (native only, defaults to the user config directory)
    #[clap(long, value_name = "FILE")]
    pub storage_file: Option<PathBuf>,

    /// Keep landmarks in memory only; nothing is read from or written to disk
    #[clap(long, default_value = "false")]
    pub in_memory: bool,

    /// Latitude of the initial view
    #[clap(long, default_value_t = DEFAULT_CENTER.lat, allow_negative_numbers = true)]
    pub default_lat: f64,

    /// Longitude of the initial view
    #[clap(long, default_value_t = DEFAULT_CENTER.lng, allow_negative_numbers = true)]
    pub default_lon: f64,

    /// Zoom level of the initial view
    #[clap(long, default_value_t = DEFAULT_ZOOM)]
    pub default_zoom: f64,

    /// Do not try to center on the current position at startup
    #[clap(long, default_value = "false")]
    pub no_geolocate: bool,

    /// Position reported as "my location" on platforms without a geolocation service, as LAT,LNG
    #[clap(long, value_name = "LAT,LNG", value_parser = parse_location, allow_hyphen_values = true)]
    pub location: Option<Coordinates>,

    /// Ignore previously persisted UI settings and start fresh
    #[clap(long, default_value = "false")]
    pub ignore_persisted: bool,
}

impl Settings {
    /// Parse the settings, falling back to defaults on web when the GET parameters are invalid
    pub fn from_cli() -> Self {
        match parse_args::<Settings>() {
            Ok(args) => args,
            Err(e) => {
                #[cfg(not(target_arch = "wasm32"))]
                e.exit();
                #[cfg(target_arch = "wasm32")]
                {
                    let user_msg = format!(
                        "Error parsing CLI:\n{}\n
    You should change the GET params, using the cli prefix.\n
    Starting anyway without args.",
                        e
                    );
                    if let Some(window) = web_sys::window() {
                        window.alert_with_message(&user_msg).unwrap_or(());
                    } else {
                        tracing::error!(user_msg);
                    }
                    Settings::parse_from(Vec::<String>::new())
                }
            }
        }
    }

    /// Initial map view
    pub fn initial_view(&self) -> (Coordinates, f64) {
        (
            Coordinates::new(self.default_lat, self.default_lon),
            self.default_zoom,
        )
    }
}

fn parse_location(value: &str) -> Result<Coordinates, String> {
    let (lat, lng) = value
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LNG but got {value:?}"))?;
    let lat = lat
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid latitude {lat:?}: {e}"))?;
    let lng = lng
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid longitude {lng:?}: {e}"))?;
    Ok(Coordinates::new(lat, lng))
}
