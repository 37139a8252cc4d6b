use std::{
    fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    thread,
};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_PATH: &str = "plotlyimex.toml";
pub const DEFAULT_PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory the `export_<plot>.html` files are written to
    pub output_dir: PathBuf,
    /// Worker pool size for exporting every plot type at once
    pub threads: Option<NonZeroUsize>,
    /// Open a single plot in the browser before writing it
    pub show: bool,

    pub map: MapSettings,
    pub html: HtmlSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    pub style: String,
    pub zoom: f64,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HtmlSettings {
    pub plotly_js: String,

    // inlined into every document instead of linking `plotly_js`, for
    // viewing the exports without network access
    pub plotly_js_path: Option<PathBuf>,

    /// Program that opens an exported page; the platform opener when unset
    pub viewer: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            threads: None,
            show: true,
            map: MapSettings::default(),
            html: HtmlSettings::default(),
        }
    }
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            style: "open-street-map".to_owned(),
            zoom: 3.0,
            width: 1920,
            height: 1080,
        }
    }
}

impl Default for HtmlSettings {
    fn default() -> Self {
        Self {
            plotly_js: DEFAULT_PLOTLY_JS.to_owned(),
            plotly_js_path: None,
            viewer: None,
        }
    }
}

impl Config {
    pub fn threads(&self) -> usize {
        self.threads
            .or_else(|| thread::available_parallelism().ok())
            .map_or(1, NonZeroUsize::get)
    }
}

pub fn load(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path).context("Failed to read config")?;
    let config = toml::from_str(&data).context("Failed to parse config")?;
    Ok(config)
}

/// Loads `path` when given, otherwise the default config file if it exists.
pub fn load_or_default(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => load(path),
        None => {
            let path = Path::new(DEFAULT_PATH);
            if path.is_file() {
                load(path)
            } else {
                Ok(Config::default())
            }
        }
    }
}
