use std::fs;
use std::path::Path;

use anyhow::Context;
use log::LevelFilter;
use serde::Deserialize;

/// Default configuration file, looked up in the working directory of the host process.
pub const CONFIG_FILE_PATH: &str = "d3d9_wrapper.json";

/// User options consumed by the interception layer. Every option defaults to "off".
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "PascalCase")]
pub struct Config {
    /// Upper bound on the multisample sample count tried at device creation. 0 disables.
    pub anti_aliasing: u32,
    #[serde(rename = "EnableVSync")]
    pub enable_vsync: bool,
    pub force_vsync_mode: bool,
    pub force_exclusive_fullscreen: bool,
    pub enable_window_mode: bool,
    pub fullscreen_window_mode: bool,
    pub window_mode_border: bool,
    /// Refresh rate forced in exclusive mode. 0 keeps the requested rate.
    pub override_refresh_rate: u32,
    pub set_initial_window_position: bool,
    pub initial_window_position_left: i32,
    pub initial_window_position_top: i32,
    pub force_mixed_vertex_processing: bool,
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            anti_aliasing: 0,
            enable_vsync: false,
            force_vsync_mode: false,
            force_exclusive_fullscreen: false,
            enable_window_mode: false,
            fullscreen_window_mode: false,
            window_mode_border: false,
            override_refresh_rate: 0,
            set_initial_window_position: false,
            initial_window_position_left: 0,
            initial_window_position_top: 0,
            force_mixed_vertex_processing: false,
            log_level: LevelFilter::Info,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid configuration JSON")
    }

    /// Reads the configuration at `path`. A missing file is not an error.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        Self::from_json(&json).with_context(|| format!("failed to parse '{}'", path.display()))
    }

    /// Like [`Config::load`], but logs the problem and falls back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                log::error!("Configuration ignored: {:#}", err);
                Self::default()
            }
        }
    }
}
