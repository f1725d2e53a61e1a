use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::constants::{FILE_PATHS, VIEW_DEFAULTS};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("day window {start}:00..{end}:00 is empty or past midnight")]
    DayWindow { start: u32, end: u32 },
    #[error("rows_per_hour must be at least 1")]
    RowsPerHour,
    #[error("grid_minutes must be at least 1")]
    GridMinutes,
    #[error("{hours} hours at {rows_per_hour} rows per hour exceed 65535 rows")]
    TooManyRows { hours: u32, rows_per_hour: u16 },
}

/// Geometry of the rendered day. Only the renderer reads these; layout is
/// independent of the visible window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub day_start_hour: u32,
    pub day_end_hour: u32,
    pub rows_per_hour: u16,
    pub grid_minutes: u32,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            day_start_hour: VIEW_DEFAULTS.day_start_hour,
            day_end_hour: VIEW_DEFAULTS.day_end_hour,
            rows_per_hour: VIEW_DEFAULTS.rows_per_hour,
            grid_minutes: VIEW_DEFAULTS.grid_minutes,
        }
    }
}

impl ViewSettings {
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.day_start_hour >= self.day_end_hour || self.day_end_hour > 24 {
            return Err(ConfigError::DayWindow {
                start: self.day_start_hour,
                end: self.day_end_hour,
            });
        }
        if self.rows_per_hour == 0 {
            return Err(ConfigError::RowsPerHour);
        }
        if self.grid_minutes == 0 {
            return Err(ConfigError::GridMinutes);
        }
        if u16::try_from(self.row_count()).is_err() {
            return Err(ConfigError::TooManyRows {
                hours: self.day_end_hour - self.day_start_hour,
                rows_per_hour: self.rows_per_hour,
            });
        }
        Ok(self)
    }

    pub fn pixels_per_minute(&self) -> f64 {
        self.rows_per_hour as f64 / 60.0
    }

    pub fn window_minutes(&self) -> (u32, u32) {
        (self.day_start_hour * 60, self.day_end_hour * 60)
    }

    /// Rows spanned by the window, saturating at `u16::MAX` for settings
    /// that skipped [`ViewSettings::validate`].
    pub fn total_rows(&self) -> u16 {
        u16::try_from(self.row_count()).unwrap_or(u16::MAX)
    }

    fn row_count(&self) -> u64 {
        let hours = self.day_end_hour.saturating_sub(self.day_start_hour);
        hours as u64 * self.rows_per_hour as u64
    }
}

pub fn get_config_path() -> PathBuf {
    let local = Path::new(FILE_PATHS.local_config);
    if local.exists() {
        return local.to_path_buf();
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "daygrid", "daygrid") {
        proj_dirs.config_dir().join(FILE_PATHS.config)
    } else {
        local.to_path_buf()
    }
}

/// Reads settings from `path`, falling back to defaults when the file is
/// absent or unreadable.
pub fn load_settings(path: &Path) -> ViewSettings {
    if !path.exists() {
        return ViewSettings::default();
    }

    let parsed = fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|content| {
            serde_json::from_str::<ViewSettings>(&content).map_err(|e| e.to_string())
        })
        .and_then(|settings| settings.validate().map_err(|e| e.to_string()));

    match parsed {
        Ok(settings) => {
            debug!(path = %path.display(), "loaded view settings");
            settings
        }
        Err(e) => {
            warn!(path = %path.display(), "ignoring config file: {}", e);
            ViewSettings::default()
        }
    }
}
