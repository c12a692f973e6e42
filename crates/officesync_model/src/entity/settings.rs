//! Office-wide settings.
//!
//! On the store, settings are five independent top-level keys. On the
//! backend they are one singleton row. [`Settings`] is the bag that
//! carries exactly those keys between the two.

use crate::codec::RowCodec;
use crate::error::CodecResult;
use crate::row::{Row, RowReader, RowWriter};
use serde::{Deserialize, Serialize};

/// Primary key of the singleton settings row.
pub const SETTINGS_ROW_ID: &str = "default";

/// Color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    /// Dark scheme.
    #[default]
    Dark,
    /// Light scheme.
    Light,
}

impl Theme {
    /// Column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Parses a column value; unknown values map to dark.
    pub fn parse(value: &str) -> Self {
        match value {
            "light" => Theme::Light,
            _ => Theme::Dark,
        }
    }
}

/// The persisted settings keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Name shown in the header.
    pub office_name: String,
    /// Color scheme.
    pub theme: Theme,
    /// Whether the floor grid is drawn.
    pub show_grid: bool,
    /// Whether ambient sound plays.
    pub sound_enabled: bool,
    /// Orbit camera speed multiplier.
    pub camera_speed: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            office_name: DEFAULT_OFFICE_NAME.to_string(),
            theme: Theme::Dark,
            show_grid: true,
            sound_enabled: false,
            camera_speed: 1.0,
        }
    }
}

const DEFAULT_OFFICE_NAME: &str = "My Office";

impl RowCodec for Settings {
    type Context = ();

    const TABLE: &'static str = "settings";

    fn to_row(&self, _ctx: ()) -> Row {
        RowWriter::new(SETTINGS_ROW_ID)
            .text("office_name", &self.office_name)
            .text("theme", self.theme.as_str())
            .bool("show_grid", self.show_grid)
            .bool("sound_enabled", self.sound_enabled)
            .f64("camera_speed", self.camera_speed)
            .finish()
    }

    fn from_row(row: &Row) -> CodecResult<Self> {
        let r = RowReader::new(Self::TABLE, row);
        let defaults = Self::default();
        Ok(Self {
            office_name: r.text_or("office_name", &defaults.office_name),
            theme: r
                .opt_text("theme")
                .map_or(defaults.theme, |t| Theme::parse(&t)),
            show_grid: r.bool_or("show_grid", defaults.show_grid),
            sound_enabled: r.bool_or("sound_enabled", defaults.sound_enabled),
            camera_speed: r.f64_or("camera_speed", defaults.camera_speed),
        })
    }
}
