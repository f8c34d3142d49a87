//! Compositor configuration
//!
//! Every option has a default, so an empty JSON object is a valid
//! configuration file.

use crate::color::{validate_rgb, ColorTable};
use crate::encoding::CharacterEncoding;
use crate::error::{Error, Result};
use crate::merge::{MergeOptions, MergePolicy};
use crate::types::LineEnding;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the sequence counter of an emitted block comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterMode {
    /// Use the pending `srt_counter-` directive, else the running counter
    #[default]
    Directive,
    /// Always use the running per-destination counter
    Auto,
    /// Emit blocks without a counter line
    Off,
}

/// Compositor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of columns in the caption grid
    pub grid_width: usize,
    /// A row with this many consecutive spaces is blank
    pub blank_run_threshold: usize,
    /// Markup for each color code
    pub color_table: ColorTable,
    /// RGB value for the user-defined color code (`#rrggbb`)
    pub user_color: Option<String>,
    /// Drop color markup entirely
    pub no_font_color: bool,
    /// Emit `<u>` for underlined cells
    pub underline: bool,
    /// How color and style annotations combine on one row
    pub merge_policy: MergePolicy,
    /// Strip leading padding as well as trailing padding
    pub trim_leading: bool,
    /// Code page of the decoder log and of the output
    pub encoding: CharacterEncoding,
    /// Counter line policy
    pub counter: CounterMode,
    /// Line terminator in emitted blocks
    pub line_ending: LineEnding,
    /// Directory that destination names are resolved against
    pub output_dir: Option<PathBuf>,
    /// Destination used until a `filename:` directive is seen
    pub default_destination: Option<String>,
    /// Poll interval when following a growing log (milliseconds)
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid_width: 32,
            blank_run_threshold: 32,
            color_table: ColorTable::default(),
            user_color: None,
            no_font_color: false,
            underline: false,
            merge_policy: MergePolicy::default(),
            trim_leading: false,
            encoding: CharacterEncoding::default(),
            counter: CounterMode::default(),
            line_ending: LineEnding::default(),
            output_dir: None,
            default_destination: None,
            poll_interval_ms: 200,
        }
    }
}

impl Config {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_width == 0 {
            return Err(Error::InvalidConfig("grid_width must be positive".into()));
        }
        if self.blank_run_threshold == 0 {
            return Err(Error::InvalidConfig(
                "blank_run_threshold must be positive".into(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "poll_interval_ms must be positive".into(),
            ));
        }
        if let Some(rgb) = &self.user_color {
            validate_rgb(rgb)?;
        }
        self.color_table.validate()
    }

    /// Color table with the user-defined color applied
    pub fn effective_colors(&self) -> ColorTable {
        match &self.user_color {
            Some(rgb) => self.color_table.clone().with_user_color(rgb),
            None => self.color_table.clone(),
        }
    }

    /// Row merge options derived from this configuration
    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            blank_run_threshold: self.blank_run_threshold,
            colors: if self.no_font_color {
                None
            } else {
                Some(self.effective_colors())
            },
            underline: self.underline,
            policy: self.merge_policy,
            trim_leading: self.trim_leading,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
