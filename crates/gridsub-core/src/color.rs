//! Caption color palette - markup emitted for each 608 color code
//!
//! White, black and transparent text has no markup; the user-defined color
//! only gets markup once an RGB value is configured for it.
//!
//! # Usage
//!
//! ```rust
//! use gridsub_core::color::ColorTable;
//! use gridsub_core::ColorCode;
//!
//! let table = ColorTable::default();
//! assert_eq!(table.markup(ColorCode::RED).unwrap().open, "<font color=\"#ff0000\">");
//! assert!(table.markup(ColorCode::WHITE).is_none());
//! ```

use crate::error::{Error, Result};
use crate::types::ColorCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Open/close markup pair for one color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorMarkup {
    pub open: String,
    pub close: String,
}

impl ColorMarkup {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// `<font color="#rrggbb">` ... `</font>`
    pub fn font(rgb: &str) -> Self {
        Self::new(format!("<font color=\"{rgb}\">"), "</font>")
    }

    /// Markup with an empty open tag has no visual effect
    pub fn has_effect(&self) -> bool {
        !self.open.is_empty()
    }
}

/// Mapping from color code to markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorTable(BTreeMap<u8, ColorMarkup>);

impl Default for ColorTable {
    fn default() -> Self {
        let entries = [
            (ColorCode::GREEN, "#00ff00"),
            (ColorCode::BLUE, "#0000ff"),
            (ColorCode::CYAN, "#00ffff"),
            (ColorCode::RED, "#ff0000"),
            (ColorCode::YELLOW, "#ffff00"),
            (ColorCode::MAGENTA, "#ff00ff"),
        ];

        Self(
            entries
                .into_iter()
                .map(|(code, rgb)| (code.0, ColorMarkup::font(rgb)))
                .collect(),
        )
    }
}

impl ColorTable {
    /// Table with no entries: every code is a no-effect code
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Markup for a code, or `None` when the code has no visual effect
    pub fn markup(&self, code: ColorCode) -> Option<&ColorMarkup> {
        self.0.get(&code.0).filter(|m| m.has_effect())
    }

    pub fn insert(&mut self, code: ColorCode, markup: ColorMarkup) {
        self.0.insert(code.0, markup);
    }

    /// Give the user-defined color code a concrete RGB value
    pub fn with_user_color(mut self, rgb: &str) -> Self {
        self.insert(ColorCode::USER_DEFINED, ColorMarkup::font(rgb));
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(code) = self.0.keys().find(|&&code| code > 9) {
            return Err(Error::InvalidConfig(format!(
                "color table entry {code} is outside the 0-9 palette"
            )));
        }
        if let Some((code, _)) = self
            .0
            .iter()
            .find(|(_, m)| m.has_effect() && m.close.is_empty())
        {
            return Err(Error::InvalidConfig(format!(
                "color table entry {code} opens a tag it never closes"
            )));
        }
        Ok(())
    }
}

/// Check an `#rrggbb` color value
pub fn validate_rgb(value: &str) -> Result<()> {
    let valid = value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "user color must look like #rrggbb, got {value:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette() {
        let table = ColorTable::default();
        assert_eq!(
            table.markup(ColorCode::GREEN),
            Some(&ColorMarkup::new("<font color=\"#00ff00\">", "</font>"))
        );
        for code in [
            ColorCode::WHITE,
            ColorCode::USER_DEFINED,
            ColorCode::BLACK,
            ColorCode::TRANSPARENT,
        ] {
            assert!(table.markup(code).is_none(), "{code} should have no effect");
        }
    }

    #[test]
    fn test_user_color() {
        let table = ColorTable::default().with_user_color("#123abc");
        assert_eq!(
            table.markup(ColorCode::USER_DEFINED).unwrap().open,
            "<font color=\"#123abc\">"
        );
    }

    #[test]
    fn test_empty_open_is_no_effect() {
        let mut table = ColorTable::empty();
        table.insert(ColorCode::RED, ColorMarkup::new("", "</font>"));
        assert!(table.markup(ColorCode::RED).is_none());
    }

    #[test]
    fn test_validation() {
        assert!(ColorTable::default().validate().is_ok());

        let mut table = ColorTable::empty();
        table.insert(ColorCode(12), ColorMarkup::font("#ffffff"));
        assert!(table.validate().is_err());

        let mut table = ColorTable::empty();
        table.insert(ColorCode::RED, ColorMarkup::new("<b>", ""));
        assert!(table.validate().is_err());

        assert!(validate_rgb("#00ff00").is_ok());
        assert!(validate_rgb("00ff00").is_err());
        assert!(validate_rgb("#00ff0g").is_err());
    }

    #[test]
    fn test_table_from_json() {
        let table: ColorTable =
            serde_json::from_str(r#"{"4": {"open": "<b>", "close": "</b>"}}"#).unwrap();
        assert_eq!(table.markup(ColorCode::RED).unwrap().close, "</b>");
        assert!(table.markup(ColorCode::GREEN).is_none());
    }
}
