//! Core types for the caption grid

use crate::error::{Error, Result};
use crate::timing::TimeWindow;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Color attribute of a grid cell (EIA-608 palette index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ColorCode(pub u8);

impl ColorCode {
    pub const WHITE: ColorCode = ColorCode(0);
    pub const GREEN: ColorCode = ColorCode(1);
    pub const BLUE: ColorCode = ColorCode(2);
    pub const CYAN: ColorCode = ColorCode(3);
    pub const RED: ColorCode = ColorCode(4);
    pub const YELLOW: ColorCode = ColorCode(5);
    pub const MAGENTA: ColorCode = ColorCode(6);
    pub const USER_DEFINED: ColorCode = ColorCode(7);
    pub const BLACK: ColorCode = ColorCode(8);
    pub const TRANSPARENT: ColorCode = ColorCode(9);

    /// Parse one character of a `color[...]` row
    pub fn from_char(c: char) -> Option<Self> {
        c.to_digit(10).map(|d| ColorCode(d as u8))
    }

    pub fn name(&self) -> &'static str {
        match self.0 {
            0 => "white",
            1 => "green",
            2 => "blue",
            3 => "cyan",
            4 => "red",
            5 => "yellow",
            6 => "magenta",
            7 => "userdefined",
            8 => "black",
            9 => "transparent",
            _ => "unknown",
        }
    }
}

impl fmt::Display for ColorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Font attribute of a grid cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleCode {
    #[default]
    Regular,
    Italic,
    Underline,
    UnderlineItalic,
}

impl StyleCode {
    /// Parse one character of a `font[...]` row
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'R' => Some(StyleCode::Regular),
            'I' => Some(StyleCode::Italic),
            'U' => Some(StyleCode::Underline),
            'B' => Some(StyleCode::UnderlineItalic),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            StyleCode::Regular => 'R',
            StyleCode::Italic => 'I',
            StyleCode::Underline => 'U',
            StyleCode::UnderlineItalic => 'B',
        }
    }

    pub fn is_italic(&self) -> bool {
        matches!(self, StyleCode::Italic | StyleCode::UnderlineItalic)
    }

    pub fn is_underline(&self) -> bool {
        matches!(self, StyleCode::Underline | StyleCode::UnderlineItalic)
    }
}

/// One character position of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub color: ColorCode,
    pub style: StyleCode,
}

impl Cell {
    pub fn new(glyph: char, color: ColorCode, style: StyleCode) -> Self {
        Self { glyph, color, style }
    }

    pub fn is_space(&self) -> bool {
        self.glyph == ' '
    }
}

/// One vertical line of the caption grid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    /// Build a row from its three parallel grid rows
    pub fn from_parts(
        index: usize,
        text: &[char],
        colors: &[ColorCode],
        styles: &[StyleCode],
    ) -> Result<Self> {
        if text.len() != colors.len() || text.len() != styles.len() {
            return Err(Error::malformed(
                "grid",
                index,
                format!(
                    "text/color/font widths differ ({}/{}/{})",
                    text.len(),
                    colors.len(),
                    styles.len()
                ),
            ));
        }

        let cells = text
            .iter()
            .zip(colors)
            .zip(styles)
            .map(|((&glyph, &color), &style)| Cell::new(glyph, color, style))
            .collect();

        Ok(Self { cells })
    }

    /// Row with default attributes on every cell
    pub fn plain(text: &str) -> Self {
        Self {
            cells: text
                .chars()
                .map(|glyph| Cell::new(glyph, ColorCode::WHITE, StyleCode::Regular))
                .collect(),
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn text(&self) -> String {
        self.cells.iter().map(|c| c.glyph).collect()
    }

    /// Length of the longest run of consecutive spaces
    pub fn longest_space_run(&self) -> usize {
        let mut longest = 0;
        let mut current = 0;
        for cell in &self.cells {
            if cell.is_space() {
                current += 1;
                longest = longest.max(current);
            } else {
                current = 0;
            }
        }
        longest
    }
}

impl FromIterator<Cell> for Row {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

/// A sealed caption page: rows plus the time window it is shown for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub rows: Vec<Row>,
    pub window: TimeWindow,
}

/// Line terminator used in emitted blocks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// One emitted subtitle cue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputBlock {
    pub counter: Option<u64>,
    pub window: TimeWindow,
    pub lines: Vec<String>,
}

impl OutputBlock {
    /// Render the block, blank terminator line included
    pub fn render(&self, line_ending: LineEnding) -> String {
        let eol = line_ending.as_str();
        let mut out = String::new();

        if let Some(counter) = self.counter {
            out.push_str(&counter.to_string());
            out.push_str(eol);
        }
        out.push_str(&self.window.to_string());
        out.push_str(eol);
        for line in &self.lines {
            out.push_str(line);
            out.push_str(eol);
        }
        out.push_str(eol);

        out
    }
}

impl fmt::Display for OutputBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(LineEnding::Lf))
    }
}
