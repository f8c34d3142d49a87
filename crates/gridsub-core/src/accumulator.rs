//! Frame accumulation - collects grid rows between two frame boundaries
//!
//! The three grids fill independently as `text[..]`, `color[..]` and
//! `font[..]` lines arrive. A row that fails validation leaves a hole in its
//! grid so that the rows after it stay aligned with their siblings.

use crate::error::{Error, Result};
use crate::types::{ColorCode, StyleCode};
use std::fmt;

/// Lifecycle of the frame under construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameState {
    Empty,
    Accumulating,
    Sealed,
}

impl fmt::Display for FrameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameState::Empty => write!(f, "empty"),
            FrameState::Accumulating => write!(f, "accumulating"),
            FrameState::Sealed => write!(f, "sealed"),
        }
    }
}

/// The three parallel grids of one frame; `None` marks a dropped row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grids {
    pub text: Vec<Option<Vec<char>>>,
    pub colors: Vec<Option<Vec<ColorCode>>>,
    pub styles: Vec<Option<Vec<StyleCode>>>,
}

impl Grids {
    /// Number of row slots in the tallest grid
    pub fn height(&self) -> usize {
        self.text
            .len()
            .max(self.colors.len())
            .max(self.styles.len())
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.colors.is_empty() && self.styles.is_empty()
    }
}

/// Builds up the grids of the current frame
#[derive(Debug)]
pub struct FrameAccumulator {
    grid_width: usize,
    state: FrameState,
    grids: Grids,
    /// Set by the first append, cleared only by `reset`
    appended: bool,
}

impl FrameAccumulator {
    pub fn new(grid_width: usize) -> Self {
        Self {
            grid_width,
            state: FrameState::Empty,
            grids: Grids::default(),
            appended: false,
        }
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    /// True if nothing was appended since the last reset
    pub fn is_empty(&self) -> bool {
        !self.appended
    }

    pub fn reset(&mut self) {
        self.grids = Grids::default();
        self.state = FrameState::Empty;
        self.appended = false;
    }

    /// Hand off the grids; the accumulator stays sealed until reset
    pub fn seal(&mut self) -> Grids {
        self.state = FrameState::Sealed;
        std::mem::take(&mut self.grids)
    }

    pub fn append_text_row(&mut self, index: usize, row: &str) -> Result<()> {
        self.begin_append()?;
        let parsed = self.parse_row("text", index, row, Some);
        push_slot(&mut self.grids.text, parsed)
    }

    pub fn append_color_row(&mut self, index: usize, row: &str) -> Result<()> {
        self.begin_append()?;
        let parsed = self.parse_row("color", index, row, ColorCode::from_char);
        push_slot(&mut self.grids.colors, parsed)
    }

    pub fn append_style_row(&mut self, index: usize, row: &str) -> Result<()> {
        self.begin_append()?;
        let parsed = self.parse_row("font", index, row, StyleCode::from_char);
        push_slot(&mut self.grids.styles, parsed)
    }

    fn begin_append(&mut self) -> Result<()> {
        match self.state {
            FrameState::Sealed => {
                self.reset();
                Err(Error::FrameSealed)
            }
            FrameState::Empty => {
                self.state = FrameState::Accumulating;
                self.appended = true;
                Ok(())
            }
            FrameState::Accumulating => Ok(()),
        }
    }

    fn parse_row<T>(
        &self,
        kind: &'static str,
        index: usize,
        row: &str,
        parse: impl Fn(char) -> Option<T>,
    ) -> Result<Vec<T>> {
        let width = row.chars().count();
        if width != self.grid_width {
            return Err(Error::malformed(
                kind,
                index,
                format!("width {width}, expected {}", self.grid_width),
            ));
        }

        row.chars()
            .enumerate()
            .map(|(column, c)| {
                parse(c).ok_or_else(|| {
                    Error::malformed(kind, index, format!("bad code {c:?} at column {column}"))
                })
            })
            .collect()
    }
}

/// Store a parsed row, or a hole if it was rejected
fn push_slot<T>(grid: &mut Vec<Option<T>>, parsed: Result<T>) -> Result<()> {
    match parsed {
        Ok(row) => {
            grid.push(Some(row));
            Ok(())
        }
        Err(e) => {
            grid.push(None);
            Err(e)
        }
    }
}
