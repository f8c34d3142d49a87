//! Row merging - one grid row plus its color and font runs into markup
//!
//! Markup is produced in a single left-to-right pass. Three tag layers are
//! tracked, outermost first: color, underline, italic. When a layer changes
//! at a cell, every open layer from the innermost out to the changed one is
//! closed and then reopened as needed, so tags are always properly nested
//! and every row closes what it opened.
//!
//! # Example
//!
//! ```rust
//! use gridsub_core::merge::{merge_row, MergeOptions};
//! use gridsub_core::{Cell, ColorCode, Row, StyleCode};
//!
//! let row: Row = "HI  "
//!     .chars()
//!     .map(|c| Cell::new(c, ColorCode::WHITE, StyleCode::Italic))
//!     .collect();
//! assert_eq!(merge_row(&row, &MergeOptions::default()).as_deref(), Some("<i>HI</i>"));
//! ```

use crate::color::ColorTable;
use crate::types::{Cell, Row};
use serde::{Deserialize, Serialize};

/// How color and style annotations combine on one row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Style markup wins when a row has both; color markup is the fallback
    #[default]
    StylePrecedence,
    /// Keep both, color outermost
    Nested,
}

/// Options for [`merge_row`]
#[derive(Debug, Clone)]
pub struct MergeOptions {
    pub blank_run_threshold: usize,
    /// `None` disables color markup
    pub colors: Option<ColorTable>,
    pub underline: bool,
    pub policy: MergePolicy,
    pub trim_leading: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            blank_run_threshold: 32,
            colors: Some(ColorTable::default()),
            underline: false,
            policy: MergePolicy::default(),
            trim_leading: false,
        }
    }
}

type Tag<'a> = (&'a str, &'a str);

const ITALIC: Tag<'static> = ("<i>", "</i>");
const UNDERLINE: Tag<'static> = ("<u>", "</u>");
const LAYERS: usize = 3;

/// Which layers take part in one rendering pass
struct Layers<'a> {
    colors: Option<&'a ColorTable>,
    underline: bool,
    italic: bool,
}

impl<'a> Layers<'a> {
    fn desired(&self, cell: &Cell) -> [Option<Tag<'a>>; LAYERS] {
        [
            self.colors
                .and_then(|table| table.markup(cell.color))
                .map(|m| (m.open.as_str(), m.close.as_str())),
            (self.underline && cell.style.is_underline()).then_some(UNDERLINE),
            (self.italic && cell.style.is_italic()).then_some(ITALIC),
        ]
    }
}

struct Rendered {
    text: String,
    tagged: bool,
}

fn render(cells: &[Cell], layers: &Layers<'_>) -> Rendered {
    let mut text = String::with_capacity(cells.len() * 2);
    let mut open: [Option<Tag<'_>>; LAYERS] = [None; LAYERS];
    let mut tagged = false;

    for cell in cells {
        let desired = layers.desired(cell);

        if let Some(first) = (0..LAYERS).find(|&i| open[i] != desired[i]) {
            for slot in open[first..].iter_mut().rev() {
                if let Some((_, close)) = slot.take() {
                    text.push_str(close);
                }
            }
            for i in first..LAYERS {
                if let Some((open_tag, _)) = desired[i] {
                    text.push_str(open_tag);
                    tagged = true;
                }
                open[i] = desired[i];
            }
        }

        text.push(cell.glyph);
    }

    for (_, close) in open.iter().rev().flatten() {
        text.push_str(close);
    }

    Rendered { text, tagged }
}

/// True if the row is padding only and must not be emitted
pub fn is_blank(row: &Row, blank_run_threshold: usize) -> bool {
    row.is_empty()
        || row.longest_space_run() >= blank_run_threshold
        || row.cells().iter().all(|c| c.glyph.is_whitespace())
}

/// Cells that are rendered: trailing padding always goes, leading padding
/// only when asked to
fn visible_cells(row: &Row, trim_leading: bool) -> &[Cell] {
    let cells = row.cells();
    let end = cells
        .iter()
        .rposition(|c| !c.is_space())
        .map_or(0, |i| i + 1);
    let start = if trim_leading {
        cells[..end]
            .iter()
            .position(|c| !c.is_space())
            .unwrap_or(end)
    } else {
        0
    };
    &cells[start..end]
}

/// Merge one row into a markup line; `None` if the row is blank
pub fn merge_row(row: &Row, options: &MergeOptions) -> Option<String> {
    if is_blank(row, options.blank_run_threshold) {
        return None;
    }

    let cells = visible_cells(row, options.trim_leading);
    if cells.is_empty() {
        return None;
    }

    let colors = options.colors.as_ref();
    let line = match options.policy {
        MergePolicy::Nested => {
            let layers = Layers {
                colors,
                underline: options.underline,
                italic: true,
            };
            render(cells, &layers).text
        }
        MergePolicy::StylePrecedence => {
            let styled = render(
                cells,
                &Layers {
                    colors: None,
                    underline: options.underline,
                    italic: true,
                },
            );
            if styled.tagged {
                styled.text
            } else {
                // Without any tag the color pass doubles as the plain text
                render(
                    cells,
                    &Layers {
                        colors,
                        underline: false,
                        italic: false,
                    },
                )
                .text
            }
        }
    };

    Some(line)
}
