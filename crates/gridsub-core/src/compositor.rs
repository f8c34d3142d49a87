//! Frame compositing - sealed grids into ordered markup lines

use crate::accumulator::Grids;
use crate::error::{Error, Result};
use crate::merge::{merge_row, MergeOptions};
use crate::timing::TimeWindow;
use crate::types::{Frame, Row};
use tracing::{debug, warn};

/// Markup lines of one frame, ready for emission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositedFrame {
    pub window: TimeWindow,
    pub lines: Vec<String>,
    /// Rows dropped because one of their grids was missing or malformed
    pub dropped_rows: usize,
}

impl CompositedFrame {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Turns sealed grids into frames and frames into markup
#[derive(Debug, Clone, Default)]
pub struct FrameCompositor {
    options: MergeOptions,
}

impl FrameCompositor {
    pub fn new(options: MergeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Assemble rows from the three grids; returns the frame and the number
    /// of rows that could not be assembled
    pub fn assemble(&self, grids: &Grids, window: TimeWindow) -> (Frame, usize) {
        let mut rows = Vec::with_capacity(grids.height());
        let mut dropped = 0;

        for index in 0..grids.height() {
            match assemble_row(grids, index) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    warn!(error = %e, "Dropping row");
                    dropped += 1;
                }
            }
        }

        (Frame { rows, window }, dropped)
    }

    /// Merge every row of a frame, omitting blank rows
    pub fn composite_frame(&self, frame: &Frame) -> Vec<String> {
        frame
            .rows
            .iter()
            .filter_map(|row| merge_row(row, &self.options))
            .collect()
    }

    /// Assemble and merge a sealed frame in one step
    pub fn composite(&self, grids: &Grids, window: TimeWindow) -> CompositedFrame {
        let (frame, dropped_rows) = self.assemble(grids, window);
        let lines = self.composite_frame(&frame);

        debug!(
            rows = frame.rows.len(),
            lines = lines.len(),
            dropped = dropped_rows,
            "Frame composited"
        );

        CompositedFrame {
            window,
            lines,
            dropped_rows,
        }
    }
}

fn assemble_row(grids: &Grids, index: usize) -> Result<Row> {
    let text = slot(&grids.text, "text", index)?;
    let colors = slot(&grids.colors, "color", index)?;
    let styles = slot(&grids.styles, "font", index)?;
    Row::from_parts(index, text, colors, styles)
}

fn slot<'a, T>(grid: &'a [Option<Vec<T>>], kind: &'static str, index: usize) -> Result<&'a [T]> {
    match grid.get(index) {
        Some(Some(row)) => Ok(row.as_slice()),
        Some(None) => Err(Error::malformed(kind, index, "row was rejected")),
        None => Err(Error::malformed(kind, index, "row is missing")),
    }
}
