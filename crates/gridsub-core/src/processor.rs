//! Line dispatch - drives accumulation, compositing and emission
//!
//! The processor is the synchronous heart of a run. Every raw log line goes
//! through [`Processor::process_line`]; problems with a single line are
//! logged and counted, and only sink failures stop the run.

use crate::accumulator::FrameAccumulator;
use crate::classifier::{classify, LineKind};
use crate::compositor::FrameCompositor;
use crate::config::Config;
use crate::emitter::BlockEmitter;
use crate::encoding::CharacterEncoding;
use crate::error::{Error, Result};
use crate::sink::BlockSink;
use crate::timing::TimeWindow;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Counters collected over a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorStats {
    pub lines: u64,
    pub frames: u64,
    pub blocks_written: u64,
    pub empty_frames: u64,
    /// Row directives refused by the accumulator
    pub rows_rejected: u64,
    /// Rows lost while compositing because a grid slot was missing
    pub rows_dropped: u64,
    pub lines_ignored: u64,
    pub timing_errors: u64,
    pub frames_without_destination: u64,
    pub destinations: Vec<String>,
}

/// Processes decoder log lines into subtitle blocks
#[derive(Debug)]
pub struct Processor<S: BlockSink> {
    encoding: CharacterEncoding,
    accumulator: FrameAccumulator,
    compositor: FrameCompositor,
    emitter: BlockEmitter<S>,
    pending_window: Option<TimeWindow>,
    pending_counter: Option<u64>,
    stats: ProcessorStats,
}

impl<S: BlockSink> Processor<S> {
    /// Create a processor; the configured default destination, if any, is
    /// created immediately
    pub fn new(sink: S, config: &Config) -> Result<Self> {
        config.validate()?;

        let mut processor = Self {
            encoding: config.encoding,
            accumulator: FrameAccumulator::new(config.grid_width),
            compositor: FrameCompositor::new(config.merge_options()),
            emitter: BlockEmitter::new(sink, config),
            pending_window: None,
            pending_counter: None,
            stats: ProcessorStats::default(),
        };

        if let Some(name) = &config.default_destination {
            processor.switch_destination(name)?;
        }

        Ok(processor)
    }

    /// Decode, classify and dispatch one raw line
    pub fn process_line(&mut self, raw: &[u8]) -> Result<()> {
        self.stats.lines += 1;

        let decoded = self.encoding.decode(raw);
        let line = decoded.trim_end_matches(['\r', '\n']);

        match self.dispatch(line) {
            Ok(()) => Ok(()),
            Err(e) if e.is_recoverable() => {
                warn!(line = self.stats.lines, error = %e, code = e.error_code(), "Skipping line");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn dispatch(&mut self, line: &str) -> Result<()> {
        let kind = match classify(line) {
            Ok(kind) => kind,
            Err(e) => {
                self.stats.rows_rejected += 1;
                return Err(e);
            }
        };

        match kind {
            LineKind::Filename(name) => self.switch_destination(name),
            LineKind::Counter(value) => {
                if value.is_none() {
                    warn!(line, "Unreadable sequence counter");
                }
                self.pending_counter = value;
                Ok(())
            }
            LineKind::Timing(directive) => {
                self.set_pending_window(directive);
                Ok(())
            }
            LineKind::EndOfFrame => self.end_frame(),
            LineKind::Text { index, payload } => {
                let result = self.accumulator.append_text_row(index, payload);
                self.count_rejected(result)
            }
            LineKind::Color { index, payload } => {
                let result = self.accumulator.append_color_row(index, payload);
                self.count_rejected(result)
            }
            LineKind::Style { index, payload } => {
                let result = self.accumulator.append_style_row(index, payload);
                self.count_rejected(result)
            }
            LineKind::Unclassified => {
                self.stats.lines_ignored += 1;
                Ok(())
            }
        }
    }

    fn count_rejected(&mut self, result: Result<()>) -> Result<()> {
        if result.is_err() {
            self.stats.rows_rejected += 1;
        }
        result
    }

    fn switch_destination(&mut self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::malformed("filename", 0, "empty destination name"));
        }
        self.emitter.set_destination(name)?;
        if !self.stats.destinations.iter().any(|d| d == name) {
            self.stats.destinations.push(name.to_string());
        }
        Ok(())
    }

    /// Parse a timing directive; the latest directive wins
    fn set_pending_window(&mut self, directive: &str) {
        let window = match TimeWindow::parse_directive(directive) {
            Ok(window) => window,
            Err(e) => {
                self.stats.timing_errors += 1;
                warn!(error = %e, "Timing directive unreadable, using unknown window");
                TimeWindow::UNKNOWN
            }
        };

        if let Some(previous) = self.pending_window.replace(window) {
            debug!(%previous, replacement = %window, "Pending time window overwritten");
        }
    }

    /// Seal, composite and emit the current frame, then reset for the next
    fn end_frame(&mut self) -> Result<()> {
        self.stats.frames += 1;

        let grids = self.accumulator.seal();
        let window = self.pending_window.take().unwrap_or(TimeWindow::UNKNOWN);
        let counter = self.pending_counter.take();
        self.accumulator.reset();

        let frame = self.compositor.composite(&grids, window);
        self.stats.rows_dropped += frame.dropped_rows as u64;

        match self.emitter.emit(&frame, counter) {
            Ok(Some(_)) => {
                self.stats.blocks_written += 1;
                Ok(())
            }
            Ok(None) => {
                self.stats.empty_frames += 1;
                Ok(())
            }
            Err(Error::NoDestination) => {
                self.stats.frames_without_destination += 1;
                Err(Error::NoDestination)
            }
            Err(e) => Err(e),
        }
    }

    pub fn stats(&self) -> &ProcessorStats {
        &self.stats
    }

    pub fn emitter(&self) -> &BlockEmitter<S> {
        &self.emitter
    }

    /// End the run. A frame still being accumulated has no boundary marker
    /// and is discarded.
    #[instrument(skip(self))]
    pub fn finish(self) -> (S, ProcessorStats) {
        if !self.accumulator.is_empty() {
            warn!("Input ended inside a frame, partial frame discarded");
        }

        info!(
            lines = self.stats.lines,
            frames = self.stats.frames,
            blocks = self.stats.blocks_written,
            rejected = self.stats.rows_rejected,
            dropped = self.stats.rows_dropped,
            "Run finished"
        );

        (self.emitter.into_sink(), self.stats)
    }
}
