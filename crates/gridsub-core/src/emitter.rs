//! Block emission - composited frames into SubRip blocks on a sink
//!
//! The emitter is the only component that writes to a destination. Each
//! destination is truncated the first time it is selected during a run;
//! after that every block is an append followed by a flush.

use crate::compositor::CompositedFrame;
use crate::config::{Config, CounterMode};
use crate::encoding::CharacterEncoding;
use crate::error::{Error, Result};
use crate::sink::BlockSink;
use crate::types::{LineEnding, OutputBlock};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Writes output blocks to the current destination
#[derive(Debug)]
pub struct BlockEmitter<S: BlockSink> {
    sink: S,
    counter_mode: CounterMode,
    line_ending: LineEnding,
    encoding: CharacterEncoding,
    destination: Option<String>,
    /// Blocks written so far, per destination seen in this run
    written: HashMap<String, u64>,
}

impl<S: BlockSink> BlockEmitter<S> {
    pub fn new(sink: S, config: &Config) -> Self {
        Self {
            sink,
            counter_mode: config.counter,
            line_ending: config.line_ending,
            encoding: config.encoding,
            destination: None,
            written: HashMap::new(),
        }
    }

    /// Switch the destination, creating it empty the first time it is seen
    #[instrument(skip(self))]
    pub fn set_destination(&mut self, name: &str) -> Result<()> {
        if !self.written.contains_key(name) {
            self.sink.create(name)?;
            self.written.insert(name.to_string(), 0);
            info!(destination = name, "Destination created");
        } else {
            info!(destination = name, "Switched back to existing destination");
        }
        self.destination = Some(name.to_string());
        Ok(())
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    /// Blocks written to a destination during this run
    pub fn blocks_written(&self, name: &str) -> u64 {
        self.written.get(name).copied().unwrap_or(0)
    }

    /// Emit one frame; frames without content produce no block and no write
    pub fn emit(
        &mut self,
        frame: &CompositedFrame,
        pending_counter: Option<u64>,
    ) -> Result<Option<OutputBlock>> {
        if frame.is_empty() {
            debug!(window = %frame.window, "Frame has no content, nothing emitted");
            return Ok(None);
        }

        let name = self.destination.clone().ok_or(Error::NoDestination)?;
        let next = self.blocks_written(&name) + 1;

        let counter = match self.counter_mode {
            CounterMode::Directive => Some(pending_counter.unwrap_or(next)),
            CounterMode::Auto => Some(next),
            CounterMode::Off => None,
        };

        let block = OutputBlock {
            counter,
            window: frame.window,
            lines: frame.lines.clone(),
        };

        let rendered = block.render(self.line_ending);
        self.sink.append(&name, &self.encoding.encode(&rendered))?;
        self.written.insert(name.clone(), next);

        debug!(
            destination = %name,
            counter = ?counter,
            lines = block.lines.len(),
            "Block written"
        );

        Ok(Some(block))
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
