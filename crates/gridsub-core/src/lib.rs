//! Gridsub Core - caption grid compositing for SubRip output
//!
//! This crate turns the grid log written by a line-21 (CEA-608) caption
//! decoder into SubRip subtitle files:
//! - Line classification of the decoder's directives and grid rows
//! - Frame accumulation of the text, color and font grids
//! - Attribute merging into `<font color>`, `<u>` and `<i>` markup
//! - Block emission with sequence counters and time windows
//! - Finite and follow-mode line sources
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Gridsub Core                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐        ┌──────────────┐                       │
//! │  │  LineSource  │──────▶│  Classifier  │                       │
//! │  └──────────────┘        └──────┬───────┘                       │
//! │                                 │                               │
//! │            ┌────────────────────┼───────────────────┐           │
//! │            │ rows               │ end of frame      │ timing,   │
//! │     ┌──────┴───────┐     ┌──────┴───────┐           │ counter,  │
//! │     │    Frame     │────▶│    Frame     │           │ filename  │
//! │     │ Accumulator  │     │  Compositor  │           │           │
//! │     └──────────────┘     └──────┬───────┘           │           │
//! │                                 │ merged lines      │           │
//! │                          ┌──────┴───────┐           │           │
//! │                          │    Block     │◀──────────┘           │
//! │                          │   Emitter    │                       │
//! │                          └──────┬───────┘                       │
//! │                          ┌──────┴───────┐                       │
//! │                          │  BlockSink   │                       │
//! │                          └──────────────┘                       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use gridsub_core::{Config, MemorySink, Processor};
//!
//! let mut processor = Processor::new(MemorySink::new(), &Config::default()).unwrap();
//! for line in [
//!     "filename:show.srt",
//!     "start_time-00:00:01,000\tend_time-00:00:02,500",
//!     "text[0]:HELLO                           ",
//!     "color[0]:00000000000000000000000000000000",
//!     "font[0]:IIIIIRRRRRRRRRRRRRRRRRRRRRRRRRRR",
//!     "***END OF FRAME***",
//! ] {
//!     processor.process_line(line.as_bytes()).unwrap();
//! }
//!
//! let (sink, _stats) = processor.finish();
//! assert_eq!(
//!     sink.text("show.srt").unwrap(),
//!     "1\n00:00:01,000 --> 00:00:02,500\n<i>HELLO</i>\n\n"
//! );
//! ```

pub mod accumulator;
pub mod classifier;
pub mod color;
pub mod compositor;
pub mod config;
pub mod emitter;
pub mod encoding;
pub mod error;
pub mod merge;
pub mod processor;
pub mod sink;
pub mod source;
pub mod timing;
pub mod types;

pub use accumulator::{FrameAccumulator, FrameState, Grids};
pub use classifier::{classify, LineKind, RowKind};
pub use color::{ColorMarkup, ColorTable};
pub use compositor::{CompositedFrame, FrameCompositor};
pub use config::{Config, CounterMode};
pub use emitter::BlockEmitter;
pub use encoding::CharacterEncoding;
pub use error::{Error, Result};
pub use merge::{is_blank, merge_row, MergeOptions, MergePolicy};
pub use processor::{Processor, ProcessorStats};
pub use sink::{BlockSink, FileSink, MemorySink};
pub use source::{run, LineSource, ReaderSource};
#[cfg(feature = "tail")]
pub use source::{StartPosition, TailSource};
pub use timing::{TimeWindow, Timestamp};
pub use types::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the library version at startup
pub fn init() {
    tracing::info!(version = VERSION, "Gridsub Core initialized");
}
