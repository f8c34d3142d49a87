//! Caption timing - SubRip timestamps and time windows
//!
//! Timing directives come from the decoder log as two hyphen-labelled
//! fields separated by a tab:
//!
//! ```text
//! start_time-00:00:01,000<TAB>end_time-00:00:03,500
//! ```
//!
//! # Example
//!
//! ```rust
//! use gridsub_core::timing::TimeWindow;
//!
//! let window = TimeWindow::parse_directive("X - 00:00:01,000\tY - 00:00:03,500").unwrap();
//! assert_eq!(window.to_string(), "00:00:01,000 --> 00:00:03,500");
//! ```

use crate::error::{Error, Result};
use nom::{
    bytes::complete::{take_while1, take_while_m_n},
    character::complete::{char, one_of},
    combinator::{all_consuming, map_res},
    IResult, Parser,
};
use serde::{Deserialize, Serialize};
use std::fmt;

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// A caption timestamp in milliseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    pub fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Parse `HH:MM:SS,mmm` (a `.` separator is accepted as well)
    pub fn parse(input: &str) -> Result<Self> {
        all_consuming(timestamp)
            .parse(input)
            .map(|(_, ts)| ts)
            .map_err(|_| Error::TimingParse(format!("invalid timestamp: {input:?}")))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.0 / MS_PER_HOUR;
        let minutes = (self.0 % MS_PER_HOUR) / MS_PER_MINUTE;
        let seconds = (self.0 % MS_PER_MINUTE) / MS_PER_SECOND;
        let millis = self.0 % MS_PER_SECOND;
        write!(f, "{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
    }
}

fn two_digits(input: &str) -> IResult<&str, u64> {
    map_res(
        take_while_m_n(2, 2, |c: char| c.is_ascii_digit()),
        str::parse::<u64>,
    )
    .parse(input)
}

fn three_digits(input: &str) -> IResult<&str, u64> {
    map_res(
        take_while_m_n(3, 3, |c: char| c.is_ascii_digit()),
        str::parse::<u64>,
    )
    .parse(input)
}

fn hours(input: &str) -> IResult<&str, u64> {
    map_res(take_while1(|c: char| c.is_ascii_digit()), str::parse::<u64>).parse(input)
}

fn timestamp(input: &str) -> IResult<&str, Timestamp> {
    let (rest, (h, _, m, _, s, _, ms)) = (
        hours,
        char(':'),
        two_digits,
        char(':'),
        two_digits,
        one_of(",."),
        three_digits,
    )
        .parse(input)?;

    let total = h
        .checked_mul(MS_PER_HOUR)
        .and_then(|t| t.checked_add(m * MS_PER_MINUTE + s * MS_PER_SECOND + ms));

    match total {
        Some(ms) if m < 60 && s < 60 => Ok((rest, Timestamp(ms))),
        _ => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        ))),
    }
}

/// Start/end pair of a caption frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeWindow {
    /// Sentinel window used when no usable timing directive was seen
    pub const UNKNOWN: TimeWindow = TimeWindow {
        start: Timestamp::ZERO,
        end: Timestamp::ZERO,
    };

    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Parse a `<label> - <start>\t<label> - <end>` directive
    pub fn parse_directive(line: &str) -> Result<Self> {
        let (first, second) = line
            .split_once('\t')
            .ok_or_else(|| Error::TimingParse(format!("missing tab separator: {line:?}")))?;

        Ok(Self {
            start: Timestamp::parse(labelled_value(first))?,
            end: Timestamp::parse(labelled_value(second))?,
        })
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }

    /// Duration of the window (zero if end precedes start)
    pub fn duration_ms(&self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} --> {}", self.start, self.end)
    }
}

/// Value part of a `label - value` field
fn labelled_value(field: &str) -> &str {
    field
        .rsplit_once('-')
        .map_or(field, |(_, value)| value)
        .trim()
}
