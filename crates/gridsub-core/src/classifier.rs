//! Line classification for the decoder's grid log
//!
//! Each log line is matched against a fixed table of markers. The first
//! marker found in the line decides its kind:
//!
//! | marker               | kind                      |
//! |----------------------|---------------------------|
//! | `filename:`          | [`LineKind::Filename`]    |
//! | `srt_counter-`       | [`LineKind::Counter`]     |
//! | `start_time`         | [`LineKind::Timing`]      |
//! | `***END OF FRAME***` | [`LineKind::EndOfFrame`]  |
//! | `text[`              | [`LineKind::Text`]        |
//! | `color[`             | [`LineKind::Color`]       |
//! | `font[`              | [`LineKind::Style`]       |
//!
//! Anything else is [`LineKind::Unclassified`] and is ignored by the
//! processor.

use crate::error::{Error, Result};
use nom::{
    bytes::complete::tag,
    character::complete::{char, digit1},
    combinator::{map_res, rest},
    sequence::delimited,
    IResult, Parser,
};

pub const FILENAME_MARKER: &str = "filename:";
pub const COUNTER_MARKER: &str = "srt_counter-";
pub const TIMING_MARKER: &str = "start_time";
pub const END_OF_FRAME_MARKER: &str = "***END OF FRAME***";

/// Kind of grid row carried by a row directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKind {
    Text,
    Color,
    Style,
}

impl RowKind {
    /// Directive keyword as written in the log
    pub fn keyword(&self) -> &'static str {
        match self {
            RowKind::Text => "text",
            RowKind::Color => "color",
            RowKind::Style => "font",
        }
    }
}

/// A classified log line, borrowing from the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Switch to a new destination
    Filename(&'a str),
    /// Sequence counter for the next block; `None` if the value is unreadable
    Counter(Option<u64>),
    /// Timing directive, left unparsed
    Timing(&'a str),
    EndOfFrame,
    Text { index: usize, payload: &'a str },
    Color { index: usize, payload: &'a str },
    Style { index: usize, payload: &'a str },
    Unclassified,
}

/// Classify one line (without its terminator)
///
/// Row directives that carry a marker but do not follow
/// `kind[<n>]:<payload>` are reported as `Error::MalformedRow`.
pub fn classify(line: &str) -> Result<LineKind<'_>> {
    if let Some(at) = line.find(FILENAME_MARKER) {
        let name = line[at + FILENAME_MARKER.len()..].trim();
        return Ok(LineKind::Filename(name));
    }

    if let Some(at) = line.find(COUNTER_MARKER) {
        let value = line[at + COUNTER_MARKER.len()..].trim();
        return Ok(LineKind::Counter(value.parse().ok()));
    }

    if line.contains(TIMING_MARKER) {
        return Ok(LineKind::Timing(line));
    }

    if line.contains(END_OF_FRAME_MARKER) {
        return Ok(LineKind::EndOfFrame);
    }

    for kind in [RowKind::Text, RowKind::Color, RowKind::Style] {
        let marker = kind.keyword();
        let Some(at) = find_row_marker(line, marker) else {
            continue;
        };
        let (index, payload) = parse_row_directive(&line[at..], kind)?;
        return Ok(match kind {
            RowKind::Text => LineKind::Text { index, payload },
            RowKind::Color => LineKind::Color { index, payload },
            RowKind::Style => LineKind::Style { index, payload },
        });
    }

    Ok(LineKind::Unclassified)
}

/// Offset of `<keyword>[` in the line
fn find_row_marker(line: &str, keyword: &str) -> Option<usize> {
    line.match_indices(keyword)
        .map(|(at, _)| at)
        .find(|&at| line[at + keyword.len()..].starts_with('['))
}

/// Parse `kind[<n>]:<payload>` starting at the keyword
pub fn parse_row_directive(input: &str, kind: RowKind) -> Result<(usize, &str)> {
    row_directive(kind.keyword())
        .parse(input)
        .map(|(_, parsed)| parsed)
        .map_err(|_| {
            let head: String = input.chars().take(24).collect();
            Error::malformed(kind.keyword(), 0, format!("bad row directive {head:?}"))
        })
}

fn row_index(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse::<usize>).parse(input)
}

fn row_directive<'a>(
    keyword: &'static str,
) -> impl Parser<&'a str, Output = (usize, &'a str), Error = nom::error::Error<&'a str>> {
    (
        tag(keyword),
        delimited(char('['), row_index, char(']')),
        char(':'),
        rest,
    )
        .map(|(_, index, _, payload)| (index, payload))
}
