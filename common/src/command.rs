//! Light command grammar.
//!
//! A command is a comma separated list of `index:RRGGBB` entries, for example
//! `"0:FF0000,3:00ff00"`. Scanning stops at the end of the text or at the
//! first NUL. Text following the colour of an entry up to the next comma is
//! skipped, and anything after the last entry is ignored.

use alloc::vec::Vec;
use core::fmt::{self, Display};

use crate::{Rgb, LED_COUNT, MAX_COMMAND_LEN};

/// Index strings this long or longer are rejected before being parsed.
const MAX_INDEX_DIGITS: usize = 10;
const HEX_DIGITS: usize = 6;

/// One parsed `index:RRGGBB` entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LightAssignment {
    pub index: usize,
    pub color: Rgb,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// The command is longer than [`MAX_COMMAND_LEN`]
    TooLong { len: usize },
    /// The bytes are not valid text
    InvalidUtf8,
    /// An entry has no `:` separator
    MissingColon,
    /// The index part is too long to be a light number
    IndexTooLong,
    /// The index is not a number in `0..LED_COUNT`
    IndexOutOfRange,
    /// Fewer than six hex digits follow the colon
    InvalidHexDigit,
}

impl ParseError {
    /// Whether the command was well formed but named a light the board does
    /// not have.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, ParseError::IndexOutOfRange)
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::TooLong { len } => {
                write!(f, "command is {len} bytes, max {MAX_COMMAND_LEN}")
            }
            ParseError::InvalidUtf8 => write!(f, "command is not valid UTF-8"),
            ParseError::MissingColon => write!(f, "colon not found"),
            ParseError::IndexTooLong => write!(f, "LED number string too long"),
            ParseError::IndexOutOfRange => {
                write!(f, "LED number out of range 0..{LED_COUNT}")
            }
            ParseError::InvalidHexDigit => write!(f, "RGB value parsing failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}

/// Lazily walks the entries of a command.
///
/// Yields at most one error, after which the iterator is exhausted.
#[derive(Clone, Debug)]
pub struct Commands<'a> {
    rest: &'a str,
    pending: Option<ParseError>,
    done: bool,
}

impl<'a> Commands<'a> {
    pub fn new(text: &'a str) -> Self {
        let pending = (text.len() > MAX_COMMAND_LEN).then_some(ParseError::TooLong {
            len: text.len(),
        });
        let text = text.split('\0').next().unwrap_or_default();

        Self {
            rest: text,
            pending,
            done: false,
        }
    }

    fn next_entry(&mut self) -> Result<LightAssignment, ParseError> {
        let colon = self.rest.find(':').ok_or(ParseError::MissingColon)?;

        let index = parse_index(&self.rest[..colon])?;

        let hex_start = colon + 1;
        let hex_end = hex_start + HEX_DIGITS;
        let color = self
            .rest
            .get(hex_start..hex_end)
            .ok_or(ParseError::InvalidHexDigit)
            .and_then(parse_hex_color)?;

        // Skip ahead to the next entry, if any
        let after_color = &self.rest[hex_end..];
        match after_color.find(',') {
            Some(comma) => self.rest = &after_color[comma + 1..],
            None => self.done = true,
        }

        Ok(LightAssignment { index, color })
    }
}

impl Iterator for Commands<'_> {
    type Item = Result<LightAssignment, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(error) = self.pending.take() {
            self.done = true;
            return Some(Err(error));
        }
        if self.done || self.rest.is_empty() {
            return None;
        }

        let entry = self.next_entry();
        if entry.is_err() {
            self.done = true;
        }
        Some(entry)
    }
}

/// Parse a whole command. Either every entry is valid and returned in order,
/// or the first error is returned.
pub fn parse(text: &str) -> Result<Vec<LightAssignment>, ParseError> {
    Commands::new(text).collect()
}

fn parse_index(digits: &str) -> Result<usize, ParseError> {
    if digits.len() >= MAX_INDEX_DIGITS {
        return Err(ParseError::IndexTooLong);
    }

    let index: i64 = digits.parse().map_err(|_| ParseError::IndexOutOfRange)?;
    usize::try_from(index)
        .ok()
        .filter(|index| *index < LED_COUNT)
        .ok_or(ParseError::IndexOutOfRange)
}

fn parse_hex_color(hex: &str) -> Result<Rgb, ParseError> {
    // from_str_radix alone would also take a leading sign
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ParseError::InvalidHexDigit);
    }

    u32::from_str_radix(hex, 16)
        .map(Rgb::from_u24)
        .map_err(|_| ParseError::InvalidHexDigit)
}
