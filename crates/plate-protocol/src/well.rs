//! Well identifiers for the 8 x 12 plate and well-selection parsing.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

pub const ROW_COUNT: usize = 8;
pub const COLUMN_COUNT: usize = 12;
pub const WELL_COUNT: usize = ROW_COUNT * COLUMN_COUNT;
pub const ROW_LETTERS: [char; ROW_COUNT] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];

lazy_static! {
    static ref WELL_LABEL: Regex = Regex::new(r"^([A-Za-z])\s*([0-9]{1,2})$").expect("valid regex");
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WellIdError {
    #[error("empty well label")]
    Empty,
    #[error("malformed well label '{0}', expected a row letter A-H followed by a column 1-12")]
    Malformed(String),
    #[error("row '{0}' is outside A-H")]
    RowOutOfRange(char),
    #[error("column {0} is outside 1-12")]
    ColumnOutOfRange(u32),
}

/// One of the 96 wells, addressed by row letter and 1-based column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WellId {
    row: u8,
    column: u8,
}

impl WellId {
    pub fn new(row: char, column: u32) -> Result<Self, WellIdError> {
        let upper = row.to_ascii_uppercase();
        let row_index = ROW_LETTERS
            .iter()
            .position(|letter| *letter == upper)
            .ok_or(WellIdError::RowOutOfRange(row))?;
        if !(1..=COLUMN_COUNT as u32).contains(&column) {
            return Err(WellIdError::ColumnOutOfRange(column));
        }
        Ok(Self {
            row: row_index as u8,
            column: column as u8,
        })
    }

    /// Zero-based grid position; `None` outside the plate.
    pub fn from_indices(row_index: usize, column_index: usize) -> Option<Self> {
        (row_index < ROW_COUNT && column_index < COLUMN_COUNT).then(|| Self {
            row: row_index as u8,
            column: column_index as u8 + 1,
        })
    }

    pub fn parse(text: &str) -> Result<Self, WellIdError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(WellIdError::Empty);
        }
        let caps = WELL_LABEL
            .captures(text)
            .ok_or_else(|| WellIdError::Malformed(text.to_string()))?;
        let row = caps[1].chars().next().unwrap_or_default();
        let column = caps[2]
            .parse::<u32>()
            .map_err(|_| WellIdError::Malformed(text.to_string()))?;
        Self::new(row, column)
    }

    /// All wells in row-major order (A1, A2, ..., H12).
    pub fn all() -> impl Iterator<Item = WellId> {
        (0..ROW_COUNT).flat_map(|row| {
            (0..COLUMN_COUNT).filter_map(move |column| Self::from_indices(row, column))
        })
    }

    pub fn row_letter(self) -> char {
        ROW_LETTERS[self.row as usize]
    }

    pub fn row_index(self) -> usize {
        self.row as usize
    }

    pub fn column(self) -> u32 {
        self.column as u32
    }

    pub fn column_index(self) -> usize {
        self.column as usize - 1
    }

    pub fn label(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for WellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row_letter(), self.column)
    }
}

impl FromStr for WellId {
    type Err = WellIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WellId {
    type Error = WellIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WellId> for String {
    fn from(value: WellId) -> Self {
        value.label()
    }
}

/// Inclusive rectangle spanned by two corner wells, row-major.
pub fn well_range(from: WellId, to: WellId) -> Vec<WellId> {
    let (top, bottom) = ordered(from.row_index(), to.row_index());
    let (left, right) = ordered(from.column_index(), to.column_index());
    (top..=bottom)
        .flat_map(|row| (left..=right).filter_map(move |column| WellId::from_indices(row, column)))
        .collect()
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Parses "A1, A2 B1:C3" style selections. Items are separated by commas or
/// whitespace; `X:Y` is a rectangular range. Duplicates keep first position.
pub fn parse_well_selection(text: &str) -> Result<Vec<WellId>, WellIdError> {
    let mut wells: Vec<WellId> = vec![];
    for item in text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|item| !item.is_empty())
    {
        let expanded = match item.split_once(':') {
            Some((from, to)) => well_range(WellId::parse(from)?, WellId::parse(to)?),
            None => vec![WellId::parse(item)?],
        };
        for well in expanded {
            if !wells.contains(&well) {
                wells.push(well);
            }
        }
    }
    Ok(wells)
}
