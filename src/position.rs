//! Slot codes: named layer edges and grid cells
//!
//! A slot is either one of the named edge slots (`top`, `front-left`,
//! `front-right`) or a grid cell written `top-<column letter><row>`, e.g.
//! `top-a1`. Columns are lettered from `a`, rows are numbered from 1, and
//! cells are visited column by column: `a1, a2, .., a<rows>, b1, ..`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DiagramError;

const CELL_PREFIX: &str = "top-";

/// Columns are lettered, so a grid is at most `a..=z` wide
pub const MAX_COLUMNS: u8 = 26;

/// A cell in a layer grid.
///
/// Always holds a column in `a..=z` and a row of at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GridCell {
    /// Zero-based column index (`a` = 0)
    column: u8,
    /// One-based row number
    row: u8,
}

impl GridCell {
    /// The first cell of every grid, `top-a1`
    pub const FIRST: GridCell = GridCell { column: 0, row: 1 };

    /// Build a cell from a zero-based column and one-based row
    pub fn new(column: u8, row: u8) -> Result<Self, DiagramError> {
        if column >= MAX_COLUMNS || row == 0 {
            return Err(DiagramError::invalid_position(format!(
                "column {column}, row {row}"
            )));
        }
        Ok(Self { column, row })
    }

    pub fn column(&self) -> u8 {
        self.column
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    /// Decode a `top-<letter><row>` code
    pub fn decode(code: &str) -> Result<Self, DiagramError> {
        let invalid = || DiagramError::invalid_position(code);

        let rest = code.strip_prefix(CELL_PREFIX).ok_or_else(invalid)?;
        let mut chars = rest.chars();
        let letter = chars.next().filter(|c| c.is_ascii_lowercase()).ok_or_else(invalid)?;
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let row: u8 = digits.parse().map_err(|_| invalid())?;
        if row == 0 {
            return Err(invalid());
        }

        Ok(Self {
            column: letter as u8 - b'a',
            row,
        })
    }

    /// Encode this cell as its `top-<letter><row>` code
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Whether this cell lies inside a `columns` x `rows` grid
    pub fn is_within_bounds(&self, columns: u8, rows: u8) -> bool {
        self.column < columns && self.row >= 1 && self.row <= rows
    }

    /// The next cell in visiting order.
    ///
    /// Rows cycle `1..=rows`; the column advances on wraparound. Fails with
    /// `LayerFull` when the advanced column would leave the grid.
    pub fn next(&self, columns: u8, rows: u8) -> Result<Self, DiagramError> {
        if self.row < rows {
            return Ok(Self {
                column: self.column,
                row: self.row + 1,
            });
        }
        let column = self.column + 1;
        if column >= columns.min(MAX_COLUMNS) {
            return Err(DiagramError::layer_full(columns, rows));
        }
        Ok(Self { column, row: 1 })
    }

    /// Every cell of a `columns` x `rows` grid in visiting order
    pub fn all(columns: u8, rows: u8) -> impl Iterator<Item = GridCell> {
        (0..columns.min(MAX_COLUMNS))
            .flat_map(move |column| (1..=rows).map(move |row| GridCell { column, row }))
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", CELL_PREFIX, (b'a' + self.column) as char, self.row)
    }
}

/// Encode a zero-based column and one-based row as a cell code
pub fn encode(column: u8, row: u8) -> Result<String, DiagramError> {
    Ok(GridCell::new(column, row)?.encode())
}

/// Decode a cell code into its grid cell
pub fn decode(code: &str) -> Result<GridCell, DiagramError> {
    GridCell::decode(code)
}

/// Whether a cell code lies inside a `columns` x `rows` grid.
///
/// Undecodable codes are never in bounds.
pub fn is_within_bounds(code: &str, columns: u8, rows: u8) -> bool {
    GridCell::decode(code)
        .map(|cell| cell.is_within_bounds(columns, rows))
        .unwrap_or(false)
}

/// The code of the cell following `code` in visiting order
pub fn next_position(code: &str, columns: u8, rows: u8) -> Result<String, DiagramError> {
    Ok(GridCell::decode(code)?.next(columns, rows)?.encode())
}

/// Where a shape sits relative to the shape it references
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Slot {
    Top,
    FrontLeft,
    FrontRight,
    Cell(GridCell),
}

impl Slot {
    /// Named slots a layer may take
    pub const LAYER_SLOTS: [Slot; 3] = [Slot::Top, Slot::FrontLeft, Slot::FrontRight];

    /// Parse a slot code
    pub fn parse(code: &str) -> Result<Self, DiagramError> {
        match code {
            "top" => Ok(Slot::Top),
            "front-left" => Ok(Slot::FrontLeft),
            "front-right" => Ok(Slot::FrontRight),
            other => GridCell::decode(other).map(Slot::Cell),
        }
    }

    /// The slot code as written in a scene
    pub fn code(&self) -> String {
        self.to_string()
    }

    pub fn is_side(&self) -> bool {
        matches!(self, Slot::FrontLeft | Slot::FrontRight)
    }

    pub fn cell(&self) -> Option<GridCell> {
        match self {
            Slot::Cell(cell) => Some(*cell),
            _ => None,
        }
    }

    /// The mirrored side slot; other slots map to themselves
    pub fn opposite(&self) -> Slot {
        match self {
            Slot::FrontLeft => Slot::FrontRight,
            Slot::FrontRight => Slot::FrontLeft,
            other => *other,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Top => f.write_str("top"),
            Slot::FrontLeft => f.write_str("front-left"),
            Slot::FrontRight => f.write_str("front-right"),
            Slot::Cell(cell) => fmt::Display::fmt(cell, f),
        }
    }
}

impl FromStr for Slot {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Slot::parse(s)
    }
}

impl TryFrom<String> for Slot {
    type Error = DiagramError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Slot::parse(&value)
    }
}

impl From<Slot> for String {
    fn from(slot: Slot) -> Self {
        slot.to_string()
    }
}

impl From<GridCell> for Slot {
    fn from(cell: GridCell) -> Self {
        Slot::Cell(cell)
    }
}
