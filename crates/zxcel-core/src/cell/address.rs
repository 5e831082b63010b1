//! Cell address and range types

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use lazy_regex::regex_captures;
use std::fmt;
use std::str::FromStr;

/// A cell address (e.g., "A1", "AB12")
///
/// Column letters use bijective base-26 numbering (A..Z, AA..AZ, BA..).
/// Row numbers are 1-based in text and 0-based internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    /// 0-based row; row 1 in text
    pub row: usize,
    /// 0-based column; column A in text
    pub col: usize,
}

impl CellAddress {
    /// Create a new cell address
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Parse `A1`-style text
    ///
    /// The text must match `^[A-Za-z]+\d+$`; anything else is an
    /// [`Error::InvalidReference`].
    ///
    /// # Examples
    /// ```
    /// use zxcel_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("ab12").unwrap();
    /// assert_eq!((addr.row, addr.col), (11, 27));
    ///
    /// assert!(CellAddress::parse("$A$1").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let (_, letters, digits) = regex_captures!(r"^([A-Za-z]+)(\d+)$", s)
            .ok_or_else(|| Error::InvalidReference(s.to_string()))?;

        let col = Self::letters_to_column(letters)?;

        let row: usize = digits
            .parse()
            .map_err(|_| Error::InvalidReference(format!("invalid row number in '{}'", s)))?;

        let row = row
            .checked_sub(1)
            .ok_or_else(|| Error::InvalidReference(format!("there is no row 0 in '{}'", s)))?;
        if row >= MAX_ROWS {
            return Err(Error::OutOfBounds {
                row,
                col,
                rows: MAX_ROWS,
                cols: MAX_COLS,
            });
        }

        Ok(Self { row, col })
    }

    /// Column letters for a 0-based index: 0 is A, 25 is Z, 26 is AA
    pub fn column_to_letters(col: usize) -> String {
        // Bijective base 26 works on the 1-based column number
        let mut n = col + 1;
        let mut letters = Vec::new();
        while n > 0 {
            let digit = (n - 1) % 26;
            letters.push(b'A' + digit as u8);
            n = (n - 1) / 26;
        }
        letters.iter().rev().map(|&b| b as char).collect()
    }

    /// 0-based column index of column letters (case-insensitive)
    pub fn letters_to_column(letters: &str) -> Result<usize> {
        if letters.is_empty() {
            return Err(Error::InvalidReference("empty column letters".into()));
        }

        let value = letters.chars().try_fold(0usize, |acc, c| {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidReference(format!(
                    "'{}' is not a column letter",
                    c
                )));
            }
            let acc = acc * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1);
            if acc > MAX_COLS {
                return Err(Error::OutOfBounds {
                    row: 0,
                    col: acc - 1,
                    rows: MAX_ROWS,
                    cols: MAX_COLS,
                });
            }
            Ok(acc)
        })?;

        Ok(value - 1)
    }

    /// `A1`-style text of this address
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", Self::column_to_letters(self.col), self.row + 1)
    }

    /// Offset this address by a row/column delta
    pub fn offset(&self, rows: usize, cols: usize) -> CellAddress {
        CellAddress::new(self.row + rows, self.col + cols)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A rectangle of cells such as `A1:B10`
///
/// Corners are normalized on construction, so `start` is always top-left
/// and `end` bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub start: CellAddress,
    pub end: CellAddress,
}

impl CellRange {
    /// Rectangle with `start` and `end` as opposite corners, in any order
    pub fn new(start: CellAddress, end: CellAddress) -> Self {
        Self {
            start: CellAddress::new(start.row.min(end.row), start.col.min(end.col)),
            end: CellAddress::new(start.row.max(end.row), start.col.max(end.col)),
        }
    }

    /// Same as [`CellRange::new`] from raw indices
    pub fn from_indices(start_row: usize, start_col: usize, end_row: usize, end_col: usize) -> Self {
        Self::new(
            CellAddress::new(start_row, start_col),
            CellAddress::new(end_row, end_col),
        )
    }

    /// The one-cell rectangle at `addr`
    pub fn single(addr: CellAddress) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    /// Parse `A1:B10`, or a lone `A1` as a one-cell range
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let Some((first, second)) = s.split_once(':') else {
            return CellAddress::parse(s).map(Self::single);
        };

        let corner = |text: &str| {
            CellAddress::parse(text.trim())
                .map_err(|e| Error::InvalidRange(format!("'{}': {}", s, e)))
        };
        Ok(Self::new(corner(first)?, corner(second)?))
    }

    /// Whether the rectangle covers `addr`
    pub fn contains(&self, addr: &CellAddress) -> bool {
        (self.start.row..=self.end.row).contains(&addr.row)
            && (self.start.col..=self.end.col).contains(&addr.col)
    }

    /// Height of the rectangle
    pub fn row_count(&self) -> usize {
        self.end.row - self.start.row + 1
    }

    /// Width of the rectangle
    pub fn col_count(&self) -> usize {
        self.end.col - self.start.col + 1
    }

    /// Number of cells covered
    pub fn cell_count(&self) -> usize {
        self.row_count() * self.col_count()
    }

    /// Restrict the range to a grid of `rows` x `cols`
    ///
    /// Returns `None` when the range lies entirely outside the grid.
    pub fn clip(&self, rows: usize, cols: usize) -> Option<CellRange> {
        if rows == 0 || cols == 0 || self.start.row >= rows || self.start.col >= cols {
            return None;
        }

        Some(CellRange::from_indices(
            self.start.row,
            self.start.col,
            self.end.row.min(rows - 1),
            self.end.col.min(cols - 1),
        ))
    }

    /// Addresses of the rectangle in row-major order
    pub fn cells(&self) -> CellRangeIterator {
        CellRangeIterator {
            range: *self,
            next: 0,
            len: self.cell_count(),
        }
    }

    /// `A1:B10` text; a one-cell range prints as just `A1`
    pub fn to_a1_string(&self) -> String {
        if self.start != self.end {
            return format!("{}:{}", self.start, self.end);
        }
        self.start.to_a1_string()
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Row-major iterator over the addresses of a [`CellRange`]
#[derive(Debug, Clone)]
pub struct CellRangeIterator {
    range: CellRange,
    /// Linear offset of the next address within the range
    next: usize,
    len: usize,
}

impl CellRangeIterator {
    fn address_at(&self, offset: usize) -> CellAddress {
        let width = self.range.col_count();
        self.range.start.offset(offset / width, offset % width)
    }
}

impl Iterator for CellRangeIterator {
    type Item = CellAddress;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.len {
            return None;
        }
        let addr = self.address_at(self.next);
        self.next += 1;
        Some(addr)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.next;
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for CellRangeIterator {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.next >= self.len {
            return None;
        }
        self.len -= 1;
        Some(self.address_at(self.len))
    }
}

impl ExactSizeIterator for CellRangeIterator {}
