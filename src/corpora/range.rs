use std::fmt::{self, Display, Formatter};

use tracing::error;

use crate::error::SweepError;

/// first candidate of the default search space
pub const DEFAULT_START: u32 = 1000;

/// last candidate (inclusive) of the default search space
pub const DEFAULT_END: u32 = 9999;

/// zero-padded width of each candidate
pub const DEFAULT_WIDTH: usize = 4;

/// an inclusive range of numeric codes, yielded in ascending order and
/// zero-padded to a fixed width
///
/// # Examples
///
/// ```
/// # use codesweep::corpora::CodeRange;
/// # use codesweep::error::SweepError;
/// # fn main() -> Result<(), SweepError> {
/// let range = CodeRange::new(7, 10, 4)?;
///
/// assert_eq!(range.len(), 4);
/// assert_eq!(range.iter().collect::<Vec<_>>(), ["0007", "0008", "0009", "0010"]);
/// # Ok(())
/// # }
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CodeRange {
    start: u32,
    end: u32,
    width: usize,
}

impl CodeRange {
    /// create a new `CodeRange` covering `start..=end`
    ///
    /// # Errors
    ///
    /// returns an error when
    /// - `start` is greater than `end`
    /// - `end` has more digits than `width`, i.e. candidates would have uneven lengths
    pub fn new(start: u32, end: u32, width: usize) -> Result<Self, SweepError> {
        if start > end {
            error!(%start, %end, "CodeRange start can't be greater than its end");

            return Err(SweepError::InvalidParameter {
                param: format!("{start}..={end}"),
                message: "CodeRange start can't be greater than its end",
            });
        }

        if end.to_string().len() > width {
            error!(%end, %width, "CodeRange end doesn't fit in the requested width");

            return Err(SweepError::InvalidParameter {
                param: width.to_string(),
                message: "CodeRange width is too small to hold its last candidate",
            });
        }

        Ok(Self { start, end, width })
    }

    /// first candidate's numeric value
    #[must_use]
    pub const fn start(&self) -> u32 {
        self.start
    }

    /// last candidate's numeric value (inclusive)
    #[must_use]
    pub const fn end(&self) -> u32 {
        self.end
    }

    /// number of digits every candidate is padded to
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// total number of candidates
    #[must_use]
    pub const fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    /// a `CodeRange` always holds at least one candidate
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// format a single value the same way the range's candidates are formatted
    #[must_use]
    pub fn format(&self, value: u32) -> String {
        format!("{value:0width$}", width = self.width)
    }

    /// iterate over every candidate, ascending
    pub fn iter(&self) -> impl Iterator<Item = String> + '_ {
        (self.start..=self.end).map(|value| self.format(value))
    }
}

impl Default for CodeRange {
    fn default() -> Self {
        Self {
            start: DEFAULT_START,
            end: DEFAULT_END,
            width: DEFAULT_WIDTH,
        }
    }
}

impl Display for CodeRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.format(self.start), self.format(self.end))
    }
}
