use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Rules of Conway's Game of Life.
pub const B3S23: RuleSet = RuleSet::new(0b1000, 0b1100);

/// # Representation
/// Life rules are represented as
/// ```notrust
/// |------birth------|
/// 0000_0000_0000_0000_0000_0000_0000_0000
///                     |----survival-----|
/// ```
///
/// # Examples
/// ```notrust
/// b3s23:                0000_0000_0000_1000_0000_0000_0000_1100
///
/// b0s0:                 0000_0000_0000_0000_0000_0000_0000_0000
/// b012345678s012345678: 0000_0001_1111_1111_0000_0001_1111_1111
/// ```
///
/// See: https://conwaylife.com/wiki/Rulestring
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RuleSet {
    rule: u32,
}

impl Default for RuleSet {
    fn default() -> Self {
        B3S23
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("Empty rule")]
    Empty,

    #[error("Neighbor count {0} is out of range 0-8")]
    OutOfRange(char),

    #[error("Unexpected character '{0}' in rule")]
    InvalidChar(char),

    #[error("Rule section '{0}' appears more than once")]
    Repeated(char),
}

impl RuleSet {
    /// Create a new `RuleSet` for the given births and survivals. For both `b` and
    /// `s`, numbers are set on a bit basis. For instance if bit `i` in `b` is on, it
    /// means `i` is included in the set of births. Any bit past the 8th is ignored.
    ///
    /// Big endian is used here (i.e. `b = 0b1` means b1, and `b = 0b1_0000_0000` means b8).
    pub const fn new(b: u16, s: u16) -> Self {
        let b = b & 0x1FF;
        let s = s & 0x1FF;

        Self {
            rule: (b as u32) << 16 | s as u32,
        }
    }

    pub fn births(&self) -> u16 {
        ((self.rule & 0x1FF0000) >> 0x10) as u16
    }

    pub fn survivals(&self) -> u16 {
        (self.rule & 0x1FF) as u16
    }

    /// The state of a cell in the next generation, given whether it is alive now and how many
    /// of its eight neighbors are.
    pub fn next_state(&self, alive: bool, neighbors: u8) -> bool {
        if neighbors > 8 {
            return false;
        }

        let n = 1 << neighbors;

        if alive {
            self.survivals() & n == n
        } else {
            self.births() & n == n
        }
    }
}

/// Formats as `B3/S23`
impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn digits(f: &mut fmt::Formatter<'_>, mask: u16) -> fmt::Result {
            for n in 0..=8 {
                if mask & (1 << n) != 0 {
                    write!(f, "{n}")?;
                }
            }

            Ok(())
        }

        write!(f, "B")?;
        digits(f, self.births())?;
        write!(f, "/S")?;
        digits(f, self.survivals())
    }
}

/// Accepts `B3/S23`, `b3s23`, and the nameless `3/23` form used by RLE `#r` lines. In the
/// nameless form, births come first.
impl FromStr for RuleSet {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        #[derive(PartialEq)]
        enum State {
            Birth,
            Survival,
        }

        let s = s.trim();
        if s.is_empty() {
            return Err(RuleError::Empty);
        }

        let mut state = State::Birth;
        let (mut b, mut s_mask) = (0u16, 0u16);
        let (mut seen_b, mut seen_s) = (false, false);

        for c in s.chars() {
            match c {
                'b' | 'B' => {
                    if seen_b {
                        return Err(RuleError::Repeated('B'));
                    }

                    seen_b = true;
                    state = State::Birth;
                }
                's' | 'S' => {
                    if seen_s {
                        return Err(RuleError::Repeated('S'));
                    }

                    seen_s = true;
                    state = State::Survival;
                }
                '/' => {
                    // `3/23` switches sections on the slash alone
                    if state == State::Birth && !seen_s {
                        state = State::Survival;
                    }
                }
                n => {
                    let n = n.to_digit(10).ok_or(RuleError::InvalidChar(n))?;

                    if n > 8 {
                        return Err(RuleError::OutOfRange(c));
                    }

                    match state {
                        State::Birth => b |= 1 << n,
                        State::Survival => s_mask |= 1 << n,
                    }
                }
            }
        }

        Ok(RuleSet::new(b, s_mask))
    }
}
