use std::ops::Range;

use thiserror::Error;
use tracing::debug;
use tracing::warn;

use crate::WorldOffset;
use crate::grid::Grid;
use crate::parse_util;
use crate::parse_util::ConvertError;
use crate::parse_util::ParseError;
use crate::rule_set::RuleError;
use crate::rule_set::RuleSet;

/// Largest pattern, in cells, we are willing to allocate a grid for.
const MAX_CELLS: usize = 1 << 28;

#[derive(Debug, Default)]
pub struct RleFile {
    pub name: Option<String>,
    pub author: Option<String>,
    pub offset: Option<(WorldOffset, WorldOffset)>,
    pub set: RuleSet,
    pub pattern: Grid,
}

#[derive(Debug, Error)]
pub enum RleError {
    #[error("Comment line error: {0}")]
    CommentLine(#[from] RleCommentLineError),

    #[error("Header line error: {0}")]
    HeaderLine(#[from] RleHeaderLineError),

    #[error("Encoding error: {0}")]
    Encoding(#[from] RleEncodingError),
}

/// Parse the RLE file format. Assumes the bytes are valid Ascii.
///
/// The pattern's bounding box is taken from the header, grown if any cell lies past it.
///
/// See: https://conwaylife.com/wiki/Run_Length_Encoded
pub fn read_rle(mut bytes: &[u8]) -> Result<RleFile, RleError> {
    let mut file = RleFile::default();

    // Parse as many comment lines as possible
    loop {
        bytes = parse_util::take_ws(bytes);

        let res = read_line_comment(bytes)?;
        let (Some(line), rest) = res else { break };

        match line {
            RleCommentLine::Comment => {}
            RleCommentLine::Name { name } => {
                if file.name.is_some() {
                    warn!("RLE file name already defined. Using latest");
                }

                file.name = Some(name);
            }
            RleCommentLine::Author { author } => {
                if file.author.is_some() {
                    warn!("RLE author already defined. Using latest");
                }

                file.author = Some(author);
            }
            RleCommentLine::Offset { x, y } => {
                if file.offset.is_some() {
                    warn!("RLE offset already defined. Using latest");
                }

                file.offset = Some((x, y))
            }
            RleCommentLine::RuleSet { set } => {
                file.set = set;
            }
        }

        bytes = rest;
    }

    // Parse header line, if it's present
    let (mut width, mut height) = (0, 0);
    let res = read_line_header(bytes)?;
    if let (Some(header), rest) = res {
        let RleHeaderLine { x, y, set } = header;

        if let Some(set) = set {
            file.set = set;
        }

        (width, height) = (x, y);
        bytes = rest;
    }

    let runs = read_encoding(bytes)?;

    for (row, cols) in &runs {
        width = width.max(cols.end);
        height = height.max(row + 1);
    }

    if width.saturating_mul(height) > MAX_CELLS {
        return Err(RleEncodingError::TooLarge { width, height }.into());
    }

    let mut pattern = Grid::dead(width, height);
    for (row, cols) in runs {
        for col in cols {
            pattern.set(row, col, true);
        }
    }

    debug!(
        name = file.name.as_deref().unwrap_or("<unnamed>"),
        width,
        height,
        rule = %file.set,
        "read RLE pattern"
    );

    file.pattern = pattern;

    Ok(file)
}

enum RleCommentLine {
    Comment,
    Name { name: String },
    Author { author: String },
    Offset { x: WorldOffset, y: WorldOffset },
    RuleSet { set: RuleSet },
}

#[derive(Debug, Error)]
pub enum RleCommentLineError {
    #[error("No comment type")]
    NoType,

    #[error("Empty name line")]
    EmptyName,

    #[error("Empty author line")]
    EmptyAuthor,

    #[error("Empty rule line")]
    EmptyRule,

    #[error("Invalid rule: {0}")]
    InvalidRule(#[from] RuleError),

    #[error("Invalid coordinates: {0}")]
    InvalidCoord(#[from] RleCoordError),

    #[error("Invalid comment type, found '{got}'")]
    InvalidType { got: char },
}

/// Attempt to parse a comment line, otherwise leaves `bytes` as-is.
fn read_line_comment(bytes: &[u8]) -> Result<(Option<RleCommentLine>, &[u8]), RleCommentLineError> {
    let Ok(bytes) = parse_util::expect(b'#', bytes) else {
        return Ok((None, bytes));
    };

    let (Some(b), bytes) = parse_util::take_1(bytes) else {
        return Err(RleCommentLineError::NoType);
    };

    let bytes = parse_util::take_blank(bytes);
    let (line, bytes) = parse_util::take_line(bytes);

    match b {
        // Comment line
        b'C' | b'c' => Ok((Some(RleCommentLine::Comment), bytes)),

        // Pattern name
        b'N' => {
            let name = line.ok_or(RleCommentLineError::EmptyName)?;
            let name = String::from_utf8_lossy(name).into_owned();

            Ok((Some(RleCommentLine::Name { name }), bytes))
        }

        // Pattern author
        b'O' => {
            let author = line.ok_or(RleCommentLineError::EmptyAuthor)?;
            let author = String::from_utf8_lossy(author).into_owned();

            Ok((Some(RleCommentLine::Author { author }), bytes))
        }

        // Pattern offset
        b'R' | b'P' => {
            let (x, y) = read_offset(line.unwrap_or_default())?;

            Ok((Some(RleCommentLine::Offset { x, y }), bytes))
        }

        // Pattern rules. The nameless form is survivals first, `23/3` being Life
        b'r' => {
            let rule = line.ok_or(RleCommentLineError::EmptyRule)?;
            let rule = String::from_utf8_lossy(rule);

            let set: RuleSet = if rule.bytes().any(|b| b.is_ascii_alphabetic()) {
                rule.parse()?
            } else {
                let (survivals, births) = rule.split_once('/').unwrap_or((&*rule, ""));
                format!("S{survivals}/B{births}").parse()?
            };

            Ok((Some(RleCommentLine::RuleSet { set }), bytes))
        }

        b => Err(RleCommentLineError::InvalidType { got: b as char }),
    }
}

struct RleHeaderLine {
    x: usize,
    y: usize,
    set: Option<RuleSet>,
}

#[derive(Debug, Error)]
pub enum RleHeaderLineError {
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    #[error("Invalid coordinates: {0}")]
    InvalidCoord(#[from] RleCoordError),

    #[error("Invalid token: expected ',' or '\\n', found '{got}'")]
    InvalidToken { got: char },

    #[error("Expected rule, found end of line")]
    NoRule,

    #[error("Invalid rule: {0}")]
    InvalidRule(#[from] RuleError),
}

/// Attempt to parse a header line, otherwise leaves `bytes` as-is.
fn read_line_header(bytes: &[u8]) -> Result<(Option<RleHeaderLine>, &[u8]), RleHeaderLineError> {
    if parse_util::peek_1(bytes) != Some(b'x') {
        return Ok((None, bytes));
    }

    let ((x, y), bytes) = read_dimensions(bytes)?;
    let bytes = parse_util::take_blank(bytes);

    match parse_util::take_1(bytes) {
        (Some(b','), bytes) => {
            let bytes = parse_util::take_ws(bytes);
            let bytes = parse_util::expect_slice(b"rule", bytes)?;
            let bytes = parse_util::take_ws(bytes);
            let bytes = parse_util::expect(b'=', bytes)?;
            let bytes = parse_util::take_blank(bytes);

            let (Some(rule), bytes) = parse_util::take_line(bytes) else {
                return Err(RleHeaderLineError::NoRule);
            };

            let set: RuleSet = String::from_utf8_lossy(rule).parse()?;

            let line = RleHeaderLine {
                x,
                y,
                set: Some(set),
            };

            Ok((Some(line), bytes))
        }
        (Some(b'\r' | b'\n') | None, _) => {
            let (_, bytes) = parse_util::take_line(bytes);
            let line = RleHeaderLine { x, y, set: None };

            Ok((Some(line), bytes))
        }
        (Some(b), _) => Err(RleHeaderLineError::InvalidToken { got: b as char }),
    }
}

#[derive(Debug, Error)]
pub enum RleEncodingError {
    #[error("Unexpected EOF")]
    UnexpectedEof,

    #[error("Failed to convert run length: {0}")]
    RunLength(#[from] ConvertError),

    #[error("Unrecognized byte: 0x{got:0X}")]
    UnrecognizedByte { got: u8 },

    #[error("Pattern of {width}x{height} cells is too large")]
    TooLarge { width: usize, height: usize },
}

/// Read the run-length encoded body, returning every run of live cells as its row and column
/// range.
fn read_encoding(mut bytes: &[u8]) -> Result<Vec<(usize, Range<usize>)>, RleEncodingError> {
    let mut runs = Vec::new();
    let mut rep: usize = 1;

    let (mut row, mut col) = (0usize, 0usize);
    let mut width = 0usize;

    // Runs are bounded before they are kept, so a huge count fails instead of allocating
    let too_large = |width: usize, height: usize| RleEncodingError::TooLarge { width, height };
    let advance = |at: usize, rep: usize| at.checked_add(rep).filter(|&end| end <= MAX_CELLS);

    loop {
        let Some(b) = parse_util::peek_1(bytes) else {
            return Err(RleEncodingError::UnexpectedEof);
        };

        match b {
            w if w.is_ascii_whitespace() => {
                let (_, rest) = parse_util::take_1(bytes);
                bytes = rest;
            }

            // End of input
            b'!' => break,

            // Dead cell
            b'b' => {
                let (_, rest) = parse_util::take_1(bytes);
                bytes = rest;

                col = advance(col, rep).ok_or_else(|| too_large(usize::MAX, row + 1))?;

                rep = 1;
            }

            // Live cell
            b'o' => {
                let (_, rest) = parse_util::take_1(bytes);
                bytes = rest;

                let end = advance(col, rep).ok_or_else(|| too_large(usize::MAX, row + 1))?;
                width = width.max(end);

                if width.saturating_mul(row + 1) > MAX_CELLS {
                    return Err(too_large(width, row + 1));
                }

                runs.push((row, col..end));
                col = end;

                rep = 1;
            }

            // End of line
            b'$' => {
                let (_, rest) = parse_util::take_1(bytes);
                bytes = rest;

                row = advance(row, rep).ok_or_else(|| too_large(width, usize::MAX))?;
                col = 0;

                rep = 1;
            }

            n if n.is_ascii_digit() => {
                let (Some(n), rest) = parse_util::take_until_fn(|b| !b.is_ascii_digit(), bytes)
                else {
                    unreachable!("We peeked and found a digit")
                };
                bytes = rest;

                rep = parse_util::convert(n)?;
            }

            b => return Err(RleEncodingError::UnrecognizedByte { got: b }),
        }
    }

    Ok(runs)
}

#[derive(Debug, Error)]
pub enum RleCoordError {
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    #[error("Expected x coordinate, found end of input")]
    NoX,

    #[error("Failed to parse x coordinate: {0}")]
    ParseX(#[source] ConvertError),

    #[error("Expected y coordinate, found end of input")]
    NoY,

    #[error("Failed to parse y coordinate: {0}")]
    ParseY(#[source] ConvertError),
}

/// Read `x = 3, y = 3`, stopping right after the y value.
fn read_dimensions(bytes: &[u8]) -> Result<((usize, usize), &[u8]), RleCoordError> {
    let bytes = parse_util::expect(b'x', bytes)?;
    let bytes = parse_util::take_ws(bytes);
    let bytes = parse_util::expect(b'=', bytes)?;
    let bytes = parse_util::take_ws(bytes);

    let (Some(x_bytes), bytes) = parse_util::take_with(b',', bytes) else {
        return Err(RleCoordError::NoX);
    };
    let x: usize = parse_util::convert(x_bytes).map_err(RleCoordError::ParseX)?;

    let bytes = parse_util::take_ws(bytes);
    let bytes = parse_util::expect(b'y', bytes)?;
    let bytes = parse_util::take_ws(bytes);
    let bytes = parse_util::expect(b'=', bytes)?;
    let bytes = parse_util::take_ws(bytes);

    // Dimensions can be terminated with either `,` or a linebreak.
    let p = |b| b == b',' || b == b'\n' || b == b'\r';
    let (Some(y_bytes), bytes) = parse_util::take_until_fn(p, bytes) else {
        return Err(RleCoordError::NoY);
    };
    let y: usize = parse_util::convert(y_bytes).map_err(RleCoordError::ParseY)?;

    Ok(((x, y), bytes))
}

/// Read the `x y` pair of a `#P` or `#R` line.
fn read_offset(bytes: &[u8]) -> Result<(WorldOffset, WorldOffset), RleCoordError> {
    let (Some(x_bytes), bytes) = parse_util::take_until_ws(bytes) else {
        return Err(RleCoordError::NoX);
    };
    let x: WorldOffset = parse_util::convert(x_bytes).map_err(RleCoordError::ParseX)?;

    let bytes = parse_util::take_ws(bytes);
    let (Some(y_bytes), _) = parse_util::take_until_ws(bytes) else {
        return Err(RleCoordError::NoY);
    };
    let y: WorldOffset = parse_util::convert(y_bytes).map_err(RleCoordError::ParseY)?;

    Ok((x, y))
}

#[cfg(test)]
mod test {
    use super::RleEncodingError;
    use super::RleError;
    use super::read_rle;
    use crate::rule_set::RuleSet;

    #[test]
    fn read_dimensions() {
        let bytes = b"x = 1, y = 1\n";
        let ((x, y), rest) = super::read_dimensions(bytes.as_slice()).unwrap();

        assert_eq!((x, y), (1, 1));
        assert_eq!(rest, b"\n");
    }

    #[test]
    fn read_glider() {
        let bytes = b"#N Glider\n#O Richard K. Guy\n#C The smallest spaceship\nx = 3, y = 3, rule = B3/S23\nbob$2bo$3o!\n";
        let file = read_rle(bytes).unwrap();

        assert_eq!(file.name.as_deref(), Some("Glider"));
        assert_eq!(file.author.as_deref(), Some("Richard K. Guy"));
        assert_eq!(file.set, RuleSet::default());
        assert_eq!(
            file.pattern.to_rows(),
            vec![vec![0, 1, 0], vec![0, 0, 1], vec![1, 1, 1]]
        );
    }

    #[test]
    fn header_pads_trailing_dead_cells() {
        let file = read_rle(b"x = 4, y = 3\no2$o!").unwrap();

        assert_eq!(
            file.pattern.to_rows(),
            vec![vec![1, 0, 0, 0], vec![0, 0, 0, 0], vec![1, 0, 0, 0]]
        );
    }

    #[test]
    fn comment_rule_and_offset() {
        let file = read_rle(b"#r 23/36\n#P -1 2\nx = 1, y = 1\no!").unwrap();

        assert_eq!(file.set, "B36/S23".parse::<RuleSet>().unwrap());
        assert_eq!(file.offset, Some((-1, 2)));
    }

    #[test]
    fn comment_rule_with_letters() {
        let file = read_rle(b"#r B36/S23\nx = 1, y = 1\no!").unwrap();
        assert_eq!(file.set, "B36/S23".parse::<RuleSet>().unwrap());

        // a lone number is the survival half
        let file = read_rle(b"#r 23\nx = 1, y = 1\no!").unwrap();
        assert_eq!(file.set, RuleSet::new(0, 0b1100));
    }

    #[test]
    fn huge_dead_run_is_too_large() {
        let res = read_rle(b"x = 1, y = 1\n18446744073709551615b2o!");

        assert!(matches!(
            res,
            Err(RleError::Encoding(RleEncodingError::TooLarge { .. }))
        ));
    }

    #[test]
    fn huge_live_run_is_too_large() {
        let res = read_rle(b"x = 1, y = 1\n1099511627776o!");

        assert!(matches!(
            res,
            Err(RleError::Encoding(RleEncodingError::TooLarge { .. }))
        ));
    }

    #[test]
    fn many_long_rows_are_too_large() {
        // Each row fits on its own, the area does not
        let res = read_rle(b"x = 1, y = 1\n268435456o$o!");

        assert!(matches!(
            res,
            Err(RleError::Encoding(RleEncodingError::TooLarge { .. }))
        ));
    }

    #[test]
    fn huge_line_skip_is_too_large() {
        let res = read_rle(b"x = 1, y = 1\no18446744073709551615$o!");

        assert!(matches!(
            res,
            Err(RleError::Encoding(RleEncodingError::TooLarge { .. }))
        ));
    }

    #[test]
    fn missing_terminator_is_an_error() {
        assert!(read_rle(b"x = 3, y = 1\n3o").is_err());
    }

    #[test]
    fn unknown_tag_is_an_error() {
        assert!(read_rle(b"x = 3, y = 1\n3q!").is_err());
    }
}
