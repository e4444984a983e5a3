use std::str::FromStr;

use super::kernels::Kernel;
use crate::error::FilterError;

/// Errors reported while reading a kernel from text.
///
/// Rows and columns are 1-based so they can be shown to a user as is.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum KernelParseError {
    /// The text contains no weights.
    #[error("kernel text is empty")]
    Empty,

    /// A token is not a number.
    #[error("invalid number {token:?} at row {row}, column {column}")]
    InvalidNumber {
        /// Row of the token.
        row: usize,
        /// Column of the token.
        column: usize,
        /// The offending token.
        token: String,
    },

    /// A token parsed to an infinite or NaN value.
    #[error("weight at row {row}, column {column} is not finite")]
    NonFinite {
        /// Row of the weight.
        row: usize,
        /// Column of the weight.
        column: usize,
    },

    /// A row has a different length than the first one.
    #[error("row {row} has {found} values, expected {expected}")]
    RaggedRows {
        /// The first row that differs.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },

    /// The rows are consistent but do not form a square.
    #[error("kernel must be square, got {rows}x{cols}")]
    NotSquare {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },

    /// A bracketed kernel does not close every bracket it opens.
    #[error("unbalanced brackets")]
    UnbalancedBrackets,

    /// A character that has no meaning in a bracketed kernel.
    #[error("unexpected character {character:?} at position {position}")]
    UnexpectedCharacter {
        /// The offending character.
        character: char,
        /// Character offset in the trimmed input.
        position: usize,
    },
}

/// Parse a single weight.
///
/// Accepts anything [`f32::from_str`] accepts plus simple fractions such as `1/9`.
fn parse_weight(token: &str, row: usize, column: usize) -> Result<f32, KernelParseError> {
    let invalid = || KernelParseError::InvalidNumber {
        row,
        column,
        token: token.to_string(),
    };

    let value = match token.split_once('/') {
        Some((num, den)) => {
            let num = num.parse::<f32>().map_err(|_| invalid())?;
            let den = den.parse::<f32>().map_err(|_| invalid())?;
            if den == 0.0 {
                return Err(invalid());
            }
            num / den
        }
        None => token.parse::<f32>().map_err(|_| invalid())?,
    };

    if !value.is_finite() {
        return Err(KernelParseError::NonFinite { row, column });
    }

    Ok(value)
}

/// Rows separated by newlines or `;`, values separated by whitespace or commas.
///
/// Every comma must sit between two values; an empty field is reported as an
/// [`KernelParseError::InvalidNumber`] with an empty token.
fn parse_lines(text: &str) -> Result<Vec<Vec<f32>>, KernelParseError> {
    text.split(['\n', ';'])
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(r, line)| parse_line(line, r + 1))
        .collect()
}

fn parse_line(line: &str, row: usize) -> Result<Vec<f32>, KernelParseError> {
    let mut values = Vec::new();
    for field in line.split(',') {
        let mut tokens = field.split_whitespace().peekable();
        if tokens.peek().is_none() {
            return Err(KernelParseError::InvalidNumber {
                row,
                column: values.len() + 1,
                token: String::new(),
            });
        }
        for token in tokens {
            values.push(parse_weight(token, row, values.len() + 1)?);
        }
    }
    Ok(values)
}

/// A list of rows written as `[[a, b, c], [d, e, f], ...]`.
///
/// Rows are separated by exactly one comma, with none after the last row.
fn parse_brackets(text: &str) -> Result<Vec<Vec<f32>>, KernelParseError> {
    let mut rows: Vec<Vec<f32>> = Vec::new();
    let mut row: Vec<f32> = Vec::new();
    let mut token = String::new();
    let mut depth = 0usize;
    let mut closed = false;
    let mut expect_value = false;
    // at depth 1: a row must come next, either first or after a comma
    let mut expect_row = true;

    let flush = |token: &mut String, row: &mut Vec<f32>, rows: &[Vec<f32>]| {
        let value = parse_weight(token, rows.len() + 1, row.len() + 1)?;
        row.push(value);
        token.clear();
        Ok::<(), KernelParseError>(())
    };

    for (position, character) in text.chars().enumerate() {
        let unexpected = KernelParseError::UnexpectedCharacter {
            character,
            position,
        };

        if closed {
            if character.is_whitespace() {
                continue;
            }
            return Err(unexpected);
        }

        match (character, depth) {
            ('[', 0) => depth = 1,
            ('[', 1) if expect_row => {
                depth = 2;
                expect_value = true;
            }
            (']', 1) if !expect_row || rows.is_empty() => {
                depth = 0;
                closed = true;
            }
            (']', 2) => {
                if !token.is_empty() {
                    flush(&mut token, &mut row, &rows)?;
                } else if expect_value && !row.is_empty() {
                    return Err(KernelParseError::InvalidNumber {
                        row: rows.len() + 1,
                        column: row.len() + 1,
                        token: String::new(),
                    });
                }
                rows.push(std::mem::take(&mut row));
                depth = 1;
                expect_row = false;
            }
            (',', 1) if !expect_row => expect_row = true,
            (',', 2) => {
                if !token.is_empty() {
                    flush(&mut token, &mut row, &rows)?;
                } else if expect_value {
                    return Err(KernelParseError::InvalidNumber {
                        row: rows.len() + 1,
                        column: row.len() + 1,
                        token: String::new(),
                    });
                }
                expect_value = true;
            }
            (c, 2) if c.is_whitespace() => {
                if !token.is_empty() {
                    flush(&mut token, &mut row, &rows)?;
                    expect_value = false;
                }
            }
            (c, _) if c.is_whitespace() => {}
            (c, 2) if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+' | '/') => {
                token.push(c);
                expect_value = false;
            }
            _ => return Err(unexpected),
        }
    }

    if !closed {
        return Err(KernelParseError::UnbalancedBrackets);
    }

    Ok(rows)
}

/// Parse a square kernel from text, without evaluating it.
///
/// Two layouts are accepted:
///
/// * one row per line (or separated by `;`), values separated by whitespace and/or commas;
/// * a bracketed list of rows, e.g. `[[1, 0, -1], [1, 0, -1], [1, 0, -1]]`.
///
/// Each value must be a finite number; simple fractions like `1/9` are allowed.
/// Blank lines are ignored. Anything else is rejected with a [`KernelParseError`].
///
/// # Example
///
/// ```
/// use konv_imgproc::filter::parse_kernel;
///
/// let kernel = parse_kernel("1 0 -1\n1 0 -1\n1 0 -1").unwrap();
/// assert_eq!(kernel.rows(), 3);
/// assert_eq!(kernel.get(0, 2), Some(-1.0));
///
/// let same = parse_kernel("[[1, 0, -1], [1, 0, -1], [1, 0, -1]]").unwrap();
/// assert_eq!(kernel, same);
///
/// assert!(parse_kernel("__import__('os')").is_err());
/// ```
pub fn parse_kernel(text: &str) -> Result<Kernel, FilterError> {
    let text = text.trim();
    let rows = if text.starts_with('[') {
        parse_brackets(text)?
    } else {
        parse_lines(text)?
    };

    let expected = match rows.first() {
        Some(first) if !first.is_empty() => first.len(),
        _ => return Err(KernelParseError::Empty.into()),
    };

    if let Some((i, row)) = rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != expected)
    {
        return Err(KernelParseError::RaggedRows {
            row: i + 1,
            expected,
            found: row.len(),
        }
        .into());
    }

    if rows.len() != expected {
        return Err(KernelParseError::NotSquare {
            rows: rows.len(),
            cols: expected,
        }
        .into());
    }

    Kernel::from_rows(&rows)
}

impl FromStr for Kernel {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_kernel(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parse_err(text: &str) -> KernelParseError {
        match parse_kernel(text) {
            Err(FilterError::KernelParse(e)) => e,
            other => panic!("expected a parse error for {text:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_whitespace_rows() -> Result<(), FilterError> {
        let kernel = parse_kernel("  0 -1 0\n-1 5 -1\n 0 -1 0\n\n")?;
        assert_eq!(
            kernel.as_slice(),
            &[0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0]
        );
        Ok(())
    }

    #[test]
    fn test_parse_commas_and_semicolons() -> Result<(), FilterError> {
        let kernel = parse_kernel("1, 2, 3; 4,5,6 ;7 8\t9")?;
        assert_eq!(kernel.rows(), 3);
        assert_eq!(
            kernel.as_slice(),
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]
        );
        Ok(())
    }

    #[test]
    fn test_parse_windows_line_endings() -> Result<(), FilterError> {
        let kernel = parse_kernel("1 0\r\n0 1\r\n")?;
        assert_eq!(kernel.as_slice(), &[1.0, 0.0, 0.0, 1.0]);
        Ok(())
    }

    #[test]
    fn test_parse_fractions_and_exponents() -> Result<(), FilterError> {
        let kernel = parse_kernel("1/9 1/9 1/9\n1/9 1/9 1/9\n1/9 1/9 1/9")?;
        kernel
            .as_slice()
            .iter()
            .for_each(|&w| assert_relative_eq!(w, 1.0 / 9.0));

        let kernel = parse_kernel("2.5e-1")?;
        assert_eq!(kernel.as_slice(), &[0.25]);
        Ok(())
    }

    #[test]
    fn test_parse_brackets() -> Result<(), FilterError> {
        let kernel = parse_kernel("[[-2, -1, 0], [-1, 1, 1], [0, 1, 2.0]]")?;
        assert_eq!(kernel, crate::filter::KernelPreset::Emboss.kernel());

        let kernel = parse_kernel("[ [1 2] ,\n [3 4] ]")?;
        assert_eq!(kernel.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
        Ok(())
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse_err(""), KernelParseError::Empty);
        assert_eq!(parse_err(" \n\n "), KernelParseError::Empty);
        assert_eq!(parse_err("[]"), KernelParseError::Empty);
        assert_eq!(parse_err("[[]]"), KernelParseError::Empty);
    }

    #[test]
    fn test_parse_invalid_number() {
        assert_eq!(
            parse_err("1 0 -1\n1 x -1\n1 0 -1"),
            KernelParseError::InvalidNumber {
                row: 2,
                column: 2,
                token: "x".to_string(),
            }
        );
        assert_eq!(
            parse_err("1/0"),
            KernelParseError::InvalidNumber {
                row: 1,
                column: 1,
                token: "1/0".to_string(),
            }
        );
        assert_eq!(
            parse_err("[[1,,2],[3,4]]"),
            KernelParseError::InvalidNumber {
                row: 1,
                column: 2,
                token: String::new(),
            }
        );
        assert_eq!(
            parse_err("[[1,2,],[3,4]]"),
            KernelParseError::InvalidNumber {
                row: 1,
                column: 3,
                token: String::new(),
            }
        );
    }

    #[test]
    fn test_parse_empty_comma_field() {
        assert_eq!(
            parse_err("1,,2\n3,4"),
            KernelParseError::InvalidNumber {
                row: 1,
                column: 2,
                token: String::new(),
            }
        );
        assert_eq!(
            parse_err("1, 2,\n3, 4"),
            KernelParseError::InvalidNumber {
                row: 1,
                column: 3,
                token: String::new(),
            }
        );
        assert_eq!(
            parse_err("1 2\n, 3 4"),
            KernelParseError::InvalidNumber {
                row: 2,
                column: 1,
                token: String::new(),
            }
        );
    }

    #[test]
    fn test_parse_bracket_row_separators() {
        assert_eq!(
            parse_err("[[1, 2],,, [3, 4],]"),
            KernelParseError::UnexpectedCharacter {
                character: ',',
                position: 8,
            }
        );
        assert_eq!(
            parse_err("[[1 2] [3 4]]"),
            KernelParseError::UnexpectedCharacter {
                character: '[',
                position: 7,
            }
        );
        assert_eq!(
            parse_err("[[1, 2], [3, 4],]"),
            KernelParseError::UnexpectedCharacter {
                character: ']',
                position: 16,
            }
        );
        assert_eq!(
            parse_err("[, [1]]"),
            KernelParseError::UnexpectedCharacter {
                character: ',',
                position: 1,
            }
        );
    }

    #[test]
    fn test_parse_non_finite() {
        assert_eq!(
            parse_err("1 inf\n0 1"),
            KernelParseError::NonFinite { row: 1, column: 2 }
        );
        assert_eq!(
            parse_err("[[NaN]]"),
            KernelParseError::NonFinite { row: 1, column: 1 }
        );
    }

    #[test]
    fn test_parse_ragged_and_not_square() {
        assert_eq!(
            parse_err("1 2 3\n4 5\n6 7 8"),
            KernelParseError::RaggedRows {
                row: 2,
                expected: 3,
                found: 2,
            }
        );
        assert_eq!(
            parse_err("1 2 3\n4 5 6"),
            KernelParseError::NotSquare { rows: 2, cols: 3 }
        );
    }

    #[test]
    fn test_parse_rejects_code() {
        assert_eq!(
            parse_err("[__import__('os').system('ls')]"),
            KernelParseError::UnexpectedCharacter {
                character: '_',
                position: 1,
            }
        );
        assert!(matches!(
            parse_err("[[1, 2], [3, 4]] + [[0]]"),
            KernelParseError::UnexpectedCharacter { character: '+', .. }
        ));
        assert!(matches!(
            parse_err("[[1, (2)], [3, 4]]"),
            KernelParseError::UnexpectedCharacter { character: '(', .. }
        ));
        assert!(matches!(
            parse_err("[[[1]]]"),
            KernelParseError::UnexpectedCharacter { character: '[', .. }
        ));
        assert!(matches!(
            parse_err("exec('1')"),
            KernelParseError::InvalidNumber { row: 1, column: 1, .. }
        ));
    }

    #[test]
    fn test_parse_unbalanced() {
        assert_eq!(parse_err("[[1, 2], [3, 4]"), KernelParseError::UnbalancedBrackets);
        assert_eq!(parse_err("[[1"), KernelParseError::UnbalancedBrackets);
    }

    #[test]
    fn test_kernel_from_str() -> Result<(), FilterError> {
        let kernel: Kernel = "0 0 0\n0 1 0\n0 0 0".parse()?;
        assert_eq!(kernel, Kernel::identity(3));
        Ok(())
    }
}
