//! Coordinate format (`%FS...*%`) and unit (`%MO..*%`, `G70`/`G71`) handling.
//!
//! Coordinates are kept as the raw digit strings found in the file until the interpreter converts them, since the
//! format may be declared after the first coordinate-free commands.

use thiserror::Error;

/// Millimeters per inch.
pub const MM_PER_INCH: f64 = 25.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Units {
    Millimeters,
    Inches,
}

impl Units {
    /// Factor converting a value in these units to millimeters.
    pub fn to_mm(&self) -> f64 {
        match self {
            Units::Millimeters => 1.0,
            Units::Inches => MM_PER_INCH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ZeroOmission {
    /// Leading zeros may be omitted, the value is right-aligned. (`L`)
    Leading,
    /// Trailing zeros may be omitted, the value is left-aligned. (`T`)
    Trailing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Notation {
    Absolute,
    Incremental,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormatError {
    #[error("Invalid format specification. reason: {0}")]
    InvalidSpecification(String),
    #[error("Invalid unit declaration: {0:?}")]
    InvalidUnits(String),
    #[error("Invalid coordinate: {0:?}")]
    InvalidCoordinate(String),
}

/// The `FS` declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoordinateFormat {
    pub integer_digits: u8,
    pub decimal_digits: u8,
    pub zero_omission: ZeroOmission,
    pub notation: Notation,
}

impl CoordinateFormat {
    pub const MAX_INTEGER_DIGITS: u8 = 7;
    pub const MAX_DECIMAL_DIGITS: u8 = 7;

    pub fn new(integer_digits: u8, decimal_digits: u8) -> Self {
        Self {
            integer_digits,
            decimal_digits,
            zero_omission: ZeroOmission::Leading,
            notation: Notation::Absolute,
        }
    }

    /// Parse the body of an FS command, e.g. `LAX46Y46` or `TAX24Y24`.
    ///
    /// The X and Y formats must be identical, as required by every exporter in practice.
    pub fn parse(body: &str) -> Result<Self, FormatError> {
        let invalid = |reason: &str| FormatError::InvalidSpecification(format!("{}, fs: {:?}", reason, body));

        let mut chars = body.chars();

        let zero_omission = match chars.next() {
            Some('L') => ZeroOmission::Leading,
            Some('T') => ZeroOmission::Trailing,
            _ => return Err(invalid("expected zero omission 'L' or 'T'")),
        };
        let notation = match chars.next() {
            Some('A') => Notation::Absolute,
            Some('I') => Notation::Incremental,
            _ => return Err(invalid("expected notation 'A' or 'I'")),
        };

        // some old exporters emit 'N2G2D2M2' sequence-number style fields, which are skipped.
        let mut x_format = None;
        let mut y_format = None;
        while let Some(field) = chars.next() {
            // sequence fields carry one digit, axis formats carry two.
            let width = match field {
                'X' | 'Y' => 2,
                'N' | 'G' | 'D' | 'M' => 1,
                _ => return Err(invalid("unexpected axis")),
            };
            let mut digits = [0_u8; 2];
            for digit in digits.iter_mut().take(width) {
                let value = chars
                    .next()
                    .and_then(|c| c.to_digit(10))
                    .ok_or_else(|| invalid("missing digit after field"))?;
                *digit = value as u8;
            }
            match field {
                'X' => x_format = Some((digits[0], digits[1])),
                'Y' => y_format = Some((digits[0], digits[1])),
                _ => {}
            }
        }

        let (Some(x_format), Some(y_format)) = (x_format, y_format) else {
            return Err(invalid("missing X or Y format"));
        };
        if x_format != y_format {
            return Err(invalid("X and Y formats differ"));
        }

        let (integer_digits, decimal_digits) = x_format;
        if integer_digits > Self::MAX_INTEGER_DIGITS || decimal_digits > Self::MAX_DECIMAL_DIGITS {
            return Err(invalid("too many digits"));
        }
        if integer_digits + decimal_digits == 0 {
            return Err(invalid("zero digits"));
        }

        Ok(Self {
            integer_digits,
            decimal_digits,
            zero_omission,
            notation,
        })
    }

    pub fn total_digits(&self) -> u8 {
        self.integer_digits + self.decimal_digits
    }

    /// The smallest representable step, in file units.
    pub fn resolution(&self) -> f64 {
        1.0 / 10_f64.powi(self.decimal_digits as i32)
    }

    /// Convert a raw coordinate string, e.g. `-12500` or `1.25`, to file units.
    ///
    /// Values with a decimal point are taken as-is, integer values use the implied decimal position.
    pub fn parse_coordinate(&self, raw: &str) -> Result<f64, FormatError> {
        let invalid = || FormatError::InvalidCoordinate(raw.to_string());

        if raw.contains('.') {
            return raw.parse::<f64>().map_err(|_| invalid());
        }

        let (negative, digits) = match raw.as_bytes().first() {
            Some(b'-') => (true, &raw[1..]),
            Some(b'+') => (false, &raw[1..]),
            _ => (false, raw),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let total = self.total_digits() as usize;
        let value: i64 = match self.zero_omission {
            ZeroOmission::Leading => digits.parse().map_err(|_| invalid())?,
            ZeroOmission::Trailing => {
                if digits.len() > total {
                    return Err(invalid());
                }
                // left-aligned, restore the omitted trailing zeros
                let padded = format!("{:0<width$}", digits, width = total);
                padded.parse().map_err(|_| invalid())?
            }
        };

        // division keeps values such as 10000 / 10^4 exact
        let value = value as f64 / 10_f64.powi(self.decimal_digits as i32);
        Ok(match negative {
            true => -value,
            false => value,
        })
    }
}

/// Parse the body of an MO command, e.g. `MM` or `IN`.
pub fn parse_units(body: &str) -> Result<Units, FormatError> {
    match body {
        "MM" => Ok(Units::Millimeters),
        "IN" => Ok(Units::Inches),
        _ => Err(FormatError::InvalidUnits(body.to_string())),
    }
}
