//! Classification of raw commands into typed commands.
//!
//! Coordinates are kept as raw strings here; converting them requires the coordinate format, which is plotter state.

use thiserror::Error;

use crate::aperture::ApertureDefinition;
use crate::arc::QuadrantMode;
use crate::format::{parse_units, CoordinateFormat, FormatError, Units};
use crate::tokenizer::RawCommand;
use crate::types::Exposure;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ContentError {
    #[error("Malformed command. reason: {0}")]
    Malformed(String),
    #[error(transparent)]
    Format(#[from] FormatError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMode {
    /// G01
    #[default]
    Linear,
    /// G02
    ClockwiseCircular,
    /// G03
    CounterclockwiseCircular,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationCode {
    /// D01
    Interpolate,
    /// D02
    Move,
    /// D03
    Flash,
}

/// Raw coordinate values, e.g. `X-1500` is stored as `Some("-1500")`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coordinates {
    pub x: Option<String>,
    pub y: Option<String>,
    pub i: Option<String>,
    pub j: Option<String>,
}

impl Coordinates {
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.i.is_none() && self.j.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Interpolation mode given in the same block, deprecated `G01X..Y..D01` syntax.
    pub mode: Option<InterpolationMode>,
    pub coordinates: Coordinates,
    /// `None` for deprecated blocks which re-use the previous D code.
    pub code: Option<OperationCode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FormatSpecification(CoordinateFormat),
    Units(Units),
    ApertureDefinition(ApertureDefinition),
    SelectAperture(i32),
    InterpolationMode(InterpolationMode),
    QuadrantMode(QuadrantMode),
    Polarity(Exposure),
    Operation(Operation),
    /// G36 (`true`) / G37 (`false`)
    RegionMode(bool),
    Comment(String),
    /// Metadata without effect on geometry, e.g. `TF`, `TA`, `TO`, `TD`, `IN`, `LN`, `G90`.
    Attribute(String),
    EndOfFile,
    /// A known command which is not supported, e.g. aperture macros or step-and-repeat.
    Unsupported(String),
    Unknown(String),
}

impl Command {
    /// Commands which are counted as unrecognized in the parse summary.
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, Command::Unsupported(_) | Command::Unknown(_))
    }
}

const UNSUPPORTED_EXTENDED_CODES: [&str; 11] = ["AM", "AB", "SR", "LM", "LR", "LS", "MI", "IR", "OF", "SF", "AS"];
const ATTRIBUTE_EXTENDED_CODES: [&str; 7] = ["TF", "TA", "TO", "TD", "IN", "IP", "LN"];

pub fn parse_command(raw: &RawCommand) -> Result<Command, ContentError> {
    match raw.extended {
        true => parse_extended(&raw.text),
        false => parse_word(&raw.text),
    }
}

fn parse_extended(text: &str) -> Result<Command, ContentError> {
    let code = text.get(..2).unwrap_or(text);
    let body = text.get(2..).unwrap_or("");

    let command = match code {
        "FS" => Command::FormatSpecification(CoordinateFormat::parse(body)?),
        "MO" => Command::Units(parse_units(body)?),
        "AD" => Command::ApertureDefinition(parse_aperture_definition(body)?),
        "LP" => match body {
            "D" => Command::Polarity(Exposure::Add),
            "C" => Command::Polarity(Exposure::CutOut),
            _ => return Err(ContentError::Malformed(format!("invalid polarity: {:?}", body))),
        },
        _ if ATTRIBUTE_EXTENDED_CODES.contains(&code) => Command::Attribute(text.to_string()),
        _ if UNSUPPORTED_EXTENDED_CODES.contains(&code) => Command::Unsupported(text.to_string()),
        _ => Command::Unknown(text.to_string()),
    };
    Ok(command)
}

/// Parse `D10C,0.5`, `D11R,1.2X0.8`, `D12P,1.5X6X30`, or `D13OC8,0.5` (macro).
fn parse_aperture_definition(body: &str) -> Result<ApertureDefinition, ContentError> {
    let malformed = |reason: &str| ContentError::Malformed(format!("{}, aperture definition: {:?}", reason, body));

    let rest = body
        .strip_prefix('D')
        .ok_or_else(|| malformed("expected 'D'"))?;
    let digits = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let code: i32 = rest[..digits]
        .parse()
        .map_err(|_| malformed("invalid code"))?;

    let (template, parameters) = match rest[digits..].split_once(',') {
        Some((template, parameters)) => (template, Some(parameters)),
        None => (&rest[digits..], None),
    };
    if template.is_empty() {
        return Err(malformed("missing template"));
    }

    let parameters = match parameters {
        None => vec![],
        Some(parameters) => parameters
            .split('X')
            .map(|value| value.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| malformed("invalid parameters"))?,
    };

    Ok(ApertureDefinition {
        code,
        template: template.to_string(),
        parameters,
    })
}

fn parse_word(text: &str) -> Result<Command, ContentError> {
    if text.starts_with("G04") || text.starts_with("G4 ") {
        let comment = text
            .trim_start_matches("G04")
            .trim_start_matches("G4");
        return Ok(Command::Comment(comment.trim().to_string()));
    }

    let Some(first) = text.chars().next() else {
        return Ok(Command::Unknown(text.to_string()));
    };

    match first {
        'G' => parse_g_code(text),
        'M' => match split_number(&text[1..]) {
            Some((0..=2, "")) => Ok(Command::EndOfFile),
            _ => Ok(Command::Unknown(text.to_string())),
        },
        'D' => match split_number(&text[1..]) {
            Some((code, "")) if code >= 10 => Ok(Command::SelectAperture(code)),
            _ => parse_operation(text, None),
        },
        'X' | 'Y' | 'I' | 'J' => parse_operation(text, None),
        _ => Ok(Command::Unknown(text.to_string())),
    }
}

fn parse_g_code(text: &str) -> Result<Command, ContentError> {
    let Some((code, rest)) = split_number(&text[1..]) else {
        return Ok(Command::Unknown(text.to_string()));
    };

    let mode = match code {
        1 => Some(InterpolationMode::Linear),
        2 => Some(InterpolationMode::ClockwiseCircular),
        3 => Some(InterpolationMode::CounterclockwiseCircular),
        _ => None,
    };
    if let Some(mode) = mode {
        return match rest.is_empty() {
            true => Ok(Command::InterpolationMode(mode)),
            false => parse_operation(rest, Some(mode)),
        };
    }

    let command = match (code, rest) {
        (74, "") => Command::QuadrantMode(QuadrantMode::Single),
        (75, "") => Command::QuadrantMode(QuadrantMode::Multi),
        (36, "") => Command::RegionMode(true),
        (37, "") => Command::RegionMode(false),
        (70, "") => Command::Units(Units::Inches),
        (71, "") => Command::Units(Units::Millimeters),
        // G90/G91 duplicate the FS notation, which takes precedence
        (90, "") | (91, "") => Command::Attribute(text.to_string()),
        (54, rest) => match rest.strip_prefix('D').and_then(split_number) {
            Some((code, "")) if code >= 10 => Command::SelectAperture(code),
            _ => return Err(ContentError::Malformed(format!("invalid aperture selection: {:?}", text))),
        },
        // G55 'prepare for flash' has no effect
        (55, "") => Command::Attribute(text.to_string()),
        (55, rest) => return parse_operation(rest, None),
        _ => Command::Unknown(text.to_string()),
    };
    Ok(command)
}

/// Parse coordinate data followed by an optional D code, e.g. `X100Y-200I50J0D01`.
fn parse_operation(text: &str, mode: Option<InterpolationMode>) -> Result<Command, ContentError> {
    let malformed = |reason: &str| ContentError::Malformed(format!("{}, operation: {:?}", reason, text));

    let mut coordinates = Coordinates::default();
    let mut code = None;

    let mut rest = text;
    while let Some(letter) = rest.chars().next() {
        let body = &rest[letter.len_utf8()..];
        let value_length = body
            .find(|c: char| !(c.is_ascii_digit() || c == '-' || c == '+' || c == '.'))
            .unwrap_or(body.len());
        let value = &body[..value_length];
        rest = &body[value_length..];

        if value.is_empty() {
            return Err(malformed("missing value"));
        }

        let slot = match letter {
            'X' => &mut coordinates.x,
            'Y' => &mut coordinates.y,
            'I' => &mut coordinates.i,
            'J' => &mut coordinates.j,
            'D' => {
                if !rest.is_empty() {
                    return Err(malformed("D code must be last"));
                }
                code = Some(match value.parse::<u32>() {
                    Ok(1) => OperationCode::Interpolate,
                    Ok(2) => OperationCode::Move,
                    Ok(3) => OperationCode::Flash,
                    _ => return Err(malformed("invalid operation code")),
                });
                continue;
            }
            _ => return Err(malformed("unexpected character")),
        };
        if slot.is_some() {
            return Err(malformed("duplicate coordinate"));
        }
        *slot = Some(value.to_string());
    }

    if coordinates.is_empty() && code.is_none() {
        return Err(malformed("empty operation"));
    }

    Ok(Command::Operation(Operation {
        mode,
        coordinates,
        code,
    }))
}

/// Split a leading unsigned decimal number from the rest of the text, e.g. `54D10` -> `(54, "D10")`.
fn split_number(text: &str) -> Option<(i32, &str)> {
    let digits = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let number = text[..digits].parse().ok()?;
    Some((number, &text[digits..]))
}
