//! The plotter state machine.
//!
//! Consumes raw commands in file order, keeps the plotter state, and emits primitives into the stream and the extent
//! accumulator. Problems with individual commands are recorded as diagnostics, only a missing or invalid format or unit
//! declaration (and, in strict mode, an aperture problem) aborts.

use log::{debug, trace, warn};
use nalgebra::Point2;

use crate::aperture::{Aperture, ApertureShape, ApertureTable};
use crate::arc::{resolve_arc, ArcRequest, QuadrantMode};
use crate::command::{parse_command, Command, ContentError, Coordinates, InterpolationMode, Operation, OperationCode};
use crate::diagnostics::{Diagnostic, DiagnosticKind, ParseOptions, ParseSummary};
use crate::error::GerberError;
use crate::extents::{ExtentAccumulator, Extents};
use crate::format::{CoordinateFormat, FormatError, Notation, Units};
use crate::primitive::{
    ArcGerberPrimitive, Contour, ContourEdge, FlashGerberPrimitive, GerberPrimitive, PrimitiveStream,
    RegionGerberPrimitive, SegmentGerberPrimitive,
};
use crate::tokenizer::{RawCommand, TokenizeError};
use crate::types::{Exposure, Position, Vector, Winding};

#[derive(Debug, Clone)]
pub struct PlotterState {
    /// Current point, in file units.
    pub position: Position,
    /// Selected D-code, which may not resolve to a defined aperture.
    pub aperture: Option<i32>,
    pub interpolation_mode: InterpolationMode,
    pub quadrant_mode: QuadrantMode,
    pub units: Option<Units>,
    pub format: Option<CoordinateFormat>,
    pub exposure: Exposure,
    /// Operation code of the previous operation, re-used by deprecated operations without a D code.
    pub last_operation: Option<OperationCode>,
    /// Set by the first coordinate operation, after which the units can no longer change.
    pub drawing_started: bool,
    pub end_of_file: bool,
    region: Option<RegionBuilder>,
}

impl Default for PlotterState {
    fn default() -> Self {
        Self {
            position: Point2::origin(),
            aperture: None,
            interpolation_mode: InterpolationMode::default(),
            quadrant_mode: QuadrantMode::default(),
            units: None,
            format: None,
            exposure: Exposure::default(),
            last_operation: None,
            drawing_started: false,
            end_of_file: false,
            region: None,
        }
    }
}

impl PlotterState {
    pub fn in_region(&self) -> bool {
        self.region.is_some()
    }
}

#[derive(Debug, Clone, Default)]
struct RegionBuilder {
    contours: Vec<Contour>,
    current: Option<Contour>,
}

impl RegionBuilder {
    fn move_to(&mut self, position: Position) {
        self.close_contour();
        self.current = Some(Contour::new(position));
    }

    fn add_edge(&mut self, from: Position, edge: ContourEdge) {
        self.current
            .get_or_insert_with(|| Contour::new(from))
            .edges
            .push(edge);
    }

    fn close_contour(&mut self) {
        if let Some(contour) = self.current.take() {
            if !contour.edges.is_empty() {
                self.contours.push(contour);
            }
        }
    }

    fn build(mut self, exposure: Exposure) -> Option<RegionGerberPrimitive> {
        self.close_contour();
        match self.contours.is_empty() {
            true => None,
            false => Some(RegionGerberPrimitive {
                contours: self.contours,
                exposure,
            }),
        }
    }
}

/// The result of interpreting a complete file.
#[derive(Debug, Clone)]
pub struct InterpreterOutput {
    pub primitives: PrimitiveStream,
    pub extents: Extents,
    pub units: Option<Units>,
    pub summary: ParseSummary,
    /// Empty unless [`ParseOptions::verbose`] is set.
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug)]
pub struct Interpreter {
    options: ParseOptions,
    state: PlotterState,
    apertures: ApertureTable,
    primitives: PrimitiveStream,
    extents: ExtentAccumulator,
    summary: ParseSummary,
    diagnostics: Vec<Diagnostic>,
}

impl Interpreter {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            state: PlotterState::default(),
            apertures: ApertureTable::default(),
            primitives: PrimitiveStream::default(),
            extents: ExtentAccumulator::default(),
            summary: ParseSummary::default(),
            diagnostics: vec![],
        }
    }

    pub fn state(&self) -> &PlotterState {
        &self.state
    }

    pub fn apertures(&self) -> &ApertureTable {
        &self.apertures
    }

    /// True once an end-of-file command has been interpreted.
    pub fn is_finished(&self) -> bool {
        self.state.end_of_file
    }

    /// Interpret one item from the tokenizer.
    pub fn interpret(&mut self, item: Result<RawCommand, TokenizeError>) -> Result<(), GerberError> {
        self.summary.commands += 1;

        let raw = match item {
            Ok(raw) => raw,
            Err(error) => {
                let TokenizeError::Unterminated {
                    line,
                    text,
                } = &error;
                let (line, text) = (*line, text.clone());
                self.record(line, &text, error.into());
                return Ok(());
            }
        };

        let command = match parse_command(&raw) {
            Ok(command) => command,
            Err(ContentError::Format(cause)) => {
                return Err(GerberError::InvalidDeclaration {
                    line: raw.line,
                    cause,
                })
            }
            Err(error) => {
                self.record(raw.line, &raw.text, error.into());
                return Ok(());
            }
        };
        trace!("line: {}, command: {:?}", raw.line, command);

        self.execute(&raw, command)
    }

    fn execute(&mut self, raw: &RawCommand, command: Command) -> Result<(), GerberError> {
        match command {
            Command::FormatSpecification(format) => {
                debug!("coordinate format: {:?}", format);
                self.state.format = Some(format);
            }
            Command::Units(units) => self.declare_units(raw, units),
            Command::ApertureDefinition(definition) => {
                if let Err(error) = self.apertures.define(&definition) {
                    self.record(raw.line, &raw.text, error.into());
                }
            }
            Command::SelectAperture(code) => self.select_aperture(raw, code)?,
            Command::InterpolationMode(mode) => {
                debug!("interpolation mode: {:?}", mode);
                self.state.interpolation_mode = mode;
            }
            Command::QuadrantMode(mode) => {
                debug!("quadrant mode: {:?}", mode);
                self.state.quadrant_mode = mode;
            }
            Command::Polarity(exposure) => {
                debug!("polarity: {:?}", exposure);
                self.state.exposure = exposure;
            }
            Command::Operation(operation) => self.operate(raw, operation)?,
            Command::RegionMode(true) => {
                if self.state.region.is_some() {
                    debug!("region start inside a region, ignored. line: {}", raw.line);
                } else {
                    self.state.region = Some(RegionBuilder::default());
                }
            }
            Command::RegionMode(false) => self.end_region(),
            Command::Comment(comment) => trace!("comment: {}", comment),
            Command::Attribute(attribute) => trace!("attribute: {}", attribute),
            Command::EndOfFile => {
                debug!("end of file. line: {}", raw.line);
                self.end_region();
                self.state.end_of_file = true;
            }
            Command::Unsupported(_) => self.record(raw.line, &raw.text, DiagnosticKind::Unsupported),
            Command::Unknown(_) => self.record(raw.line, &raw.text, DiagnosticKind::Unrecognized),
        }
        Ok(())
    }

    fn declare_units(&mut self, raw: &RawCommand, units: Units) {
        match self.state.units {
            Some(current) if current != units && self.state.drawing_started => {
                self.record(raw.line, &raw.text, DiagnosticKind::UnitChangeIgnored {
                    current,
                    requested: units,
                });
            }
            _ => {
                debug!("units: {:?}", units);
                self.state.units = Some(units);
            }
        }
    }

    fn select_aperture(&mut self, raw: &RawCommand, code: i32) -> Result<(), GerberError> {
        if self.apertures.get(code).is_none() {
            if self.options.strict {
                return Err(GerberError::UnresolvedAperture {
                    line: raw.line,
                    code,
                });
            }
            // reported when the aperture is used
            debug!("selected undefined aperture. line: {}, code: {}", raw.line, code);
        }
        self.state.aperture = Some(code);
        Ok(())
    }

    fn require_declarations(&self, line: usize) -> Result<CoordinateFormat, GerberError> {
        let format = self
            .state
            .format
            .ok_or(GerberError::MissingFormat {
                line,
            })?;
        self.state
            .units
            .ok_or(GerberError::MissingUnits {
                line,
            })?;
        Ok(format)
    }

    fn operate(&mut self, raw: &RawCommand, operation: Operation) -> Result<(), GerberError> {
        let format = self.require_declarations(raw.line)?;
        self.state.drawing_started = true;

        if let Some(mode) = operation.mode {
            self.state.interpolation_mode = mode;
        }

        let Some(code) = operation
            .code
            .or(self.state.last_operation)
        else {
            let error = ContentError::Malformed("operation without D code".to_string());
            self.record(raw.line, &raw.text, error.into());
            return Ok(());
        };

        let (target, offset) = match self.resolve_coordinates(&format, &operation.coordinates) {
            Ok(result) => result,
            Err(error) => {
                self.record(raw.line, &raw.text, ContentError::from(error).into());
                return Ok(());
            }
        };

        let from = self.state.position;
        let tolerance = self.options.arc_tolerance * format.resolution();

        match code {
            OperationCode::Move => {
                if let Some(region) = self.state.region.as_mut() {
                    region.move_to(target);
                }
            }
            OperationCode::Interpolate if self.state.in_region() => {
                let edge = match self.build_arc(raw, from, target, offset, 0.0, tolerance) {
                    Some(arc) => ContourEdge::Arc(arc),
                    None => ContourEdge::Line {
                        to: target,
                    },
                };
                if let Some(region) = self.state.region.as_mut() {
                    region.add_edge(from, edge);
                }
            }
            OperationCode::Interpolate => {
                if let Some(aperture) = self.active_aperture(raw)? {
                    let width = aperture.shape.stroke_width();
                    let primitive = match self.build_arc(raw, from, target, offset, width, tolerance) {
                        Some(arc) => GerberPrimitive::Arc(arc),
                        None => GerberPrimitive::Segment(self.build_segment(from, target, width)),
                    };
                    self.emit(primitive);
                }
            }
            OperationCode::Flash if self.state.in_region() => {
                self.record(raw.line, &raw.text, DiagnosticKind::FlashInRegion);
            }
            OperationCode::Flash => {
                if let Some(aperture) = self.active_aperture(raw)? {
                    let primitive = GerberPrimitive::Flash(self.build_flash(aperture.shape, target));
                    self.emit(primitive);
                }
            }
        }

        self.state.position = target;
        self.state.last_operation = Some(code);
        Ok(())
    }

    /// Converts the coordinates of an operation, returning the target point and the arc center offset.
    fn resolve_coordinates(
        &self,
        format: &CoordinateFormat,
        coordinates: &Coordinates,
    ) -> Result<(Position, Vector), FormatError> {
        let value = |raw: &Option<String>| {
            raw.as_deref()
                .map(|raw| format.parse_coordinate(raw))
                .transpose()
        };

        let (x, y) = (value(&coordinates.x)?, value(&coordinates.y)?);
        let offset = Vector::new(
            value(&coordinates.i)?.unwrap_or(0.0),
            value(&coordinates.j)?.unwrap_or(0.0),
        );

        let position = self.state.position;
        let target = match format.notation {
            // omitted coordinates keep their previous value
            Notation::Absolute => Point2::new(x.unwrap_or(position.x), y.unwrap_or(position.y)),
            Notation::Incremental => Point2::new(position.x + x.unwrap_or(0.0), position.y + y.unwrap_or(0.0)),
        };

        Ok((target, offset))
    }

    /// The aperture used by a D01/D03, or `None` after recording why there is none.
    fn active_aperture(&mut self, raw: &RawCommand) -> Result<Option<Aperture>, GerberError> {
        let Some(code) = self.state.aperture else {
            if self.options.strict {
                return Err(GerberError::MissingAperture {
                    line: raw.line,
                });
            }
            self.record(raw.line, &raw.text, DiagnosticKind::MissingAperture);
            return Ok(None);
        };

        match self.apertures.get(code) {
            Some(aperture) => Ok(Some(aperture.clone())),
            None => {
                if self.options.strict {
                    return Err(GerberError::UnresolvedAperture {
                        line: raw.line,
                        code,
                    });
                }
                self.record(raw.line, &raw.text, DiagnosticKind::UnresolvedAperture(code));
                Ok(None)
            }
        }
    }

    /// Resolve an arc for the current interpolation mode.
    ///
    /// Returns `None` in linear mode, and after recording a diagnostic when the arc could not be resolved, in which
    /// case the caller draws a straight line instead.
    #[cfg_attr(feature = "profile-primitives", profiling::function)]
    fn build_arc(
        &mut self,
        raw: &RawCommand,
        from: Position,
        to: Position,
        offset: Vector,
        width: f64,
        tolerance: f64,
    ) -> Option<ArcGerberPrimitive> {
        let winding = match self.state.interpolation_mode {
            InterpolationMode::Linear => return None,
            InterpolationMode::ClockwiseCircular => Winding::Clockwise,
            InterpolationMode::CounterclockwiseCircular => Winding::CounterClockwise,
        };

        let request = ArcRequest {
            from,
            to,
            offset,
            winding,
            quadrant_mode: self.state.quadrant_mode,
            width,
            exposure: self.state.exposure,
            tolerance,
        };

        match resolve_arc(&request) {
            Ok(arc) => Some(arc),
            Err(error) => {
                self.record(raw.line, &raw.text, error.into());
                None
            }
        }
    }

    #[cfg_attr(feature = "profile-primitives", profiling::function)]
    fn build_segment(&self, from: Position, to: Position, width: f64) -> SegmentGerberPrimitive {
        SegmentGerberPrimitive {
            from,
            to,
            width,
            exposure: self.state.exposure,
        }
    }

    #[cfg_attr(feature = "profile-primitives", profiling::function)]
    fn build_flash(&self, shape: ApertureShape, center: Position) -> FlashGerberPrimitive {
        FlashGerberPrimitive {
            shape,
            center,
            exposure: self.state.exposure,
        }
    }

    fn end_region(&mut self) {
        let Some(region) = self.state.region.take() else {
            return;
        };
        match region.build(self.state.exposure) {
            Some(primitive) => self.emit(GerberPrimitive::Region(primitive)),
            None => debug!("region without edges, ignored"),
        }
    }

    fn emit(&mut self, primitive: GerberPrimitive) {
        trace!("primitive: {:?}", primitive);
        self.extents.observe(&primitive);
        self.primitives.push(primitive);
    }

    fn record(&mut self, line: usize, command: &str, kind: DiagnosticKind) {
        if kind.is_unrecognized() {
            self.summary.unrecognized += 1;
        } else if kind.skips_command() {
            self.summary.skipped += 1;
        }

        let diagnostic = Diagnostic {
            line,
            command: command.to_string(),
            kind,
        };

        match self.options.verbose {
            true => {
                warn!("{}", diagnostic);
                self.diagnostics.push(diagnostic);
            }
            false => debug!("{}", diagnostic),
        }
    }

    /// Finish interpretation, closing any open region and converting the extents to millimeters.
    pub fn finish(mut self) -> InterpreterOutput {
        if self.state.in_region() {
            debug!("region still open at end of input, closing");
            self.end_region();
        }

        let units = self.state.units;
        // with no declared units nothing can have been drawn, so the extents are empty either way
        let extents = self
            .extents
            .finalize(units.unwrap_or(Units::Millimeters));

        InterpreterOutput {
            primitives: self.primitives,
            extents,
            units,
            summary: self.summary,
            diagnostics: self.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use rstest::rstest;

    use super::*;
    use crate::tokenizer::tokenize;

    fn interpret(source: &str, options: ParseOptions) -> Result<InterpreterOutput, GerberError> {
        let mut interpreter = Interpreter::new(options);
        for item in tokenize(source) {
            if interpreter.is_finished() {
                break;
            }
            interpreter.interpret(item)?;
        }
        Ok(interpreter.finish())
    }

    fn verbose() -> ParseOptions {
        ParseOptions::default().with_verbose(true)
    }

    const HEADER: &str = "%FSLAX46Y46*%\n%MOMM*%\n%ADD10C,0.5*%\n";

    #[test]
    fn test_move_draw_flash() {
        // given
        let source = format!("{}D10*\nX0Y0D02*\nX1000000Y0D01*\nX2000000Y1000000D03*\nM02*\n", HEADER);

        // when
        let output = interpret(&source, verbose()).unwrap();

        // then
        assert_eq!(output.primitives.len(), 2);
        assert_eq!(
            output.primitives[0],
            GerberPrimitive::Segment(SegmentGerberPrimitive {
                from: Point2::new(0.0, 0.0),
                to: Point2::new(1.0, 0.0),
                width: 0.5,
                exposure: Exposure::Add,
            })
        );
        assert_eq!(
            output.primitives[1],
            GerberPrimitive::Flash(FlashGerberPrimitive {
                shape: crate::aperture::ApertureShape::Circle {
                    diameter: 0.5
                },
                center: Point2::new(2.0, 1.0),
                exposure: Exposure::Add,
            })
        );
        assert!(output.diagnostics.is_empty());
        assert_eq!(output.summary.commands, 8);
        assert!(output.summary.all_recognized());
    }

    #[test]
    fn test_modal_coordinates_and_deprecated_operations() {
        // given
        let source = format!("{}G54D10*\nG01X0Y0D02*\nX1000000D01*\nY1000000*\nD2*\nX0Y0D1*\n", HEADER);

        // when
        let output = interpret(&source, verbose()).unwrap();

        // then
        let ends = output
            .primitives
            .iter()
            .map(|primitive| match primitive {
                GerberPrimitive::Segment(segment) => (segment.from, segment.to),
                _ => panic!("expected segment"),
            })
            .collect::<Vec<_>>();
        assert_eq!(ends, vec![
            (Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)),
            (Point2::new(1.0, 0.0), Point2::new(1.0, 1.0)),
            (Point2::new(1.0, 1.0), Point2::new(0.0, 0.0)),
        ]);
    }

    #[test]
    fn test_incremental_notation() {
        let source = "%FSLIX24Y24*%\n%MOIN*%\n%ADD10C,0.01*%\nD10*\nX0100Y0100D02*\nX0100D01*\nY-0050D01*\n";

        let output = interpret(source, verbose()).unwrap();

        let ends = output
            .primitives
            .iter()
            .filter_map(|primitive| match primitive {
                GerberPrimitive::Segment(segment) => Some(segment.to),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(ends, vec![Point2::new(0.02, 0.01), Point2::new(0.02, 0.005)]);
    }

    #[rstest]
    #[case("%MOMM*%\nX0Y0D02*\n", GerberError::MissingFormat { line: 2 })]
    #[case("%FSLAX46Y46*%\nD03*\n", GerberError::MissingUnits { line: 2 })]
    #[case("G04 no units*\n%FSLAX46Y46*%\nX0Y0D02*\n", GerberError::MissingUnits { line: 3 })]
    fn test_operation_before_declarations_is_fatal(#[case] source: &str, #[case] expected: GerberError) {
        assert_eq!(interpret(source, ParseOptions::default()).unwrap_err(), expected);
    }

    #[rstest]
    #[case("%FSLAX99Y99*%\n")]
    #[case("%FSLAX46Y46*%\n%MOFT*%\n")]
    fn test_invalid_declaration_is_fatal(#[case] source: &str) {
        assert!(matches!(
            interpret(source, ParseOptions::default()),
            Err(GerberError::InvalidDeclaration { .. })
        ));
    }

    #[test]
    fn test_declarations_without_operations_are_not_fatal() {
        let output = interpret("%MOMM*%\nG04 nothing here*\nM02*\n", ParseOptions::default()).unwrap();

        assert!(output.primitives.is_empty());
        assert_eq!(output.extents, Extents::Empty);
    }

    #[test]
    fn test_unresolved_aperture_is_recoverable() {
        // given
        let source = format!("{}D11*\nX0Y0D02*\nX1000000Y0D01*\nD10*\nX2000000Y0D01*\n", HEADER);

        // when
        let output = interpret(&source, verbose()).unwrap();

        // then
        assert_eq!(output.primitives.len(), 1);
        assert_eq!(output.summary.skipped, 1);
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].kind, DiagnosticKind::UnresolvedAperture(11));
        assert_eq!(output.diagnostics[0].line, 6);
        // the skipped draw still moved the current point
        let GerberPrimitive::Segment(segment) = &output.primitives[0] else {
            panic!("expected segment");
        };
        assert_eq!(segment.from, Point2::new(1.0, 0.0));
    }

    #[test]
    fn test_unresolved_aperture_is_fatal_when_strict() {
        let source = format!("{}D11*\nX0Y0D02*\n", HEADER);

        let result = interpret(&source, ParseOptions::default().with_strict(true));

        assert_eq!(result.unwrap_err(), GerberError::UnresolvedAperture {
            line: 4,
            code: 11
        });
    }

    #[test]
    fn test_missing_aperture() {
        let source = format!("{}X0Y0D03*\n", HEADER);

        let output = interpret(&source, verbose()).unwrap();
        assert!(output.primitives.is_empty());
        assert_eq!(output.diagnostics[0].kind, DiagnosticKind::MissingAperture);

        let result = interpret(&source, ParseOptions::default().with_strict(true));
        assert_eq!(result.unwrap_err(), GerberError::MissingAperture {
            line: 4
        });
    }

    #[test]
    fn test_quiet_mode_keeps_counts_only() {
        let source = format!("{}D10*\nG99*\n%SRX2Y2I1J1*%\nX1Y1Q1D01*\n", HEADER);

        let output = interpret(&source, ParseOptions::default()).unwrap();

        assert!(output.diagnostics.is_empty());
        assert_eq!(output.summary.unrecognized, 2);
        assert_eq!(output.summary.skipped, 1);
        assert_eq!(output.summary.to_string(), "7 commands, 2 unrecognized, 1 skipped");
    }

    #[test]
    fn test_multi_quadrant_arc() {
        // given
        let source = format!("{}D10*\nG75*\nX1000000Y0D02*\nG03X0Y1000000I-1000000J0D01*\n", HEADER);

        // when
        let output = interpret(&source, verbose()).unwrap();

        // then
        let GerberPrimitive::Arc(arc) = &output.primitives[0] else {
            panic!("expected arc");
        };
        assert_eq!(arc.center, Point2::new(0.0, 0.0));
        assert_eq!(arc.radius, 1.0);
        assert_eq!(arc.start_angle, 0.0);
        assert!((arc.end_angle - FRAC_PI_2).abs() < 1e-12);
        assert_eq!(arc.winding, Winding::CounterClockwise);
        assert_eq!(arc.width, 0.5);
    }

    #[test]
    fn test_inconsistent_arc_falls_back_to_segment() {
        let source = format!("{}D10*\nG75*\nX1000000Y0D02*\nG02X0Y3000000I-1000000J0D01*\nX0Y0D01*\n", HEADER);

        let output = interpret(&source, verbose()).unwrap();

        assert_eq!(output.primitives.len(), 2);
        assert!(matches!(&output.primitives[0], GerberPrimitive::Segment(segment) if segment.to == Point2::new(0.0, 3.0)));
        assert!(matches!(
            output.diagnostics[0].kind,
            DiagnosticKind::Arc(crate::arc::ArcError::RadiusMismatch { .. })
        ));
        // drawn, so not counted as skipped
        assert_eq!(output.summary.skipped, 0);
    }

    #[test]
    fn test_region() {
        // given
        let source = format!(
            "{}G36*\nX0Y0D02*\nG01X1000000Y0D01*\nY1000000D01*\nX0D01*\nY0D01*\nX5000000Y5000000D03*\nG37*\n",
            HEADER
        );

        // when
        let output = interpret(&source, verbose()).unwrap();

        // then
        assert_eq!(output.primitives.len(), 1);
        let GerberPrimitive::Region(region) = &output.primitives[0] else {
            panic!("expected region");
        };
        assert_eq!(region.contours.len(), 1);
        assert_eq!(region.contours[0].edges.len(), 4);
        assert!(region.contours[0].is_closed(1e-9));
        assert_eq!(output.diagnostics[0].kind, DiagnosticKind::FlashInRegion);
        assert_eq!(
            output.extents,
            Extents::Bounded(crate::geometry::BoundingBox::new(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)))
        );
    }

    #[test]
    fn test_polarity() {
        let source = format!("{}D10*\n%LPC*%\nX0Y0D03*\n%LPD*%\nX0Y0D03*\n", HEADER);

        let output = interpret(&source, verbose()).unwrap();

        let exposures = output
            .primitives
            .iter()
            .map(GerberPrimitive::exposure)
            .collect::<Vec<_>>();
        assert_eq!(exposures, vec![Exposure::CutOut, Exposure::Add]);
    }

    #[test]
    fn test_unit_change_after_drawing_is_ignored() {
        // given
        let source = format!("{}D10*\nX1000000Y0D03*\nG70*\n", HEADER);

        // when
        let output = interpret(&source, verbose()).unwrap();

        // then
        assert_eq!(output.units, Some(Units::Millimeters));
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].line, 6);
        assert_eq!(output.diagnostics[0].command, "G70");
        assert_eq!(
            output.diagnostics[0].kind,
            DiagnosticKind::UnitChangeIgnored {
                current: Units::Millimeters,
                requested: Units::Inches,
            }
        );
        assert_eq!(output.summary.skipped, 1);
    }

    #[test]
    fn test_unit_change_after_drawing_is_counted_in_quiet_mode() {
        // given
        let source = format!("{}D10*\nX1000000Y0D03*\n%MOIN*%\n", HEADER);

        // when
        let output = interpret(&source, ParseOptions::default()).unwrap();

        // then
        assert_eq!(output.units, Some(Units::Millimeters));
        assert!(output.diagnostics.is_empty());
        assert_eq!(output.summary.skipped, 1);
        assert_eq!(output.summary.unrecognized, 0);
    }

    #[test]
    fn test_repeated_units_after_drawing_are_accepted() {
        // given
        let source = format!("{}D10*\nX1000000Y0D03*\nG71*\n", HEADER);

        // when
        let output = interpret(&source, verbose()).unwrap();

        // then
        assert_eq!(output.units, Some(Units::Millimeters));
        assert!(output.diagnostics.is_empty());
        assert_eq!(output.summary.skipped, 0);
    }
}
