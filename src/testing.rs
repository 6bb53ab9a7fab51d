use std::fmt::{Display, Formatter};

pub fn dump_gerber_source(source: &GerberSource) {
    println!("Gerber source:\n{}", source);
}

/// Builds the text of a Gerber file, one command per line.
///
/// Coordinates are given as the integer values written to the file, i.e. already scaled by the format.
#[derive(Debug, Clone, Default)]
pub struct GerberSource {
    lines: Vec<String>,
}

impl GerberSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// `%FS<format>*%` followed by `%MO<units>*%`, e.g. `("LAX46Y46", "MM")`.
    pub fn with_header(format: &str, units: &str) -> Self {
        Self::new()
            .extended(&format!("FS{}", format))
            .extended(&format!("MO{}", units))
    }

    /// Millimeters, 4.6 format.
    pub fn metric() -> Self {
        Self::with_header("LAX46Y46", "MM")
    }

    /// Inches, 2.4 format.
    pub fn imperial() -> Self {
        Self::with_header("LAX24Y24", "IN")
    }

    pub fn extended(mut self, command: &str) -> Self {
        self.lines
            .push(format!("%{}*%", command));
        self
    }

    pub fn command(mut self, command: &str) -> Self {
        self.lines
            .push(format!("{}*", command));
        self
    }

    /// Raw text, added without a terminator.
    pub fn raw(mut self, text: &str) -> Self {
        self.lines.push(text.to_string());
        self
    }

    pub fn comment(self, text: &str) -> Self {
        self.command(&format!("G04 {}", text))
    }

    /// e.g. `aperture(10, "C,0.5")`
    pub fn aperture(self, code: i32, definition: &str) -> Self {
        self.extended(&format!("ADD{}{}", code, definition))
    }

    pub fn select(self, code: i32) -> Self {
        self.command(&format!("D{}", code))
    }

    pub fn move_to(self, x: i64, y: i64) -> Self {
        self.command(&format!("X{}Y{}D02", x, y))
    }

    pub fn draw_to(self, x: i64, y: i64) -> Self {
        self.command(&format!("X{}Y{}D01", x, y))
    }

    pub fn arc_to(self, x: i64, y: i64, i: i64, j: i64) -> Self {
        self.command(&format!("X{}Y{}I{}J{}D01", x, y, i, j))
    }

    pub fn flash_at(self, x: i64, y: i64) -> Self {
        self.command(&format!("X{}Y{}D03", x, y))
    }

    pub fn end(self) -> Self {
        self.command("M02")
    }

    pub fn build(&self) -> String {
        self.to_string()
    }
}

impl Display for GerberSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
