//! Gerber (RS-274X) command interpreter.
//!
//! Turns the text of a Gerber layer file into an ordered stream of analytic primitives (segments, arcs, flashes,
//! regions) and the extents, in millimeters, needed to scale them onto a page.
//!
//! ```
//! use gerber_plotter::{GerberLayer, ParseOptions};
//!
//! let source = "%FSLAX46Y46*%\n%MOMM*%\n%ADD10C,0.5*%\nD10*\nX0Y0D02*\nX1000000Y0D01*\nM02*\n";
//! let layer = GerberLayer::parse(source, &ParseOptions::default()).unwrap();
//!
//! assert_eq!(layer.primitives().len(), 1);
//! assert_eq!(layer.extents().width(), 1.5);
//! ```

mod aperture;
mod arc;
mod command;
mod diagnostics;
mod error;
mod extents;
mod format;
mod geometry;
mod interpreter;
mod layer;
mod primitive;
mod tokenizer;
mod types;

pub use aperture::*;
pub use arc::*;
pub use command::*;
pub use diagnostics::*;
pub use error::*;
pub use extents::*;
pub use format::*;
pub use geometry::*;
pub use interpreter::*;
pub use layer::*;
pub use primitive::*;
pub use tokenizer::*;
pub use types::*;

#[cfg(feature = "testing")]
pub mod testing;
