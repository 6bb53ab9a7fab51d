use log::{debug, error, info};
use rayon::prelude::*;

use crate::diagnostics::{Diagnostic, ParseOptions, ParseSummary};
use crate::error::{GerberError, LayerError};
use crate::extents::Extents;
use crate::format::Units;
use crate::geometry::BoundingBox;
use crate::interpreter::Interpreter;
use crate::primitive::{GerberPrimitive, PrimitiveStream};
use crate::tokenizer::tokenize;

/// The geometry of one Gerber file.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GerberLayer {
    primitives: PrimitiveStream,
    extents: Extents,
    units: Option<Units>,
    summary: ParseSummary,
    #[cfg_attr(feature = "serde", serde(skip))]
    diagnostics: Vec<Diagnostic>,
}

impl GerberLayer {
    /// Interpret the complete text of a Gerber file.
    ///
    /// Problems with individual commands are recoverable and reported via [`GerberLayer::summary`] and, in verbose
    /// mode, [`GerberLayer::diagnostics`].
    #[profiling::function]
    pub fn parse(source: &str, options: &ParseOptions) -> Result<Self, GerberError> {
        if source.trim().is_empty() {
            error!("{}", GerberError::EmptyInput);
            return Err(GerberError::EmptyInput);
        }

        let mut interpreter = Interpreter::new(*options);
        let mut tokens = tokenize(source);
        for item in tokens.by_ref() {
            if let Err(cause) = interpreter.interpret(item) {
                error!("{}", cause);
                return Err(cause);
            }
            if interpreter.is_finished() {
                break;
            }
        }

        let ignored = tokens.count();
        if ignored > 0 {
            debug!("ignored commands after end of file. count: {}", ignored);
        }

        let output = interpreter.finish();
        info!("layer_primitives: {}", output.primitives.len());
        info!("{}", output.summary);

        Ok(Self {
            primitives: output.primitives,
            extents: output.extents,
            units: output.units,
            summary: output.summary,
            diagnostics: output.diagnostics,
        })
    }

    pub fn primitives(&self) -> &PrimitiveStream {
        &self.primitives
    }

    /// Extents in millimeters.
    pub fn extents(&self) -> &Extents {
        &self.extents
    }

    /// The declared units, which are also the units of the primitives' coordinates.
    pub fn units(&self) -> Option<Units> {
        self.units
    }

    pub fn summary(&self) -> &ParseSummary {
        &self.summary
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// It's possible to have a gerber file with no primitives
    pub fn is_empty(&self) -> bool {
        self.extents.is_empty()
    }

    /// Return the bounding box, in millimeters, if the gerber file resulted in primitives which need drawing.
    pub fn try_bounding_box(&self) -> Option<&BoundingBox> {
        self.extents.bounding_box()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GerberPrimitive> {
        self.primitives.iter()
    }
}

/// A named layer of a [`LayerSet`].
#[derive(Clone, Debug)]
pub struct NamedLayer {
    pub name: String,
    pub layer: GerberLayer,
}

/// Several layers of the same board, e.g. copper and silkscreen, parsed independently.
#[derive(Clone, Debug, Default)]
pub struct LayerSet {
    layers: Vec<NamedLayer>,
    extents: Extents,
}

impl LayerSet {
    /// Parse `(name, source)` pairs in parallel, the first fatal error is returned with the name of its file.
    #[profiling::function]
    pub fn parse<N, S>(sources: &[(N, S)], options: &ParseOptions) -> Result<Self, LayerError>
    where
        N: AsRef<str> + Sync,
        S: AsRef<str> + Sync,
    {
        let layers = sources
            .par_iter()
            .map(|(name, source)| {
                let name = name.as_ref().to_string();
                debug!("parsing layer: {}", name);
                match GerberLayer::parse(source.as_ref(), options) {
                    Ok(layer) => Ok(NamedLayer {
                        name,
                        layer,
                    }),
                    Err(source) => Err(LayerError {
                        name,
                        source,
                    }),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        // join point, the board extents need every layer
        let extents = layers
            .iter()
            .fold(Extents::Empty, |extents, named| {
                extents.union(named.layer.extents())
            });
        info!("layers: {}, extents: {:?}", layers.len(), extents);

        Ok(Self {
            layers,
            extents,
        })
    }

    pub fn layers(&self) -> &[NamedLayer] {
        &self.layers
    }

    pub fn get(&self, name: &str) -> Option<&GerberLayer> {
        self.layers
            .iter()
            .find(|named| named.name == name)
            .map(|named| &named.layer)
    }

    /// Combined extents of every layer, in millimeters.
    pub fn extents(&self) -> &Extents {
        &self.extents
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
