//! Rendering of resolved types to TypeScript source text.
//!
//! The [`Renderer`] trait is the templating seam: the orchestrator computes
//! every text fragment (mapped type names, import paths, enum values) and
//! the renderer only arranges them, re-inserting preserved zones into their
//! fixed slots.

mod typescript;
mod writer;

use indexmap::IndexMap;
use typeport_model::ExportShape;

use crate::{PreservedZone, Result};

pub use typescript::TypeScriptRenderer;
pub use writer::{CodeWriter, Indent};

/// Tag of the zone slotted between the imports and the declaration.
pub const CUSTOM_HEAD: &str = "custom-head";

/// Tag of the zone slotted at the end of a class/interface body.
pub const CUSTOM_BODY: &str = "custom-body";

/// Tag of the zone holding one service method's body.
pub fn method_zone_tag(method: &str) -> String {
    format!("custom-method-{method}")
}

/// A property line, fully mapped to TypeScript text fragments.
#[derive(Debug, Clone)]
pub struct FieldLine {
    pub name: String,
    pub ty: String,
    /// Doc text from a `doc` annotation, emitted as a comment.
    pub doc: Option<String>,
    pub optional: bool,
    pub readonly: bool,
    pub is_static: bool,
    pub default: Option<String>,
}

/// A service method signature with mapped parameter and return names.
#[derive(Debug, Clone)]
pub struct MethodLine {
    pub name: String,
    pub params: Vec<(String, String)>,
    pub returns: String,
}

/// An enum variant with its already-formatted value literal.
#[derive(Debug, Clone)]
pub struct VariantLine {
    pub name: String,
    pub value: String,
}

/// One named import from a sibling module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportLine {
    pub name: String,
    pub from: String,
}

/// Everything the renderer needs for one output file.
#[derive(Debug)]
pub struct RenderUnit {
    pub shape: ExportShape,
    /// Mapped TypeScript type name.
    pub name: String,
    /// Doc text from the type's `doc` annotation.
    pub doc: Option<String>,
    pub generics: Vec<String>,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub fields: Vec<FieldLine>,
    pub methods: Vec<MethodLine>,
    pub variants: Vec<VariantLine>,
    pub imports: Vec<ImportLine>,
    /// Zones extracted from the previous generation of this file.
    pub zones: IndexMap<String, PreservedZone>,
}

/// Turns a render unit into final file content.
///
/// Implementations must be deterministic: the same unit renders to
/// byte-identical output, and preserved zone content reappears verbatim
/// between the same markers.
pub trait Renderer: Send + Sync {
    fn render(&self, unit: &RenderUnit) -> Result<String>;
}
