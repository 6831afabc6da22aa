//! TypeScript generation pipeline: closure resolution, name mapping,
//! custom-region preservation, rendering, and barrel emission.
//!
//! The entry point is [`Generator`], driven by export requests against a
//! [`typeport_model::MetadataProvider`].

mod barrel;
mod diagnostic;
mod error;
mod mapper;
mod naming;
mod orchestrator;
mod regions;
mod render;
mod resolver;

pub use barrel::{barrel_content, scan_dir};
pub use diagnostic::{Diagnostic, Severity};
pub use error::{GenerateError, Result};
pub use mapper::{TypeCategory, TypeNameMapper};
pub use naming::{NamingConvention, TYPESCRIPT_NAMING};
pub use orchestrator::{GenerateOptions, GenerationResult, Generator};
pub use regions::{PreservedZone, begin_marker, end_marker, parse_zones, parse_zones_str};
pub use render::{
    CUSTOM_BODY, CUSTOM_HEAD, CodeWriter, FieldLine, ImportLine, Indent, MethodLine, RenderUnit,
    Renderer, TypeScriptRenderer, VariantLine, method_zone_tag,
};
pub use resolver::{ClosureEntry, ResolvedClosure, Resolver};
