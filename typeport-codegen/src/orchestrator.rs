//! The generation run: seed gathering, closure resolution, parallel
//! rendering, and barrel emission, in that order.
//!
//! Fatal errors abort the run and discard partial results; per-type render
//! failures are recorded as diagnostics and the remaining types still
//! generate (unless strict mode escalates them at the end).

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexMap;
use rayon::prelude::*;
use typeport_core::{DiskSink, FileSink};
use typeport_model::{
    EnumVariant, ExportRequest, ExportShape, MetadataProvider, Model, Registration, SpecRegistry,
    TypeKey, TypeSpec,
};

use crate::naming::{NamingConvention, TYPESCRIPT_NAMING};
use crate::render::{
    CUSTOM_BODY, CUSTOM_HEAD, FieldLine, ImportLine, MethodLine, RenderUnit, Renderer,
    TypeScriptRenderer, VariantLine, method_zone_tag,
};
use crate::resolver::{ClosureEntry, ResolvedClosure, Resolver, collect_ref_keys};
use crate::{Diagnostic, GenerateError, Result, TypeCategory, TypeNameMapper, barrel, regions};

/// Options for one generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Root directory all output paths are relative to.
    pub root: PathBuf,
    /// Escalate per-type render failures to a run failure.
    pub strict: bool,
    /// Emit a barrel file per output directory.
    pub index_files: bool,
    pub index_file_name: String,
    /// Output file extension, without the dot.
    pub extension: String,
}

impl GenerateOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            strict: false,
            index_files: true,
            index_file_name: "index.ts".to_string(),
            extension: "ts".to_string(),
        }
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn without_index_files(mut self) -> Self {
        self.index_files = false;
        self
    }
}

/// What a completed run produced. Paths are relative to the root, with
/// `/` separators.
#[derive(Debug)]
pub struct GenerationResult {
    pub type_files: Vec<String>,
    pub service_files: Vec<String>,
    pub index_files: Vec<String>,
    /// Total service methods rendered.
    pub method_count: usize,
    /// Configured barrel file name (`index.ts` unless overridden).
    pub index_file_name: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl GenerationResult {
    /// Every produced file path, sorted.
    pub fn all_files(&self) -> Vec<String> {
        let mut files: Vec<String> = self
            .type_files
            .iter()
            .chain(&self.service_files)
            .chain(&self.index_files)
            .cloned()
            .collect();
        files.sort();
        files
    }

    pub fn file_count(&self) -> usize {
        self.type_files.len() + self.service_files.len() + self.index_files.len()
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_warning())
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }
}

/// One planned output file.
struct RenderTask<'a> {
    key: &'a TypeKey,
    entry: &'a ClosureEntry,
    rel: String,
    abs: PathBuf,
}

enum Outcome {
    Rendered {
        is_service: bool,
        methods: usize,
        diagnostics: Vec<Diagnostic>,
    },
    Failed(Diagnostic),
    Fatal(GenerateError),
    Skipped,
}

/// Drives a full generation run against a metadata provider.
pub struct Generator {
    provider: Arc<dyn MetadataProvider>,
    mapper: TypeNameMapper,
    naming: NamingConvention,
    renderer: Box<dyn Renderer>,
    sinks: Vec<Arc<dyn FileSink>>,
    options: GenerateOptions,
}

impl Generator {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        primitives: IndexMap<String, String>,
        options: GenerateOptions,
    ) -> Self {
        let mapper = TypeNameMapper::new(Arc::clone(&provider), primitives);
        Self {
            provider,
            mapper,
            naming: TYPESCRIPT_NAMING,
            renderer: Box::new(TypeScriptRenderer::new()),
            sinks: vec![Arc::new(DiskSink)],
            options,
        }
    }

    /// Generator backed by a TOML model, using the model's primitive table.
    pub fn from_model(model: Arc<Model>, options: GenerateOptions) -> Self {
        let primitives = model.settings().primitives.clone();
        Self::new(model, primitives, options)
    }

    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Replace the default disk sink.
    pub fn with_sinks(mut self, sinks: Vec<Arc<dyn FileSink>>) -> Self {
        self.sinks = sinks;
        self
    }

    /// Run generation for the given export requests.
    pub fn run(&self, requests: &[ExportRequest]) -> Result<GenerationResult> {
        let mut diagnostics = Vec::new();

        let seeds = self.gather_seeds(requests, &mut diagnostics)?;
        let closure = Resolver::new(Arc::clone(&self.provider)).resolve(&seeds)?;
        let plan = self.plan(&closure)?;

        let abort = AtomicBool::new(false);
        let outcomes: Vec<Outcome> = plan
            .par_iter()
            .map(|task| {
                if abort.load(Ordering::Relaxed) {
                    return Outcome::Skipped;
                }
                match self.render_one(task, &closure) {
                    Ok((content, methods, diags)) => match self.write(task, &content) {
                        Ok(()) => Outcome::Rendered {
                            is_service: !task.entry.descriptor.methods.is_empty(),
                            methods,
                            diagnostics: diags,
                        },
                        Err(e) => {
                            abort.store(true, Ordering::Relaxed);
                            Outcome::Fatal(e)
                        }
                    },
                    Err(RenderFailure::PerType(diag)) => Outcome::Failed(diag),
                    Err(RenderFailure::Fatal(e)) => {
                        abort.store(true, Ordering::Relaxed);
                        Outcome::Fatal(e)
                    }
                }
            })
            .collect();

        let mut type_files = Vec::new();
        let mut service_files = Vec::new();
        let mut method_count = 0;
        let mut failed = 0;
        for (task, outcome) in plan.iter().zip(outcomes) {
            match outcome {
                Outcome::Rendered {
                    is_service,
                    methods,
                    diagnostics: diags,
                } => {
                    diagnostics.extend(diags);
                    method_count += methods;
                    if is_service {
                        service_files.push(task.rel.clone());
                    } else {
                        type_files.push(task.rel.clone());
                    }
                }
                Outcome::Failed(diag) => {
                    diagnostics.push(diag);
                    failed += 1;
                }
                Outcome::Fatal(e) => return Err(e),
                Outcome::Skipped => {}
            }
        }
        if self.options.strict && failed > 0 {
            return Err(GenerateError::Strict { failed });
        }

        let index_files = if self.options.index_files {
            self.emit_barrels(&plan)?
        } else {
            Vec::new()
        };

        Ok(GenerationResult {
            type_files,
            service_files,
            index_files,
            method_count,
            index_file_name: self.options.index_file_name.clone(),
            diagnostics,
        })
    }

    /// Register requested exports, then promote the complex types mentioned
    /// by service method signatures to seeds of their own, in the service's
    /// output directory.
    fn gather_seeds(
        &self,
        requests: &[ExportRequest],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<SpecRegistry> {
        if requests.is_empty() {
            return Err(GenerateError::NoSeeds);
        }

        let mut seeds = SpecRegistry::new();
        for request in requests {
            let outcome = seeds.register(request.key.clone(), request.spec.clone());
            if let Registration::Ignored { differs: true } = outcome {
                diagnostics.push(
                    Diagnostic::warning(
                        "seeds",
                        "conflicting duplicate export; the first registration wins",
                    )
                    .on(request.key.to_string()),
                );
            }
        }

        for request in requests {
            let descriptor = self
                .provider
                .describe(&request.key)
                .map_err(|e| GenerateError::metadata(&request.key, e))?;
            if descriptor.methods.is_empty() {
                continue;
            }

            let mut keys = Vec::new();
            for reference in descriptor.methods.iter().flat_map(|m| m.type_refs()) {
                collect_ref_keys(reference, &mut keys);
            }
            for key in keys {
                if self.mapper.classify(&key)? != TypeCategory::Complex {
                    continue;
                }
                let kind = self
                    .provider
                    .kind_of(&key)
                    .map_err(|e| GenerateError::metadata(&key, e))?;
                let mut spec = TypeSpec::in_dir(request.spec.output.clone());
                spec.shape = ExportShape::infer(kind);
                seeds.register(key, spec);
            }
        }
        Ok(seeds)
    }

    /// Assign output paths and reject collisions before any file is
    /// touched.
    fn plan<'a>(&self, closure: &'a ResolvedClosure) -> Result<Vec<RenderTask<'a>>> {
        let mut by_path: IndexMap<String, &TypeKey> = IndexMap::new();
        let mut plan = Vec::new();

        for (key, entry) in closure.materializable(&self.mapper)? {
            let stem = self.naming.file_name(key.short_name());
            let rel = join_rel(&entry.spec.output, &format!("{stem}.{}", self.options.extension));
            if let Some(first) = by_path.insert(rel.clone(), key) {
                return Err(GenerateError::DuplicateOutputPath {
                    first: (*first).clone(),
                    second: key.clone(),
                    path: PathBuf::from(rel),
                });
            }
            let abs = self.options.root.join(&rel);
            plan.push(RenderTask {
                key,
                entry,
                rel,
                abs,
            });
        }
        Ok(plan)
    }

    fn render_one(
        &self,
        task: &RenderTask<'_>,
        closure: &ResolvedClosure,
    ) -> std::result::Result<(String, usize, Vec<Diagnostic>), RenderFailure> {
        let (unit, diagnostics) = self.build_unit(task, closure).map_err(RenderFailure::Fatal)?;
        let methods = unit.methods.len();

        match self.renderer.render(&unit) {
            Ok(content) => Ok((content, methods, diagnostics)),
            Err(e) => Err(RenderFailure::PerType(
                Diagnostic::error("render", e.to_string()).on(task.key.to_string()),
            )),
        }
    }

    fn build_unit(
        &self,
        task: &RenderTask<'_>,
        closure: &ResolvedClosure,
    ) -> Result<(RenderUnit, Vec<Diagnostic>)> {
        let descriptor = &task.entry.descriptor;
        let shape = task
            .entry
            .spec
            .shape
            .or_else(|| ExportShape::infer(descriptor.kind))
            .unwrap_or(ExportShape::Class);

        let mut fields = Vec::new();
        for member in &descriptor.members {
            fields.push(FieldLine {
                name: self.naming.field_name(&member.name),
                ty: self.mapper.map_name(&member.ty, true)?,
                doc: member
                    .annotation("doc")
                    .and_then(|v| v.as_str())
                    .map(str::to_string),
                optional: member.is_optional,
                readonly: member.is_readonly,
                is_static: member.is_static,
                default: member.default.clone(),
            });
        }

        let mut methods = Vec::new();
        for method in &descriptor.methods {
            let params = method
                .params
                .iter()
                .map(|p| {
                    Ok((
                        self.naming.field_name(&p.name),
                        self.mapper.map_name(&p.ty, true)?,
                    ))
                })
                .collect::<Result<Vec<_>>>()?;
            let returns = match &method.returns {
                Some(reference) => self.mapper.map_name(reference, true)?,
                None => "void".to_string(),
            };
            methods.push(MethodLine {
                name: self.naming.field_name(&method.name),
                params,
                returns,
            });
        }

        // Export-spec annotations override the provider's.
        let mut annotations = self
            .provider
            .annotations(task.key)
            .map_err(|e| GenerateError::metadata(task.key, e))?;
        for (kind, value) in &task.entry.spec.annotations {
            annotations.insert(kind.clone(), value.clone());
        }
        let doc = annotations
            .get("doc")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let extends = descriptor
            .base
            .as_ref()
            .map(|base| self.naming.type_name(base.short_name()));
        let implements = descriptor
            .interfaces
            .iter()
            .map(|i| self.naming.type_name(i.short_name()))
            .collect();

        let mut tags = vec![CUSTOM_HEAD.to_string(), CUSTOM_BODY.to_string()];
        tags.extend(methods.iter().map(|m| method_zone_tag(&m.name)));
        let (zones, diagnostics) = regions::parse_zones(&task.abs, &tags);
        let diagnostics = diagnostics
            .into_iter()
            .map(|d| {
                if d.subject.is_none() {
                    d.on(task.rel.clone())
                } else {
                    d
                }
            })
            .collect();

        let unit = RenderUnit {
            shape,
            name: self.naming.type_name(task.key.short_name()),
            doc,
            generics: descriptor.generics.clone(),
            extends,
            implements,
            fields,
            methods,
            variants: variant_lines(&descriptor.variants),
            imports: self.collect_imports(task, closure)?,
            zones,
        };
        Ok((unit, diagnostics))
    }

    /// Imports for every complex type this one references, relative to the
    /// importing file's directory.
    fn collect_imports(
        &self,
        task: &RenderTask<'_>,
        closure: &ResolvedClosure,
    ) -> Result<Vec<ImportLine>> {
        let descriptor = &task.entry.descriptor;
        let mut keys = Vec::new();
        for reference in descriptor.declared_refs() {
            collect_ref_keys(reference, &mut keys);
        }
        keys.extend(descriptor.base.iter().cloned());
        keys.extend(descriptor.interfaces.iter().cloned());

        let mut imports = Vec::new();
        for key in keys {
            if key == *task.key || self.mapper.classify(&key)? != TypeCategory::Complex {
                continue;
            }
            let Some(dep) = closure.get(&key) else {
                continue;
            };
            let stem = self.naming.file_name(key.short_name());
            let import = ImportLine {
                name: self.naming.type_name(key.short_name()),
                from: rel_import(&task.entry.spec.output, &dep.spec.output, &stem),
            };
            if !imports.contains(&import) {
                imports.push(import);
            }
        }
        imports.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(imports)
    }

    fn write(&self, task: &RenderTask<'_>, content: &str) -> Result<()> {
        let source = task.key.to_string();
        for sink in &self.sinks {
            sink.write(Some(&source), &task.abs, content)
                .map_err(|e| GenerateError::Sink {
                    path: task.abs.clone(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// One barrel per output directory. When the directory exists on disk
    /// it is scanned (picking up pre-existing modules too); otherwise the
    /// barrel lists what this run rendered.
    fn emit_barrels(&self, plan: &[RenderTask<'_>]) -> Result<Vec<String>> {
        let mut dirs: IndexMap<&str, Vec<String>> = IndexMap::new();
        for task in plan {
            let stem = self.naming.file_name(task.key.short_name());
            dirs.entry(task.entry.spec.output.as_str())
                .or_default()
                .push(stem);
        }
        dirs.sort_keys();

        let mut index_files = Vec::new();
        for (dir, rendered) in dirs {
            let dir_path = self.options.root.join(dir);
            let stems = if dir_path.is_dir() {
                barrel::scan_dir(&dir_path, &self.options.extension, &self.options.index_file_name)?
            } else {
                rendered
            };
            let content = barrel::barrel_content(&stems);
            let rel = join_rel(dir, &self.options.index_file_name);
            let abs = self.options.root.join(&rel);
            for sink in &self.sinks {
                sink.write(None, &abs, &content)
                    .map_err(|e| GenerateError::Sink {
                        path: abs.clone(),
                        source: e,
                    })?;
            }
            index_files.push(rel);
        }
        Ok(index_files)
    }
}

enum RenderFailure {
    PerType(Diagnostic),
    Fatal(GenerateError),
}

fn join_rel(dir: &str, file: &str) -> String {
    if dir.is_empty() {
        file.to_string()
    } else {
        format!("{}/{file}", dir.trim_end_matches('/'))
    }
}

/// Import specifier from one output directory to another.
fn rel_import(from_dir: &str, to_dir: &str, stem: &str) -> String {
    if from_dir == to_dir {
        return format!("./{stem}");
    }
    let from: Vec<&str> = from_dir.split('/').filter(|s| !s.is_empty()).collect();
    let to: Vec<&str> = to_dir.split('/').filter(|s| !s.is_empty()).collect();
    let common = from
        .iter()
        .zip(&to)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = vec!["..".to_string(); from.len() - common];
    parts.extend(to[common..].iter().map(|s| s.to_string()));
    if parts.is_empty() {
        return format!("./{stem}");
    }
    let prefix = if parts[0] == ".." { "" } else { "./" };
    format!("{prefix}{}/{stem}", parts.join("/"))
}

/// Enum variant value literals: explicit values verbatim (JSON-quoted for
/// strings), sequential numbering in the gaps.
fn variant_lines(variants: &[EnumVariant]) -> Vec<VariantLine> {
    let mut next = 0i64;
    variants
        .iter()
        .map(|variant| {
            let value = match &variant.value {
                Some(serde_json::Value::Number(n)) => {
                    if let Some(i) = n.as_i64() {
                        next = i + 1;
                    }
                    n.to_string()
                }
                Some(other) => other.to_string(),
                None => {
                    let value = next.to_string();
                    next += 1;
                    value
                }
            };
            VariantLine {
                name: variant.name.clone(),
                value,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rel_import_same_dir() {
        assert_eq!(rel_import("models", "models", "order"), "./order");
        assert_eq!(rel_import("", "", "order"), "./order");
    }

    #[test]
    fn test_rel_import_across_dirs() {
        assert_eq!(rel_import("services", "models", "order"), "../models/order");
        assert_eq!(
            rel_import("api/services", "api/models", "order"),
            "../models/order"
        );
        assert_eq!(rel_import("", "models", "order"), "./models/order");
        assert_eq!(rel_import("models", "", "order"), "../order");
    }

    #[test]
    fn test_variant_values_sequence_around_explicit() {
        let variants = vec![
            EnumVariant {
                name: "A".to_string(),
                value: None,
            },
            EnumVariant {
                name: "B".to_string(),
                value: Some(serde_json::json!(10)),
            },
            EnumVariant {
                name: "C".to_string(),
                value: None,
            },
        ];
        let lines = variant_lines(&variants);
        let values: Vec<&str> = lines.iter().map(|l| l.value.as_str()).collect();
        assert_eq!(values, vec!["0", "10", "11"]);
    }

    #[test]
    fn test_variant_string_values_are_quoted() {
        let variants = vec![EnumVariant {
            name: "Open".to_string(),
            value: Some(serde_json::json!("open")),
        }];
        assert_eq!(variant_lines(&variants)[0].value, "\"open\"");
    }

    #[test]
    fn test_join_rel() {
        assert_eq!(join_rel("models", "order.ts"), "models/order.ts");
        assert_eq!(join_rel("", "order.ts"), "order.ts");
    }
}
