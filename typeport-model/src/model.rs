//! TOML-backed model: a concrete [`MetadataProvider`] plus export requests.
//!
//! The model file declares the host type graph directly:
//!
//! ```toml
//! [types.Order]
//! kind = "class"
//! members = [{ name = "items", type = "List<OrderLine>" }]
//!
//! [types.OrderLine]
//! kind = "class"
//! members = [{ name = "sku", type = "string" }]
//!
//! [[export]]
//! type = "Order"
//! output = "models"
//! ```

use std::{path::Path, str::FromStr, sync::Arc};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{
    EnumVariant, Error, ExportRequest, ExportShape, MemberDescriptor, MetadataProvider,
    MethodDescriptor, Param, Result, TypeDescriptor, TypeKey, TypeKind, TypeRef, TypeSpec,
    parse_type_expr,
};

/// Host-model settings: how primitive, collection, and dictionary types are
/// recognized.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    /// Host primitive name -> TypeScript primitive name.
    pub primitives: IndexMap<String, String>,
    /// Type names treated as built-in collections (`Elem[]` mapping).
    pub collections: Vec<String>,
    /// Type names treated as built-in dictionaries (index-signature mapping).
    pub dictionaries: Vec<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        let primitives = [
            ("string", "string"),
            ("char", "string"),
            ("Guid", "string"),
            ("int", "number"),
            ("long", "number"),
            ("short", "number"),
            ("byte", "number"),
            ("float", "number"),
            ("double", "number"),
            ("decimal", "number"),
            ("number", "number"),
            ("bool", "boolean"),
            ("boolean", "boolean"),
            ("DateTime", "Date"),
            ("Date", "Date"),
            ("object", "any"),
            ("any", "any"),
            ("void", "void"),
        ]
        .into_iter()
        .map(|(host, ts)| (host.to_string(), ts.to_string()))
        .collect();

        Self {
            primitives,
            collections: ["Array", "List", "IEnumerable", "ICollection", "IList", "HashSet"]
                .map(String::from)
                .to_vec(),
            dictionaries: ["Map", "Dictionary", "IDictionary"].map(String::from).to_vec(),
        }
    }
}

/// A parsed model: descriptor graph, settings, and export requests.
#[derive(Debug)]
pub struct Model {
    descriptors: IndexMap<TypeKey, Arc<TypeDescriptor>>,
    annotations: IndexMap<TypeKey, IndexMap<String, serde_json::Value>>,
    generic_params: Vec<String>,
    settings: ModelSettings,
    exports: Vec<ExportRequest>,
}

impl FromStr for Model {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_str_with_filename(s, "model.toml")
    }
}

impl Model {
    /// Parse a model file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source: e,
            })
        })?;
        Self::from_str_with_filename(&content, &path.display().to_string())
    }

    /// Parse a model from a string, with a filename for error reporting.
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        let raw: ModelFile =
            toml::from_str(content).map_err(|e| Error::parse(e, content, filename))?;
        Self::build(raw)
    }

    /// Caller-requested exports, in declaration order (services included).
    pub fn exports(&self) -> &[ExportRequest] {
        &self.exports
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// Number of declared types (services included).
    pub fn type_count(&self) -> usize {
        self.descriptors.len()
    }

    fn build(raw: ModelFile) -> Result<Self> {
        let settings = raw.settings.merge_into_defaults();
        let mut descriptors = IndexMap::new();
        let mut annotations = IndexMap::new();
        let mut generic_params: Vec<String> = Vec::new();
        let mut exports = Vec::new();

        for (name, def) in &raw.types {
            let key = TypeKey::new(name.clone(), def.generics.len());
            let mut desc = TypeDescriptor::new(key.clone(), def.kind.into());
            desc.generics = def.generics.clone();
            desc.base = def.base.clone().map(TypeKey::simple);
            desc.interfaces = def.implements.iter().cloned().map(TypeKey::simple).collect();
            for member in &def.members {
                desc.members.push(member.build()?);
            }
            desc.variants = def
                .variants
                .iter()
                .map(|v| EnumVariant {
                    name: v.name.clone(),
                    value: v.value.clone(),
                })
                .collect();

            for param in &def.generics {
                if !generic_params.contains(param) {
                    generic_params.push(param.clone());
                }
            }
            if !def.annotations.is_empty() {
                annotations.insert(key.clone(), def.annotations.clone());
            }
            descriptors.insert(key, Arc::new(desc));
        }

        for (name, def) in &raw.services {
            let key = TypeKey::simple(name.clone());
            if descriptors.contains_key(&key) {
                return Err(Error::validation(format!(
                    "'{name}' is declared both as a type and as a service"
                )));
            }
            let mut desc = TypeDescriptor::new(key.clone(), TypeKind::Class);
            for method in &def.methods {
                desc.methods.push(method.build()?);
            }
            exports.push(ExportRequest {
                key: key.clone(),
                spec: TypeSpec::in_dir(def.output.clone()).with_shape(ExportShape::Class),
            });
            descriptors.insert(key, Arc::new(desc));
        }

        for export in &raw.exports {
            let key = find_declared(&descriptors, &export.ty).ok_or_else(|| {
                Error::validation(format!(
                    "export requests undeclared type '{}'",
                    export.ty
                ))
            })?;
            let mut spec = TypeSpec::in_dir(export.output.clone());
            spec.shape = export.shape;
            spec.annotations = export.annotations.clone();
            exports.push(ExportRequest { key, spec });
        }

        Ok(Self {
            descriptors,
            annotations,
            generic_params,
            settings,
            exports,
        })
    }
}

/// Find a declared key by bare name, ignoring arity.
fn find_declared(
    descriptors: &IndexMap<TypeKey, Arc<TypeDescriptor>>,
    name: &str,
) -> Option<TypeKey> {
    descriptors.keys().find(|k| k.name() == name).cloned()
}

impl MetadataProvider for Model {
    fn describe(&self, key: &TypeKey) -> Result<Arc<TypeDescriptor>> {
        if let Some(desc) = self.descriptors.get(key) {
            return Ok(Arc::clone(desc));
        }
        // Built-ins have no declared structure; synthesize a bare descriptor.
        let kind = self.kind_of(key)?;
        Ok(Arc::new(TypeDescriptor::new(key.clone(), kind)))
    }

    fn kind_of(&self, key: &TypeKey) -> Result<TypeKind> {
        if let Some(desc) = self.descriptors.get(key) {
            return Ok(desc.kind);
        }
        let name = key.name();
        if key.arity() == 0 && self.settings.primitives.contains_key(name) {
            return Ok(TypeKind::Primitive);
        }
        if self.settings.collections.iter().any(|c| c == name) {
            return Ok(TypeKind::Collection);
        }
        if self.settings.dictionaries.iter().any(|d| d == name) {
            return Ok(TypeKind::Dictionary);
        }
        if key.arity() == 0 && self.generic_params.iter().any(|g| g == name) {
            return Ok(TypeKind::GenericParameter);
        }
        Err(Error::unknown_type(key))
    }

    fn annotations(&self, key: &TypeKey) -> Result<IndexMap<String, serde_json::Value>> {
        Ok(self.annotations.get(key).cloned().unwrap_or_default())
    }
}

// Raw serde shapes for the TOML file.

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModelFile {
    #[serde(default)]
    settings: SettingsDef,
    #[serde(default)]
    types: IndexMap<String, TypeDef>,
    #[serde(default)]
    services: IndexMap<String, ServiceDef>,
    #[serde(default, rename = "export")]
    exports: Vec<ExportDef>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsDef {
    #[serde(default)]
    primitives: IndexMap<String, String>,
    collections: Option<Vec<String>>,
    dictionaries: Option<Vec<String>>,
}

impl SettingsDef {
    /// Overlay file settings onto the defaults. Primitive entries extend
    /// the default table; collection/dictionary lists replace it when set.
    fn merge_into_defaults(self) -> ModelSettings {
        let mut settings = ModelSettings::default();
        settings.primitives.extend(self.primitives);
        if let Some(collections) = self.collections {
            settings.collections = collections;
        }
        if let Some(dictionaries) = self.dictionaries {
            settings.dictionaries = dictionaries;
        }
        settings
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum DeclaredKind {
    Class,
    Interface,
    Enum,
}

impl From<DeclaredKind> for TypeKind {
    fn from(kind: DeclaredKind) -> Self {
        match kind {
            DeclaredKind::Class => TypeKind::Class,
            DeclaredKind::Interface => TypeKind::Interface,
            DeclaredKind::Enum => TypeKind::Enum,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TypeDef {
    kind: DeclaredKind,
    base: Option<String>,
    #[serde(default)]
    implements: Vec<String>,
    #[serde(default)]
    generics: Vec<String>,
    #[serde(default)]
    members: Vec<MemberDef>,
    #[serde(default)]
    variants: Vec<VariantDef>,
    #[serde(default)]
    annotations: IndexMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MemberDef {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    readonly: bool,
    #[serde(default, rename = "static")]
    is_static: bool,
    default: Option<String>,
    #[serde(default)]
    annotations: IndexMap<String, serde_json::Value>,
}

impl MemberDef {
    fn build(&self) -> Result<MemberDescriptor> {
        let ty = parse_type_expr(&self.ty)?;
        Ok(MemberDescriptor {
            name: self.name.clone(),
            ty,
            is_static: self.is_static,
            is_readonly: self.readonly,
            is_optional: self.optional,
            default: self.default.clone(),
            annotations: self.annotations.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct VariantDef {
    name: String,
    value: Option<serde_json::Value>,
}

fn default_service_output() -> String {
    "services".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServiceDef {
    #[serde(default = "default_service_output")]
    output: String,
    #[serde(default)]
    methods: Vec<MethodDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MethodDef {
    name: String,
    #[serde(default)]
    params: Vec<ParamDef>,
    returns: Option<String>,
}

impl MethodDef {
    fn build(&self) -> Result<MethodDescriptor> {
        let mut method = MethodDescriptor::new(self.name.clone());
        for param in &self.params {
            method.params.push(Param {
                name: param.name.clone(),
                ty: parse_type_expr(&param.ty)?,
            });
        }
        method.returns = self.returns.as_deref().map(parse_type_expr).transpose()?;
        Ok(method)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParamDef {
    name: String,
    #[serde(rename = "type")]
    ty: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExportDef {
    #[serde(rename = "type")]
    ty: String,
    output: String,
    shape: Option<ExportShape>,
    /// Annotation overrides applied on top of the type's own annotations.
    #[serde(default)]
    annotations: IndexMap<String, serde_json::Value>,
}
