//! The concrete TypeScript renderer.

use typeport_model::ExportShape;

use super::{
    CUSTOM_BODY, CUSTOM_HEAD, CodeWriter, Indent, MethodLine, RenderUnit, Renderer,
    method_zone_tag,
};
use crate::{Result, regions};

/// Renders classes, interfaces, enums, and service classes with preserved
/// zone slots.
#[derive(Debug, Default)]
pub struct TypeScriptRenderer {
    indent: Indent,
}

impl TypeScriptRenderer {
    pub fn new() -> Self {
        Self {
            indent: Indent::TYPESCRIPT,
        }
    }
}

impl Renderer for TypeScriptRenderer {
    fn render(&self, unit: &RenderUnit) -> Result<String> {
        let mut w = CodeWriter::new(self.indent);

        for import in &unit.imports {
            w.line(&format!(
                "import {{ {} }} from \"{}\";",
                import.name, import.from
            ));
        }
        if !unit.imports.is_empty() {
            w.blank();
        }

        self.emit_zone(&mut w, unit, CUSTOM_HEAD, 0, None);
        w.blank();

        if let Some(doc) = &unit.doc {
            self.doc_comment(&mut w, doc);
        }
        match unit.shape {
            ExportShape::Enum => self.render_enum(&mut w, unit),
            ExportShape::Interface => self.render_interface(&mut w, unit),
            ExportShape::Class => self.render_class(&mut w, unit),
        }

        Ok(w.build())
    }
}

impl TypeScriptRenderer {
    fn doc_comment(&self, w: &mut CodeWriter, doc: &str) {
        if doc.lines().count() <= 1 {
            w.line(&format!("/** {doc} */"));
        } else {
            w.line("/**");
            for line in doc.lines() {
                w.line(&format!(" * {line}"));
            }
            w.line(" */");
        }
    }

    fn type_name(&self, unit: &RenderUnit) -> String {
        if unit.generics.is_empty() {
            unit.name.clone()
        } else {
            format!("{}<{}>", unit.name, unit.generics.join(", "))
        }
    }

    fn render_enum(&self, w: &mut CodeWriter, unit: &RenderUnit) {
        w.line(&format!("export enum {} {{", unit.name));
        w.indent();
        for variant in &unit.variants {
            w.line(&format!("{} = {},", variant.name, variant.value));
        }
        w.dedent();
        w.line("}");
    }

    fn render_interface(&self, w: &mut CodeWriter, unit: &RenderUnit) {
        // Interfaces extend both their base type and their interfaces.
        let mut extends: Vec<String> = Vec::new();
        extends.extend(unit.extends.iter().cloned());
        extends.extend(unit.implements.iter().cloned());

        let mut header = format!("export interface {}", self.type_name(unit));
        if !extends.is_empty() {
            header.push_str(&format!(" extends {}", extends.join(", ")));
        }
        header.push_str(" {");
        w.line(&header);
        w.indent();

        for field in &unit.fields {
            if let Some(doc) = &field.doc {
                self.doc_comment(w, doc);
            }
            let mut line = String::new();
            if field.readonly {
                line.push_str("readonly ");
            }
            line.push_str(&field.name);
            if field.optional {
                line.push('?');
            }
            line.push_str(&format!(": {};", field.ty));
            w.line(&line);
        }

        if !unit.fields.is_empty() {
            w.blank();
        }
        w.dedent();
        self.emit_zone(w, unit, CUSTOM_BODY, 1, None);
        w.line("}");
    }

    fn render_class(&self, w: &mut CodeWriter, unit: &RenderUnit) {
        let mut header = format!("export class {}", self.type_name(unit));
        if let Some(base) = &unit.extends {
            header.push_str(&format!(" extends {base}"));
        }
        if !unit.implements.is_empty() {
            header.push_str(&format!(" implements {}", unit.implements.join(", ")));
        }
        header.push_str(" {");
        w.line(&header);
        w.indent();

        for field in &unit.fields {
            if let Some(doc) = &field.doc {
                self.doc_comment(w, doc);
            }
            let mut line = String::new();
            if field.is_static {
                line.push_str("static ");
            }
            if field.readonly {
                line.push_str("readonly ");
            }
            line.push_str(&field.name);
            if field.optional {
                line.push('?');
            }
            line.push_str(&format!(": {}", field.ty));
            if let Some(default) = &field.default {
                line.push_str(&format!(" = {default}"));
            }
            line.push(';');
            w.line(&line);
        }

        for (i, method) in unit.methods.iter().enumerate() {
            if !unit.fields.is_empty() || i > 0 {
                w.blank();
            }
            self.render_method(w, unit, method);
        }

        if !unit.fields.is_empty() || !unit.methods.is_empty() {
            w.blank();
        }
        w.dedent();
        self.emit_zone(w, unit, CUSTOM_BODY, 1, None);
        w.line("}");
    }

    fn render_method(&self, w: &mut CodeWriter, unit: &RenderUnit, method: &MethodLine) {
        let params = method
            .params
            .iter()
            .map(|(name, ty)| format!("{name}: {ty}"))
            .collect::<Vec<_>>()
            .join(", ");
        w.line(&format!(
            "{}({}): {} {{",
            method.name, params, method.returns
        ));

        let stub = format!("throw new Error(\"{} is not implemented\");", method.name);
        self.emit_zone(w, unit, &method_zone_tag(&method.name), 2, Some(&stub));
        w.line("}");
    }

    /// Emit a zone slot: begin marker, preserved content (or the default
    /// stub on first generation), end marker.
    ///
    /// Preserved content is re-emitted verbatim; it already carries its own
    /// indentation from the previous file.
    fn emit_zone(
        &self,
        w: &mut CodeWriter,
        unit: &RenderUnit,
        tag: &str,
        depth: usize,
        default: Option<&str>,
    ) {
        let indent = self.indent.as_str().repeat(depth);
        w.raw_line(&format!("{indent}{}", regions::begin_marker(tag)));
        match unit.zones.get(tag) {
            Some(zone) => {
                for line in &zone.content {
                    w.raw_line(line);
                }
            }
            None => {
                if let Some(default) = default {
                    let inner = self.indent.as_str().repeat(depth + 1);
                    w.raw_line(&format!("{inner}{default}"));
                }
            }
        }
        w.raw_line(&format!("{indent}{}", regions::end_marker(tag)));
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use typeport_model::ExportShape;

    use super::*;
    use crate::render::{FieldLine, ImportLine, VariantLine};
    use crate::{PreservedZone, regions::parse_zones_str};

    fn unit(shape: ExportShape, name: &str) -> RenderUnit {
        RenderUnit {
            shape,
            name: name.to_string(),
            doc: None,
            generics: Vec::new(),
            extends: None,
            implements: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            variants: Vec::new(),
            imports: Vec::new(),
            zones: IndexMap::new(),
        }
    }

    fn field(name: &str, ty: &str) -> FieldLine {
        FieldLine {
            name: name.to_string(),
            ty: ty.to_string(),
            doc: None,
            optional: false,
            readonly: false,
            is_static: false,
            default: None,
        }
    }

    #[test]
    fn test_render_class_with_import() {
        let mut u = unit(ExportShape::Class, "Order");
        u.imports.push(ImportLine {
            name: "OrderLine".to_string(),
            from: "./order-line".to_string(),
        });
        u.fields.push(field("items", "OrderLine[]"));

        let out = TypeScriptRenderer::new().render(&u).unwrap();
        insta::assert_snapshot!(out, @r###"
        import { OrderLine } from "./order-line";

        // begin-custom-head
        // end-custom-head

        export class Order {
          items: OrderLine[];

          // begin-custom-body
          // end-custom-body
        }
        "###);
    }

    #[test]
    fn test_render_enum() {
        let mut u = unit(ExportShape::Enum, "Status");
        u.variants.push(VariantLine {
            name: "Open".to_string(),
            value: "0".to_string(),
        });
        u.variants.push(VariantLine {
            name: "Closed".to_string(),
            value: "\"closed\"".to_string(),
        });

        let out = TypeScriptRenderer::new().render(&u).unwrap();
        insta::assert_snapshot!(out, @r###"
        // begin-custom-head
        // end-custom-head

        export enum Status {
          Open = 0,
          Closed = "closed",
        }
        "###);
    }

    #[test]
    fn test_render_interface_extends() {
        let mut u = unit(ExportShape::Interface, "Order");
        u.extends = Some("Entity".to_string());
        u.implements.push("Auditable".to_string());
        let mut f = field("sku", "string");
        f.readonly = true;
        f.optional = true;
        u.fields.push(f);

        let out = TypeScriptRenderer::new().render(&u).unwrap();
        assert!(out.contains("export interface Order extends Entity, Auditable {"));
        assert!(out.contains("readonly sku?: string;"));
    }

    #[test]
    fn test_render_is_idempotent_through_zone_round_trip() {
        let mut u = unit(ExportShape::Class, "Order");
        u.fields.push(field("sku", "string"));
        let renderer = TypeScriptRenderer::new();

        let first = renderer.render(&u).unwrap();
        let tags = vec![CUSTOM_HEAD.to_string(), CUSTOM_BODY.to_string()];
        let (zones, diags) = parse_zones_str(&first, &tags);
        assert!(diags.is_empty());

        let mut again = unit(ExportShape::Class, "Order");
        again.fields.push(field("sku", "string"));
        again.zones = zones;
        let second = renderer.render(&again).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_preserved_body_survives_regeneration() {
        let mut u = unit(ExportShape::Class, "Order");
        u.fields.push(field("sku", "string"));
        u.zones.insert(
            CUSTOM_BODY.to_string(),
            PreservedZone {
                tag: CUSTOM_BODY.to_string(),
                content: vec![
                    "  total(): number {".to_string(),
                    "    return 42;".to_string(),
                    "  }".to_string(),
                ],
                indent: "  ".to_string(),
            },
        );

        let out = TypeScriptRenderer::new().render(&u).unwrap();
        assert!(out.contains(
            "  // begin-custom-body\n  total(): number {\n    return 42;\n  }\n  // end-custom-body"
        ));
    }

    #[test]
    fn test_zone_trailing_blank_line_round_trip() {
        let make = || {
            let mut u = unit(ExportShape::Class, "Order");
            u.fields.push(field("sku", "string"));
            u
        };
        let mut u = make();
        u.zones.insert(
            CUSTOM_BODY.to_string(),
            PreservedZone {
                tag: CUSTOM_BODY.to_string(),
                content: vec![
                    "  total(): number {".to_string(),
                    "    return 1;".to_string(),
                    "  }".to_string(),
                    String::new(),
                ],
                indent: "  ".to_string(),
            },
        );
        let renderer = TypeScriptRenderer::new();

        let first = renderer.render(&u).unwrap();
        assert!(first.contains("    return 1;\n  }\n\n  // end-custom-body"));

        let tags = vec![CUSTOM_HEAD.to_string(), CUSTOM_BODY.to_string()];
        let (zones, diags) = parse_zones_str(&first, &tags);
        assert!(diags.is_empty());

        let mut again = make();
        again.zones = zones;
        let second = renderer.render(&again).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_doc_annotations_render_as_comments() {
        let mut u = unit(ExportShape::Class, "Order");
        u.doc = Some("A customer order".to_string());
        let mut f = field("sku", "string");
        f.doc = Some("Stock-keeping unit".to_string());
        u.fields.push(f);

        let out = TypeScriptRenderer::new().render(&u).unwrap();
        assert!(out.contains("/** A customer order */\nexport class Order {"));
        assert!(out.contains("  /** Stock-keeping unit */\n  sku: string;"));
    }

    #[test]
    fn test_service_method_stub_gets_zone() {
        let mut u = unit(ExportShape::Class, "OrderService");
        u.methods.push(MethodLine {
            name: "getOrder".to_string(),
            params: vec![("id".to_string(), "string".to_string())],
            returns: "Order".to_string(),
        });

        let out = TypeScriptRenderer::new().render(&u).unwrap();
        assert!(out.contains("getOrder(id: string): Order {"));
        assert!(out.contains("// begin-custom-method-getOrder"));
        assert!(out.contains("throw new Error(\"getOrder is not implemented\");"));
    }
}
