//! End-to-end generation runs against TOML models.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use typeport_codegen::{GenerateError, GenerateOptions, Generator};
use typeport_core::{FileSink, MemorySink};
use typeport_model::Model;

fn memory_run(
    model_toml: &str,
    options: GenerateOptions,
) -> (typeport_codegen::GenerationResult, Arc<MemorySink>) {
    let model = Arc::new(Model::from_str(model_toml).unwrap());
    let sink = Arc::new(MemorySink::new());
    let generator = Generator::from_model(Arc::clone(&model), options)
        .with_sinks(vec![Arc::clone(&sink) as Arc<dyn FileSink>]);
    let result = generator.run(model.exports()).unwrap();
    (result, sink)
}

const ORDER_MODEL: &str = r#"
    [types.Order]
    kind = "class"
    members = [
        { name = "items", type = "List<OrderLine>" },
        { name = "status", type = "Status" },
    ]

    [types.OrderLine]
    kind = "class"
    members = [
        { name = "sku", type = "string" },
        { name = "quantity", type = "int" },
    ]

    [types.Status]
    kind = "enum"
    variants = [{ name = "Open" }, { name = "Closed" }]

    [[export]]
    type = "Order"
    output = "models"
"#;

#[test]
fn test_closure_generates_dependencies_of_the_seed() {
    let (result, sink) = memory_run(ORDER_MODEL, GenerateOptions::new("out"));

    assert_eq!(
        result.type_files,
        vec!["models/order.ts", "models/order-line.ts", "models/status.ts"]
    );
    assert_eq!(result.index_files, vec!["models/index.ts"]);
    assert!(result.diagnostics.is_empty());

    let order = sink.content(Path::new("out/models/order.ts")).unwrap();
    assert!(order.contains("import { OrderLine } from \"./order-line\";"));
    assert!(order.contains("import { Status } from \"./status\";"));
    assert!(order.contains("export class Order {"));
    assert!(order.contains("items: OrderLine[];"));
    assert!(order.contains("status: Status;"));

    let status = sink.content(Path::new("out/models/status.ts")).unwrap();
    assert!(status.contains("export enum Status {"));
    assert!(status.contains("Open = 0,"));
    assert!(status.contains("Closed = 1,"));
}

#[test]
fn test_barrel_lists_rendered_modules_sorted() {
    let (_, sink) = memory_run(ORDER_MODEL, GenerateOptions::new("out"));

    let index = sink.content(Path::new("out/models/index.ts")).unwrap();
    assert_eq!(
        index,
        "export * from \"./order\";\nexport * from \"./order-line\";\nexport * from \"./status\";\n"
    );
}

#[test]
fn test_index_files_can_be_disabled() {
    let (result, sink) = memory_run(ORDER_MODEL, GenerateOptions::new("out").without_index_files());
    assert!(result.index_files.is_empty());
    assert!(sink.content(Path::new("out/models/index.ts")).is_none());
}

#[test]
fn test_service_generation_with_method_stubs() {
    let (result, sink) = memory_run(
        r#"
        [types.Order]
        kind = "class"
        members = [{ name = "id", type = "string" }]

        [services.OrderService]
        methods = [
            { name = "getOrder", params = [{ name = "id", type = "string" }], returns = "Order" },
            { name = "deleteOrder", params = [{ name = "id", type = "string" }] },
        ]
        "#,
        GenerateOptions::new("out"),
    );

    assert_eq!(result.service_files, vec!["services/order-service.ts"]);
    assert_eq!(result.method_count, 2);
    // Order is pulled into the service's output directory.
    assert_eq!(result.type_files, vec!["services/order.ts"]);

    let service = sink
        .content(Path::new("out/services/order-service.ts"))
        .unwrap();
    assert!(service.contains("import { Order } from \"./order\";"));
    assert!(service.contains("getOrder(id: string): Order {"));
    assert!(service.contains("deleteOrder(id: string): void {"));
    assert!(service.contains("// begin-custom-method-getOrder"));
    assert!(service.contains("throw new Error(\"getOrder is not implemented\");"));
}

#[test]
fn test_duplicate_output_path_is_fatal() {
    let model = Arc::new(
        Model::from_str(
            r#"
            [types.OrderLine]
            kind = "class"

            [types.Order_Line]
            kind = "class"

            [[export]]
            type = "OrderLine"
            output = "models"

            [[export]]
            type = "Order_Line"
            output = "models"
            "#,
        )
        .unwrap(),
    );
    let sink = Arc::new(MemorySink::new());
    let generator = Generator::from_model(Arc::clone(&model), GenerateOptions::new("out"))
        .with_sinks(vec![Arc::clone(&sink) as Arc<dyn FileSink>]);

    let err = generator.run(model.exports()).unwrap_err();
    assert!(matches!(err, GenerateError::DuplicateOutputPath { .. }));
    // Nothing was written.
    assert!(sink.files().is_empty());
}

#[test]
fn test_conflicting_duplicate_export_warns_and_first_wins() {
    let (result, sink) = memory_run(
        r#"
        [types.Order]
        kind = "class"

        [[export]]
        type = "Order"
        output = "models"

        [[export]]
        type = "Order"
        output = "elsewhere"
        "#,
        GenerateOptions::new("out"),
    );

    assert!(result.has_warnings());
    assert_eq!(result.type_files, vec!["models/order.ts"]);
    assert!(sink.content(Path::new("out/models/order.ts")).is_some());
    assert!(sink.content(Path::new("out/elsewhere/order.ts")).is_none());
}

#[test]
fn test_regeneration_is_byte_identical_on_disk() {
    let temp = tempfile::TempDir::new().unwrap();
    let model = Arc::new(Model::from_str(ORDER_MODEL).unwrap());

    let generator = Generator::from_model(
        Arc::clone(&model),
        GenerateOptions::new(temp.path()),
    );
    generator.run(model.exports()).unwrap();
    let order_path = temp.path().join("models").join("order.ts");
    let first = std::fs::read_to_string(&order_path).unwrap();

    generator.run(model.exports()).unwrap();
    let second = std::fs::read_to_string(&order_path).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_custom_regions_survive_regeneration() {
    let temp = tempfile::TempDir::new().unwrap();
    let model = Arc::new(Model::from_str(ORDER_MODEL).unwrap());
    let generator = Generator::from_model(
        Arc::clone(&model),
        GenerateOptions::new(temp.path()),
    );
    generator.run(model.exports()).unwrap();

    // Hand-edit the custom body zone the way a user would.
    let order_path = temp.path().join("models").join("order.ts");
    let content = std::fs::read_to_string(&order_path).unwrap();
    let edited = content.replace(
        "  // begin-custom-body\n  // end-custom-body",
        "  // begin-custom-body\n  total(): number {\n    return this.items.length;\n  }\n  // end-custom-body",
    );
    assert_ne!(content, edited);
    std::fs::write(&order_path, &edited).unwrap();

    generator.run(model.exports()).unwrap();
    let regenerated = std::fs::read_to_string(&order_path).unwrap();
    assert!(regenerated.contains("return this.items.length;"));
    // Generated parts are still refreshed around the preserved zone.
    assert!(regenerated.contains("items: OrderLine[];"));
}

#[test]
fn test_zone_edits_ending_in_blank_line_survive_regeneration() {
    let temp = tempfile::TempDir::new().unwrap();
    let model = Arc::new(Model::from_str(ORDER_MODEL).unwrap());
    let generator = Generator::from_model(
        Arc::clone(&model),
        GenerateOptions::new(temp.path()),
    );
    generator.run(model.exports()).unwrap();

    let order_path = temp.path().join("models").join("order.ts");
    let content = std::fs::read_to_string(&order_path).unwrap();
    let edited = content.replace(
        "  // begin-custom-body\n  // end-custom-body",
        "  // begin-custom-body\n  total(): number {\n    return 1;\n  }\n\n  // end-custom-body",
    );
    assert_ne!(content, edited);
    std::fs::write(&order_path, &edited).unwrap();

    generator.run(model.exports()).unwrap();
    let regenerated = std::fs::read_to_string(&order_path).unwrap();
    assert!(regenerated.contains("    return 1;\n  }\n\n  // end-custom-body"));

    // And the edited file regenerates byte-for-byte from here on.
    generator.run(model.exports()).unwrap();
    assert_eq!(std::fs::read_to_string(&order_path).unwrap(), regenerated);
}

#[test]
fn test_doc_annotations_emitted_as_comments() {
    let (_, sink) = memory_run(
        r#"
        [types.Order]
        kind = "class"
        members = [
            { name = "sku", type = "string", annotations = { doc = "Stock-keeping unit" } },
        ]
        annotations = { doc = "A customer order" }

        [[export]]
        type = "Order"
        output = "models"
        "#,
        GenerateOptions::new("out"),
    );

    let order = sink.content(Path::new("out/models/order.ts")).unwrap();
    assert!(order.contains("/** A customer order */\nexport class Order {"));
    assert!(order.contains("  /** Stock-keeping unit */\n  sku: string;"));
}

#[test]
fn test_export_annotation_overrides_type_annotation() {
    let (_, sink) = memory_run(
        r#"
        [types.Order]
        kind = "class"
        annotations = { doc = "From the type" }

        [[export]]
        type = "Order"
        output = "models"
        annotations = { doc = "From the export" }
        "#,
        GenerateOptions::new("out"),
    );

    let order = sink.content(Path::new("out/models/order.ts")).unwrap();
    assert!(order.contains("/** From the export */"));
    assert!(!order.contains("From the type"));
}

#[test]
fn test_barrel_scan_includes_preexisting_modules() {
    let temp = tempfile::TempDir::new().unwrap();
    let models = temp.path().join("models");
    std::fs::create_dir_all(&models).unwrap();
    std::fs::write(models.join("hand-written.ts"), "export const x = 1;\n").unwrap();

    let model = Arc::new(Model::from_str(ORDER_MODEL).unwrap());
    let generator = Generator::from_model(
        Arc::clone(&model),
        GenerateOptions::new(temp.path()),
    );
    generator.run(model.exports()).unwrap();

    let index = std::fs::read_to_string(models.join("index.ts")).unwrap();
    assert!(index.contains("export * from \"./hand-written\";"));
    assert!(index.contains("export * from \"./order\";"));
}

#[test]
fn test_missing_dependency_aborts_run() {
    let model = Arc::new(
        Model::from_str(
            r#"
            [types.Order]
            kind = "class"
            members = [{ name = "ghost", type = "Ghost" }]

            [[export]]
            type = "Order"
            output = "models"
            "#,
        )
        .unwrap(),
    );
    let sink = Arc::new(MemorySink::new());
    let generator = Generator::from_model(Arc::clone(&model), GenerateOptions::new("out"))
        .with_sinks(vec![Arc::clone(&sink) as Arc<dyn FileSink>]);

    let err = generator.run(model.exports()).unwrap_err();
    assert!(matches!(err, GenerateError::Metadata { ref key, .. } if key.name() == "Ghost"));
    assert!(sink.files().is_empty());
}
