use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use eyre::{Context, Result};
use typeport_codegen::{GenerateOptions, Generator, Severity};
use typeport_core::{FileSink, MemorySink};
use typeport_model::Model;

use super::UnwrapOrExit;

#[derive(Args)]
pub struct CheckCommand {
    /// Path to the model file (defaults to ./typeport.toml)
    #[arg(short, long, default_value = "typeport.toml")]
    pub config: PathBuf,
}

impl CheckCommand {
    /// Run the check command
    pub fn run(&self) -> Result<()> {
        let model = Arc::new(Model::open(&self.config).unwrap_or_exit());

        // Dry-run the full pipeline against a memory sink so closure
        // resolution and output-path planning are validated too.
        let sink = Arc::new(MemorySink::new());
        let generator = Generator::from_model(Arc::clone(&model), GenerateOptions::new("."))
            .with_sinks(vec![sink as Arc<dyn FileSink>]);
        let result = generator
            .run(model.exports())
            .wrap_err("Validation failed")?;

        let mut has_errors = false;
        for diag in &result.diagnostics {
            match diag.severity {
                Severity::Error => {
                    has_errors = true;
                    eprintln!("{diag}");
                }
                Severity::Warning => eprintln!("{diag}"),
                Severity::Info => println!("{diag}"),
            }
        }
        if has_errors {
            std::process::exit(1);
        }
        if result.has_warnings() {
            println!();
        }

        println!("✓ {} is valid\n", self.config.display());
        println!("  {} declared type(s)", model.type_count());
        println!("  {} export(s)", model.exports().len());

        println!(
            "  {} file{} would be generated",
            result.file_count(),
            if result.file_count() == 1 { "" } else { "s" }
        );
        if !result.service_files.is_empty() {
            println!(
                "  {} service(s) with {} method(s)",
                result.service_files.len(),
                result.method_count
            );
        }

        Ok(())
    }
}
