use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use eyre::{Context, Result};
use typeport_codegen::{GenerateOptions, Generator, Severity};
use typeport_model::Model;

use super::UnwrapOrExit;

#[derive(Args)]
pub struct GenerateCommand {
    /// Path to the model file (defaults to ./typeport.toml)
    #[arg(short, long, default_value = "typeport.toml")]
    pub config: PathBuf,

    /// Output root directory (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Treat per-type render failures as a run failure
    #[arg(long)]
    pub strict: bool,

    /// Skip barrel (index.ts) files
    #[arg(long)]
    pub no_index: bool,
}

impl GenerateCommand {
    /// Run the generate command
    pub fn run(&self) -> Result<()> {
        let model = Arc::new(Model::open(&self.config).unwrap_or_exit());

        let mut options = GenerateOptions::new(&self.output);
        if self.strict {
            options = options.strict();
        }
        if self.no_index {
            options = options.without_index_files();
        }

        let generator = Generator::from_model(Arc::clone(&model), options);
        let result = generator
            .run(model.exports())
            .wrap_err("Failed to generate code")?;

        for diag in &result.diagnostics {
            match diag.severity {
                Severity::Error | Severity::Warning => eprintln!("{diag}"),
                Severity::Info => println!("{diag}"),
            }
        }
        if !result.diagnostics.is_empty() {
            println!();
        }

        println!("Generated {} file(s) in {}/", result.file_count(), self.output.display());
        if !result.type_files.is_empty() {
            println!();
            println!("Types ({}):", result.type_files.len());
            for file in &result.type_files {
                println!("  {file}");
            }
        }
        if !result.service_files.is_empty() {
            println!();
            println!(
                "Services ({}, {} method(s)):",
                result.service_files.len(),
                result.method_count
            );
            for file in &result.service_files {
                println!("  {file}");
            }
        }
        if !result.index_files.is_empty() {
            println!();
            println!("Barrels ({}):", result.index_files.len());
            for file in &result.index_files {
                println!("  {file}");
            }
        }

        Ok(())
    }
}
