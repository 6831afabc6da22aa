use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use eyre::{Context, Result};
use typeport_codegen::{GenerateOptions, Generator};
use typeport_core::{FileSink, MemorySink};
use typeport_model::Model;

use super::UnwrapOrExit;

#[derive(Args)]
pub struct PreviewCommand {
    /// Path to the model file (defaults to ./typeport.toml)
    #[arg(short, long, default_value = "typeport.toml")]
    pub config: PathBuf,

    /// Output root the preview is computed against
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,
}

impl PreviewCommand {
    /// Run the preview command
    pub fn run(&self) -> Result<()> {
        let model = Arc::new(Model::open(&self.config).unwrap_or_exit());

        // Capture into memory; existing files on disk still feed preserved
        // zones, so the preview matches what generate would write.
        let sink = Arc::new(MemorySink::new());
        let generator = Generator::from_model(
            Arc::clone(&model),
            GenerateOptions::new(&self.output),
        )
        .with_sinks(vec![Arc::clone(&sink) as Arc<dyn FileSink>]);

        generator
            .run(model.exports())
            .wrap_err("Failed to generate code")?;

        let files = sink.files();
        for file in &files {
            println!("── {} ──", file.path.display());
            println!("{}", file.content);
        }

        println!("── Summary ──");
        println!("{} files would be generated", files.len());

        Ok(())
    }
}
