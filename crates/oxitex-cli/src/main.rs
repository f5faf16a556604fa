use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use oxitex_core::compile::{CompileRequest, Compiler};

#[derive(Parser)]
#[command(name = "oxitex")]
#[command(about = "OxiTeX CLI tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a LaTeX source for structural problems and emit a JSON report
    Validate {
        /// Path to the .tex file
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
    /// Compile a LaTeX document and emit the compilation record as JSON
    Compile {
        /// Path to the main .tex file
        #[arg(value_name = "FILE")]
        path: PathBuf,
        /// Engine to drive (pdflatex, lualatex, xelatex)
        #[arg(long, default_value = "pdflatex")]
        engine: String,
        /// Run the bibliography pass between engine passes
        #[arg(long)]
        bib: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => {
            let content = fs::read_to_string(&path)?;
            let report = oxitex_lint::validate(&content);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Compile { path, engine, bib } => {
            let source = path.canonicalize().unwrap_or(path);
            let request = CompileRequest {
                source,
                engine,
                bibliography: bib,
            };
            let outcome = Compiler::new().compile(&request).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }
    Ok(())
}
