//! Multi-pass compilation orchestrator.
//!
//! Drives the external TeX toolchain through up to three passes: the engine
//! pass, an optional `bibtex` pass, and the re-compile that resolves
//! citations. Every pass runs in the source file's parent directory, passed
//! explicitly per spawn; the daemon's own working directory is never touched,
//! so concurrent compiles cannot interfere with each other.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use serde::Serialize;

use crate::engine::Engine;
use crate::error::ToolError;
use crate::runner::{CapturedOutput, CommandRunner, Invocation, RunnerError, TokioCommandRunner};

/// Wall-clock budget for a single document engine pass.
pub const ENGINE_PASS_TIMEOUT: Duration = Duration::from_secs(60);
/// Wall-clock budget for the bibliography pass.
pub const BIB_PASS_TIMEOUT: Duration = Duration::from_secs(30);

/// A compilation request as received from a client.
#[derive(Debug, Clone)]
pub struct CompileRequest {
    /// Path of the root `.tex` file.
    pub source: PathBuf,
    /// Requested engine name, e.g. `"pdflatex"`.
    ///
    /// Kept as a plain string so [`Compiler::compile`] can validate it after
    /// the path checks; precondition failures keep a fixed order.
    pub engine: String,
    /// Run a bibliography pass plus a second engine pass when a `.bib` file
    /// sits next to the source.
    pub bibliography: bool,
}

/// Everything a finished compilation has to report.
///
/// Stage fields for the bibliography pass and the re-compile are only present
/// when those passes ran; they serialize away entirely otherwise. `success`
/// follows the exit code of the final engine pass, which is the re-compile
/// whenever one happened.
#[derive(Debug, Clone, Serialize)]
pub struct CompileOutcome {
    pub latex_output: String,
    pub latex_errors: String,
    pub latex_returncode: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bibtex_output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bibtex_errors: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bibtex_returncode: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latex_output_2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latex_errors_2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latex_returncode_2: Option<i32>,
    pub pdf_generated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_path: Option<String>,
    pub success: bool,
}

/// Drives external TeX engines through their passes.
///
/// Holds no per-request state, so one instance serves any number of
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct Compiler {
    runner: Arc<dyn CommandRunner>,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    /// Creates a compiler that spawns real processes.
    pub fn new() -> Self {
        Self {
            runner: Arc::new(TokioCommandRunner),
        }
    }

    /// Creates a compiler with a custom runner (for testing).
    pub fn with_runner(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Compiles `request.source`, sequencing engine and bibliography passes.
    ///
    /// Preconditions are checked in a fixed order, first failure wins: the
    /// source must exist ([`ToolError::NotFound`]), carry a `.tex` extension,
    /// and name a supported engine (both [`ToolError::InvalidInput`]).
    ///
    /// # Errors
    ///
    /// [`ToolError::Timeout`] when any pass outlives its budget (the child is
    /// killed first), [`ToolError::Internal`] when a spawn fails outright.
    /// A pass that runs and exits nonzero is not an error; it is reported in
    /// the outcome.
    pub async fn compile(&self, request: &CompileRequest) -> Result<CompileOutcome, ToolError> {
        if !request.source.exists() {
            return Err(ToolError::NotFound(format!(
                "File does not exist: {}",
                request.source.display()
            )));
        }
        if request.source.extension().map_or(true, |ext| ext != "tex") {
            return Err(ToolError::InvalidInput(
                "File must have .tex extension".to_string(),
            ));
        }
        let engine: Engine = request.engine.parse()?;

        // extension() returned Some above, so a file name is present
        let filename = request
            .source
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        let stem = request
            .source
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        let workdir = match request.source.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        info!("compiling {filename} with {engine}");
        let engine_args = ["-interaction=nonstopmode", filename.as_str()];

        let first = self
            .run_pass("engine", engine.program(), &engine_args, &workdir, ENGINE_PASS_TIMEOUT)
            .await?;

        let mut outcome = CompileOutcome {
            success: first.success(),
            latex_output: first.stdout,
            latex_errors: first.stderr,
            latex_returncode: first.code,
            bibtex_output: None,
            bibtex_errors: None,
            bibtex_returncode: None,
            latex_output_2: None,
            latex_errors_2: None,
            latex_returncode_2: None,
            pdf_generated: false,
            pdf_path: None,
        };

        if request.bibliography {
            if has_bib_companion(&workdir).await {
                let bib = self
                    .run_pass("bibliography", "bibtex", &[stem.as_str()], &workdir, BIB_PASS_TIMEOUT)
                    .await?;
                outcome.bibtex_output = Some(bib.stdout);
                outcome.bibtex_errors = Some(bib.stderr);
                outcome.bibtex_returncode = Some(bib.code);

                // Re-resolve citations. This pass is the authoritative one.
                let second = self
                    .run_pass("re-compile", engine.program(), &engine_args, &workdir, ENGINE_PASS_TIMEOUT)
                    .await?;
                outcome.success = second.success();
                outcome.latex_output_2 = Some(second.stdout);
                outcome.latex_errors_2 = Some(second.stderr);
                outcome.latex_returncode_2 = Some(second.code);
            } else {
                debug!("bibliography pass requested but no .bib file next to {filename}, skipping");
            }
        }

        let pdf = request.source.with_extension("pdf");
        if pdf.exists() {
            outcome.pdf_generated = true;
            outcome.pdf_path = Some(pdf.display().to_string());
        }

        info!(
            "compile of {filename} finished: success={} pdf_generated={}",
            outcome.success, outcome.pdf_generated
        );
        Ok(outcome)
    }

    async fn run_pass(
        &self,
        stage: &str,
        program: &str,
        args: &[&str],
        workdir: &Path,
        budget: Duration,
    ) -> Result<CapturedOutput, ToolError> {
        let invocation = Invocation {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            workdir: workdir.to_path_buf(),
            timeout: budget,
        };
        info!("{stage} pass: {program} in {}", workdir.display());
        match self.runner.run(&invocation).await {
            Ok(output) => Ok(output),
            Err(RunnerError::Timeout { .. }) => {
                warn!("{stage} pass timed out after {}s", budget.as_secs());
                Err(ToolError::Timeout("Compilation timed out".to_string()))
            }
            Err(err) => Err(ToolError::Internal(format!("Compilation failed: {err}"))),
        }
    }
}

/// Whether `dir` holds at least one `.bib` entry (non-recursive).
async fn has_bib_companion(dir: &Path) -> bool {
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return false;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name();
        if Path::new(&name).extension().map_or(false, |ext| ext == "bib") {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests;
