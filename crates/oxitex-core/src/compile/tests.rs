use super::*;
use crate::runner::ScriptedRunner;
use std::path::Path;

fn tex_workspace() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("main.tex");
    std::fs::write(
        &source,
        "\\documentclass{article}\n\\begin{document}\nhello\n\\end{document}\n",
    )
    .unwrap();
    (dir, source)
}

fn request(source: &Path, engine: &str, bibliography: bool) -> CompileRequest {
    CompileRequest {
        source: source.to_path_buf(),
        engine: engine.to_string(),
        bibliography,
    }
}

fn scripted_compiler() -> (std::sync::Arc<ScriptedRunner>, Compiler) {
    let runner = std::sync::Arc::new(ScriptedRunner::new());
    let compiler = Compiler::with_runner(runner.clone());
    (runner, compiler)
}

#[tokio::test]
async fn missing_source_fails_before_any_spawn() {
    let (runner, compiler) = scripted_compiler();
    let missing = Path::new("/definitely/not/here/main.tex");

    let err = compiler
        .compile(&request(missing, "pdflatex", false))
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::NotFound(_)));
    assert_eq!(
        err.to_string(),
        "File does not exist: /definitely/not/here/main.tex"
    );
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn non_tex_source_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "not latex").unwrap();
    let (runner, compiler) = scripted_compiler();

    let err = compiler
        .compile(&request(&notes, "pdflatex", false))
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::InvalidInput(_)));
    assert_eq!(err.to_string(), "File must have .tex extension");
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn unknown_engine_is_rejected() {
    let (_dir, source) = tex_workspace();
    let (runner, compiler) = scripted_compiler();

    let err = compiler
        .compile(&request(&source, "latexmk", false))
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::InvalidInput(_)));
    assert_eq!(err.to_string(), "Unsupported engine: latexmk");
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn missing_file_wins_over_bad_engine() {
    let (_runner, compiler) = scripted_compiler();
    let missing = Path::new("/definitely/not/here/main.tex");

    let err = compiler
        .compile(&request(missing, "latexmk", false))
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::NotFound(_)));
}

#[tokio::test]
async fn single_pass_runs_in_source_directory() {
    let (dir, source) = tex_workspace();
    let (runner, compiler) = scripted_compiler();
    runner.push_ok("This is pdfTeX", "", 0);

    let outcome = compiler
        .compile(&request(&source, "pdflatex", false))
        .await
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.latex_returncode, 0);
    assert_eq!(outcome.latex_output, "This is pdfTeX");
    assert!(!outcome.pdf_generated);
    assert!(outcome.pdf_path.is_none());

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].program, "pdflatex");
    assert_eq!(calls[0].args, vec!["-interaction=nonstopmode", "main.tex"]);
    assert_eq!(calls[0].workdir, dir.path());
    assert_eq!(calls[0].timeout, ENGINE_PASS_TIMEOUT);
}

#[tokio::test]
async fn bibliography_sequences_three_passes() {
    let (dir, source) = tex_workspace();
    std::fs::write(dir.path().join("refs.bib"), "@book{k, title={T}}").unwrap();
    let (runner, compiler) = scripted_compiler();
    runner.push_ok("first pass", "", 1);
    runner.push_ok("bibtex ran", "", 0);
    runner.push_ok("second pass", "", 0);

    let outcome = compiler
        .compile(&request(&source, "pdflatex", true))
        .await
        .unwrap();

    let calls = runner.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].program, "pdflatex");
    assert_eq!(calls[1].program, "bibtex");
    assert_eq!(calls[1].args, vec!["main"]);
    assert_eq!(calls[1].timeout, BIB_PASS_TIMEOUT);
    assert_eq!(calls[2].program, "pdflatex");
    assert_eq!(calls[2].args, calls[0].args);
    assert_eq!(calls[2].workdir, dir.path());

    assert_eq!(outcome.bibtex_output.as_deref(), Some("bibtex ran"));
    assert_eq!(outcome.bibtex_returncode, Some(0));
    assert_eq!(outcome.latex_output_2.as_deref(), Some("second pass"));
    assert_eq!(outcome.latex_returncode_2, Some(0));
}

#[tokio::test]
async fn bibliography_without_bib_file_is_a_silent_skip() {
    let (_dir, source) = tex_workspace();
    let (runner, compiler) = scripted_compiler();
    runner.push_ok("only pass", "", 0);

    let outcome = compiler
        .compile(&request(&source, "pdflatex", true))
        .await
        .unwrap();

    assert_eq!(runner.calls().len(), 1);
    assert!(outcome.success);
    assert!(outcome.bibtex_output.is_none());
    assert!(outcome.latex_output_2.is_none());

    // Skipped stages disappear from the serialized record entirely.
    let value = serde_json::to_value(&outcome).unwrap();
    assert!(value.get("bibtex_output").is_none());
    assert!(value.get("latex_output_2").is_none());
    assert!(value.get("pdf_path").is_none());
}

#[tokio::test]
async fn final_pass_decides_success_after_recovery() {
    let (dir, source) = tex_workspace();
    std::fs::write(dir.path().join("refs.bib"), "@book{k, title={T}}").unwrap();
    let (runner, compiler) = scripted_compiler();
    // Citations unresolved on the first pass, fixed by the re-compile.
    runner.push_ok("", "undefined citations", 1);
    runner.push_ok("", "", 0);
    runner.push_ok("", "", 0);

    let outcome = compiler
        .compile(&request(&source, "pdflatex", true))
        .await
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.latex_returncode, 1);
    assert_eq!(outcome.latex_returncode_2, Some(0));
}

#[tokio::test]
async fn final_pass_decides_success_after_regression() {
    let (dir, source) = tex_workspace();
    std::fs::write(dir.path().join("refs.bib"), "@book{k, title={T}}").unwrap();
    let (runner, compiler) = scripted_compiler();
    runner.push_ok("", "", 0);
    runner.push_ok("", "", 0);
    runner.push_ok("", "broke on the re-compile", 1);

    let outcome = compiler
        .compile(&request(&source, "pdflatex", true))
        .await
        .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.latex_returncode, 0);
    assert_eq!(outcome.latex_returncode_2, Some(1));
}

#[tokio::test]
async fn bibtex_failure_is_recorded_not_fatal() {
    let (dir, source) = tex_workspace();
    std::fs::write(dir.path().join("refs.bib"), "@book{k, title={T}}").unwrap();
    let (runner, compiler) = scripted_compiler();
    runner.push_ok("", "", 0);
    runner.push_ok("", "I couldn't open database file refs.bib", 2);
    runner.push_ok("", "", 0);

    let outcome = compiler
        .compile(&request(&source, "pdflatex", true))
        .await
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.bibtex_returncode, Some(2));
    assert_eq!(
        outcome.bibtex_errors.as_deref(),
        Some("I couldn't open database file refs.bib")
    );
}

#[tokio::test]
async fn timeout_surfaces_and_leaves_cwd_alone() {
    let before = std::env::current_dir().unwrap();
    let (_dir, source) = tex_workspace();
    let (runner, compiler) = scripted_compiler();
    runner.push_timeout();

    let err = compiler
        .compile(&request(&source, "pdflatex", false))
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::Timeout(_)));
    assert_eq!(err.to_string(), "Compilation timed out");
    assert_eq!(std::env::current_dir().unwrap(), before);
}

#[tokio::test]
async fn spawn_failure_surfaces_as_internal() {
    let (_dir, source) = tex_workspace();
    let (runner, compiler) = scripted_compiler();
    runner.push_io_failure("No such file or directory");

    let err = compiler
        .compile(&request(&source, "pdflatex", false))
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::Internal(_)));
    assert!(err.to_string().starts_with("Compilation failed:"));
}

#[tokio::test]
async fn concurrent_compiles_keep_their_own_directories() {
    let before = std::env::current_dir().unwrap();
    let (dir_a, source_a) = tex_workspace();
    let (dir_b, source_b) = tex_workspace();
    let (runner_a, compiler_a) = scripted_compiler();
    let (runner_b, compiler_b) = scripted_compiler();
    runner_a.push_ok("", "", 0);
    runner_b.push_ok("", "", 0);

    let request_a = request(&source_a, "pdflatex", false);
    let request_b = request(&source_b, "xelatex", false);
    let (a, b) = tokio::join!(
        compiler_a.compile(&request_a),
        compiler_b.compile(&request_b),
    );
    a.unwrap();
    b.unwrap();

    // Each spawn carries its own directory; nothing ambient to race on.
    assert_eq!(runner_a.calls()[0].workdir, dir_a.path());
    assert_eq!(runner_b.calls()[0].workdir, dir_b.path());
    assert_eq!(runner_b.calls()[0].program, "xelatex");
    assert_eq!(std::env::current_dir().unwrap(), before);
}

#[tokio::test]
async fn existing_pdf_artifact_is_reported() {
    let (dir, source) = tex_workspace();
    std::fs::write(dir.path().join("main.pdf"), b"%PDF-1.5").unwrap();
    let (runner, compiler) = scripted_compiler();
    runner.push_ok("", "", 0);

    let outcome = compiler
        .compile(&request(&source, "pdflatex", false))
        .await
        .unwrap();

    assert!(outcome.pdf_generated);
    let pdf_path = outcome.pdf_path.unwrap();
    assert!(pdf_path.ends_with("main.pdf"));
}
