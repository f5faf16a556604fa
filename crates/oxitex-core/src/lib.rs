//! # OxiTeX Core
//!
//! Engine discovery and compilation orchestration for the OxiTeX tool server.
//!
//! ## Overview
//!
//! This crate owns every interaction with the external TeX toolchain: finding
//! out which distribution is installed, spawning engine and bibliography
//! processes with bounded lifetimes, and sequencing the multi-pass dance a
//! LaTeX document needs before its citations resolve. Higher layers (the stdio
//! server, the CLI) stay free of process-handling concerns.
//!
//! ## Modules
//!
//! - [`compile`] - The pass orchestrator: preconditions, engine/bibliography
//!   sequencing, artifact reporting
//! - [`engine`] - Supported engine names and TeX distribution detection
//! - [`runner`] - The command execution seam ([`runner::CommandRunner`]) and
//!   its tokio-backed production implementation
//! - [`error`] - The error taxonomy shared by every tool operation
//!
//! ## Design Philosophy
//!
//! - **No ambient state**: external tools always receive an explicit working
//!   directory; the daemon's own current directory is never touched, so
//!   concurrent compiles cannot race on it.
//! - **Bounded lifetimes**: every spawn carries a wall-clock budget and the
//!   child is killed, not abandoned, when the budget runs out.
//! - **Testability**: process execution sits behind a trait, so the whole
//!   orchestration protocol is checkable without a TeX installation.
//!
//! ## Example
//!
//! ```no_run
//! use oxitex_core::compile::{CompileRequest, Compiler};
//! use oxitex_core::error::ToolError;
//!
//! async fn typeset() -> Result<(), ToolError> {
//!     let compiler = Compiler::new();
//!     let request = CompileRequest {
//!         source: "/work/paper/main.tex".into(),
//!         engine: "pdflatex".to_string(),
//!         bibliography: true,
//!     };
//!     let outcome = compiler.compile(&request).await?;
//!     println!("success: {} pdf: {:?}", outcome.success, outcome.pdf_path);
//!     Ok(())
//! }
//! ```

pub mod compile;
pub mod engine;
pub mod error;
pub mod runner;
