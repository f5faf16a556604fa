//! Heuristic LaTeX syntax validation.
//!
//! ## Overview
//!
//! A deliberately lightweight lint pass over a single file's content: no TeX
//! parsing, no catcode awareness, just character scans and a pair of regular
//! expressions. It runs in one pass over the text and is safe to call
//! concurrently from any number of tasks.
//!
//! Four checks feed one [`ValidationReport`]:
//!
//! - brace balance with line-numbered stray-closing errors ([`braces`])
//! - presence of the three structural markers (`\documentclass`,
//!   `\begin{document}`, `\end{document}`)
//! - math-delimiter parity on `$`
//! - `\ref` targets without a matching `\label` ([`refs`])
//!
//! ## Known limitations
//!
//! The `$` parity check counts every dollar sign, escaped `\$` included, so
//! it can false-positive on literal dollars; that is why parity problems are
//! warnings rather than errors. The reference cross-check only sees labels
//! declared in the content it is given: labels living in files pulled in via
//! `\input` or `\include` are invisible and their references get reported as
//! potentially undefined.

pub mod braces;
pub mod refs;

use serde::Serialize;

const DOCUMENTCLASS: &str = "\\documentclass";
const BEGIN_DOCUMENT: &str = "\\begin{document}";
const END_DOCUMENT: &str = "\\end{document}";

/// Outcome of one validation pass.
///
/// Built fresh per call and never mutated after return. `is_valid` reflects
/// the error list only; a report can be valid and still carry warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub is_valid: bool,
    pub structure_complete: bool,
}

/// Validates `content` without touching the filesystem.
///
/// ```
/// let report = oxitex_lint::validate("\\documentclass{article}\n\\begin{document}\nok\n\\end{document}\n");
/// assert!(report.is_valid);
/// assert!(report.structure_complete);
/// ```
pub fn validate(content: &str) -> ValidationReport {
    let mut errors = braces::scan(content);

    let has_documentclass = content.contains(DOCUMENTCLASS);
    let has_begin = content.contains(BEGIN_DOCUMENT);
    let has_end = content.contains(END_DOCUMENT);
    if !has_documentclass {
        errors.push("Missing \\documentclass command".to_string());
    }
    if !has_begin {
        errors.push("Missing \\begin{document}".to_string());
    }
    if !has_end {
        errors.push("Missing \\end{document}".to_string());
    }

    let mut warnings = Vec::new();
    if content.matches('$').count() % 2 != 0 {
        warnings.push("Unmatched math mode delimiters ($)".to_string());
    }

    let dangling = refs::dangling_references(content);
    if !dangling.is_empty() {
        warnings.push(format!(
            "Potentially undefined references: {}",
            dangling.join(", ")
        ));
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        structure_complete: has_documentclass && has_begin && has_end,
        errors,
        warnings,
    }
}
