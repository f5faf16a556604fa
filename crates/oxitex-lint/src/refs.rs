//! Reference/label cross-checking.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static REF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\ref\{([^}]+)\}").unwrap());
static LABEL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\label\{([^}]+)\}").unwrap());

/// Referenced targets with no matching `\label` in the same content.
///
/// Each target appears once, in order of first appearance. Labels declared
/// in other files are invisible here, so their references will show up in
/// the result; callers surface this as a "potentially undefined" warning,
/// not a hard error.
pub fn dangling_references(content: &str) -> Vec<String> {
    let labels: HashSet<&str> = LABEL_RE
        .captures_iter(content)
        .map(|caps| caps.get(1).map_or("", |m| m.as_str()))
        .collect();

    let mut seen = HashSet::new();
    let mut dangling = Vec::new();
    for caps in REF_RE.captures_iter(content) {
        let target = caps.get(1).map_or("", |m| m.as_str());
        if !labels.contains(target) && seen.insert(target) {
            dangling.push(target.to_string());
        }
    }
    dangling
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_references_are_clean() {
        let content = "\\label{sec:a}\n\\ref{sec:a}\n";
        assert!(dangling_references(content).is_empty());
    }

    #[test]
    fn unresolved_references_keep_first_appearance_order() {
        let content = "\\ref{zeta}\n\\ref{alpha}\n\\label{known}\n\\ref{known}\n";
        assert_eq!(dangling_references(content), vec!["zeta", "alpha"]);
    }

    #[test]
    fn repeated_unresolved_reference_is_listed_once() {
        let content = "\\ref{x} \\ref{x} \\ref{y}";
        assert_eq!(dangling_references(content), vec!["x", "y"]);
    }

    #[test]
    fn label_order_does_not_matter() {
        let content = "\\ref{fwd}\n\\label{fwd}\n";
        assert!(dangling_references(content).is_empty());
    }
}
