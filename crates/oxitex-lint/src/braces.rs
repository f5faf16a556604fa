//! Brace balance scanning.

/// Scans `content` for unbalanced braces.
///
/// Tracks a signed nesting counter in reading order. A closing brace that
/// takes the counter negative produces an error naming its 1-based line,
/// then resets the counter to zero so one stray brace cannot cascade into
/// spurious errors for the rest of the file. Openings still unclosed when
/// the scan ends produce a single aggregate error carrying their count,
/// not one error each.
pub fn scan(content: &str) -> Vec<String> {
    let mut errors = Vec::new();
    let mut depth: i32 = 0;
    for (index, line) in content.split('\n').enumerate() {
        for ch in line.chars() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth < 0 {
                        errors.push(format!("Line {}: Unmatched closing brace", index + 1));
                        depth = 0;
                    }
                }
                _ => {}
            }
        }
    }
    if depth > 0 {
        errors.push(format!("Unmatched opening braces: {depth}"));
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_content_is_clean() {
        assert!(scan("\\emph{a {nested} group}").is_empty());
    }

    #[test]
    fn stray_closing_brace_names_its_line() {
        let errors = scan("\\section{ok}\ntext }\nmore text\n");
        assert_eq!(errors, vec!["Line 2: Unmatched closing brace"]);
    }

    #[test]
    fn reset_after_stray_brace_stops_the_cascade() {
        // The stray brace on line 1 must not unbalance the valid group below.
        let errors = scan("}\n\\emph{fine}\n");
        assert_eq!(errors, vec!["Line 1: Unmatched closing brace"]);
    }

    #[test]
    fn unclosed_openings_collapse_into_one_error() {
        let errors = scan("{{{\n");
        assert_eq!(errors, vec!["Unmatched opening braces: 3"]);
    }

    #[test]
    fn stray_close_and_unclosed_open_both_reported() {
        let errors = scan("}\n{\n");
        assert_eq!(
            errors,
            vec!["Line 1: Unmatched closing brace", "Unmatched opening braces: 1"]
        );
    }
}
