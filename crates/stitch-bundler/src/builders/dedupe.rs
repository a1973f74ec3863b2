//! Removal of helper blocks the engine emitted more than once in one file.
//!
//! Helpers are top-level `var __name = ...;` statements. Only exact repeats
//! inside the same output are dropped; the first occurrence stays.

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static HELPER_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^var __[\w$]+ = ").expect("valid helper pattern"));

/// Strip repeated helper blocks from `code`.
///
/// Returns the input unchanged (borrowed) when nothing was repeated.
pub fn strip_duplicate_helpers(code: &str) -> Cow<'_, str> {
    let lines: Vec<&str> = code.split_inclusive('\n').collect();
    let mut seen: HashSet<String> = HashSet::new();
    let mut output = String::with_capacity(code.len());
    let mut removed = 0usize;
    let mut i = 0;

    while i < lines.len() {
        if !HELPER_START.is_match(lines[i]) {
            output.push_str(lines[i]);
            i += 1;
            continue;
        }

        let end = helper_end(&lines, i);
        let block: String = lines[i..=end].concat();
        if seen.insert(block.clone()) {
            output.push_str(&block);
        } else {
            removed += 1;
        }
        i = end + 1;
    }

    if removed == 0 {
        Cow::Borrowed(code)
    } else {
        tracing::debug!(removed, "Stripped duplicate helper blocks");
        Cow::Owned(output)
    }
}

/// Index of the line that closes the block starting at `start`.
fn helper_end(lines: &[&str], start: usize) -> usize {
    let mut depth: i64 = 0;
    for (offset, line) in lines[start..].iter().enumerate() {
        for ch in line.chars() {
            match ch {
                '{' | '(' | '[' => depth += 1,
                '}' | ')' | ']' => depth -= 1,
                _ => {}
            }
        }
        if depth <= 0 && line.trim_end().ends_with(';') {
            return start + offset;
        }
    }
    lines.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT_HELPER: &str = "var __export = (target, all) => {\n\tfor (var name in all) target[name] = all[name];\n};\n";

    #[test]
    fn test_no_duplicates_is_borrowed() {
        let code = format!("{EXPORT_HELPER}console.log(1);\n");
        assert!(matches!(strip_duplicate_helpers(&code), Cow::Borrowed(_)));
    }

    #[test]
    fn test_repeated_block_removed() {
        let code = format!("{EXPORT_HELPER}a();\n{EXPORT_HELPER}b();\n");
        let stripped = strip_duplicate_helpers(&code);
        assert_eq!(stripped, format!("{EXPORT_HELPER}a();\nb();\n"));
    }

    #[test]
    fn test_single_line_helpers() {
        let code = "var __defProp = Object.defineProperty;\nx();\nvar __defProp = Object.defineProperty;\n";
        assert_eq!(
            strip_duplicate_helpers(code),
            "var __defProp = Object.defineProperty;\nx();\n"
        );
    }

    #[test]
    fn test_different_bodies_kept() {
        let code = "var __a = 1;\nvar __a = 2;\n";
        assert_eq!(strip_duplicate_helpers(code), code);
    }

    #[test]
    fn test_non_helper_vars_untouched() {
        let code = "var x = 1;\nvar x = 1;\n";
        assert_eq!(strip_duplicate_helpers(code), code);
    }
}
