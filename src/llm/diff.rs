//! Condense unified diffs to the lines worth showing a model.

/// At most this many changed lines are kept per diff.
pub const MAX_MEANINGFUL_LINES: usize = 20;

/// Keep only added/removed lines that carry content.
///
/// Headers, context lines, blank or whitespace-only changes, comment-only
/// changes and bare import lines are dropped. Returns `""` when nothing
/// remains.
pub fn condense(diff: &str) -> String {
    diff.lines()
        .filter(|line| is_meaningful(line))
        .take(MAX_MEANINGFUL_LINES)
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line description of how much meaningful content a diff changes.
pub fn change_summary(diff: &str) -> String {
    let (additions, deletions) = diff
        .lines()
        .filter(|line| is_meaningful(line))
        .fold((0usize, 0usize), |(a, d), line| {
            if line.trim_start().starts_with('+') {
                (a + 1, d)
            } else {
                (a, d + 1)
            }
        });

    match (additions, deletions) {
        (0, 0) => "No meaningful changes".to_string(),
        (a, 0) => format!("Added (+{a} lines)"),
        (0, d) => format!("Removed (-{d} lines)"),
        (a, d) => format!("Modified (+{a}, -{d} lines)"),
    }
}

fn is_meaningful(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() || is_header(trimmed) {
        return false;
    }

    let Some(content) = trimmed
        .strip_prefix('+')
        .or_else(|| trimmed.strip_prefix('-'))
    else {
        return false;
    };

    let content = content.trim();
    !content.is_empty() && !is_comment(content) && !is_bare_import(content)
}

fn is_header(line: &str) -> bool {
    ["@@", "+++", "---", "index ", "diff --git"]
        .iter()
        .any(|prefix| line.starts_with(prefix))
}

fn is_comment(content: &str) -> bool {
    ["//", "/*", "*", "#", "<!--", "-->"]
        .iter()
        .any(|prefix| content.starts_with(prefix))
}

fn is_bare_import(content: &str) -> bool {
    (content.starts_with("import ") || content.starts_with("use "))
        && !content.contains("new ")
        && !content.contains('=')
        && !content.contains('{')
        && !content.contains('(')
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "diff --git a/src/lib.rs b/src/lib.rs
index 83db48f..bf269f4 100644
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1,5 +1,6 @@
 fn unchanged() {}
+use std::fmt;
+// a new comment
+
+
-fn old() -> u32 { 1 }
+fn new() -> u32 { 2 }
+let x = compute();";

    #[test]
    fn test_condense_keeps_only_meaningful_lines() {
        assert_eq!(
            condense(SAMPLE),
            "-fn old() -> u32 { 1 }\n+fn new() -> u32 { 2 }\n+let x = compute();"
        );
    }

    #[test]
    fn test_condense_caps_line_count() {
        let diff: String = (0..50).map(|i| format!("+let v{i} = {i};\n")).collect();
        assert_eq!(condense(&diff).lines().count(), MAX_MEANINGFUL_LINES);
    }

    #[test]
    fn test_condense_empty() {
        assert_eq!(condense(""), "");
        assert_eq!(condense("@@ -1 +1 @@\n context"), "");
    }

    #[test]
    fn test_change_summary_variants() {
        assert_eq!(change_summary(SAMPLE), "Modified (+2, -1 lines)");
        assert_eq!(change_summary("+a = 1\n+b = 2"), "Added (+2 lines)");
        assert_eq!(change_summary("-a = 1"), "Removed (-1 lines)");
        assert_eq!(change_summary("+// only a comment"), "No meaningful changes");
        assert_eq!(change_summary(""), "No meaningful changes");
    }
}
