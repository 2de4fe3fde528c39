//! GitHub flavor renderer for PR and issue templates.
//!
//! GitHub templates carry no loop or conditional syntax. Rendering is three
//! passes: strip HTML comments, substitute a fixed commit-derived
//! vocabulary, then tick checklist items the commits appear to satisfy.

use std::sync::LazyLock;

use chrono::{Local, NaiveDateTime};
use indexmap::IndexSet;
use regex_lite::{Captures, Regex};
use tracing::debug;

use crate::git::Commit;
use crate::locale::Locale;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));

static VARIABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([\w.]+)\s*\}\}").expect("valid regex"));

static CHECKBOX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*)-[ \t]*\[[ \t]*\][ \t]*(.+)$").expect("valid regex")
});

/// Render a GitHub template against `commits` using the current time.
pub fn render_github_template(
    template: &str,
    commits: &[Commit],
    title: Option<&str>,
    locale: Locale,
) -> String {
    GitHubRenderer::new(locale).render(template, commits, title)
}

/// Renderer for GitHub PR/issue templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitHubRenderer {
    locale: Locale,
    now: Option<NaiveDateTime>,
}

impl GitHubRenderer {
    pub fn new(locale: Locale) -> Self {
        Self { locale, now: None }
    }

    /// Pin the clock used for `{{date}}` and `{{datetime}}`.
    pub fn at(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    pub fn render(&self, template: &str, commits: &[Commit], title: Option<&str>) -> String {
        let stripped = strip_comments(template);
        let substituted = self.substitute(&stripped, commits, title);
        check_boxes(&substituted, commits).trim().to_string()
    }

    fn substitute(&self, text: &str, commits: &[Commit], title: Option<&str>) -> String {
        let now = self.now.unwrap_or_else(|| Local::now().naive_local());
        VARIABLE_RE
            .replace_all(text, |caps: &Captures<'_>| {
                match self.variable(&caps[1], commits, title, now) {
                    Some(value) => value,
                    None => {
                        debug!(token = &caps[0], "keeping unknown template variable");
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }

    /// Value of a fixed-vocabulary variable, or `None` for unknown names.
    fn variable(
        &self,
        name: &str,
        commits: &[Commit],
        title: Option<&str>,
        now: NaiveDateTime,
    ) -> Option<String> {
        let messages = self.locale.messages();
        let value = match name.to_lowercase().as_str() {
            "title" => title
                .map(str::to_string)
                .unwrap_or_else(|| messages.default_pr_title().to_string()),
            "commits.count" => commits.len().to_string(),
            "commits.summary" => self.summary(commits),
            "commits.list" => commits
                .iter()
                .map(|c| format!("- {} ({})", c.subject(), c.author))
                .collect::<Vec<_>>()
                .join("\n"),
            "commits.files" => changed_paths(commits)
                .iter()
                .map(|path| format!("- {path}"))
                .collect::<Vec<_>>()
                .join("\n"),
            "commits.authors" => authors(commits).join(", "),
            "date" => now.format("%Y-%m-%d").to_string(),
            "datetime" => now.format("%Y-%m-%dT%H:%M:%S").to_string(),
            _ => return None,
        };
        Some(value)
    }

    fn summary(&self, commits: &[Commit]) -> String {
        let messages = self.locale.messages();
        if commits.is_empty() {
            return messages.no_changes().to_string();
        }

        let mut summary = messages.commit_summary(commits.len());
        let authors = authors(commits);
        if authors.len() > 1 {
            summary.push_str(&messages.participants(&authors.join(", ")));
        }
        summary
    }
}

/// Remove every `<!-- ... -->` span, including multi-line ones.
pub fn strip_comments(text: &str) -> String {
    COMMENT_RE.replace_all(text, "").into_owned()
}

/// Mark `- [ ] label` items whose label matches a heuristic the commits satisfy.
///
/// Indentation is kept; unmatched items stay unchecked.
pub fn check_boxes(text: &str, commits: &[Commit]) -> String {
    let evidence = Evidence::collect(commits);
    CHECKBOX_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let indent = &caps[1];
            let label = &caps[2];
            let mark = if evidence.satisfies(label) { 'x' } else { ' ' };
            format!("{indent}- [{mark}] {label}")
        })
        .into_owned()
}

/// Distinct author names in first-seen order.
fn authors(commits: &[Commit]) -> Vec<&str> {
    commits
        .iter()
        .map(|c| c.author.as_str())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct changed paths in first-seen order.
fn changed_paths(commits: &[Commit]) -> Vec<&str> {
    commits
        .iter()
        .flat_map(|c| c.changes.iter().map(|change| change.path.as_str()))
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// What the commit set looks like, computed once per render.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Evidence {
    tests: bool,
    docs: bool,
    breaking: bool,
    fixes: bool,
    features: bool,
}

impl Evidence {
    fn collect(commits: &[Commit]) -> Self {
        let mut evidence = Self::default();
        for commit in commits {
            let message = commit.message.to_lowercase();
            let paths: Vec<String> = commit.changes.iter().map(|c| c.path.to_lowercase()).collect();
            let any_path = |needle: &str| paths.iter().any(|p| p.contains(needle));

            evidence.tests |= message.contains("test") || any_path("test");
            evidence.docs |= message.contains("doc") || any_path("readme") || any_path(".md");
            evidence.breaking |= message.contains("breaking") || message.contains("major");
            evidence.fixes |= message.contains("fix") || message.contains("bug");
            evidence.features |= ["feat", "feature", "add"].iter().any(|k| message.contains(k));
        }
        evidence
    }

    fn satisfies(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        (label.contains("test") && self.tests)
            || (label.contains("documentation") && self.docs)
            || (label.contains("breaking") && self.breaking)
            || (label.contains("fix") && self.fixes)
            || (label.contains("feature") && self.features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::fixtures::commit;
    use chrono::NaiveDate;

    fn fixed_renderer(locale: Locale) -> GitHubRenderer {
        let now = NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(7, 8, 9)
            .unwrap();
        GitHubRenderer::new(locale).at(now)
    }

    #[test]
    fn test_comments_are_stripped() {
        let tpl = "A<!-- note -->B\n<!--\nmulti\nline\n-->C";
        let out = fixed_renderer(Locale::En).render(tpl, &[], None);
        assert_eq!(out, "AB\nC");
        assert!(!out.contains("note"));
    }

    #[test]
    fn test_unknown_variable_preserved_verbatim() {
        let out = fixed_renderer(Locale::En).render("x {{ unknownvar }} y", &[], None);
        assert_eq!(out, "x {{ unknownvar }} y");
    }

    #[test]
    fn test_fixed_vocabulary() {
        let commits = vec![
            commit("feat: add login\n\nbody", "Ana", &["src/login.rs", "README.md"]),
            commit("fix: typo", "Ben", &["README.md"]),
        ];
        let tpl = "{{title}}|{{commits.count}}|{{commits.authors}}|{{date}}|{{datetime}}";
        let out = fixed_renderer(Locale::En).render(tpl, &commits, Some("My PR"));
        assert_eq!(out, "My PR|2|Ana, Ben|2024-05-06|2024-05-06T07:08:09");
    }

    #[test]
    fn test_variable_names_are_case_insensitive() {
        let out = fixed_renderer(Locale::En).render("{{ Commits.Count }}", &[], None);
        assert_eq!(out, "0");
    }

    #[test]
    fn test_commit_list_and_files() {
        let commits = vec![
            commit("feat: add login\n\nbody", "Ana", &["src/login.rs", "README.md"]),
            commit("fix: typo", "Ben", &["README.md"]),
        ];
        let renderer = fixed_renderer(Locale::En);
        assert_eq!(
            renderer.render("{{commits.list}}", &commits, None),
            "- feat: add login (Ana)\n- fix: typo (Ben)"
        );
        assert_eq!(
            renderer.render("{{commits.files}}", &commits, None),
            "- src/login.rs\n- README.md"
        );
    }

    #[test]
    fn test_default_title_is_localized() {
        assert_eq!(fixed_renderer(Locale::En).render("{{title}}", &[], None), "Pull Request");
        assert_eq!(fixed_renderer(Locale::Ja).render("{{title}}", &[], None), "プルリクエスト");
    }

    #[test]
    fn test_summary_lists_participants_only_when_several() {
        let renderer = fixed_renderer(Locale::En);
        let solo = vec![commit("a", "Ana", &[]), commit("b", "Ana", &[])];
        assert_eq!(
            renderer.render("{{commits.summary}}", &solo, None),
            "This change includes 2 commits."
        );

        let pair = vec![commit("a", "Ana", &[]), commit("b", "Ben", &[])];
        assert_eq!(
            renderer.render("{{commits.summary}}", &pair, None),
            "This change includes 2 commits. Contributors: Ana, Ben"
        );

        assert_eq!(renderer.render("{{commits.summary}}", &[], None), "No changes.");
    }

    #[test]
    fn test_fix_commit_checks_bug_fix_box_only() {
        let commits = vec![commit("fix null pointer", "Ana", &["src/a.rs"])];
        let tpl = "- [ ] Bug fixes\n- [ ] Breaking changes";
        let out = fixed_renderer(Locale::En).render(tpl, &commits, None);
        assert_eq!(out, "- [x] Bug fixes\n- [ ] Breaking changes");
    }

    #[test]
    fn test_checkbox_heuristics() {
        let commits = vec![
            commit("Add parser", "Ana", &["tests/parser_test.rs"]),
            commit("update guide", "Ana", &["docs/guide.md"]),
            commit("BREAKING: drop v1 api", "Ana", &[]),
        ];
        let tpl = "- [ ] Tests added\n- [ ] Documentation updated\n- [ ] Breaking change\n- [ ] New feature\n- [ ] Bug fix\n- [ ] Other";
        let out = fixed_renderer(Locale::En).render(tpl, &commits, None);
        assert_eq!(
            out,
            "- [x] Tests added\n- [x] Documentation updated\n- [x] Breaking change\n- [x] New feature\n- [ ] Bug fix\n- [ ] Other"
        );
    }

    #[test]
    fn test_checkbox_keeps_indentation() {
        let commits = vec![commit("fix: crash", "Ana", &[])];
        let out = check_boxes("  - [ ] fix verified\n\t-[] nothing", &commits);
        assert_eq!(out, "  - [x] fix verified\n\t- [ ] nothing");
    }

    #[test]
    fn test_checked_boxes_are_left_alone() {
        let out = check_boxes("- [x] Bug fixes", &[]);
        assert_eq!(out, "- [x] Bug fixes");
    }

    #[test]
    fn test_comments_stripped_before_substitution() {
        let commits = vec![commit("fix: x", "Ana", &[])];
        let tpl = "<!-- {{title}} -->\n## {{title}}\n- [ ] fix";
        let out = fixed_renderer(Locale::En).render(tpl, &commits, Some("T"));
        assert_eq!(out, "## T\n- [x] fix");
    }

    #[test]
    fn test_output_is_trimmed() {
        let out = fixed_renderer(Locale::En).render("\n\n<!-- c -->\n# Title\n\n", &[], None);
        assert_eq!(out, "# Title");
    }
}
