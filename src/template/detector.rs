//! Discovery of GitHub PR and issue templates inside a repository.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::TemplateError;
use crate::locale::Locale;

/// PR template locations GitHub recognises, as `(directory, stem)` pairs.
const PR_TEMPLATE_LOCATIONS: &[(&str, &str)] = &[
    (".github", "pull_request_template"),
    (".github", "PULL_REQUEST_TEMPLATE"),
    (".github/PULL_REQUEST_TEMPLATE", "pull_request_template"),
    ("docs", "pull_request_template"),
    ("docs", "PULL_REQUEST_TEMPLATE"),
    ("", "pull_request_template"),
    ("", "PULL_REQUEST_TEMPLATE"),
];

const ISSUE_TEMPLATE_DIR: &str = ".github/ISSUE_TEMPLATE";

const ISSUE_TEMPLATE_FILES: &[&str] = &[
    ".github/issue_template.md",
    ".github/ISSUE_TEMPLATE.md",
    "docs/issue_template.md",
    "docs/ISSUE_TEMPLATE.md",
    "issue_template.md",
    "ISSUE_TEMPLATE.md",
];

const ISSUE_TEMPLATE_EXTENSIONS: &[&str] = &["md", "yml", "yaml"];

/// Kinds of repository templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TemplateKind {
    PullRequest,
    Issue,
}

/// Candidate PR template paths for `locale`, in search order.
///
/// Every location is tried with the `_<code>` suffix first, then without.
pub fn pr_template_candidates(locale: Locale) -> Vec<PathBuf> {
    let suffixed = PR_TEMPLATE_LOCATIONS
        .iter()
        .map(|(dir, stem)| Path::new(dir).join(format!("{stem}_{}.md", locale.code())));
    let plain = PR_TEMPLATE_LOCATIONS
        .iter()
        .map(|(dir, stem)| Path::new(dir).join(format!("{stem}.md")));
    suffixed.chain(plain).collect()
}

/// First PR template found under `repo_root`, preferring a localized one.
pub fn find_pr_template(repo_root: &Path, locale: Locale) -> Option<PathBuf> {
    let found = pr_template_candidates(locale)
        .into_iter()
        .map(|candidate| repo_root.join(candidate))
        .find(|path| path.is_file());
    debug!(?found, %locale, "PR template lookup");
    found
}

/// All issue templates under `repo_root`.
///
/// Files in `.github/ISSUE_TEMPLATE/` (recursively, sorted) come first,
/// followed by the single-file locations that exist.
pub fn find_issue_templates(repo_root: &Path) -> Vec<PathBuf> {
    let mut templates = Vec::new();

    let dir = repo_root.join(ISSUE_TEMPLATE_DIR);
    if dir.is_dir() {
        let mut found: Vec<PathBuf> = WalkDir::new(&dir)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!(error = %e, "skipping unreadable issue template entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| has_template_extension(entry.path()))
            .map(|entry| entry.into_path())
            .collect();
        found.sort();
        templates.extend(found);
    }

    templates.extend(
        ISSUE_TEMPLATE_FILES
            .iter()
            .map(|file| repo_root.join(file))
            .filter(|path| path.is_file()),
    );

    templates
}

/// First template of each kind present under `repo_root`.
pub fn find_all_templates(repo_root: &Path, locale: Locale) -> BTreeMap<TemplateKind, PathBuf> {
    let mut templates = BTreeMap::new();
    if let Some(pr) = find_pr_template(repo_root, locale) {
        templates.insert(TemplateKind::PullRequest, pr);
    }
    if let Some(issue) = find_issue_templates(repo_root).into_iter().next() {
        templates.insert(TemplateKind::Issue, issue);
    }
    templates
}

/// Whether `path` is an existing, non-empty regular file.
pub fn is_valid_template(path: &Path) -> bool {
    fs::metadata(path)
        .map(|meta| meta.is_file() && meta.len() > 0)
        .unwrap_or(false)
}

/// Read a template file as UTF-8.
pub fn read_template(path: &Path) -> Result<String, TemplateError> {
    if !path.is_file() {
        return Err(TemplateError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|source| TemplateError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    if content.is_empty() {
        return Err(TemplateError::Empty(path.to_path_buf()));
    }
    Ok(content)
}

fn has_template_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ISSUE_TEMPLATE_EXTENSIONS.contains(&ext))
}
