//! Markdown template rendering.
//!
//! Two flavors share this module:
//!
//! - the generic renderer ([`render`]), driven by a [`Context`] and
//!   supporting `{{var}}`, `{{if cond}}...{{endif}}` and
//!   `{{for x in items}}...{{endfor}}`;
//! - the GitHub renderer ([`render_github_template`]) for PR and issue
//!   templates, which strips comments, fills a fixed commit vocabulary and
//!   ticks checklist items.

pub mod context;
pub mod detector;
pub mod engine;
pub mod github;
pub mod resolver;
pub mod scanner;
pub mod value;

pub use context::{build_context, build_context_at};
pub use detector::{
    TemplateKind, find_all_templates, find_issue_templates, find_pr_template, is_valid_template,
    read_template,
};
pub use engine::{Template, render};
pub use github::{GitHubRenderer, render_github_template};
pub use resolver::{Scope, resolve};
pub use value::{Context, Value};
