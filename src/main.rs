//! chronicle - CLI entry point.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use dialoguer::{Input, Select};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use commit_chronicle::config::UserConfig;
use commit_chronicle::git::{Commit, GitAnalyzer};
use commit_chronicle::llm::{
    CliExecutor, CliOptions, LlmRouter, LlmSummarizer, Provider, ProviderSelection, Summarizer,
    pr_document,
};
use commit_chronicle::locale::Locale;
use commit_chronicle::template::{build_context, find_pr_template, read_template, render};

/// Turn recent git history into summaries, PR descriptions and changelogs.
#[derive(Parser, Debug)]
#[command(name = "chronicle")]
#[command(about = "Turn recent git history into summaries, PR descriptions and changelogs")]
#[command(version)]
struct Cli {
    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Which commits to read.
#[derive(Args, Debug, Clone)]
struct GitOptions {
    /// Path inside the git repository
    #[arg(long, default_value = ".")]
    path: PathBuf,

    /// Include commits from the last N days
    #[arg(short, long, default_value_t = 7)]
    days: u32,

    /// Maximum number of commits when reading by days
    #[arg(short, long, default_value_t = 50)]
    limit: usize,

    /// Start of commit range (tag, commit hash, or branch); overrides --days
    #[arg(long)]
    from: Option<String>,

    /// End of commit range
    #[arg(long, default_value = "HEAD")]
    to: String,
}

/// Provider settings; unset values come from the stored config.
#[derive(Args, Debug, Clone)]
struct AiOptions {
    /// LLM provider CLI to use first
    #[arg(short, long, value_enum)]
    provider: Option<Provider>,

    /// Model name passed to the provider CLI
    #[arg(long)]
    model: Option<String>,

    /// Output language (en, ko, zh, ja)
    #[arg(long)]
    locale: Option<Locale>,
}

#[derive(Args, Debug, Clone)]
struct OutputOptions {
    /// Write the document to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize the selected commits
    Summarize {
        #[command(flatten)]
        git: GitOptions,
        #[command(flatten)]
        ai: AiOptions,
        #[command(flatten)]
        out: OutputOptions,
    },

    /// Write a pull request description, filling the repository's PR template if present
    Pr {
        #[command(flatten)]
        git: GitOptions,
        #[command(flatten)]
        ai: AiOptions,
        #[command(flatten)]
        out: OutputOptions,

        /// Pull request title
        #[arg(long)]
        title: Option<String>,

        /// Ignore any PR template and ask the provider for a draft
        #[arg(long)]
        no_template: bool,
    },

    /// Write a changelog for the selected commits
    Changelog {
        #[command(flatten)]
        git: GitOptions,
        #[command(flatten)]
        ai: AiOptions,
        #[command(flatten)]
        out: OutputOptions,

        /// Group entries by change type
        #[arg(long)]
        group: bool,
    },

    /// Render a Markdown template against the selected commits
    Render {
        /// Template file using {{var}}, {{if}} and {{for}} directives
        template: PathBuf,

        #[command(flatten)]
        git: GitOptions,
        #[command(flatten)]
        out: OutputOptions,

        /// Value of {{title}}
        #[arg(long)]
        title: Option<String>,

        /// Sets {{group_by_type}}
        #[arg(long)]
        group: bool,

        /// Locale for built-in strings (en, ko, zh, ja)
        #[arg(long)]
        locale: Option<Locale>,
    },

    /// Show or change the stored configuration
    Config {
        /// Default provider
        #[arg(short, long, value_enum)]
        provider: Option<Provider>,

        /// Default model
        #[arg(long)]
        model: Option<String>,

        /// Default locale
        #[arg(long)]
        locale: Option<Locale>,

        /// API key forwarded to the provider CLI
        #[arg(short, long)]
        key: Option<String>,

        /// Print the configuration
        #[arg(long)]
        show: bool,

        /// Restore the defaults
        #[arg(long)]
        reset: bool,

        /// Choose settings interactively
        #[arg(short, long)]
        interactive: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Summarize { git, ai, out } => {
            let config = effective_config(&ai);
            let Some(commits) = load_commits(&git, config.locale_or_default())? else {
                return Ok(());
            };
            let mut summarizer = summarizer(&config);
            let summary = summarizer
                .summarize(&commits)
                .await
                .map_err(|e| anyhow!(e.detailed()))
                .context("Failed to generate summary")?;
            emit(out.output.as_deref(), &summary)
        }

        Command::Pr {
            git,
            ai,
            out,
            title,
            no_template,
        } => {
            let config = effective_config(&ai);
            let locale = config.locale_or_default();
            let Some(commits) = load_commits(&git, locale)? else {
                return Ok(());
            };

            let template = if no_template {
                None
            } else {
                pr_template(&git.path, locale)?
            };

            let mut summarizer = summarizer(&config);
            let document = pr_document(
                &mut summarizer,
                &commits,
                title.as_deref(),
                template.as_deref(),
                locale,
            )
            .await
            .map_err(|e| anyhow!(e.detailed()))
            .context("Failed to generate PR description")?;
            emit(out.output.as_deref(), &document)
        }

        Command::Changelog { git, ai, out, group } => {
            let config = effective_config(&ai);
            let Some(commits) = load_commits(&git, config.locale_or_default())? else {
                return Ok(());
            };
            let mut summarizer = summarizer(&config);
            let changelog = summarizer
                .changelog(&commits, group)
                .await
                .map_err(|e| anyhow!(e.detailed()))
                .context("Failed to generate changelog")?;
            emit(out.output.as_deref(), &changelog)
        }

        Command::Render {
            template,
            git,
            out,
            title,
            group,
            locale,
        } => {
            let locale = locale.unwrap_or_else(|| UserConfig::load().locale_or_default());
            let source = read_template(&template)
                .with_context(|| format!("Failed to load template {}", template.display()))?;
            let Some(commits) = load_commits(&git, locale)? else {
                return Ok(());
            };
            let context = build_context(&commits, title.as_deref(), group, locale);
            emit(out.output.as_deref(), &render(&source, &context))
        }

        Command::Config {
            provider,
            model,
            locale,
            key,
            show,
            reset,
            interactive,
        } => {
            if reset {
                UserConfig::reset().context("Failed to reset configuration")?;
                let locale = locale.unwrap_or_default();
                println!("{}", locale.messages().config_reset());
                return Ok(());
            }

            let mut config = UserConfig::load();
            if interactive {
                config = prompt_config(config)?;
            }

            let overrides = UserConfig {
                provider,
                model,
                locale,
                api_key: key,
            };
            let changed = interactive || overrides != UserConfig::default();
            let config = config.merge(overrides);

            if changed {
                let path = config.save().context("Failed to save configuration")?;
                debug!(path = %path.display(), "configuration written");
                println!("{}", config.locale_or_default().messages().config_saved());
            }
            if show || !changed {
                println!("{config}");
            }
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Stored config with the command-line provider options applied.
fn effective_config(ai: &AiOptions) -> UserConfig {
    UserConfig::load().merge(UserConfig {
        provider: ai.provider,
        model: ai.model.clone(),
        locale: ai.locale,
        api_key: None,
    })
}

fn summarizer(config: &UserConfig) -> LlmSummarizer<CliExecutor> {
    let selection = ProviderSelection::from_primary(config.provider_or_default());
    let executor = CliExecutor::new(CliOptions {
        model: config.model.clone(),
        api_key: config.api_key.clone(),
    });
    LlmSummarizer::new(LlmRouter::new(selection, executor), config.locale_or_default())
}

/// Read the selected commits; `None` when there are none (already reported).
fn load_commits(git: &GitOptions, locale: Locale) -> Result<Option<Vec<Commit>>> {
    let analyzer = GitAnalyzer::open(&git.path)
        .context("Not a git repository. Run chronicle from within a git repository.")?;

    let commits = match &git.from {
        Some(from) => analyzer
            .commit_range(from, Some(git.to.as_str()))
            .with_context(|| format!("Failed to read commits {}..{}", from, git.to))?,
        None => analyzer
            .commits_since(git.days, git.limit)
            .context("Failed to read recent commits")?,
    };

    let messages = locale.messages();
    if commits.is_empty() {
        println!("{}", messages.no_commits());
        return Ok(None);
    }

    eprintln!("{}", messages.analyzing_commits(commits.len()));
    Ok(Some(commits))
}

/// Contents of the repository's PR template for `locale`, if one is usable.
fn pr_template(path: &Path, locale: Locale) -> Result<Option<String>> {
    let analyzer = GitAnalyzer::open(path).context("Failed to open repository")?;
    let Some(root) = analyzer.workdir() else {
        return Ok(None);
    };
    let Some(template_path) = find_pr_template(root, locale) else {
        return Ok(None);
    };

    match read_template(&template_path) {
        Ok(content) => {
            eprintln!(
                "{}",
                locale
                    .messages()
                    .template_detected(&template_path.display().to_string())
            );
            Ok(Some(content))
        }
        Err(e) => {
            warn!("Ignoring PR template: {}", e);
            Ok(None)
        }
    }
}

fn prompt_config(mut config: UserConfig) -> Result<UserConfig> {
    let providers = [Provider::Claude, Provider::Codex];
    let current = config.provider_or_default();
    let choice = Select::new()
        .with_prompt("Provider")
        .items(&providers)
        .default(providers.iter().position(|p| *p == current).unwrap_or(0))
        .interact()
        .context("Provider selection cancelled")?;
    config.provider = Some(providers[choice]);

    let locales = Locale::all();
    let labels: Vec<String> = locales
        .iter()
        .map(|l| format!("{} ({})", l.language_name(), l.code()))
        .collect();
    let current = config.locale_or_default();
    let choice = Select::new()
        .with_prompt("Language")
        .items(&labels)
        .default(locales.iter().position(|l| *l == current).unwrap_or(0))
        .interact()
        .context("Language selection cancelled")?;
    config.locale = Some(locales[choice]);

    let model: String = Input::new()
        .with_prompt("Model (empty for the provider default)")
        .with_initial_text(config.model.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()
        .context("Model input cancelled")?;
    let model = model.trim();
    config.model = (!model.is_empty()).then(|| model.to_string());

    Ok(config)
}

/// Print `content` or write it to `output`.
fn emit(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", content.trim_end()))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("✓ Wrote {}", path.display());
        }
        None => println!("{content}"),
    }
    Ok(())
}
