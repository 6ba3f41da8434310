use clap::{Parser, Subcommand};
use clap_complete::engine::{ArgValueCompleter, CompletionCandidate};

#[derive(Parser)]
#[command(name = "burrow", about = "Tunnel remote-spec decoder and catalog", version)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

fn complete_spec_names(current: &std::ffi::OsStr) -> Vec<CompletionCandidate> {
    let prefix = current.to_str().unwrap_or("");
    let cfg = crate::config::Config::load();
    cfg.remotes
        .keys()
        .filter(|name| name.starts_with(prefix))
        .map(CompletionCandidate::new)
        .collect()
}

#[derive(Subcommand)]
pub enum Command {
    /// Decode specs and print their normalized form
    Decode {
        /// One or more specs, e.g. "3000:example.com:80" or "socks"
        #[arg(required = true)]
        specs: Vec<String>,
    },
    /// Validate specs without printing the decoded fields
    Check {
        /// One or more specs to validate
        #[arg(required = true)]
        specs: Vec<String>,
    },
    /// List saved specs from the catalog
    #[command(alias = "ls")]
    List,
    /// Validate a spec and save it under a name
    Add {
        /// Name to save the spec as
        name: String,
        /// The spec shorthand
        spec: String,
    },
    /// Remove a saved spec
    Remove {
        /// Saved spec name (interactive picker if omitted)
        #[arg(add = ArgValueCompleter::new(complete_spec_names))]
        name: Option<String>,
    },
    /// Rename a saved spec
    Rename {
        /// Current name (interactive picker if omitted)
        #[arg(add = ArgValueCompleter::new(complete_spec_names))]
        old: Option<String>,
        /// New name
        new_name: String,
    },
    /// Initialize or edit ~/.burrow/config.toml
    Config,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (reads from config if omitted)
        shell: Option<clap_complete::Shell>,
    },
    /// List saved spec names (for shell completion scripts)
    #[command(hide = true)]
    ListSpecNames,
}
