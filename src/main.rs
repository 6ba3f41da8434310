mod cli;
mod config;
mod display;
mod picker;
mod remote;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::Colorize;

use cli::{Cli, Command};
use config::Config;
use remote::Remote;

fn main() -> Result<()> {
    clap_complete::CompleteEnv::with_factory(Cli::command).complete();

    let cli = Cli::parse();
    let cfg = Config::load();

    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command {
        Command::Decode { specs } => cmd_decode(&specs),
        Command::Check { specs } => cmd_check(&specs),
        Command::List => cmd_list(),
        Command::Add { name, spec } => cmd_add(name, spec),
        Command::Remove { name } => cmd_remove(name),
        Command::Rename { old, new_name } => cmd_rename(old, new_name),
        Command::Config => cmd_config(&cfg),
        Command::Completions { shell } => cmd_completions(shell, &cfg),
        Command::ListSpecNames => cmd_list_spec_names(),
    }
}

/// Build a picker label for a saved spec: the decoded form when it still
/// decodes, the raw string otherwise.
fn format_entry(name: &str, spec: &str) -> String {
    let rendered = spec
        .parse::<Remote>()
        .map(|r| r.to_string())
        .unwrap_or_else(|_| spec.to_string());
    format!("{} ({})", name, rendered)
}

fn cmd_decode(specs: &[String]) -> Result<()> {
    let mut failed = 0;
    for spec in specs {
        match spec.parse::<Remote>() {
            Ok(remote) => {
                let mut suffix = String::new();
                if remote.socks {
                    suffix.push_str(&format!("  {}", "[socks]".dimmed()));
                } else if !remote.proxy.is_empty() {
                    suffix.push_str(&format!("  {}", format!("[via {}]", remote.proxy).dimmed()));
                }
                println!(
                    "{} {}  {}{}",
                    "●".green(),
                    spec.bold(),
                    remote.to_string().green(),
                    suffix
                );
            }
            Err(e) => {
                failed += 1;
                println!("{} {} — {}", "✗".red(), spec.red().bold(), e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} spec(s) invalid", failed, specs.len());
    }
    Ok(())
}

fn cmd_check(specs: &[String]) -> Result<()> {
    let mut failed = 0;
    for spec in specs {
        match spec.parse::<Remote>() {
            Ok(_) => println!("  {} {}", "✓".green(), spec),
            Err(e) => {
                failed += 1;
                println!("  {} {} — {}", "✗".red(), spec, e);
            }
        }
    }

    println!();
    if failed == 0 {
        println!("  {} All {} spec(s) valid", "✓".green(), specs.len());
        Ok(())
    } else {
        anyhow::bail!("{}/{} spec(s) valid", specs.len() - failed, specs.len());
    }
}

fn cmd_list() -> Result<()> {
    let cfg = Config::load();
    display::print_spec_list(&cfg.remotes);
    Ok(())
}

fn cmd_add(name: String, spec: String) -> Result<()> {
    let mut cfg = Config::load();

    if cfg.remotes.contains_key(&name) {
        anyhow::bail!("spec '{}' already exists — remove it first or pick another name", name);
    }

    let remote = spec
        .parse::<Remote>()
        .with_context(|| format!("invalid spec '{}'", spec))?;

    cfg.remotes.insert(name.clone(), spec);
    cfg.save()?;

    println!(
        "{} {} saved — {}",
        "✓".green(),
        name.green().bold(),
        remote.to_string().dimmed()
    );

    Ok(())
}

fn cmd_remove(name: Option<String>) -> Result<()> {
    let mut cfg = Config::load();

    let name = match name {
        Some(n) => {
            if !cfg.remotes.contains_key(&n) {
                anyhow::bail!("spec '{}' not found in catalog", n);
            }
            n
        }
        None => {
            let names: Vec<String> = cfg.remotes.keys().cloned().collect();
            let items: Vec<String> = cfg
                .remotes
                .iter()
                .map(|(name, spec)| format_entry(name, spec))
                .collect();

            if items.is_empty() {
                println!("{}", "No saved specs.".yellow());
                return Ok(());
            }

            let idx = picker::pick("Remove spec", &items)?;
            names[idx].clone()
        }
    };

    let confirmed = dialoguer::Confirm::new()
        .with_prompt(format!("Remove {}?", name))
        .default(false)
        .interact()
        .context("failed to read confirmation")?;

    if !confirmed {
        println!("Cancelled.");
        return Ok(());
    }

    cfg.remotes.remove(&name);
    cfg.save()?;

    println!("{} {} removed", "✓".green(), name.green().bold());

    Ok(())
}

fn cmd_rename(old: Option<String>, new_name: String) -> Result<()> {
    let mut cfg = Config::load();

    let old_name = match old {
        Some(n) => {
            if !cfg.remotes.contains_key(&n) {
                anyhow::bail!("spec '{}' not found in catalog", n);
            }
            n
        }
        None => {
            let names: Vec<String> = cfg.remotes.keys().cloned().collect();
            let items: Vec<String> = cfg
                .remotes
                .iter()
                .map(|(name, spec)| format_entry(name, spec))
                .collect();

            if items.is_empty() {
                println!("{}", "No saved specs.".yellow());
                return Ok(());
            }

            let idx = picker::pick("Rename spec", &items)?;
            names[idx].clone()
        }
    };

    if cfg.remotes.contains_key(&new_name) {
        anyhow::bail!("spec '{}' already exists", new_name);
    }

    let spec = cfg
        .remotes
        .remove(&old_name)
        .ok_or_else(|| anyhow::anyhow!("spec '{}' not found in catalog", old_name))?;
    cfg.remotes.insert(new_name.clone(), spec);
    cfg.save()?;

    println!(
        "{} renamed {} -> {}",
        "✓".green(),
        old_name.green().bold(),
        new_name.green().bold()
    );

    Ok(())
}

fn cmd_config(cfg: &Config) -> Result<()> {
    let path = Config::init()?;
    let editor = cfg.resolve_editor();

    let status = std::process::Command::new(&editor)
        .arg(&path)
        .status()
        .with_context(|| format!("failed to launch editor '{}'", editor))?;

    if !status.success() {
        anyhow::bail!("editor exited with {}", status);
    }

    Ok(())
}

fn cmd_completions(shell: Option<clap_complete::Shell>, cfg: &Config) -> Result<()> {
    let shell = match shell {
        Some(s) => s,
        None => {
            let name = cfg.shell.as_deref()
                .ok_or_else(|| anyhow::anyhow!(
                    "no shell specified — use `burrow completions <shell>` or set `shell` in ~/.burrow/config.toml"
                ))?;
            name.parse::<clap_complete::Shell>()
                .map_err(|_| anyhow::anyhow!("unknown shell '{}' in config", name))?
        }
    };

    let shell_name = match shell {
        clap_complete::Shell::Bash => "bash",
        clap_complete::Shell::Zsh => "zsh",
        clap_complete::Shell::Fish => "fish",
        clap_complete::Shell::Elvish => "elvish",
        clap_complete::Shell::PowerShell => "powershell",
        _ => anyhow::bail!("unsupported shell"),
    };
    unsafe { std::env::set_var("COMPLETE", shell_name) };
    clap_complete::CompleteEnv::with_factory(Cli::command).complete();
    Ok(())
}

fn cmd_list_spec_names() -> Result<()> {
    let cfg = Config::load();
    for name in cfg.remotes.keys() {
        println!("{}", name);
    }
    Ok(())
}
