use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

fn config_path() -> Result<PathBuf> {
    let dir = dirs::home_dir()
        .context("cannot determine home directory")?
        .join(".burrow");
    fs::create_dir_all(&dir)?;
    Ok(dir.join("config.toml"))
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shell for completions (bash, zsh, fish)
    pub shell: Option<String>,
    /// Editor for `burrow config` (overrides $VISUAL/$EDITOR)
    pub editor: Option<String>,
    /// Saved catalog: name -> raw spec shorthand. Specs are stored as typed
    /// and decoded on demand so the file stays hand-editable.
    pub remotes: BTreeMap<String, String>,
}

impl Config {
    /// Load config from ~/.burrow/config.toml, falling back to defaults.
    pub fn load() -> Self {
        let path = match config_path() {
            Ok(p) => p,
            Err(_) => return Self::default(),
        };
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Write the config back to ~/.burrow/config.toml.
    pub fn save(&self) -> Result<()> {
        let path = config_path()?;
        let content = toml::to_string_pretty(self).context("failed to serialize config")?;
        fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// Resolve which editor to use: config > $VISUAL > $EDITOR > vi
    pub fn resolve_editor(&self) -> String {
        if let Some(ref e) = self.editor {
            return e.clone();
        }
        std::env::var("VISUAL")
            .or_else(|_| std::env::var("EDITOR"))
            .unwrap_or_else(|_| "vi".to_string())
    }

    /// Write a default config file if none exists. Returns the path.
    pub fn init() -> Result<PathBuf> {
        let path = config_path()?;
        if path.exists() {
            return Ok(path);
        }
        let default = Self::default();
        let content = toml::to_string_pretty(&default)
            .context("failed to serialize default config")?;
        fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remotes_table_round_trips() {
        let mut cfg = Config::default();
        cfg.remotes
            .insert("web".to_string(), "8080:example.com:80".to_string());
        cfg.remotes.insert("proxy".to_string(), "socks".to_string());

        let serialized = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.remotes.len(), 2);
        assert_eq!(parsed.remotes["web"], "8080:example.com:80");
        assert_eq!(parsed.remotes["proxy"], "socks");
    }

    #[test]
    fn missing_fields_default() {
        let cfg: Config = toml::from_str("shell = \"zsh\"\n").unwrap();
        assert_eq!(cfg.shell.as_deref(), Some("zsh"));
        assert!(cfg.editor.is_none());
        assert!(cfg.remotes.is_empty());
    }
}
