//! Common utilities and configuration for tools

use anstyle::{AnsiColor, Style};
use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::io::IsTerminal;
use std::path::Path;

/// Global configuration options
#[derive(Debug, Clone, Default, Serialize, Deserialize, Args)]
pub struct GlobalConfig {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,
}

impl GlobalConfig {
    /// Log level selected by the flags
    pub fn log_level(&self) -> tracing::Level {
        if self.debug {
            tracing::Level::DEBUG
        } else if self.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

/// Initialize logging based on configuration
pub fn init_logging(config: &GlobalConfig) -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(config.log_level())
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

/// Colours for terminal report lines
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Colour only when stdout is a terminal
    pub fn for_stdout() -> Self {
        Self::new(std::io::stdout().is_terminal())
    }

    pub fn good(&self, value: impl Display) -> String {
        self.paint(AnsiColor::Green, value)
    }

    pub fn note(&self, value: impl Display) -> String {
        self.paint(AnsiColor::Yellow, value)
    }

    pub fn bad(&self, value: impl Display) -> String {
        self.paint(AnsiColor::Red, value)
    }

    pub fn timing(&self, value: impl Display) -> String {
        self.paint(AnsiColor::Cyan, value)
    }

    fn paint(&self, color: AnsiColor, value: impl Display) -> String {
        if self.enabled {
            let style = Style::new().fg_color(Some(color.into()));
            format!("{style}{value}{style:#}")
        } else {
            value.to_string()
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("json")
}

/// Load configuration from a `.json` or TOML file
pub fn load_config<T: for<'a> Deserialize<'a>>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    if is_json(path) {
        serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON config: {:?}", path))
    } else {
        toml::from_str(&content).with_context(|| format!("Failed to parse TOML config: {:?}", path))
    }
}

/// Save configuration to a `.json` or TOML file
pub fn save_config<T: Serialize>(config: &T, path: &Path) -> Result<()> {
    let content = if is_json(path) {
        serde_json::to_string_pretty(config).context("Failed to serialize config")?
    } else {
        toml::to_string_pretty(config).context("Failed to serialize config")?
    };

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_selection() {
        let mut config = GlobalConfig::default();
        assert_eq!(config.log_level(), tracing::Level::WARN);

        config.verbose = true;
        assert_eq!(config.log_level(), tracing::Level::INFO);

        config.debug = true;
        assert_eq!(config.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_palette() {
        let plain = Palette::new(false);
        assert_eq!(plain.bad("12.50%"), "12.50%");
        assert_eq!(plain.good("HI"), "HI");

        let colored = Palette::new(true);
        let painted = colored.good("HI");
        assert!(painted.starts_with("\x1b["));
        assert!(painted.contains("HI"));
        assert!(painted.ends_with("\x1b[0m"));
        assert_ne!(colored.bad(3), colored.note(3));
    }

    #[test]
    fn test_json_detection() {
        assert!(is_json(Path::new("sim.json")));
        assert!(!is_json(Path::new("sim.toml")));
        assert!(!is_json(Path::new("sim")));
    }

    #[test]
    fn test_missing_config_file() {
        let result: Result<GlobalConfig> = load_config(Path::new("/nonexistent/hamfec.toml"));
        assert!(result.is_err());
    }
}
