/// Config file loading and creation for the scoreboard CLI.
///
/// Config lives at ~/.config/scoreboard/config.toml.
/// All fields are optional — CLI args override config values.
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::bail;

/// Port the server has always listened on.
pub const DEFAULT_PORT: u16 = 3500;
pub const DEFAULT_BIND: &str = "0.0.0.0";
/// Origin of the browser game served during development.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://127.0.0.1:5500";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3500";

#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct ScoreboardConfig {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub allowed_origin: Option<String>,
    pub page_size: Option<usize>,
    pub top_limit: Option<usize>,
    pub store_path: Option<PathBuf>,
    pub server: Option<String>,
    pub reject_empty_names: Option<bool>,
}

const DEFAULT_CONFIG_TEMPLATE: &str = "\
# scoreboard configuration
# All values here can be overridden by CLI flags.

# Address and port the server listens on
# bind = \"0.0.0.0\"
# port = 3500

# Origin allowed to call the API from a browser (CORS)
# allowed_origin = \"http://127.0.0.1:5500\"

# Entries per leaderboard page, and default size of the top list
# page_size = 5
# top_limit = 10

# Append-only JSONL file mirroring submissions and removals.
# If not set, the board lives in memory only and is empty after a restart.
# store_path = \"/var/lib/scoreboard/scores.jsonl\"

# Reject submissions with an empty player name
# reject_empty_names = false

# Base URL used by the client commands (submit, top, remove, ...)
# server = \"http://127.0.0.1:3500\"
";

/// Returns the default config path: ~/.config/scoreboard/config.toml
pub fn config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| bail("HOME environment variable not set"));
    PathBuf::from(home).join(".config").join("scoreboard").join("config.toml")
}

/// Load config from a file path. Returns default (all None) if file doesn't exist.
pub fn load_config(path: &Path) -> ScoreboardConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_config(&content)
            .unwrap_or_else(|e| bail(format!("Failed to parse config at {}: {e}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => ScoreboardConfig::default(),
        Err(e) => bail(format!("Failed to read config at {}: {e}", path.display())),
    }
}

fn parse_config(content: &str) -> Result<ScoreboardConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Create the default config file at `path`. Errors if it already exists.
pub fn create_default_config(path: &Path) -> PathBuf {
    if path.exists() {
        bail(format!("Config file already exists at {}", path.display()));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| bail(format!("Failed to create directory {}: {e}", parent.display())));
    }

    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .unwrap_or_else(|e| bail(format!("Failed to write config to {}: {e}", path.display())));

    path.to_path_buf()
}
