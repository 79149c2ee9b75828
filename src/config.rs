use std::path::PathBuf;

pub const ENV_WORKSPACE: &str = "HOSTELD_WORKSPACE";
pub const ENV_LOG: &str = "HOSTELD_LOG";
pub const ENV_SEED: &str = "HOSTELD_SEED";

#[derive(Debug, Clone, PartialEq)]
pub struct DaemonConfig {
    /// Workspace opened before the first request is read.
    pub workspace: Option<PathBuf>,
    pub log_filter: String,
    /// Seed empty stores with the demo fixtures on first read.
    pub seed_fixtures: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            workspace: None,
            log_filter: "info".to_string(),
            seed_fixtures: true,
        }
    }
}

impl DaemonConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(ws) = lookup(ENV_WORKSPACE).filter(|s| !s.trim().is_empty()) {
            cfg.workspace = Some(PathBuf::from(ws.trim()));
        }
        if let Some(filter) = lookup(ENV_LOG)
            .or_else(|| lookup("RUST_LOG"))
            .filter(|s| !s.trim().is_empty())
        {
            cfg.log_filter = filter.trim().to_string();
        }
        if let Some(seed) = lookup(ENV_SEED) {
            cfg.seed_fixtures = parse_boolish(&seed).unwrap_or(true);
        }
        cfg
    }
}

fn parse_boolish(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}
