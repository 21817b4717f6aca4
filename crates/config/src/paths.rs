//! Filesystem locations used by researchdesk

use std::path::{Path, PathBuf};

/// Data directory (~/.researchdesk)
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".researchdesk")
}

/// Config file location
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Dotenv files checked at startup, in load order.
///
/// Earlier files win: dotenvy never overwrites a variable that is already set.
pub fn dotenv_candidates(base: &Path) -> Vec<PathBuf> {
    vec![
        base.join("config").join(".env"),
        base.join("configs").join(".env"),
        base.join(".env"),
    ]
}
