use thiserror::Error;

/// Errors produced by the content repository core.
///
/// Absence is never an error: lookups (`collection`, `global_set`,
/// `find_entry`, ...) return `Option` and callers null-check. The variants
/// here cover I/O and serialization failures from the store, fatal
/// configuration problems (unknown search drivers), and the one recoverable
/// condition: a remote search backend being unreachable.
#[derive(Error, Debug)]
pub enum LoamError {
    #[error("IO error: {0}")]
    Io(std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Recoverable: the search backend could not be reached or timed out.
    /// Callers should degrade to an unfiltered listing rather than abort.
    #[error("Search unavailable: {0}")]
    SearchUnavailable(String),
}

pub type Result<T> = std::result::Result<T, LoamError>;
