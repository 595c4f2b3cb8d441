use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unable to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("kubeconfig has no current context")]
    NoCurrentContext,
    #[error("kubeconfig refers to unknown {kind} '{name}'")]
    MissingEntry { kind: &'static str, name: String },
    #[error("home directory not found")]
    NoHomeDir,
    #[error("invalid {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}
