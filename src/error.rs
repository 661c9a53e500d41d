use thiserror::Error;

/// Raised while synthesizing a phenotype, before any organism state exists.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum GenotypeError {
    /// `size` truncates to a body height that cannot divide `width`.
    #[error("invalid genotype: size {size} yields body height {height}, expected a positive integer")]
    InvalidGenotype { size: f64, height: f64 },
}

/// Scene file loading and validation failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scene: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid arena: {0}")]
    Arena(String),
}
