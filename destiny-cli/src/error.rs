//! Error types emitted by the Destiny manifest CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>`.

use std::sync::Arc;

use destiny_data::manifest::ManifestError;
use thiserror::Error;

/// Errors emitted by the Destiny manifest CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// Resolving, downloading, or reading the manifest failed.
    #[error(transparent)]
    Manifest(#[from] Box<ManifestError>),
    /// The manifest holds no definition for the requested hash.
    #[error("no {category} definition with hash {hash} in the '{locale}' manifest")]
    DefinitionNotFound {
        hash: String,
        category: String,
        locale: String,
    },
    /// Serialising a definition for output failed.
    #[error("failed to serialise definition: {0}")]
    SerialiseDefinition(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}

impl From<ManifestError> for CliError {
    fn from(error: ManifestError) -> Self {
        Self::Manifest(Box::new(error))
    }
}
