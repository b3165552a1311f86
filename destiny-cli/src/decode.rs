//! `decode` command: print the definition stored for a hash.

use camino::Utf8PathBuf;
use clap::Parser;
use destiny_data::manifest::{ManifestCache, ManifestSource};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::{
    ARG_API_KEY, ARG_CATEGORY, ARG_DOWNLOAD_LOG, ARG_ENDPOINT, ARG_HASH, ARG_LOCALE,
    ARG_STORAGE_DIR, CacheSettings, CliError, ENV_DECODE_CATEGORY, ENV_DECODE_HASH,
    ENV_DECODE_LOCALE,
};

/// CLI arguments for the `decode` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Look up a definition by hash in one category table of a \
                 locale's manifest, downloading the manifest first when it \
                 is missing. The definition is printed as pretty JSON.",
    about = "Print the definition stored for a hash"
)]
#[ortho_config(prefix = "DESTINY")]
pub(crate) struct DecodeArgs {
    /// Definition hash, e.g. `3881495763`, or a historical stat key.
    #[arg(long = ARG_HASH, value_name = "hash", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) hash: Option<String>,
    /// Category table, e.g. `DestinyActivityDefinition`.
    #[arg(long = ARG_CATEGORY, value_name = "table")]
    #[serde(default)]
    pub(crate) category: Option<String>,
    /// Locale code such as `en` or `pt-br`, in any case.
    #[arg(long = ARG_LOCALE, value_name = "code")]
    #[serde(default)]
    pub(crate) locale: Option<String>,
    /// Directory manifests are stored in (defaults to the working directory).
    #[arg(long = ARG_STORAGE_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) storage_dir: Option<Utf8PathBuf>,
    /// Bungie API key, sent in the `X-API-Key` header.
    #[arg(long = ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Override the Bungie platform API root.
    #[arg(long = ARG_ENDPOINT, value_name = "url")]
    #[serde(default)]
    pub(crate) endpoint: Option<String>,
    /// SQLite file recording every manifest install.
    #[arg(long = ARG_DOWNLOAD_LOG, value_name = "path")]
    #[serde(default)]
    pub(crate) download_log: Option<Utf8PathBuf>,
}

impl DecodeArgs {
    pub(crate) fn into_config(self) -> Result<DecodeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        DecodeConfig::try_from(merged)
    }
}

/// Resolved `decode` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DecodeConfig {
    pub(crate) hash: String,
    pub(crate) category: String,
    pub(crate) locale: String,
    pub(crate) settings: CacheSettings,
}

impl TryFrom<DecodeArgs> for DecodeConfig {
    type Error = CliError;

    fn try_from(args: DecodeArgs) -> Result<Self, Self::Error> {
        let hash = args.hash.ok_or(CliError::MissingArgument {
            field: ARG_HASH,
            env: ENV_DECODE_HASH,
        })?;
        let category = args.category.ok_or(CliError::MissingArgument {
            field: ARG_CATEGORY,
            env: ENV_DECODE_CATEGORY,
        })?;
        let locale = args.locale.ok_or(CliError::MissingArgument {
            field: ARG_LOCALE,
            env: ENV_DECODE_LOCALE,
        })?;
        Ok(Self {
            hash,
            category,
            locale,
            settings: CacheSettings::new(
                args.storage_dir,
                args.api_key,
                args.endpoint,
                args.download_log,
            ),
        })
    }
}

pub(crate) fn run_decode(args: DecodeArgs, out: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let mut cache = config.settings.open_cache()?;
    decode_with(&mut cache, &config, out)
}

/// Look up the configured hash through `cache` and print it as pretty JSON.
pub(crate) fn decode_with<S: ManifestSource>(
    cache: &mut ManifestCache<S>,
    config: &DecodeConfig,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let definition = cache
        .decode(&config.hash, &config.category, &config.locale)?
        .ok_or_else(|| CliError::DefinitionNotFound {
            hash: config.hash.clone(),
            category: config.category.clone(),
            locale: config.locale.clone(),
        })?;
    serde_json::to_writer_pretty(&mut *out, &definition).map_err(CliError::SerialiseDefinition)?;
    writeln!(out).map_err(CliError::WriteOutput)
}
