//! `update` command: make sure a locale's manifest database is present.

use camino::Utf8PathBuf;
use clap::Parser;
use destiny_data::manifest::{ManifestCache, ManifestSource};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::{
    ARG_API_KEY, ARG_DOWNLOAD_LOG, ARG_ENDPOINT, ARG_LOCALE, ARG_STORAGE_DIR, CacheSettings,
    CliError, ENV_UPDATE_LOCALE,
};

/// CLI arguments for the `update` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Fetch the manifest index and download the database for a \
                 locale unless it is already present in the storage \
                 directory. Settings can come from CLI flags, configuration \
                 files, or environment variables.",
    about = "Download the manifest database for a locale"
)]
#[ortho_config(prefix = "DESTINY")]
pub(crate) struct UpdateArgs {
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

impl UpdateArgs {
    pub(crate) fn into_config(self) -> Result<UpdateConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        UpdateConfig::try_from(merged)
    }
}

/// Resolved `update` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UpdateConfig {
    pub(crate) locale: String,
    pub(crate) settings: CacheSettings,
}

impl TryFrom<UpdateArgs> for UpdateConfig {
    type Error = CliError;

    fn try_from(args: UpdateArgs) -> Result<Self, Self::Error> {
        let locale = args.locale.ok_or(CliError::MissingArgument {
            field: ARG_LOCALE,
            env: ENV_UPDATE_LOCALE,
        })?;
        Ok(Self {
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

pub(crate) fn run_update(args: UpdateArgs, out: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let mut cache = config.settings.open_cache()?;
    update_with(&mut cache, &config.locale, out)
}

/// Ensure `locale` through `cache` and print the database path.
pub(crate) fn update_with<S: ManifestSource>(
    cache: &mut ManifestCache<S>,
    locale: &str,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let path = cache.update_manifest(locale)?;
    info!("{locale} manifest ready at {path}");
    writeln!(out, "{path}").map_err(CliError::WriteOutput)
}
