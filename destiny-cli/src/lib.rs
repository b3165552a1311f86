//! Command-line interface for downloading and querying Destiny 2 manifests.
#![forbid(unsafe_code)]

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use destiny_core::Locale;
use destiny_data::manifest::{HttpManifestSourceConfig, ManifestCache, ManifestCacheConfig};
use std::io::{self, Write};

mod decode;
mod error;
mod update;

pub use error::CliError;

use decode::DecodeArgs;
use update::UpdateArgs;

pub(crate) const ARG_LOCALE: &str = "locale";
pub(crate) const ARG_HASH: &str = "hash";
pub(crate) const ARG_CATEGORY: &str = "category";
pub(crate) const ARG_STORAGE_DIR: &str = "storage-dir";
pub(crate) const ARG_API_KEY: &str = "api-key";
pub(crate) const ARG_ENDPOINT: &str = "endpoint";
pub(crate) const ARG_DOWNLOAD_LOG: &str = "download-log";
pub(crate) const ENV_UPDATE_LOCALE: &str = "DESTINY_CMDS_UPDATE_LOCALE";
pub(crate) const ENV_DECODE_LOCALE: &str = "DESTINY_CMDS_DECODE_LOCALE";
pub(crate) const ENV_DECODE_HASH: &str = "DESTINY_CMDS_DECODE_HASH";
pub(crate) const ENV_DECODE_CATEGORY: &str = "DESTINY_CMDS_DECODE_CATEGORY";

/// Storage directory used when none is configured.
const DEFAULT_STORAGE_DIR: &str = ".";

/// Run the CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(cli.command, &mut out)
}

fn execute(command: Command, out: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Update(args) => update::run_update(args, out),
        Command::Decode(args) => decode::run_decode(args, out),
        Command::Locales => write_locales(out),
    }
}

fn write_locales(out: &mut dyn Write) -> Result<(), CliError> {
    for locale in Locale::ALL {
        writeln!(out, "{locale}").map_err(CliError::WriteOutput)?;
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(
    name = "destiny",
    about = "Download Destiny 2 manifests and decode definitions",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Make sure the manifest database for a locale is present locally.
    Update(UpdateArgs),
    /// Print the definition stored for a hash.
    Decode(DecodeArgs),
    /// List the supported locale codes.
    Locales,
}

/// Settings shared by every command that opens a manifest cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CacheSettings {
    pub(crate) storage_dir: Utf8PathBuf,
    pub(crate) api_key: Option<String>,
    pub(crate) endpoint: Option<String>,
    pub(crate) download_log: Option<Utf8PathBuf>,
}

impl CacheSettings {
    pub(crate) fn new(
        storage_dir: Option<Utf8PathBuf>,
        api_key: Option<String>,
        endpoint: Option<String>,
        download_log: Option<Utf8PathBuf>,
    ) -> Self {
        Self {
            storage_dir: storage_dir.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_STORAGE_DIR)),
            api_key,
            endpoint,
            download_log,
        }
    }

    pub(crate) fn cache_config(&self) -> ManifestCacheConfig {
        let mut source = HttpManifestSourceConfig::default();
        if let Some(key) = &self.api_key {
            source = source.with_api_key(key.as_str());
        }
        if let Some(endpoint) = &self.endpoint {
            source = source.with_platform_base(endpoint.as_str());
        }
        let config = ManifestCacheConfig::new(self.storage_dir.clone()).with_source(source);
        match &self.download_log {
            Some(path) => config.with_download_log(path.clone()),
            None => config,
        }
    }

    pub(crate) fn open_cache(&self) -> Result<ManifestCache, CliError> {
        Ok(ManifestCache::open(&self.cache_config())?)
    }
}

#[cfg(test)]
mod tests;
