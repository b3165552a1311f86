//! Focused unit tests covering argument parsing and configuration conversion.

use super::*;
use crate::decode::{DecodeArgs, DecodeConfig};
use crate::update::{UpdateArgs, UpdateConfig};
use destiny_data::manifest::{API_KEY_HEADER, DEFAULT_PLATFORM_BASE};
use rstest::rstest;

#[rstest]
fn converting_update_without_locale_errors() {
    let err = UpdateConfig::try_from(UpdateArgs::default()).expect_err("missing locale");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_LOCALE);
            assert_eq!(env, ENV_UPDATE_LOCALE);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
#[case(None, Some("DestinyActivityDefinition"), Some("en"), ARG_HASH, ENV_DECODE_HASH)]
#[case(Some("1"), None, Some("en"), ARG_CATEGORY, ENV_DECODE_CATEGORY)]
#[case(Some("1"), Some("DestinyActivityDefinition"), None, ARG_LOCALE, ENV_DECODE_LOCALE)]
fn converting_decode_without_required_fields_errors(
    #[case] hash: Option<&str>,
    #[case] category: Option<&str>,
    #[case] locale: Option<&str>,
    #[case] field: &'static str,
    #[case] env_var: &'static str,
) {
    let args = DecodeArgs {
        hash: hash.map(str::to_owned),
        category: category.map(str::to_owned),
        locale: locale.map(str::to_owned),
        ..DecodeArgs::default()
    };
    let err = DecodeConfig::try_from(args).expect_err("missing field should error");
    match err {
        CliError::MissingArgument {
            field: missing,
            env,
        } => {
            assert_eq!(missing, field);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn storage_dir_defaults_to_working_directory() {
    let args = UpdateArgs {
        locale: Some("fr".to_owned()),
        ..UpdateArgs::default()
    };
    let config = UpdateConfig::try_from(args).expect("config should build");
    assert_eq!(config.locale, "fr");
    assert_eq!(config.settings.storage_dir, Utf8PathBuf::from("."));
    assert_eq!(config.settings.download_log, None);
}

#[rstest]
fn settings_build_cache_config() {
    let settings = CacheSettings::new(
        Some(Utf8PathBuf::from("manifests")),
        Some("secret".to_owned()),
        Some("https://proxy.test/Platform".to_owned()),
        Some(Utf8PathBuf::from("manifests/downloads.sqlite")),
    );
    let config = settings.cache_config();
    assert_eq!(config.storage_dir, Utf8PathBuf::from("manifests"));
    assert_eq!(
        config.source.headers,
        vec![(API_KEY_HEADER.to_owned(), "secret".to_owned())]
    );
    assert_eq!(config.source.platform_base, "https://proxy.test/Platform");
    assert_eq!(
        config.download_log,
        Some(Utf8PathBuf::from("manifests/downloads.sqlite"))
    );
}

#[rstest]
fn settings_without_overrides_use_bungie() {
    let config = CacheSettings::new(None, None, None, None).cache_config();
    assert!(config.source.headers.is_empty());
    assert_eq!(config.source.platform_base, DEFAULT_PLATFORM_BASE);
}

#[rstest]
fn parses_decode_flags() {
    let cli = Cli::try_parse_from([
        "destiny",
        "decode",
        "--hash",
        "-413471533",
        "--category",
        "DestinyActivityDefinition",
        "--locale",
        "EN",
        "--storage-dir",
        "manifests",
    ])
    .expect("arguments should parse");
    match cli.command {
        Command::Decode(args) => {
            assert_eq!(args.hash.as_deref(), Some("-413471533"));
            assert_eq!(args.category.as_deref(), Some("DestinyActivityDefinition"));
            assert_eq!(args.locale.as_deref(), Some("EN"));
            assert_eq!(args.storage_dir, Some(Utf8PathBuf::from("manifests")));
        }
        other => panic!("expected decode command, found {other:?}"),
    }
}

#[rstest]
fn parses_update_flags() {
    let cli = Cli::try_parse_from(["destiny", "update", "--locale", "pt-br", "--api-key", "k"])
        .expect("arguments should parse");
    match cli.command {
        Command::Update(args) => {
            assert_eq!(args.locale.as_deref(), Some("pt-br"));
            assert_eq!(args.api_key.as_deref(), Some("k"));
        }
        other => panic!("expected update command, found {other:?}"),
    }
}

#[rstest]
fn rejects_unknown_subcommand() {
    let outcome = Cli::try_parse_from(["destiny", "purge"]);
    assert!(outcome.is_err());
}
