//! Behavioural coverage for the manifest cache.

use camino::Utf8PathBuf;
use destiny_core::LocaleError;
use destiny_data::manifest::test_support::{
    StubSource, index_document, manifest_archive, manifest_database,
};
use destiny_data::manifest::{ManifestCache, ManifestError};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::{cell::RefCell, fs};
use tempfile::TempDir;

const ACTIVITY: &str = "DestinyActivityDefinition";
const FR_PATH: &str = "/common/destiny2_content/sqlite/fr/abc123.content";

type DecodeOutcome = Result<Option<serde_json::Value>, ManifestError>;

/// State shared by the steps of one scenario.
#[derive(Debug)]
struct CacheWorld {
    dir: TempDir,
    cache: RefCell<Option<ManifestCache<StubSource>>>,
    outcome: RefCell<Option<DecodeOutcome>>,
}

impl CacheWorld {
    fn root(&self) -> Utf8PathBuf {
        match Utf8PathBuf::from_path_buf(self.dir.path().to_path_buf()) {
            Ok(path) => path,
            Err(path) => panic!("temporary directory is not UTF-8: {path:?}"),
        }
    }

    fn with_cache<T>(&self, f: impl FnOnce(&mut ManifestCache<StubSource>) -> T) -> T {
        let mut borrowed = self.cache.borrow_mut();
        let cache = borrowed
            .as_mut()
            .unwrap_or_else(|| panic!("cache must be initialised"));
        f(cache)
    }
}

#[fixture]
fn world() -> CacheWorld {
    let dir = match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temporary directory: {err}"),
    };
    CacheWorld {
        dir,
        cache: RefCell::new(None),
        outcome: RefCell::new(None),
    }
}

#[given("a manifest index listing the French database")]
fn french_index(world: &CacheWorld) {
    let root = world.root();
    let fixture = root.join("fixture.content");
    manifest_database(
        &fixture,
        ACTIVITY,
        &[(
            "-413471533",
            r#"{"hash":3881495763,"displayProperties":{"name":"Leviathan"}}"#,
        )],
    );
    let database = match fs::read(&fixture) {
        Ok(bytes) => bytes,
        Err(err) => panic!("failed to read fixture database: {err}"),
    };
    let source = StubSource::with_index(
        index_document("1.0", &[("fr", FR_PATH)]),
        manifest_archive("abc123.content", &database),
    );
    let cache = match ManifestCache::with_source(root.join("manifests"), source) {
        Ok(cache) => cache,
        Err(err) => panic!("cache should build: {err}"),
    };
    world.cache.replace(Some(cache));
}

#[when("I decode activity hash {hash} for locale {locale}")]
fn decode_activity(world: &CacheWorld, hash: String, locale: String) {
    let outcome = world.with_cache(|cache| cache.decode(&hash, ACTIVITY, &locale));
    world.outcome.replace(Some(outcome));
}

#[then("the activity named {name} is returned")]
fn activity_returned(world: &CacheWorld, name: String) {
    let borrowed = world.outcome.borrow();
    let definition = match borrowed.as_ref() {
        Some(Ok(Some(definition))) => definition,
        other => panic!("expected a definition, got {other:?}"),
    };
    assert_eq!(
        definition.pointer("/displayProperties/name"),
        Some(&serde_json::Value::String(name))
    );
}

#[then("no definition is returned")]
fn nothing_returned(world: &CacheWorld) {
    let borrowed = world.outcome.borrow();
    assert!(
        matches!(borrowed.as_ref(), Some(Ok(None))),
        "expected an absent definition, got {borrowed:?}"
    );
}

#[then("the archive was downloaded once")]
fn downloaded_once(world: &CacheWorld) {
    let (index, archive) = world.with_cache(|cache| {
        (
            cache.source().index_requests(),
            cache.source().archive_requests(),
        )
    });
    assert_eq!((index, archive), (1, 1));
    assert!(world.root().join("manifests").join("abc123.content").is_file());
}

#[then("an unsupported locale error is returned")]
fn unsupported_locale(world: &CacheWorld) {
    let borrowed = world.outcome.borrow();
    match borrowed.as_ref() {
        Some(Err(ManifestError::Locale(LocaleError::Unsupported { code }))) => {
            assert_eq!(code, "tlh");
        }
        other => panic!("expected an unsupported locale error, got {other:?}"),
    }
}

#[then("no request reached the source")]
fn no_requests(world: &CacheWorld) {
    let requests = world.with_cache(|cache| cache.source().requests());
    assert_eq!(requests, 0);
}

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/manifest_cache.feature", name = $title)]
        fn $fn_name(world: CacheWorld) {
            let _ = world;
        }
    };
}

register_scenario!(
    decoding_a_definition_downloads_the_manifest_once,
    "decoding a definition downloads the manifest once"
);
register_scenario!(
    looking_up_a_hash_that_is_not_in_the_manifest,
    "looking up a hash that is not in the manifest"
);
register_scenario!(
    rejecting_an_unsupported_locale,
    "rejecting an unsupported locale"
);
