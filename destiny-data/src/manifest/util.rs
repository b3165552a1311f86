//! Shared helpers used across manifest operations and sources.

use url::Url;

use super::{BaseUrl, ManifestUrl};

/// Trim trailing slashes and fall back to `default` when nothing remains.
pub(crate) fn sanitise_base_url(url: impl Into<String>, default: &str) -> BaseUrl {
    let raw = url.into();
    let trimmed = raw.trim_end_matches('/');
    if trimmed.is_empty() {
        BaseUrl::from(default)
    } else {
        BaseUrl::new(trimmed.to_owned())
    }
}

/// Resolve a path from the manifest index against the content host.
///
/// Absolute URLs are kept as-is; relative paths are joined with exactly one
/// separator.
pub(crate) fn normalise_url(
    base_url: &BaseUrl,
    relative: &str,
) -> Result<ManifestUrl, url::ParseError> {
    let absolute = if relative.starts_with("http://") || relative.starts_with("https://") {
        relative.to_owned()
    } else if relative.starts_with('/') {
        format!("{}{}", base_url.as_str(), relative)
    } else {
        format!("{}/{}", base_url.as_str(), relative)
    };
    Url::parse(&absolute).map(Into::into)
}
