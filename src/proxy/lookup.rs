//! Document resolution by human-readable path.
//!
//! A frontend path like `getting-started` may live upstream under several
//! ids. Candidates are tried in a fixed order and the first hit wins.

use std::future::Future;

pub const DOCS_PREFIX: &str = "docs/";
pub const DOC_EXTENSION: &str = ".md";

/// Strip surrounding slashes; `None` when nothing is left.
pub fn normalize_slug(raw: &str) -> Option<&str> {
    let slug = raw.trim().trim_matches('/');
    (!slug.is_empty()).then_some(slug)
}

/// Upstream ids to try for `slug`, highest priority first.
pub fn candidate_ids(slug: &str) -> [String; 4] {
    [
        slug.to_owned(),
        format!("{slug}{DOC_EXTENSION}"),
        format!("{DOCS_PREFIX}{slug}"),
        format!("{DOCS_PREFIX}{slug}{DOC_EXTENSION}"),
    ]
}

/// Try `fetch` on each candidate until one yields a value.
///
/// `Ok(None)` from `fetch` moves on to the next candidate; an error stops
/// the lookup immediately. Returns the winning id with its value, or
/// `Ok(None)` when every candidate was missing.
pub async fn resolve_first<T, E, F, Fut>(
    candidates: impl IntoIterator<Item = String>,
    mut fetch: F,
) -> Result<Option<(String, T)>, E>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    for id in candidates {
        if let Some(found) = fetch(id.clone()).await? {
            return Ok(Some((id, found)));
        }
        tracing::debug!(candidate = %id, "Document candidate not found");
    }
    Ok(None)
}
