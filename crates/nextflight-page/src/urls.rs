//! Discovery of `/_next/static/` asset urls and the site's base path.

use crate::document::Document;
use crate::error::PageError;

pub const NEXT_PREFIX: &str = "/_next";
pub const NEXT_STATIC_PREFIX: &str = "/_next/static/";

/// Attribute values on the page that point into `/_next/static/`.
pub fn next_static_urls(doc: &Document) -> Vec<&str> {
    doc.urls_containing(NEXT_STATIC_PREFIX)
}

/// The shared prefix in front of `/_next/static/` across the given urls.
///
/// `""` for a site served at the domain root, `"/hello"` for one deployed
/// under a path prefix, and the scheme-and-host form when the urls are
/// absolute (pass `remove_domain` to strip it). Urls that disagree on the
/// prefix are an error; an empty slice is `Ok(None)`.
pub fn base_path(urls: &[&str], remove_domain: bool) -> Result<Option<String>, PageError> {
    let mut shared: Option<usize> = None;
    for url in urls {
        let at = url
            .rfind(NEXT_STATIC_PREFIX)
            .ok_or_else(|| PageError::MissingStaticPrefix((*url).to_owned()))?;
        match shared {
            None => shared = Some(at),
            Some(prev) if prev != at => return Err(PageError::MixedStaticRoots),
            Some(_) => {}
        }
    }
    let Some(at) = shared else {
        return Ok(None);
    };
    let mut base = &urls[0][..at];
    if remove_domain {
        base = strip_origin(base);
    }
    Ok(Some(base.to_owned()))
}

/// Drops a `scheme://host` front from a path, when one is present.
fn strip_origin(path: &str) -> &str {
    match path.split_once("://") {
        Some((_, rest)) => match rest.find('/') {
            Some(slash) => &rest[slash..],
            None => "",
        },
        None => path,
    }
}
