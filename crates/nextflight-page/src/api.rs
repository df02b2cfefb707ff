//! Composition of the `/_next/data/` JSON endpoints a build exposes.

/// Framework paths that have no JSON data equivalent.
pub const EXCLUDED_PATHS: [&str; 4] = ["/404", "/_app", "/_error", "/sitemap.xml"];

const INDEX_JSON: &str = "index.json";

/// Joins url path parts, tolerating stray slashes on either side of each.
pub fn join_paths(parts: &[&str]) -> String {
    let mut out = String::new();
    for part in parts {
        let trimmed = part.trim_matches('/');
        if trimmed.is_empty() {
            continue;
        }
        out.push('/');
        out.push_str(trimmed);
    }
    out
}

/// The JSON data path for one page, or `None` for pages that have no data
/// equivalent.
pub fn api_path(build_id: &str, base_path: Option<&str>, page_path: Option<&str>) -> Option<String> {
    let mut path = match page_path {
        None => INDEX_JSON.to_owned(),
        Some(page) if EXCLUDED_PATHS.contains(&page) => return None,
        Some(page) => page.to_owned(),
    };
    if !path.ends_with(".json") {
        path.push_str(".json");
    }
    if path.ends_with("/.json") {
        path = INDEX_JSON.to_owned();
    }
    Some(join_paths(&[
        base_path.unwrap_or(""),
        "/_next/data",
        build_id,
        &path,
    ]))
}

/// The `index.json` endpoint for a build.
pub fn index_api_path(build_id: &str, base_path: Option<&str>) -> String {
    join_paths(&[base_path.unwrap_or(""), "/_next/data", build_id, INDEX_JSON])
}

/// Whether the data API is exposed, judged from the `index.json` response.
pub fn is_api_exposed(status: u16, content_type: &str, body: &str) -> bool {
    if content_type.starts_with("application/json") || status == 200 {
        true
    } else if content_type.starts_with("text/html") {
        false
    } else {
        body == r#"{"notFound":true}"#
    }
}

/// Data paths for the manifest's `sortedPages`, unless the API is known to
/// be closed.
pub fn list_api_paths(
    sorted_pages: &[String],
    build_id: &str,
    base_path: Option<&str>,
    exposed: Option<bool>,
) -> Vec<String> {
    if exposed == Some(false) {
        return Vec::new();
    }
    sorted_pages
        .iter()
        .filter_map(|page| api_path(build_id, base_path, Some(page)))
        .collect()
}
