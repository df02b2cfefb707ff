//! Page classification and build-id discovery.

use nextflight_core::{decode_scripts, has_flight_scripts};
use serde_json::Value;

use crate::document::Document;
use crate::error::PageError;
use crate::manifest::MANIFEST_FILES;
use crate::nextdata::{has_next_data, next_data};
use crate::urls::{base_path, next_static_urls, NEXT_STATIC_PREFIX};

/// True when the page carries any recognizable framework data.
pub fn has_nextjs(doc: &Document) -> bool {
    has_next_data(doc) || has_flight_scripts(doc.script_texts())
}

/// Searches the page for its build id.
///
/// Sources, in order: a manifest url under `/_next/static/<id>/`, the
/// `__NEXT_DATA__` payload's `buildId`, and the flight root payload.
/// `Ok(None)` when none of them identifies a build.
pub fn find_build_id(doc: &Document) -> Result<Option<String>, PageError> {
    let static_urls = next_static_urls(doc);
    if let Some(base) = base_path(&static_urls, false)? {
        for url in &static_urls {
            let sliced = url.strip_prefix(base.as_str()).unwrap_or(url);
            let sliced = sliced.strip_prefix(NEXT_STATIC_PREFIX).unwrap_or(sliced);
            for file in MANIFEST_FILES {
                if let Some(id) = sliced.strip_suffix(&format!("/{file}")) {
                    return Ok(Some(id.to_owned()));
                }
            }
        }
    }

    if let Some(data) = next_data(doc)? {
        if let Some(id) = data.get("buildId").and_then(Value::as_str) {
            return Ok(Some(id.to_owned()));
        }
        // A __NEXT_DATA__ page without a buildId key has nothing further to
        // offer; flight data and __NEXT_DATA__ do not coexist.
        return Ok(None);
    }

    if let Some(flight) = decode_scripts(doc.script_texts())? {
        if let Some(id) = flight.build_id() {
            return Ok(Some(id.to_owned()));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Script;

    fn script(text: &str) -> Script {
        Script {
            id: None,
            text: text.to_owned(),
        }
    }

    #[test]
    fn manifest_url_wins() {
        let doc = Document::from_parts(
            vec![Script {
                id: Some("__NEXT_DATA__".to_owned()),
                text: r#"{"buildId":"from-next-data"}"#.to_owned(),
            }],
            vec![
                "/_next/static/css/app.css".to_owned(),
                "/_next/static/the-build-id/_buildManifest.js".to_owned(),
            ],
        );
        assert_eq!(
            find_build_id(&doc).unwrap().unwrap(),
            "the-build-id"
        );
    }

    #[test]
    fn manifest_url_with_base_path_and_domain() {
        let doc = Document::from_parts(
            Vec::new(),
            vec!["https://cdn.example/base/_next/static/xyz/_ssgManifest.js".to_owned()],
        );
        assert_eq!(find_build_id(&doc).unwrap().unwrap(), "xyz");
    }

    #[test]
    fn next_data_is_the_second_source() {
        let doc = Document::from_parts(
            vec![Script {
                id: Some("__NEXT_DATA__".to_owned()),
                text: r#"{"buildId":"from-next-data"}"#.to_owned(),
            }],
            Vec::new(),
        );
        assert!(has_nextjs(&doc));
        assert_eq!(find_build_id(&doc).unwrap().unwrap(), "from-next-data");
    }

    #[test]
    fn flight_root_is_the_last_source() {
        let doc = Document::from_parts(
            vec![
                script(r#"(self.__next_f = self.__next_f || []).push([0])"#),
                script(r#"self.__next_f.push([1,"0:{\"b\":\"from-flight\"}\n"])"#),
            ],
            Vec::new(),
        );
        assert!(has_nextjs(&doc));
        assert_eq!(find_build_id(&doc).unwrap().unwrap(), "from-flight");
    }

    #[test]
    fn nothing_found_is_ok_none() {
        let doc = Document::from_parts(vec![script("var x;")], Vec::new());
        assert!(!has_nextjs(&doc));
        assert!(find_build_id(&doc).unwrap().is_none());
    }

    #[test]
    fn next_data_without_build_id_yields_none() {
        let doc = Document::from_parts(
            vec![Script {
                id: Some("__NEXT_DATA__".to_owned()),
                text: r#"{"props":{}}"#.to_owned(),
            }],
            Vec::new(),
        );
        assert!(find_build_id(&doc).unwrap().is_none());
    }
}
