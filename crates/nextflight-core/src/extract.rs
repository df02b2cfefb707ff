//! Extraction of flight push tuples from page script bodies.
//!
//! Server-rendered pages stream their state through inline scripts of two
//! shapes: one bootstrap script `(self.__next_f = self.__next_f || []).push(…)`
//! and any number of continuation scripts `self.__next_f.push(…)`. This module
//! finds those scripts and parses the pushed arrays, in document order.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::FlightError;

static RE_INIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(self\.__next_f\s?=\s?self\.__next_f\s?\|\|\s?\[\]\)\.push\((\[.+)\)").unwrap()
});

static RE_PUSH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^self\.__next_f\.push\((\[.+)\)$").unwrap());

/// True when any script body carries the flight bootstrap pattern.
pub fn has_flight_scripts<'a, I>(scripts: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    scripts.into_iter().any(|s| RE_INIT.is_match(s.trim()))
}

/// Collects the raw `self.__next_f` push tuples, in document order.
///
/// Returns `Ok(None)` when no script matches either pattern: a page without
/// flight data is a valid absence, not an error. Only the first bootstrap
/// script is honored, matching client behavior.
pub fn raw_push_tuples<'a, I>(scripts: I) -> Result<Option<Vec<Value>>, FlightError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut tuples: Vec<Value> = Vec::new();
    let mut found_init = false;
    for script in scripts {
        let script = script.trim();
        if !found_init {
            if let Some(caps) = RE_INIT.captures(script) {
                found_init = true;
                tuples.push(serde_json::from_str(&caps[1])?);
            }
        }
        if let Some(caps) = RE_PUSH.captures(script) {
            tuples.push(serde_json::from_str(&caps[1])?);
        }
    }
    Ok(if tuples.is_empty() { None } else { Some(tuples) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn init_and_push_scripts_are_collected_in_order() {
        let scripts = [
            "console.log('noise')",
            r#"(self.__next_f = self.__next_f || []).push([0])"#,
            r#"self.__next_f.push([1,"0:null\n"])"#,
            r#"self.__next_f.push([1,"1:null\n"])"#,
        ];
        let tuples = raw_push_tuples(scripts).unwrap().unwrap();
        assert_eq!(
            tuples,
            vec![json!([0]), json!([1, "0:null\n"]), json!([1, "1:null\n"])]
        );
    }

    #[test]
    fn no_matching_script_is_a_valid_absence() {
        let scripts = ["var x = 1;", "window.__DATA__ = {}"];
        assert!(raw_push_tuples(scripts).unwrap().is_none());
        assert!(!has_flight_scripts(scripts));
    }

    #[test]
    fn bootstrap_pattern_tolerates_spacing_variants() {
        for s in [
            "(self.__next_f = self.__next_f || []).push([0])",
            "(self.__next_f=self.__next_f||[]).push([0])",
        ] {
            assert!(has_flight_scripts([s]), "did not match: {s}");
        }
    }

    #[test]
    fn push_pattern_must_span_the_whole_script() {
        // A push call buried inside other code is not a flight script.
        let scripts = [r#"f(); self.__next_f.push([1,"x"]);"#];
        assert!(raw_push_tuples(scripts).unwrap().is_none());
    }

    #[test]
    fn second_bootstrap_script_is_ignored() {
        let scripts = [
            r#"(self.__next_f = self.__next_f || []).push([0])"#,
            r#"(self.__next_f = self.__next_f || []).push([0])"#,
        ];
        let tuples = raw_push_tuples(scripts).unwrap().unwrap();
        assert_eq!(tuples, vec![json!([0])]);
    }
}
