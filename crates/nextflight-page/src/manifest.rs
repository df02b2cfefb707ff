//! The `_buildManifest.js` asset-manifest script.
//!
//! Two physical shapes exist in the wild: a direct object literal assigned
//! to `self.__BUILD_MANIFEST`, and a minified immediately-invoked function
//! whose formal parameters stand in for repeated path fragments. Both parse
//! through the object-literal micro-language, the second after substituting
//! the call arguments for the parameters.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::api::join_paths;
use crate::error::PageError;
use crate::urls::NEXT_STATIC_PREFIX;

pub const BUILD_MANIFEST_FILE: &str = "_buildManifest.js";
pub const SSG_MANIFEST_FILE: &str = "_ssgManifest.js";
pub const MANIFEST_FILES: [&str; 2] = [BUILD_MANIFEST_FILE, SSG_MANIFEST_FILE];

static RE_FUNCTION_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^function\((?P<keys>(?:[\w$]+,)*[\w$]+)\)\s*\{\s*return\s*(?P<content>\{[\S\s]*\})\s*\}\((?P<values>.*?)\)",
    )
    .unwrap()
});

/// Parses the body of a `_buildManifest.js` script.
pub fn parse_build_manifest(script: &str) -> Result<Value, PageError> {
    let rest = script
        .trim_start()
        .strip_prefix("self.__BUILD_MANIFEST")
        .ok_or(PageError::InvalidManifest(
            "does not start with self.__BUILD_MANIFEST",
        ))?;
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('=').unwrap_or(rest).trim_start();

    if rest.starts_with('{') {
        return Ok(nextflight_jslit::parse(rest)?);
    }

    let caps = RE_FUNCTION_FORM
        .captures(rest)
        .ok_or(PageError::InvalidManifest("unrecognized manifest shape"))?;
    let keys: Vec<&str> = caps["keys"].split(',').map(str::trim).collect();
    let args = nextflight_jslit::parse(&format!("[{}]", &caps["values"]))?;
    let Value::Array(args) = args else {
        return Err(PageError::InvalidManifest("call arguments did not parse"));
    };
    let vars: HashMap<String, Value> = keys
        .into_iter()
        .map(str::to_owned)
        .zip(args)
        .collect();
    Ok(nextflight_jslit::parse_with(&caps["content"], &vars)?)
}

/// Path of the build manifest for a given build.
pub fn build_manifest_path(build_id: &str, base_path: Option<&str>) -> String {
    join_paths(&[
        base_path.unwrap_or(""),
        NEXT_STATIC_PREFIX,
        build_id,
        BUILD_MANIFEST_FILE,
    ])
}

/// Path of the SSG manifest for a given build.
pub fn ssg_manifest_path(build_id: &str, base_path: Option<&str>) -> String {
    join_paths(&[
        base_path.unwrap_or(""),
        NEXT_STATIC_PREFIX,
        build_id,
        SSG_MANIFEST_FILE,
    ])
}
