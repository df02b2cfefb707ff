//! Page-side helpers around the flight decoder: document access, the
//! `__NEXT_DATA__` payload, static-url and base-path discovery, build
//! manifests, build-id probing, and data-API path composition.

pub mod api;
pub mod document;
pub mod error;
pub mod manifest;
pub mod nextdata;
pub mod probe;
pub mod urls;

pub use api::{api_path, index_api_path, is_api_exposed, join_paths, list_api_paths};
pub use document::{Document, Script};
pub use error::PageError;
pub use manifest::{
    build_manifest_path, parse_build_manifest, ssg_manifest_path, BUILD_MANIFEST_FILE,
    MANIFEST_FILES, SSG_MANIFEST_FILE,
};
pub use nextdata::{has_next_data, next_data, NEXT_DATA_ID};
pub use probe::{find_build_id, has_nextjs};
pub use urls::{base_path, next_static_urls, NEXT_PREFIX, NEXT_STATIC_PREFIX};
