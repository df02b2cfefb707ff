//! Scan a saved HTML page for framework data.
//!
//! Usage: `next-scan <page.html>`

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::process::ExitCode;

use nextflight_core::decode_scripts;
use nextflight_page::{find_build_id, has_next_data, has_nextjs, Document};

fn main() -> ExitCode {
    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: next-scan <page.html>");
        return ExitCode::from(2);
    };
    let html = match fs::read_to_string(&path) {
        Ok(html) => html,
        Err(err) => {
            eprintln!("next-scan: {path}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let doc = Document::parse(&html);
    if !has_nextjs(&doc) {
        println!("no framework markers found");
        return ExitCode::SUCCESS;
    }

    match find_build_id(&doc) {
        Ok(Some(id)) => println!("build id: {id}"),
        Ok(None) => println!("build id: not found"),
        Err(err) => println!("build id: lookup failed ({err})"),
    }
    if has_next_data(&doc) {
        println!("page carries a __NEXT_DATA__ payload");
    }

    match decode_scripts(doc.script_texts()) {
        Ok(Some(data)) => {
            println!("flight records: {}", data.len());
            let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
            for element in data.find_iter(None, None, true) {
                *counts.entry(element.kind().name()).or_default() += 1;
            }
            for (kind, count) in counts {
                println!("  {kind}: {count}");
            }
            for warning in &data.warnings {
                println!("  warning: {warning}");
            }
        }
        Ok(None) => println!("no flight data"),
        Err(err) => {
            eprintln!("next-scan: flight decode failed: {err}");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
