//! `require` directive parsing for asset source headers.
//!
//! Accepted forms (one per line, header only):
//! - `//= require 'jquery'` and `//=require rrssb`
//! - `*= require base` inside a block comment
//! - `#= require vendor/foo`
//!
//! Parsing stops at the first line that is neither blank nor a comment.
//! Other `=` directives (`require_self`, `require_tree`, ...) are skipped
//! and logged at debug level.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static REQUIRE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*(?://|\*|#)=\s*require\s+(?:'([^']+)'|"([^"]+)"|(\S+))\s*(?:\*/)?\s*$"#)
        .expect("valid require directive regex")
});
static DIRECTIVE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?://|\*|#)=\s*(\S+)").expect("valid directive regex"));
static COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?://|/\*|\*|#)").expect("valid comment regex"));

/// Returns required logical names from the header of `source`, in order.
pub fn parse_requires(source: &str) -> Vec<String> {
    let mut requires = Vec::new();
    for line in source.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(caps) = REQUIRE_RE.captures(line) {
            if let Some(name) = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)) {
                requires.push(name.as_str().to_string());
            }
            continue;
        }
        if let Some(caps) = DIRECTIVE_RE.captures(line) {
            debug!(
                "event=asset_directive module=directive status=skipped directive={}",
                &caps[1]
            );
            continue;
        }
        if !COMMENT_RE.is_match(line) {
            break;
        }
    }
    requires
}
