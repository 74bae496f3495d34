//! Extraction of process URNs from free-form text.
//!
//! Deployment tooling prints process URNs somewhere in its output; piping
//! that output in is enough to start watching. A URN looks like
//! `urn:platform:eu-north-1:123456789012:process/api-gateway/9f8e7d`.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

const URN_PATTERN: &str =
    r"urn:platform:([a-z0-9-]+):\d*:process/([A-Za-z0-9][A-Za-z0-9_.-]*)/[0-9A-Za-z-]+";

fn urn_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(URN_PATTERN).expect("URN pattern is valid"))
}

/// A process reference found in scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessLocator {
    /// The full URN, usable as a lookup target.
    pub urn: String,
    /// Region parsed out of the URN.
    pub region: String,
    /// Process name parsed out of the URN.
    pub name: String,
}

/// Scan text for process URNs.
///
/// Returns each distinct URN once, in order of first appearance. Returns an
/// empty vector when the text mentions no process.
#[must_use]
pub fn extract_process_locators(input: &str) -> Vec<ProcessLocator> {
    let mut seen = HashSet::new();
    let mut locators = Vec::new();

    for captures in urn_regex().captures_iter(input) {
        let urn = captures
            .get(0)
            .expect("whole match always present")
            .as_str();
        if !seen.insert(urn.to_string()) {
            continue;
        }
        locators.push(ProcessLocator {
            urn: urn.to_string(),
            region: captures[1].to_string(),
            name: captures[2].to_string(),
        });
    }

    locators
}
