//! Fuzz target for the compact environment variable syntax.
//!
//! Feeds arbitrary strings through the `class:size,...` and
//! `backend:flag,...` parsers. Parsing may fail but must never panic, and
//! whatever parses must produce a valid configuration.

#![no_main]

use libfuzzer_sys::fuzz_target;
use wgsize_core::config::ReductionConfig;

fuzz_target!(|data: (&str, &str)| {
    let (preferred, bundles) = data;

    if let Ok(config) = ReductionConfig::default().apply_compact(Some(preferred), Some(bundles)) {
        assert!(config.validate().is_ok());
    }
});
