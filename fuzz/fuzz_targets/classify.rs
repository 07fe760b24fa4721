#![no_main]

use libfuzzer_sys::fuzz_target;
use nixgen_core::artifact::structural_defects;
use nixgen_core::features::{SourceListing, features_for};
use nixgen_core::scan::library_declarations;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        // The same text is fuzzed as build configuration and as a generated descriptor
        let _ = library_declarations(&s.to_lowercase());
        let _ = features_for(s, &SourceListing { sources: 2, headers: 1 });
        let _ = structural_defects(s);
    }
});
