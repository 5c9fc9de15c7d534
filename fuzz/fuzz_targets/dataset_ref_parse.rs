//! Fuzz target for dataset reference parsing.
//!
//! Feeds arbitrary UTF-8 input to the reference parser, checking for
//! panics, crashes, or hangs.

#![no_main]

use libfuzzer_sys::fuzz_target;
use yolo_ingest::hub::resolve::fuzz_parse_dataset_ref;

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }

    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let _ = fuzz_parse_dataset_ref(input);
});
