//! Fuzz target for file name classification.

#![no_main]

use libfuzzer_sys::fuzz_target;
use yolo_ingest::ingest::collect::{classify_file_name, FileKind};

fuzz_target!(|data: &[u8]| {
    let Ok(name) = std::str::from_utf8(data) else {
        return;
    };

    let kind = classify_file_name(name);
    if kind == FileKind::Image || kind == FileKind::Label {
        assert!(name.contains('.'));
    }
});
