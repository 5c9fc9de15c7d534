#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::Path;

use zip::write::SimpleFileOptions;

pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, contents).expect("write file");
}

/// Write a zip archive with the given `(entry name, contents)` pairs.
pub fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    let file = fs::File::create(path).expect("create zip");
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, contents) in entries {
        writer.start_file(*name, options).expect("start entry");
        writer.write_all(contents.as_bytes()).expect("write entry");
    }
    writer.finish().expect("finish zip");
}

/// Sorted file names directly inside `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| {
            entry
                .expect("dir entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

/// The scenario tree: `a/cat1.jpg`, `a/cat1.txt`, `b/cat2.png`.
pub fn create_cat_dataset(root: &Path) {
    write_file(&root.join("a/cat1.jpg"), "jpg-bytes");
    write_file(&root.join("a/cat1.txt"), "0 0.5 0.5 0.25 0.25\n");
    write_file(&root.join("b/cat2.png"), "png-bytes");
}
