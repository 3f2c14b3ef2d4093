//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Write a deflated PK3 containing `members`.
pub fn write_pk3(path: &Path, members: &[(&str, &[u8])]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, data) in members {
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap();
}

pub fn write_file(root: &Path, rel: &str, data: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, data).unwrap();
}

/// Every file under `root` as a sorted list of `/`-separated relative paths.
pub fn tree(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && e.file_name() != pk3skin::constants::CACHE_MARKER)
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}

/// A game folder with a single `reborn` model in `base/assets1.pk3`.
pub fn reborn_game(game: &Path) {
    write_pk3(
        &game.join("base/assets1.pk3"),
        &[
            ("models/players/reborn/model.glm", b"GLM-reborn".as_slice()),
            ("models/players/reborn/model_default.skin", b"head,model_default.jpg".as_slice()),
            ("models/players/reborn/model_default.jpg", b"jpeg".as_slice()),
            ("models/players/_humanoid/_humanoid.gla", b"GLA".as_slice()),
        ],
    );
}
