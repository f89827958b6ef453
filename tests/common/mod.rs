//! 整合測試共用的影格檔產生器

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[path = "../../src/frame/fixtures.rs"]
mod fixtures;

pub use fixtures::{sensor_cards, write_fits, write_frame};

pub fn write_xisf(path: &Path, cards: &[(&str, &str)]) -> PathBuf {
    let keywords: String = cards
        .iter()
        .map(|(key, value)| {
            let value = if value.parse::<f64>().is_ok() {
                (*value).to_string()
            } else {
                format!("'{value}'")
            };
            format!(r#"<FITSKeyword name="{key}" value="{value}" comment=""/>"#)
        })
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><xisf version="1.0"><Image>{keywords}</Image></xisf>"#
    );

    let mut bytes = b"XISF0100".to_vec();
    bytes.extend((xml.len() as u32).to_le_bytes());
    bytes.extend([0u8; 4]);
    bytes.extend(xml.as_bytes());

    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
    path.to_path_buf()
}

/// 目錄樹中所有檔案的相對路徑與內容
pub fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    if !root.exists() {
        return BTreeMap::new();
    }
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let relative = e.path().strip_prefix(root).unwrap().to_path_buf();
            (relative, fs::read(e.path()).unwrap())
        })
        .collect()
}
