//! 測試用的最小 FITS 檔產生器
//!
//! 整合測試無法使用 `#[cfg(test)]` 模組，`tests/common` 以 `#[path]` 引入同一份檔案

use std::fs;
use std::path::{Path, PathBuf};

const BLOCK_SIZE: usize = 2880;

fn card(text: &str) -> String {
    format!("{text:<80}")
}

/// 寫出只有檔頭的 FITS 檔；數字值原樣寫入，其餘加上單引號
pub fn write_fits(path: &Path, cards: &[(&str, &str)]) -> PathBuf {
    let mut header = card("SIMPLE  =                    T");
    for (key, value) in cards {
        let value = if value.parse::<f64>().is_ok() {
            format!("{value:>20}")
        } else {
            format!("'{value:<8}'")
        };
        header.push_str(&card(&format!("{key:<8}= {value}")));
    }
    header.push_str(&card("END"));

    let mut bytes = header.into_bytes();
    bytes.resize(bytes.len().div_ceil(BLOCK_SIZE) * BLOCK_SIZE, b' ');

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, bytes).unwrap();
    path.to_path_buf()
}

/// 相機 A、-10°C、gain 100、offset 50、readout 0 的檔頭欄位
pub fn sensor_cards<'a>(
    kind: &'a str,
    exposure: Option<&'a str>,
    filter: Option<&'a str>,
) -> Vec<(&'a str, &'a str)> {
    let mut cards = vec![
        ("IMAGETYP", kind),
        ("INSTRUME", "A"),
        ("SET-TEMP", "-10.0"),
        ("GAIN", "100"),
        ("OFFSET", "50"),
        ("READOUTM", "0"),
    ];
    if let Some(exposure) = exposure {
        cards.push(("EXPOSURE", exposure));
    }
    if let Some(filter) = filter {
        cards.push(("FILTER", filter));
    }
    cards
}

pub fn write_frame(
    dir: &Path,
    name: &str,
    kind: &str,
    exposure: Option<&str>,
    filter: Option<&str>,
) -> PathBuf {
    write_fits(&dir.join(name), &sensor_cards(kind, exposure, filter))
}
