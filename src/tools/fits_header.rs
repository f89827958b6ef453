//! FITS 主檔頭讀取
//!
//! 只解析 2880 位元組區塊中的 80 字元 card，不讀取影像資料

use anyhow::{Context, Result, bail};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

/// 檔頭關鍵字（大寫）對應值的表
pub type HeaderMap = BTreeMap<String, String>;

const BLOCK_SIZE: usize = 2880;
const CARD_SIZE: usize = 80;
/// 超過此區塊數仍未遇到 END 就視為損毀
const MAX_HEADER_BLOCKS: usize = 256;

pub fn read_fits_header(path: &Path) -> Result<HeaderMap> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    parse_fits_header(BufReader::new(file))
        .with_context(|| format!("invalid FITS header in {}", path.display()))
}

pub fn parse_fits_header<R: Read>(mut reader: R) -> Result<HeaderMap> {
    let mut header = HeaderMap::new();
    let mut block = [0u8; BLOCK_SIZE];

    for block_index in 0..MAX_HEADER_BLOCKS {
        match reader.read_exact(&mut block) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                bail!("file ended before the END card");
            }
            Err(e) => return Err(e.into()),
        }

        for (card_index, raw_card) in block.chunks(CARD_SIZE).enumerate() {
            let card = card_to_ascii(raw_card);

            if block_index == 0 && card_index == 0 && !card.starts_with("SIMPLE") {
                bail!("missing SIMPLE card");
            }

            if card[..8].trim_end() == "END" {
                return Ok(header);
            }

            if let Some((keyword, value)) = parse_card(&card) {
                header.entry(keyword).or_insert(value);
            }
        }
    }

    bail!("no END card within {MAX_HEADER_BLOCKS} header blocks")
}

/// 非 ASCII 位元組以 '?' 取代，確保之後的切片都落在字元邊界
fn card_to_ascii(raw: &[u8]) -> String {
    raw.iter()
        .map(|&b| if b.is_ascii() { b as char } else { '?' })
        .collect()
}

fn parse_card(card: &str) -> Option<(String, String)> {
    let keyword = card[..8].trim_end();
    if keyword.is_empty() || keyword == "COMMENT" || keyword == "HISTORY" {
        return None;
    }
    if &card[8..10] != "= " {
        return None;
    }

    let rest = card[10..].trim_start();
    let value = if let Some(quoted) = rest.strip_prefix('\'') {
        parse_string_value(quoted)
    } else {
        rest.split('/').next().unwrap_or_default().trim().to_string()
    };

    Some((keyword.to_ascii_uppercase(), value))
}

/// 字串值以單引號包住，兩個連續單引號代表一個單引號；尾端空白不具意義
fn parse_string_value(quoted: &str) -> String {
    let mut value = String::new();
    let mut chars = quoted.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\'' {
            if chars.peek() == Some(&'\'') {
                value.push('\'');
                chars.next();
            } else {
                break;
            }
        } else {
            value.push(c);
        }
    }

    value.trim_end().to_string()
}
