//! XISF 檔頭讀取
//!
//! XISF 檔以 `XISF0100` 開頭，接著是小端序的 XML 檔頭長度與保留欄位，
//! 這裡只取出 XML 中的 `<FITSKeyword>` 元素

use super::fits_header::HeaderMap;
use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const SIGNATURE: &[u8; 8] = b"XISF0100";
const MAX_XML_HEADER_LEN: usize = 16 * 1024 * 1024;

pub fn read_xisf_header(path: &Path) -> Result<HeaderMap> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    parse_xisf_header(BufReader::new(file))
        .with_context(|| format!("invalid XISF header in {}", path.display()))
}

pub fn parse_xisf_header<R: Read>(mut reader: R) -> Result<HeaderMap> {
    let mut signature = [0u8; 8];
    reader
        .read_exact(&mut signature)
        .context("file too short for XISF signature")?;
    if &signature != SIGNATURE {
        bail!("missing XISF0100 signature");
    }

    let mut length = [0u8; 4];
    reader.read_exact(&mut length).context("missing header length")?;
    let header_len = u32::from_le_bytes(length) as usize;
    if header_len == 0 || header_len > MAX_XML_HEADER_LEN {
        bail!("implausible XML header length {header_len}");
    }

    let mut reserved = [0u8; 4];
    reader.read_exact(&mut reserved).context("missing reserved field")?;

    let mut xml = vec![0u8; header_len];
    reader
        .read_exact(&mut xml)
        .context("file ended inside the XML header")?;

    // 部分寫入端會以 NUL 補滿檔頭長度
    let text = String::from_utf8_lossy(&xml);
    extract_fits_keywords(text.trim_end_matches('\0'))
}

fn extract_fits_keywords(xml: &str) -> Result<HeaderMap> {
    let mut reader = Reader::from_str(xml);
    let mut header = HeaderMap::new();

    loop {
        match reader.read_event().context("malformed XML header")? {
            Event::Start(element) | Event::Empty(element)
                if element.local_name().as_ref() == b"FITSKeyword" =>
            {
                let Some((name, value)) = keyword_attributes(&element)? else {
                    continue;
                };
                header
                    .entry(name.trim().to_ascii_uppercase())
                    .or_insert_with(|| strip_fits_quotes(&value));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(header)
}

/// 取出 `name` 與 `value` 屬性（已解開實體與字元參照），沒有 `name` 時回傳 `None`
fn keyword_attributes(element: &BytesStart<'_>) -> Result<Option<(String, String)>> {
    let mut name = None;
    let mut value = None;

    for attribute in element.attributes() {
        let attribute = attribute.context("malformed FITSKeyword attribute")?;
        let text = attribute
            .unescape_value()
            .context("invalid escape in FITSKeyword attribute")?;
        match attribute.key.as_ref() {
            b"name" => name = Some(text.into_owned()),
            b"value" => value = Some(text.into_owned()),
            _ => {}
        }
    }

    Ok(name.map(|name| (name, value.unwrap_or_default())))
}

/// XISF 中的字串值保留 FITS 的單引號外框
fn strip_fits_quotes(value: &str) -> String {
    let trimmed = value.trim();
    trimmed
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .map_or(trimmed, str::trim)
        .replace("''", "'")
}
