use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;

const BUFFER_SIZE: usize = 4 * 1024 * 1024; // 4MB buffer

pub fn calculate_file_hash(path: &Path) -> Result<blake3::Hash> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .with_context(|| format!("cannot read {}", path.display()))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize())
}

/// 兩個檔案內容是否完全相同，大小不同時不計算雜湊
pub fn files_identical(a: &Path, b: &Path) -> Result<bool> {
    let len_a = fs::metadata(a)
        .with_context(|| format!("cannot stat {}", a.display()))?
        .len();
    let len_b = fs::metadata(b)
        .with_context(|| format!("cannot stat {}", b.display()))?
        .len();
    if len_a != len_b {
        return Ok(false);
    }

    Ok(calculate_file_hash(a)? == calculate_file_hash(b)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_with(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_identical_content() {
        let a = temp_with(b"SIMPLE = T");
        let b = temp_with(b"SIMPLE = T");
        assert!(files_identical(a.path(), b.path()).unwrap());
    }

    #[test]
    fn test_same_size_different_content() {
        let a = temp_with(b"dark 300");
        let b = temp_with(b"dark 060");
        assert!(!files_identical(a.path(), b.path()).unwrap());
    }

    #[test]
    fn test_different_size() {
        let a = temp_with(b"flat");
        let b = temp_with(b"flat frame");
        assert!(!files_identical(a.path(), b.path()).unwrap());
    }

    #[test]
    fn test_missing_file_is_error() {
        let a = temp_with(b"bias");
        assert!(files_identical(a.path(), Path::new("/nonexistent/bias.fits")).is_err());
    }
}
