//! Document loading functionality.
//!
//! This module reads JSON document text from files or stdin, transparently
//! decompressing gzip input. Parsing is left to the query entry point so that
//! document errors are reported with their byte offsets.

use anyhow::{Context, Result};
use std::fs;
use std::io::Read;
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Reads a JSON document from the filesystem.
///
/// Files with a `.gz` extension are decompressed.
///
/// # Examples
///
/// ```no_run
/// use pathquill::file::loader::load_document_file;
///
/// let text = load_document_file("store.json").unwrap();
/// let authors = pathquill::evaluate_json_path("$..author", &text).unwrap();
/// ```
///
/// # Errors
///
/// This function will return an error if:
/// - The file path does not exist
/// - The file cannot be read (permissions, etc.)
/// - The file is gzipped but corrupted
/// - The contents are not valid UTF-8
pub fn load_document_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path_ref = path.as_ref();

    // Check if file is gzipped
    let is_gzipped = path_ref
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    if is_gzipped {
        read_gzipped_file(path_ref)
    } else {
        fs::read_to_string(path_ref)
            .with_context(|| format!("Failed to read file: {}", path_ref.display()))
    }
}

/// Reads a JSON document from standard input until EOF.
///
/// Input starting with the gzip magic bytes is decompressed, so
/// `gzip -c doc.json | pathquill '$.a'` works.
pub fn load_document_from_stdin() -> Result<String> {
    read_document(std::io::stdin().lock()).context("Failed to read from stdin")
}

/// Reads a whole document from `reader`, decompressing it if it is gzipped.
pub fn read_document<R: Read>(mut reader: R) -> Result<String> {
    let mut buffer = Vec::new();
    reader
        .read_to_end(&mut buffer)
        .context("Failed to read input")?;

    if buffer.starts_with(&GZIP_MAGIC) {
        decompress_gzip_bytes(&buffer)
    } else {
        String::from_utf8(buffer).context("Invalid UTF-8 in input")
    }
}

/// Reads and decompresses a gzipped file.
fn read_gzipped_file(path: &Path) -> Result<String> {
    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open gzipped file: {}", path.display()))?;
    gunzip(file).context("Failed to decompress gzipped file - file may be corrupted")
}

/// Decompresses gzip-encoded bytes to a UTF-8 string.
fn decompress_gzip_bytes(bytes: &[u8]) -> Result<String> {
    gunzip(bytes).context("Failed to decompress gzipped input")
}

fn gunzip<R: Read>(reader: R) -> std::io::Result<String> {
    use flate2::read::GzDecoder;

    let mut decoder = GzDecoder::new(reader);
    let mut content = String::new();
    decoder.read_to_string(&mut content)?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(text: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_read_document_plain() {
        let text = read_document(r#"{"a": 1}"#.as_bytes()).unwrap();
        assert_eq!(text, r#"{"a": 1}"#);
    }

    #[test]
    fn test_read_document_gzipped() {
        let bytes = gzip(r#"[1, 2, 3]"#);
        assert_eq!(read_document(bytes.as_slice()).unwrap(), "[1, 2, 3]");
    }

    #[test]
    fn test_read_document_invalid_utf8() {
        let err = read_document(&[0xff, 0xfe, 0x00][..]).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_corrupted_gzip_bytes() {
        let mut bytes = gzip(r#"{"a": 1}"#);
        bytes.truncate(6);
        let err = read_document(bytes.as_slice()).unwrap_err();
        assert!(err.to_string().contains("decompress"));
    }

    #[test]
    fn test_read_gzipped_file() {
        let dir = tempfile::tempdir().unwrap();
        let gz_path = dir.path().join("doc.json.gz");
        fs::write(&gz_path, gzip(r#"{"test": "value"}"#)).unwrap();

        assert_eq!(load_document_file(&gz_path).unwrap(), r#"{"test": "value"}"#);
    }

    #[test]
    fn test_read_gzipped_file_corrupted() {
        let dir = tempfile::tempdir().unwrap();
        let gz_path = dir.path().join("doc.json.gz");
        fs::write(&gz_path, b"not gzip data").unwrap();

        let err_msg = load_document_file(&gz_path).unwrap_err().to_string();
        assert!(err_msg.contains("decompress") || err_msg.contains("corrupted"));
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = load_document_file("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
