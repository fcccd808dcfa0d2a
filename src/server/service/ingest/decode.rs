//! Detects and unwraps gzip or zip compressed reports.

use std::io::{Cursor, Read};

use flate2::read::GzDecoder;

use crate::server::error::ingest::IngestError;

/// Upper bound on the decompressed size of a single report.
pub const MAX_REPORT_SIZE: usize = 50 * 1024 * 1024;

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Returns the report content of `bytes`.
///
/// Gzip input is inflated, zip input yields its first `.xml` entry, anything
/// else is returned unchanged.
///
/// # Returns
/// - `Ok(Vec<u8>)` - Report content
/// - `Err(IngestError::Empty)` - No input
/// - `Err(IngestError::TooLarge)` - Content exceeds [`MAX_REPORT_SIZE`]
/// - `Err(IngestError::Decompress)` - Corrupt archive
/// - `Err(IngestError::NoXmlInArchive)` - Zip without an XML entry
pub fn decode(bytes: &[u8]) -> Result<Vec<u8>, IngestError> {
    if bytes.is_empty() {
        return Err(IngestError::Empty);
    }

    if bytes.starts_with(GZIP_MAGIC) {
        return read_limited(GzDecoder::new(bytes));
    }

    if bytes.starts_with(ZIP_MAGIC) {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| IngestError::Decompress(e.to_string()))?;

        for i in 0..archive.len() {
            let entry = archive
                .by_index(i)
                .map_err(|e| IngestError::Decompress(e.to_string()))?;
            if entry.is_file() && entry.name().to_ascii_lowercase().ends_with(".xml") {
                return read_limited(entry);
            }
        }

        return Err(IngestError::NoXmlInArchive);
    }

    if bytes.len() > MAX_REPORT_SIZE {
        return Err(IngestError::TooLarge(MAX_REPORT_SIZE));
    }

    Ok(bytes.to_vec())
}

fn read_limited(reader: impl Read) -> Result<Vec<u8>, IngestError> {
    let mut out = Vec::new();
    reader
        .take(MAX_REPORT_SIZE as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| IngestError::Decompress(e.to_string()))?;

    if out.len() > MAX_REPORT_SIZE {
        return Err(IngestError::TooLarge(MAX_REPORT_SIZE));
    }
    if out.is_empty() {
        return Err(IngestError::Empty);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::{write::GzEncoder, Compression};
    use zip::write::SimpleFileOptions;

    use super::*;

    const XML: &[u8] = b"<feedback></feedback>";

    /// Expected: plain input passes through untouched
    #[test]
    fn passes_plain_xml_through() {
        assert_eq!(decode(XML).unwrap(), XML);
    }

    #[test]
    fn inflates_gzip() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(XML).unwrap();
        let gz = encoder.finish().unwrap();

        assert_eq!(decode(&gz).unwrap(), XML);
    }

    /// Expected: first `.xml` entry returned, other entries skipped
    #[test]
    fn extracts_xml_from_zip() {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buf);
            let options = SimpleFileOptions::default();
            writer.start_file("readme.txt", options).unwrap();
            writer.write_all(b"ignore me").unwrap();
            writer.start_file("google.com!example.com!1!2.XML", options).unwrap();
            writer.write_all(XML).unwrap();
            writer.finish().unwrap();
        }

        assert_eq!(decode(buf.get_ref()).unwrap(), XML);
    }

    #[test]
    fn rejects_zip_without_xml() {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buf);
            writer
                .start_file("readme.txt", SimpleFileOptions::default())
                .unwrap();
            writer.write_all(b"nothing").unwrap();
            writer.finish().unwrap();
        }

        assert!(matches!(
            decode(buf.get_ref()),
            Err(IngestError::NoXmlInArchive)
        ));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(decode(&[]), Err(IngestError::Empty)));
    }
}
