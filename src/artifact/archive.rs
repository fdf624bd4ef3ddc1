//! Zip archive helpers: download, digest verification and extraction

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use zip::ZipArchive;

/// Copy `body` into `file`, returning the hex SHA-256 of what was written.
///
/// The file is rewound so it can be handed straight to [`extract`].
pub(crate) fn spool(mut body: impl Read, file: &mut File) -> io::Result<String> {
    io::copy(&mut body, file)?;
    file.seek(SeekFrom::Start(0))?;

    let mut hasher = Sha256::new();
    io::copy(file, &mut hasher)?;
    file.seek(SeekFrom::Start(0))?;

    Ok(format!("{:x}", hasher.finalize()))
}

/// Extract every entry of a zip archive below `dest`.
///
/// Entry names are sanitized by the zip reader; entries escaping `dest` are
/// skipped.
pub(crate) fn extract(reader: impl Read + Seek, dest: &Path) -> zip::result::ZipResult<()> {
    let mut archive = ZipArchive::new(reader)?;
    archive.extract(dest)
}

/// Sum of the uncompressed sizes of all entries.
pub(crate) fn unzipped_size(archive: &[u8]) -> zip::result::ZipResult<u64> {
    let mut archive = ZipArchive::new(Cursor::new(archive))?;
    let mut total = 0u64;
    for i in 0..archive.len() {
        total = total.saturating_add(archive.by_index(i)?.size());
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn make_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in entries {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(body).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_unzipped_size() {
        let archive = make_zip(&[("a.py", b"12345"), ("lib/b.py", b"123")]);
        assert_eq!(unzipped_size(&archive).unwrap(), 8);
    }

    #[test]
    fn test_unzipped_size_rejects_garbage() {
        assert!(unzipped_size(b"definitely not a zip").is_err());
    }

    #[test]
    fn test_spool_and_extract() {
        let archive = make_zip(&[("handler.py", b"def handler(e, c): pass"), ("pkg/x.txt", b"x")]);
        let dir = tempfile::tempdir().unwrap();

        let mut file = tempfile::tempfile_in(dir.path()).unwrap();
        let digest = spool(Cursor::new(archive.clone()), &mut file).unwrap();
        assert_eq!(digest, crate::artifact::sha256_hex(&archive));

        let dest = dir.path().join("out");
        extract(&mut file, &dest).unwrap();
        assert_eq!(
            std::fs::read_to_string(dest.join("handler.py")).unwrap(),
            "def handler(e, c): pass"
        );
        assert!(dest.join("pkg/x.txt").exists());
    }
}
