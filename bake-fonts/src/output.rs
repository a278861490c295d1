//! Writing generated fonts to disk.
//!
//! A font produces up to three files. If any of them cannot be written, the
//! ones already written are removed again so that no partial output is left
//! behind.

use std::path::{Path, PathBuf};

use crate::{generate::GeneratedFont, Error};

/// The files written for one font.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputPaths {
    pub binary: PathBuf,
    pub charset: PathBuf,
    /// Only written when some characters failed.
    pub unsupported: PathBuf,
}

impl OutputPaths {
    pub fn new(dir: &Path, stem: &str) -> Self {
        Self {
            binary: dir.join(format!("{stem}.bin")),
            charset: dir.join(format!("{stem}.cst")),
            unsupported: dir.join(format!("{stem}_unsupported.txt")),
        }
    }
}

/// Files written so far, removed on drop unless committed.
#[derive(Debug, Default)]
struct PendingArtifacts {
    paths: Vec<PathBuf>,
}

impl PendingArtifacts {
    fn write(&mut self, path: &Path, contents: &[u8]) -> Result<(), Error> {
        // register first so a partially written file is cleaned up too
        self.paths.push(path.to_owned());
        std::fs::write(path, contents).map_err(|e| Error::io(path, e))
    }

    fn commit(mut self) {
        self.paths.clear();
    }
}

impl Drop for PendingArtifacts {
    fn drop(&mut self) {
        for path in self.paths.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => log::debug!("removed partial output {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => (),
                Err(e) => log::warn!("failed to remove {}: {e}", path.display()),
            }
        }
    }
}

/// Write the binary font and its sidecar files into `dir`.
pub fn write_font(font: &GeneratedFont, dir: &Path) -> Result<OutputPaths, Error> {
    std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    let paths = OutputPaths::new(dir, &font.stem);
    let mut pending = PendingArtifacts::default();
    pending.write(&paths.binary, &font.binary)?;
    pending.write(&paths.charset, &font.charset_bytes())?;
    match font.unsupported_report() {
        Some(report) => pending.write(&paths.unsupported, report.as_bytes())?,
        // a report left over from an earlier run would be stale
        None => {
            if paths.unsupported.exists() {
                std::fs::remove_file(&paths.unsupported)
                    .map_err(|e| Error::io(&paths.unsupported, e))?;
            }
        }
    }
    pending.commit();
    log::info!("wrote {}", paths.binary.display());
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RenderFailure;
    use pretty_assertions::assert_eq;

    fn font(failures: Vec<(u32, RenderFailure)>) -> GeneratedFont {
        GeneratedFont {
            stem: "Test_size16_bits4".into(),
            binary: vec![1, 2, 3],
            charset: vec![0x41, 0x42],
            failures,
        }
    }

    #[test]
    fn writes_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");
        let paths = write_font(&font(vec![(0x42, RenderFailure::MissingGlyph)]), &out).unwrap();
        assert_eq!(paths.binary, out.join("Test_size16_bits4.bin"));
        assert_eq!(std::fs::read(&paths.binary).unwrap(), vec![1, 2, 3]);
        assert_eq!(std::fs::read(&paths.charset).unwrap(), vec![0x41, 0, 0x42, 0]);
        assert_eq!(
            std::fs::read_to_string(&paths.unsupported).unwrap(),
            "U+0042 (B)\n"
        );
    }

    #[test]
    fn report_only_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::new(dir.path(), "Test_size16_bits4");
        std::fs::write(&paths.unsupported, "old").unwrap();
        write_font(&font(vec![]), dir.path()).unwrap();
        assert!(paths.binary.exists());
        assert!(!paths.unsupported.exists());
    }

    #[test]
    fn failed_write_removes_earlier_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = OutputPaths::new(dir.path(), "Test_size16_bits4");
        // a directory in place of the charset file makes its write fail
        std::fs::create_dir(&paths.charset).unwrap();
        let err = write_font(&font(vec![]), dir.path()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(!paths.binary.exists());
        assert!(paths.charset.is_dir());
    }
}
