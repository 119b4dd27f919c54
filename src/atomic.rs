//! Temp files for write-then-rename output.
//!
//! `tempfile` creates files owner-only (0600) and `persist` keeps that mode.
//! Catalog and page images are served by a separate static server, so the
//! temp file is created with the same mode a plain `std::fs::write` would
//! give (0666 minus the process umask).

use std::io;
use std::path::Path;
use tempfile::NamedTempFile;

/// Create a temp file in `dir`, to be persisted over a published output.
pub(crate) fn output_temp_file(dir: &Path) -> io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".lookbook-");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }

    builder.tempfile_in(dir)
}

#[cfg(all(test, unix))]
pub(crate) mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Permission bits of `path`.
    pub(crate) fn mode(path: &Path) -> u32 {
        std::fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    /// Mode a plain `std::fs::write` produces in `dir` under the current umask.
    pub(crate) fn plain_write_mode(dir: &Path) -> u32 {
        let sample = dir.join("plain-write.txt");
        std::fs::write(&sample, b"x").unwrap();
        let m = mode(&sample);
        std::fs::remove_file(&sample).unwrap();
        m
    }

    #[test]
    fn persisted_file_has_normal_write_mode() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.json");

        let tmp = output_temp_file(dir.path()).unwrap();
        tmp.persist(&target).unwrap();

        assert_eq!(mode(&target), plain_write_mode(dir.path()));
    }
}
