//! Directory preparation
//!
//! Everything that happens before any compression work is dispatched:
//! - Source directory validation (exists, is a directory, readable)
//! - Destination directory creation and writability probing
//! - A single non-recursive scan splitting entries into regular files
//!   and subdirectory names
//! - Writing the subdirectory manifest into the destination

use crate::error::{PrepareError, PrepareResult};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the subdirectory manifest written into the destination
pub const MANIFEST_NAME: &str = "directoris.txt";

/// Result of scanning the source directory once
#[derive(Debug, Default)]
pub struct DirScan {
    /// Regular files directly under the source, in listing order
    pub files: Vec<PathBuf>,

    /// Names of immediate subdirectories, in listing order
    pub subdirs: Vec<String>,
}

/// Validate that the source directory exists, is a directory and is readable
pub fn check_source(path: &Path) -> PrepareResult<()> {
    let meta = fs::metadata(path).map_err(|e| classify_access_error(e, path))?;

    if !meta.is_dir() {
        return Err(PrepareError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    // Readability is proven by opening the directory for listing
    fs::read_dir(path).map_err(|e| classify_access_error(e, path))?;

    debug!(path = %path.display(), "Source directory verified");
    Ok(())
}

/// Create the destination directory if absent and verify it is writable
pub fn prepare_dest(path: &Path) -> PrepareResult<()> {
    match fs::metadata(path) {
        Ok(meta) if !meta.is_dir() => {
            return Err(PrepareError::NotADirectory {
                path: path.to_path_buf(),
            });
        }
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {
            fs::create_dir_all(path).map_err(|e| PrepareError::CreateFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            debug!(path = %path.display(), "Created destination directory");
        }
        Err(e) => {
            return Err(classify_access_error(e, path));
        }
    }

    ensure_writable(path)
}

/// Verify write access by creating and removing a probe file
///
/// Permission bits alone cannot answer this portably (ACLs, read-only
/// mounts), so the check performs an actual write.
pub fn ensure_writable(dir: &Path) -> PrepareResult<()> {
    let probe = dir.join(format!(".gzdir-probe-{}", std::process::id()));

    match OpenOptions::new().write(true).create_new(true).open(&probe) {
        Ok(file) => {
            drop(file);
            if let Err(e) = fs::remove_file(&probe) {
                warn!(path = %probe.display(), error = %e, "Failed to remove probe file");
            }
            Ok(())
        }
        Err(_) => Err(PrepareError::NotWritable {
            path: dir.to_path_buf(),
        }),
    }
}

/// Scan the source directory once, non-recursively
///
/// Regular files go into `files`; immediate subdirectory names into
/// `subdirs`. Classification follows symlinks, so a link to a regular
/// file is compressed like any other file. Entries whose metadata cannot
/// be resolved (dangling links, races with concurrent deletion) are
/// skipped with a warning.
pub fn scan(source: &Path) -> PrepareResult<DirScan> {
    let entries = fs::read_dir(source).map_err(|e| classify_access_error(e, source))?;

    let mut scan = DirScan::default();

    for entry in entries {
        let entry = entry.map_err(|e| PrepareError::ScanFailed {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;

        let path = entry.path();
        let meta = match fs::metadata(&path) {
            Ok(meta) => meta,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        if meta.is_file() {
            scan.files.push(path);
        } else if meta.is_dir() {
            scan.subdirs
                .push(entry.file_name().to_string_lossy().into_owned());
        } else {
            // Sockets, fifos, device nodes
            debug!(path = %path.display(), "Skipping special file");
        }
    }

    debug!(
        files = scan.files.len(),
        subdirs = scan.subdirs.len(),
        "Source directory scanned"
    );

    Ok(scan)
}

/// Write the subdirectory manifest into the destination directory
///
/// One name per line in listing order, newline-terminated, no header.
/// Returns the path of the written manifest.
pub fn write_manifest(subdirs: &[String], dest: &Path) -> PrepareResult<PathBuf> {
    let path = dest.join(MANIFEST_NAME);

    let write = |path: &Path| -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        for name in subdirs {
            writeln!(out, "{}", name)?;
        }
        out.flush()
    };

    write(&path).map_err(|e| PrepareError::ManifestWrite {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(path)
}

/// Map an I/O error from a directory access to a preparation error
fn classify_access_error(err: io::Error, path: &Path) -> PrepareError {
    match err.kind() {
        ErrorKind::NotFound => PrepareError::NotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::PermissionDenied => PrepareError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => PrepareError::ScanFailed {
            path: path.to_path_buf(),
            reason: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_check_source_missing() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = check_source(&missing).unwrap_err();
        assert!(matches!(err, PrepareError::NotFound { .. }));
    }

    #[test]
    fn test_check_source_not_a_directory() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, b"x").unwrap();
        let err = check_source(&file).unwrap_err();
        assert!(matches!(err, PrepareError::NotADirectory { .. }));
    }

    #[test]
    fn test_prepare_dest_creates_missing() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("out").join("nested");
        prepare_dest(&dest).unwrap();
        assert!(dest.is_dir());
    }

    #[test]
    fn test_scan_splits_files_and_subdirs() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("x.txt"), b"x").unwrap();
        fs::write(dir.path().join("y.txt"), b"y").unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();

        let scan = scan(dir.path()).unwrap();
        assert_eq!(scan.files.len(), 2);

        let mut subdirs = scan.subdirs.clone();
        subdirs.sort();
        assert_eq!(subdirs, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_write_manifest_contents() {
        let dir = tempdir().unwrap();
        let subdirs = vec!["a".to_string(), "b".to_string()];
        let path = write_manifest(&subdirs, dir.path()).unwrap();

        assert_eq!(path.file_name().unwrap(), MANIFEST_NAME);
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "a\nb\n");
    }

    #[test]
    fn test_write_manifest_empty() {
        let dir = tempdir().unwrap();
        let path = write_manifest(&[], dir.path()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
