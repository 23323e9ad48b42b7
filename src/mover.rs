/// Single-file move primitive.
///
/// A move is a byte copy into the destination followed by removal of the
/// source. It is not an atomic rename: a failure between the two steps can
/// leave both files in place (see [`MoveError::SourceRemove`]). The rename fast
/// path is only taken when a caller asks for [`MoveStrategy::RenameFirst`].
use serde::Serialize;
use std::fs::{self, File, Metadata, OpenOptions, Permissions};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[cfg(unix)]
use std::os::unix::fs::{MetadataExt, OpenOptionsExt, PermissionsExt};

/// Permission-only bits kept when copying a file mode.
#[cfg(unix)]
const PERMISSION_MASK: u32 = 0o777;

/// Errors that can occur while moving a single file.
#[derive(Debug, Error)]
pub enum MoveError {
    /// The source file could not be opened or inspected.
    #[error("could not open source file {}: {source}", path.display())]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The destination file could not be created for writing.
    #[error("could not create destination file {}: {source}", path.display())]
    DestinationCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Copying failed part-way. The destination has been removed and the
    /// source is untouched.
    #[error(
        "could not copy file contents from {} to {}: {source}",
        source_path.display(),
        destination.display()
    )]
    Copy {
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The copy completed but the source could not be removed. Both files
    /// now exist.
    #[error("could not remove source file {}: {source}", path.display())]
    SourceRemove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Source and destination name the same file. Nothing was touched.
    #[error("source and destination are the same file: {}", path.display())]
    SameFile { path: PathBuf },
}

/// Stable classification of a [`MoveError`], used in batch reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveErrorKind {
    SourceOpen,
    DestinationCreate,
    Copy,
    SourceRemove,
    SameFile,
}

impl MoveError {
    pub fn kind(&self) -> MoveErrorKind {
        match self {
            Self::SourceOpen { .. } => MoveErrorKind::SourceOpen,
            Self::DestinationCreate { .. } => MoveErrorKind::DestinationCreate,
            Self::Copy { .. } => MoveErrorKind::Copy,
            Self::SourceRemove { .. } => MoveErrorKind::SourceRemove,
            Self::SameFile { .. } => MoveErrorKind::SameFile,
        }
    }
}

/// Result type for file move operations.
pub type MoveResult<T> = Result<T, MoveError>;

/// How a file should be moved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MoveStrategy {
    /// Always copy the bytes and then delete the source.
    #[default]
    CopyDelete,
    /// Try an atomic rename first and fall back to copy-then-delete when the
    /// rename fails (for example across filesystems).
    RenameFirst,
}

/// The path a successful move actually took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveMethod {
    Copied,
    Renamed,
}

/// Moves `source` to `destination` by copying the bytes and then removing the
/// source.
///
/// The destination is created or truncated and receives the source's
/// permission bits (file type and special bits stripped). The source is only
/// removed once every byte has been copied.
///
/// # Errors
///
/// See [`MoveError`] for the state each failure leaves behind.
///
/// # Examples
///
/// ```no_run
/// use regmove::mover::move_file;
/// use std::path::Path;
///
/// match move_file(Path::new("/tmp/in/photo.jpg"), Path::new("/tmp/out/photo.jpg")) {
///     Ok(()) => println!("moved"),
///     Err(e) => eprintln!("move failed: {}", e),
/// }
/// ```
pub fn move_file(source: &Path, destination: &Path) -> MoveResult<()> {
    let source_file = File::open(source).map_err(|e| MoveError::SourceOpen {
        path: source.to_path_buf(),
        source: e,
    })?;

    let metadata = source_file.metadata().map_err(|e| MoveError::SourceOpen {
        path: source.to_path_buf(),
        source: e,
    })?;
    // Truncating the destination would empty the source if they are one file.
    if is_same_file(source, &metadata, destination) {
        return Err(MoveError::SameFile {
            path: source.to_path_buf(),
        });
    }
    let permissions = permission_bits(metadata.permissions());

    let destination_file = create_destination(destination, &permissions).map_err(|e| {
        MoveError::DestinationCreate {
            path: destination.to_path_buf(),
            source: e,
        }
    })?;

    if let Err(e) = copy_contents(source_file, destination_file, permissions) {
        // The destination handle is already closed here.
        if let Err(cleanup) = fs::remove_file(destination) {
            warn!(
                destination = %destination.display(),
                error = %cleanup,
                "could not remove partial destination file"
            );
        }
        return Err(MoveError::Copy {
            source_path: source.to_path_buf(),
            destination: destination.to_path_buf(),
            source: e,
        });
    }

    fs::remove_file(source).map_err(|e| {
        warn!(
            source = %source.display(),
            destination = %destination.display(),
            "file copied but source could not be removed; both copies exist"
        );
        MoveError::SourceRemove {
            path: source.to_path_buf(),
            source: e,
        }
    })?;

    debug!(
        source = %source.display(),
        destination = %destination.display(),
        "copied and removed source"
    );
    Ok(())
}

/// Moves a file using the given strategy and reports which method was used.
///
/// With [`MoveStrategy::RenameFirst`] an atomic rename is attempted first. Any
/// rename failure falls back to [`move_file`], so the errors returned are the
/// same as for a plain copy-then-delete move.
///
/// # Errors
///
/// Returns the [`MoveError`] of the copy-then-delete path.
pub fn move_file_with(
    source: &Path,
    destination: &Path,
    strategy: MoveStrategy,
) -> MoveResult<MoveMethod> {
    if strategy == MoveStrategy::RenameFirst {
        // rename(p, p) succeeds without moving anything.
        if let Ok(metadata) = fs::metadata(source)
            && is_same_file(source, &metadata, destination)
        {
            return Err(MoveError::SameFile {
                path: source.to_path_buf(),
            });
        }
        match fs::rename(source, destination) {
            Ok(()) => {
                debug!(
                    source = %source.display(),
                    destination = %destination.display(),
                    "renamed"
                );
                return Ok(MoveMethod::Renamed);
            }
            Err(e) => {
                debug!(
                    source = %source.display(),
                    error = %e,
                    "rename failed, falling back to copy"
                );
            }
        }
    }

    move_file(source, destination).map(|()| MoveMethod::Copied)
}

/// Copies every byte and applies the source permissions. Both handles are
/// dropped before this returns, on success and on failure.
fn copy_contents(
    mut source_file: File,
    mut destination_file: File,
    permissions: Permissions,
) -> io::Result<()> {
    io::copy(&mut source_file, &mut destination_file)?;
    // Applied explicitly so the process umask cannot narrow the mode.
    destination_file.set_permissions(permissions)?;
    Ok(())
}

/// True when `destination` exists and is the file described by
/// `source_metadata` (same path, hard link, or symlink to it).
#[cfg(unix)]
fn is_same_file(_source: &Path, source_metadata: &Metadata, destination: &Path) -> bool {
    fs::metadata(destination)
        .map(|d| d.dev() == source_metadata.dev() && d.ino() == source_metadata.ino())
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_same_file(source: &Path, _source_metadata: &Metadata, destination: &Path) -> bool {
    match (fs::canonicalize(source), fs::canonicalize(destination)) {
        (Ok(s), Ok(d)) => s == d,
        _ => false,
    }
}

#[cfg(unix)]
fn permission_bits(permissions: Permissions) -> Permissions {
    Permissions::from_mode(permissions.mode() & PERMISSION_MASK)
}

#[cfg(not(unix))]
fn permission_bits(permissions: Permissions) -> Permissions {
    permissions
}

#[cfg(unix)]
fn create_destination(path: &Path, permissions: &Permissions) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(permissions.mode())
        .open(path)
}

#[cfg(not(unix))]
fn create_destination(path: &Path, _permissions: &Permissions) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
