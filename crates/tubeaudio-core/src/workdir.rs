//! Per-request scratch directory.
//!
//! A [`WorkDir`] owns exactly one freshly created directory. It is removed
//! either explicitly through [`WorkDir::close`] or when the guard is
//! dropped, so every exit path of a request (success, tool failure, error,
//! client hang-up mid-stream) releases it.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{error, info};

use crate::video_id::VideoId;
use crate::fetcher::AUDIO_FORMAT;

const DIR_PREFIX: &str = "tubeaudio-";
const SHM_ROOT: &str = "/dev/shm";

/// Memory-backed `/dev/shm` when available, the platform temp dir otherwise.
pub fn default_temp_root() -> PathBuf {
    let shm = Path::new(SHM_ROOT);
    if shm.is_dir() {
        shm.to_path_buf()
    } else {
        std::env::temp_dir()
    }
}

#[derive(Debug)]
pub struct WorkDir {
    // `None` once closed explicitly.
    dir: Option<TempDir>,
    path: PathBuf,
}

impl WorkDir {
    /// Create a uniquely named directory under `root`.
    pub fn create_in(root: impl AsRef<Path>) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(DIR_PREFIX)
            .tempdir_in(root)?;
        let path = dir.path().to_path_buf();
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where the download tool must place the transcoded file for `id`.
    pub fn output_path(&self, id: &VideoId) -> PathBuf {
        self.path.join(id.file_name(AUDIO_FORMAT))
    }

    /// Remove the directory now and report the outcome.
    pub fn close(mut self) -> io::Result<()> {
        match self.dir.take() {
            Some(dir) => dir.close(),
            None => Ok(()),
        }
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        match dir.close() {
            Ok(()) => info!(path = %self.path.display(), "cleaned up work dir"),
            Err(e) => error!(path = %self.path.display(), error = %e, "failed to clean up work dir"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tracing_test::traced_test;

    fn id() -> VideoId {
        VideoId::extract("dQw4w9WgXcQ").unwrap()
    }

    #[test]
    fn directory_exists_while_guard_lives() {
        let root = tempfile::tempdir().unwrap();
        let work = WorkDir::create_in(root.path()).unwrap();
        assert!(work.path().is_dir());
        assert!(work.path().starts_with(root.path()));
        assert_eq!(
            work.output_path(&id()),
            work.path().join("dQw4w9WgXcQ.mp3")
        );
    }

    #[test]
    #[traced_test]
    fn drop_removes_directory_and_contents() {
        let root = tempfile::tempdir().unwrap();
        let work = WorkDir::create_in(root.path()).unwrap();
        let path = work.path().to_path_buf();
        std::fs::write(work.output_path(&id()), b"ID3").unwrap();

        drop(work);
        assert!(!path.exists());
        assert!(logs_contain("cleaned up work dir"));
    }

    #[test]
    #[traced_test]
    fn failed_cleanup_is_logged_not_panicked() {
        let root = tempfile::tempdir().unwrap();
        let work = WorkDir::create_in(root.path()).unwrap();
        std::fs::remove_dir_all(work.path()).unwrap();

        drop(work);
        assert!(logs_contain("failed to clean up work dir"));
    }

    #[test]
    fn close_removes_directory() {
        let root = tempfile::tempdir().unwrap();
        let work = WorkDir::create_in(root.path()).unwrap();
        let path = work.path().to_path_buf();
        work.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn directories_never_collide() {
        let root = tempfile::tempdir().unwrap();
        let dirs: Vec<WorkDir> = (0..32)
            .map(|_| WorkDir::create_in(root.path()).unwrap())
            .collect();
        let unique: HashSet<&Path> = dirs.iter().map(WorkDir::path).collect();
        assert_eq!(unique.len(), dirs.len());
    }

    #[test]
    fn missing_root_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("does-not-exist");
        assert!(WorkDir::create_in(missing).is_err());
    }

    #[test]
    fn default_root_is_a_directory() {
        assert!(default_temp_root().is_dir());
    }
}
