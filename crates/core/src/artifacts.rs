//! Per-request ownership of temporary files.
//!
//! Every file a request writes is registered here before it is created. The
//! set is swept exactly once, either explicitly or when it is dropped, so a
//! failing stage, an elapsed deadline or an aborted response body all leave
//! the disk clean.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::materializer::MediaTitle;
use crate::metrics::STAGE_DURATION;
use crate::pipeline::PipelineStage;

/// The temporary paths owned by one request.
#[derive(Debug)]
pub struct ArtifactSet {
    request_id: Uuid,
    scratch_dir: PathBuf,
    output_dir: PathBuf,
    files: Vec<PathBuf>,
    swept: bool,
}

impl ArtifactSet {
    /// Creates a set rooted in fresh per-request directories. Nothing touches
    /// the disk until [`ArtifactSet::prepare`].
    pub fn new(storage: &StorageConfig) -> Self {
        Self::with_id(storage, Uuid::new_v4())
    }

    pub fn with_id(storage: &StorageConfig, request_id: Uuid) -> Self {
        let name = request_id.to_string();
        Self {
            request_id,
            scratch_dir: storage.temp_dir.join(&name),
            output_dir: storage.downloads_dir.join(&name),
            files: Vec::new(),
            swept: false,
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Directory holding the video/audio intermediates.
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Directory holding the muxed output.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Creates both per-request directories, including missing parents such
    /// as the shared downloads directory.
    pub async fn prepare(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.scratch_dir).await?;
        tokio::fs::create_dir_all(&self.output_dir).await?;
        Ok(())
    }

    /// Registers and returns the path for the video-only intermediate.
    pub fn video_path(&mut self, title: &MediaTitle) -> PathBuf {
        let path = self.scratch_dir.join(format!("{}_video.mp4", title));
        self.register(path.clone());
        path
    }

    /// Registers and returns the path for the audio-only intermediate.
    pub fn audio_path(&mut self, title: &MediaTitle) -> PathBuf {
        let path = self.scratch_dir.join(format!("{}_audio.mp4", title));
        self.register(path.clone());
        path
    }

    /// Registers and returns the path for the muxed output.
    pub fn output_path(&mut self, title: &MediaTitle) -> PathBuf {
        let path = self.output_dir.join(format!("{}.mp4", title));
        self.register(path.clone());
        path
    }

    pub fn register(&mut self, path: PathBuf) {
        if !self.files.contains(&path) {
            self.files.push(path);
        }
    }

    /// Every file path registered so far.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn is_swept(&self) -> bool {
        self.swept
    }

    /// Removes every registered file and then both per-request directories.
    /// Each removal is independent and best-effort; missing paths are fine.
    pub fn sweep(&mut self) {
        if self.swept {
            return;
        }
        self.swept = true;
        let started = Instant::now();

        for file in &self.files {
            remove_quietly(file, std::fs::remove_file(file));
        }
        for dir in [&self.scratch_dir, &self.output_dir] {
            remove_quietly(dir, std::fs::remove_dir_all(dir));
        }

        STAGE_DURATION
            .with_label_values(&[PipelineStage::Cleanup.as_str(), "ok"])
            .observe(started.elapsed().as_secs_f64());
        debug!(request_id = %self.request_id, files = self.files.len(), "Swept request artifacts");
    }
}

impl Drop for ArtifactSet {
    fn drop(&mut self) {
        self.sweep();
    }
}

fn remove_quietly(path: &Path, result: io::Result<()>) {
    match result {
        Ok(()) => debug!(path = %path.display(), "Removed"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove artifact"),
    }
}

/// Best-effort async removal of one file, used where a stage frees disk early.
pub(crate) async fn remove_file_quietly(path: &Path) {
    remove_quietly(path, tokio::fs::remove_file(path).await);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage(root: &TempDir) -> StorageConfig {
        StorageConfig {
            temp_dir: root.path().join("tmp"),
            downloads_dir: root.path().join("downloads"),
        }
    }

    #[test]
    fn test_paths_are_scoped_to_request() {
        let root = TempDir::new().unwrap();
        let title = MediaTitle::new("Some Video", "dQw4w9WgXcQ");

        let mut a = ArtifactSet::new(&storage(&root));
        let mut b = ArtifactSet::new(&storage(&root));

        assert_ne!(a.request_id(), b.request_id());
        assert_ne!(a.video_path(&title), b.video_path(&title));
        assert_ne!(a.output_path(&title), b.output_path(&title));
    }

    #[test]
    fn test_path_names_follow_title() {
        let root = TempDir::new().unwrap();
        let title = MediaTitle::new("Clip", "dQw4w9WgXcQ");
        let mut set = ArtifactSet::new(&storage(&root));

        let video = set.video_path(&title);
        let audio = set.audio_path(&title);
        let output = set.output_path(&title);

        assert!(video.ends_with("Clip_video.mp4"));
        assert!(audio.ends_with("Clip_audio.mp4"));
        assert!(output.ends_with("Clip.mp4"));
        assert!(video.starts_with(set.scratch_dir()));
        assert!(output.starts_with(set.output_dir()));
        assert_eq!(set.files().len(), 3);
    }

    #[test]
    fn test_register_is_idempotent() {
        let root = TempDir::new().unwrap();
        let mut set = ArtifactSet::new(&storage(&root));
        set.register(root.path().join("a"));
        set.register(root.path().join("a"));
        assert_eq!(set.files().len(), 1);
    }

    #[tokio::test]
    async fn test_drop_removes_files_and_directories() {
        let root = TempDir::new().unwrap();
        let title = MediaTitle::new("Clip", "dQw4w9WgXcQ");
        let mut set = ArtifactSet::new(&storage(&root));
        set.prepare().await.unwrap();

        let video = set.video_path(&title);
        let output = set.output_path(&title);
        std::fs::write(&video, b"video").unwrap();
        std::fs::write(&output, b"output").unwrap();
        let scratch = set.scratch_dir().to_path_buf();
        let out_dir = set.output_dir().to_path_buf();

        drop(set);

        assert!(!video.exists());
        assert!(!output.exists());
        assert!(!scratch.exists());
        assert!(!out_dir.exists());
        // the shared downloads root stays
        assert!(root.path().join("downloads").exists());
    }

    #[test]
    fn test_sweep_tolerates_missing_paths() {
        let root = TempDir::new().unwrap();
        let title = MediaTitle::new("Clip", "dQw4w9WgXcQ");
        let mut set = ArtifactSet::new(&storage(&root));
        set.video_path(&title);

        set.sweep();
        assert!(set.is_swept());
        // second sweep is a no-op
        set.sweep();
    }
}
