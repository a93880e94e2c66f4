use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A local media file to be transcribed.
///
/// The asset is staged in object storage under a key equal to its file
/// name, and its declared duration becomes the billable quantity on the
/// submitted job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAsset {
    pub folder: PathBuf,
    pub file_name: String,
    pub duration_secs: u32,
}

impl MediaAsset {
    pub fn new(folder: impl Into<PathBuf>, file_name: impl Into<String>, duration_secs: u32) -> Self {
        Self {
            folder: folder.into(),
            file_name: file_name.into(),
            duration_secs,
        }
    }

    /// Path of the file on the local filesystem.
    pub fn local_path(&self) -> PathBuf {
        self.folder.join(&self.file_name)
    }

    /// Key under which the asset is staged in object storage.
    pub fn storage_key(&self) -> &str {
        &self.file_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_is_file_name() {
        let asset = MediaAsset::new("/media/incoming", "video.mp4", 30);
        assert_eq!(asset.storage_key(), "video.mp4");
        assert_eq!(asset.local_path(), PathBuf::from("/media/incoming/video.mp4"));
    }
}
