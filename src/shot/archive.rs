use std::path::{Path, PathBuf};

use crate::ibw::IBW_EXTENSION;

/// Calibration file stored in every shot folder
pub const DAS_CONF_FILE: &str = "DAS.conf";

/// Layout of the Pegasus data archive.
///
/// Shots live three levels deep: `<root>/<SS>0000/<SS'>00/T<SSSSSS>`, where
/// `SSSSSS` is the zero-padded shot number, `SS` its first two digits and `SS'`
/// the next two. Shot 109756 lives in `<root>/100000/9700/T109756`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShotArchive {
    root: PathBuf,
}

impl Default for ShotArchive {
    fn default() -> Self {
        Self::new(Self::default_root())
    }
}

impl ShotArchive {
    /// Archive rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Mount point of the archive share on this platform
    pub fn default_root() -> PathBuf {
        if cfg!(target_os = "macos") {
            Path::new("/Volumes").join("Pegasus_Data_Archive").join("p3data")
        } else if cfg!(windows) {
            Path::new("P:\\").join("p3data")
        } else {
            Path::new("/mnt").join("Pegasus_Data_Archive").join("p3data")
        }
    }

    /// Archive root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder name of a shot, e.g. `T109756`
    pub fn folder_name(shot: u32) -> String {
        format!("T{:06}", shot)
    }

    /// Full folder path of a shot
    pub fn shot_folder(&self, shot: u32) -> PathBuf {
        let digits = format!("{:06}", shot);
        let upper = format!("{}0000", &digits[..2]);
        let middle = format!("{}00", &digits[2..4]);
        self.root
            .join(upper)
            .join(middle)
            .join(Self::folder_name(shot))
    }

    /// Path of one channel's wave file
    pub fn channel_path(&self, shot: u32, channel: &str) -> PathBuf {
        channel_file(&self.shot_folder(shot), channel)
    }

    /// Path of a shot's DAS.conf
    pub fn das_conf_path(&self, shot: u32) -> PathBuf {
        self.shot_folder(shot).join(DAS_CONF_FILE)
    }
}

/// Path of a channel's wave file inside a shot folder
pub fn channel_file(folder: &Path, channel: &str) -> PathBuf {
    folder.join(format!("{}.{}", channel, IBW_EXTENSION))
}
