use std::path::Path;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Deserialize;

use crate::ibw::{igor_time_to_utc, read_wave, ReaderError};

use super::archive::{channel_file, ShotArchive};
use super::channels::SignalGroup;
use super::record::Shot;
use super::trace::ChannelTrace;

/// What to do when a requested channel has no file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// Record the channel in [`Shot::missing`] and continue
    #[default]
    Skip,
    /// Fail the whole shot
    Fail,
}

/// Loads shots from the archive
#[derive(Debug, Clone, Default)]
pub struct ShotLoader {
    archive: ShotArchive,
    missing: MissingPolicy,
}

impl ShotLoader {
    /// Loader over the given archive, skipping missing channels
    pub fn new(archive: ShotArchive) -> Self {
        Self {
            archive,
            missing: MissingPolicy::default(),
        }
    }

    /// Set the missing-channel policy
    pub fn with_missing_policy(mut self, policy: MissingPolicy) -> Self {
        self.missing = policy;
        self
    }

    /// Archive layout
    pub fn archive(&self) -> &ShotArchive {
        &self.archive
    }

    /// Missing-channel policy
    pub fn missing_policy(&self) -> MissingPolicy {
        self.missing
    }

    /// Load the listed channels of a shot
    pub fn load<S: AsRef<str>>(&self, shot: u32, channels: &[S]) -> Result<Shot, ReaderError> {
        load_folder(&self.archive.shot_folder(shot), shot, channels, self.missing)
    }

    /// Load every channel of the given groups, each file once
    pub fn load_groups(&self, shot: u32, groups: &[SignalGroup]) -> Result<Shot, ReaderError> {
        let mut channels: Vec<&str> = Vec::new();
        for group in groups {
            for &channel in group.channels() {
                if !channels.contains(&channel) {
                    channels.push(channel);
                }
            }
        }
        self.load(shot, &channels)
    }

    /// Load every known diagnostic channel
    pub fn load_all(&self, shot: u32) -> Result<Shot, ReaderError> {
        self.load_groups(shot, &SignalGroup::ALL)
    }
}

/// Load channels from an explicit shot folder.
///
/// The acquisition time is the earliest creation time among the loaded waves.
pub fn load_folder<S: AsRef<str>>(
    folder: &Path,
    shot: u32,
    channels: &[S],
    policy: MissingPolicy,
) -> Result<Shot, ReaderError> {
    if !folder.is_dir() {
        return Err(ReaderError::Io {
            path: folder.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "shot folder not found"),
        });
    }
    info!("Loading shot {} from {}", shot, folder.display());

    let mut traces = Vec::with_capacity(channels.len());
    let mut missing = Vec::new();
    let mut acquired_at: Option<DateTime<Utc>> = None;

    for channel in channels {
        let channel = channel.as_ref();
        let path = channel_file(folder, channel);
        if !path.is_file() {
            match policy {
                MissingPolicy::Skip => {
                    warn!("Shot {}: {} not loaded - file not found", shot, channel);
                    missing.push(channel.to_string());
                    continue;
                }
                MissingPolicy::Fail => {
                    return Err(ReaderError::MissingChannel {
                        channel: channel.to_string(),
                        folder: folder.to_path_buf(),
                    });
                }
            }
        }

        let wave = read_wave(&path)?;
        let created = igor_time_to_utc(wave.header.creation_date);
        acquired_at = Some(acquired_at.map_or(created, |t| t.min(created)));

        let trace = ChannelTrace::from_wave(channel, wave, Some(&path)).map_err(|source| {
            ReaderError::InvalidTrace {
                channel: channel.to_string(),
                source,
            }
        })?;
        debug!("Shot {}: {} loaded ({} samples)", shot, channel, trace.len());
        traces.push(trace);
    }

    info!(
        "Shot {}: {} channels loaded, {} missing",
        shot,
        traces.len(),
        missing.len()
    );

    let acquired_at = acquired_at.unwrap_or_else(|| igor_time_to_utc(0));
    Ok(Shot::new(shot, acquired_at, traces)?
        .with_missing(missing)
        .with_folder(folder))
}
