// `Face` implementation grounded on difs-fetcher's own `testing::ScriptedFace`
// (same discovery-vs-numbered dispatch), backed by real disk I/O instead of
// an in-memory map so the producer and consumer binaries can run as two
// separate processes.
//! A [`Face`] backed by a directory of published segments.

use crate::store::{parse_segment_file_name, segment_path};
use async_trait::async_trait;
use difs_fetcher::face::{Face, FaceEvent, Interest};
use difs_types::Data;
use std::path::PathBuf;

/// Reads segments published by `difs-producer` from `dir`. Discovery
/// interests (`can_be_prefix = true`) resolve to the lowest segment number
/// present in the directory; numbered interests resolve to that exact
/// file. A missing segment, or one that fails to decode, is reported as a
/// timeout rather than a nack — this substrate has no notion of routing
/// failure distinct from "nothing there yet".
pub struct DirectoryFace {
    dir: PathBuf,
}

impl DirectoryFace {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn lowest_segment(&self) -> Option<u64> {
        std::fs::read_dir(&self.dir)
            .ok()?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter_map(|name| parse_segment_file_name(&name))
            .min()
    }
}

#[async_trait]
impl Face for DirectoryFace {
    async fn express(&self, interest: Interest) -> FaceEvent {
        let target = if interest.can_be_prefix {
            match self.lowest_segment() {
                Some(n) => n,
                None => return FaceEvent::Timeout,
            }
        } else {
            match interest.name.last_segment() {
                Ok(n) => n,
                Err(_) => return FaceEvent::Timeout,
            }
        };

        match tokio::fs::read(segment_path(&self.dir, target)).await {
            Ok(bytes) => match Data::decode(&bytes) {
                Ok((data, _)) => FaceEvent::Data(data),
                Err(_) => FaceEvent::Timeout,
            },
            Err(_) => FaceEvent::Timeout,
        }
    }
}
