// There is no NDN forwarder in this workspace to resolve a name to a
// reachable producer, so the reference CLIs share a segment store on disk
// instead: `difs-producer` publishes into it, `difs-consumer` fetches from
// it through `DirectoryFace`. See DESIGN.md for the full rationale.
//! Local segment store shared by the reference producer and consumer
//! binaries.

use difs_types::Name;
use std::path::{Path, PathBuf};

/// Overrides the store's root directory; defaults to `.difs-store` in the
/// current working directory.
pub const STORE_DIR_ENV: &str = "DIFS_STORE_DIR";
const DEFAULT_STORE_DIR: &str = ".difs-store";

/// Maps a name to its directory under the store, one path component per
/// name component.
pub fn store_dir_for(name: &Name) -> PathBuf {
    let root = std::env::var(STORE_DIR_ENV).unwrap_or_else(|_| DEFAULT_STORE_DIR.to_string());
    let mut dir = PathBuf::from(root);
    for component in name.components() {
        dir.push(sanitize_component(&component.to_string()));
    }
    dir
}

fn sanitize_component(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '=' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Where the producer's chain-head verifying key is published, for
/// consumers running with `-h`.
pub fn pubkey_path(dir: &Path) -> PathBuf {
    dir.join("pubkey.bin")
}

/// Where segment `segment_no`'s encoded `Data` is stored. Zero-padded so a
/// directory listing sorts in segment order.
pub fn segment_path(dir: &Path, segment_no: u64) -> PathBuf {
    dir.join(format!("seg-{segment_no:020}.bin"))
}

/// Parses a segment number back out of a path produced by
/// [`segment_path`], for `DirectoryFace`'s discovery-interest handling.
pub fn parse_segment_file_name(file_name: &str) -> Option<u64> {
    file_name
        .strip_prefix("seg-")?
        .strip_suffix(".bin")?
        .parse()
        .ok()
}
