//! Creation and modification timestamps for tree items.
//!
//! Ordering falls back to "oldest first" whenever no explicit sort weight is
//! set, so every item needs an idea of when it was created. Two sources exist:
//!
//! - **Local**: filesystem creation/modification time. Always available, but
//!   reset by every fresh clone or checkout.
//! - **History**: first and last commit time from version control. Stable
//!   across clones, but costs one subprocess per file.
//!
//! ## Resolution
//!
//! [`TimestampResolver::lookup`] resolves one path:
//!
//! 1. Stat the path. If the cache holds an entry whose stored modification
//!    time equals the current one, return it unchanged (no history query).
//! 2. Folders stop at the local pair. Their history pair is filled in later
//!    from their descendants (see [`crate::tree::aggregate_timestamps`]).
//! 3. Files query history. A failing, timed-out, or empty query all mean
//!    "no history", and the local pair stands in wherever a creation or
//!    modification time is needed.
//!
//! Both collaborators are traits so the core runs without a real filesystem
//! clock or a `git` binary.

use crate::cache::{CacheEntry, CacheManifest, CacheStats};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;

/// Default upper bound on a single history query.
pub const HISTORY_TIMEOUT: Duration = Duration::from_secs(10);

/// Timestamps resolved for one item, in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    pub local_created: i64,
    pub local_modified: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_history: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_history: Option<i64>,
}

impl Timestamps {
    /// History creation time if known, else local creation time.
    pub fn earliest(&self) -> i64 {
        self.first_history.unwrap_or(self.local_created)
    }

    /// History modification time if known, else local modification time.
    pub fn latest(&self) -> i64 {
        self.last_history.unwrap_or(self.local_modified)
    }
}

/// Local filesystem timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTimes {
    pub created: i64,
    pub modified: i64,
}

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Failed to run history command: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("History command exited with {0}")]
    Status(std::process::ExitStatus),
    #[error("History command timed out after {0:?}")]
    Timeout(Duration),
    #[error("Unparseable history line: {0}")]
    Parse(String),
}

/// Reads local timestamps for a path.
pub trait FileTimes: Sync {
    fn stat(&self, path: &Path) -> std::io::Result<LocalTimes>;
}

/// Reads version-control commit times (ms since epoch) for a file.
///
/// An empty list means the file has no history.
pub trait HistoryLog: Sync {
    fn history(&self, path: &Path) -> Result<Vec<i64>, HistoryError>;
}

/// [`FileTimes`] backed by `std::fs::metadata`.
///
/// Filesystems without a birth time report the modification time as the
/// creation time.
pub struct FsTimes;

impl FileTimes for FsTimes {
    fn stat(&self, path: &Path) -> std::io::Result<LocalTimes> {
        let meta = std::fs::metadata(path)?;
        let modified = meta.modified()?;
        let created = meta.created().unwrap_or(modified);
        Ok(LocalTimes {
            created: to_millis(created),
            modified: to_millis(modified),
        })
    }
}

fn to_millis(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_millis() as i64,
        Err(e) => -(e.duration().as_millis() as i64),
    }
}

/// [`HistoryLog`] that shells out to `git log`.
pub struct GitLog {
    timeout: Duration,
}

impl GitLog {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for GitLog {
    fn default() -> Self {
        Self::new(HISTORY_TIMEOUT)
    }
}

impl HistoryLog for GitLog {
    fn history(&self, path: &Path) -> Result<Vec<i64>, HistoryError> {
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        let file = path.file_name().map(Path::new).unwrap_or(path);

        let mut command = Command::new("git");
        command
            .args(["log", "--follow", "--format=%at", "--"])
            .arg(file)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        if let Some(dir) = dir {
            command.current_dir(dir);
        }
        let mut child = command.spawn()?;

        // Drain stdout on a separate thread so a chatty child can't block on a
        // full pipe while we wait on the deadline.
        let mut stdout = child.stdout.take().ok_or_else(|| {
            HistoryError::Spawn(std::io::Error::other("child stdout not captured"))
        })?;
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let mut out = String::new();
            let result = stdout.read_to_string(&mut out).map(|_| out);
            let _ = tx.send(result);
        });

        let output = match rx.recv_timeout(self.timeout) {
            Ok(result) => result?,
            Err(_) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(HistoryError::Timeout(self.timeout));
            }
        };
        let status = child.wait()?;
        if !status.success() {
            return Err(HistoryError::Status(status));
        }
        parse_history(&output)
    }
}

/// Parse `git log --format=%at` output (one Unix second count per line).
pub fn parse_history(output: &str) -> Result<Vec<i64>, HistoryError> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.parse::<i64>()
                .map(|secs| secs * 1000)
                .map_err(|_| HistoryError::Parse(line.to_string()))
        })
        .collect()
}

/// Resolves [`Timestamps`] through cache, history, and local stat.
pub struct TimestampResolver<'a> {
    times: &'a dyn FileTimes,
    history: &'a dyn HistoryLog,
}

/// A resolved lookup and whether it should be written back to the cache.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lookup {
    pub timestamps: Timestamps,
    pub fresh: bool,
}

impl Lookup {
    /// Count this lookup in `stats` and write fresh results to `cache`.
    pub fn record(&self, cache: &mut CacheManifest, stats: &mut CacheStats, path: &Path) {
        if self.fresh {
            stats.miss();
            cache.insert(path, CacheEntry::new(self.timestamps));
        } else {
            stats.hit();
        }
    }
}

impl<'a> TimestampResolver<'a> {
    pub fn new(times: &'a dyn FileTimes, history: &'a dyn HistoryLog) -> Self {
        Self { times, history }
    }

    /// Resolve timestamps for `path` without mutating the cache.
    ///
    /// Only the local stat can fail; history problems degrade to no history.
    pub fn lookup(
        &self,
        cache: &CacheManifest,
        path: &Path,
        is_folder: bool,
    ) -> std::io::Result<Lookup> {
        let local = self.times.stat(path)?;

        if let Some(cached) = cache.find_cached(path, local.modified) {
            debug!(path = %path.display(), "timestamp cache hit");
            return Ok(Lookup {
                timestamps: *cached,
                fresh: false,
            });
        }

        let mut timestamps = Timestamps {
            local_created: local.created,
            local_modified: local.modified,
            first_history: None,
            last_history: None,
        };

        if !is_folder {
            match self.history.history(path) {
                Ok(commits) => {
                    timestamps.first_history = commits.iter().copied().min();
                    timestamps.last_history = commits.iter().copied().max();
                }
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "no history, using local times");
                }
            }
        }

        Ok(Lookup {
            timestamps,
            fresh: true,
        })
    }

}
