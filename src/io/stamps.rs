//! Per-file ownership stamps.
//!
//! A worker claims an output file by creating `<path>.running` with
//! its hostname; successful completion renames it to `<path>.done`.
//! This is opportunistic ownership, not consensus: re-running any unit
//! is safe because outputs are written atomically, and a stale
//! `.running` without output can simply be reclaimed.
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use lazy_static::lazy_static;
use log::{info, warn};

use super::host;
use crate::error::Error;

/// Default freshness window for `.running` stamps.
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(24 * 3600);

lazy_static! {
    /// Stamps owned by this process, removed on interrupt.
    static ref ACTIVE: Mutex<Vec<PathBuf>> = Mutex::new(Vec::new());
}

fn stamp_path(output: &Path, suffix: &str) -> PathBuf {
    PathBuf::from(format!("{}.{}", output.display(), suffix))
}

fn register(path: &Path) {
    if let Ok(mut active) = ACTIVE.lock() {
        active.push(path.to_path_buf());
    }
}

fn unregister(path: &Path) {
    if let Ok(mut active) = ACTIVE.lock() {
        active.retain(|p| p != path);
    }
}

/// Install a signal handler that drops all `.running` stamps owned by
/// this process before exiting. `.working.*` artifacts stay behind for
/// inspection.
pub fn install_signal_handler() -> Result<(), Error> {
    ctrlc::set_handler(|| {
        if let Ok(mut active) = ACTIVE.lock() {
            for path in active.drain(..) {
                let _ = fs::remove_file(&path);
            }
        }
        std::process::exit(130);
    })
    .map_err(|e| Error::Custom(format!("could not install signal handler: {}", e)))
}

/// Outcome of trying to claim an output file.
#[derive(Debug)]
pub enum Claim {
    Acquired(RunningStamp),
    /// a `.done` stamp exists, the unit is complete
    AlreadyDone,
    /// a fresh `.running` stamp exists, another worker owns the unit
    InProgress,
}

/// A held `.running` stamp. Must be resolved with [RunningStamp::done]
/// or [RunningStamp::abort].
#[derive(Debug)]
pub struct RunningStamp {
    path: PathBuf,
    output: PathBuf,
}

impl RunningStamp {
    /// Mark the unit complete: `.running` becomes `.done`.
    pub fn done(self) -> Result<(), Error> {
        let done = stamp_path(&self.output, "done");
        fs::rename(&self.path, done)?;
        unregister(&self.path);
        Ok(())
    }

    /// Give the unit up, removing the `.running` stamp.
    pub fn abort(self) {
        let _ = fs::remove_file(&self.path);
        unregister(&self.path);
    }
}

/// Try to claim `output` for this worker.
///
/// Skips units that are `.done` or freshly `.running` elsewhere; a
/// stale `.running` stamp is reclaimed with a warning.
pub fn claim(output: &Path, freshness: Duration) -> Result<Claim, Error> {
    if stamp_path(output, "done").exists() {
        return Ok(Claim::AlreadyDone);
    }

    let running = stamp_path(output, "running");
    if running.exists() {
        if is_fresh(&running, freshness) {
            return Ok(Claim::InProgress);
        }
        warn!("reclaiming stale stamp {:?}", running);
        let _ = fs::remove_file(&running);
    }

    match OpenOptions::new().write(true).create_new(true).open(&running) {
        Ok(mut file) => {
            writeln!(file, "{}", host())?;
            register(&running);
            Ok(Claim::Acquired(RunningStamp {
                path: running,
                output: output.to_path_buf(),
            }))
        }
        // another worker won the race between our check and create
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(Claim::InProgress),
        Err(e) => Err(Error::Io(e)),
    }
}

fn is_fresh(path: &Path, freshness: Duration) -> bool {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|mtime| mtime.elapsed().ok())
        .map(|age| age <= freshness)
        // unreadable metadata counts as fresh, better to skip than to steal
        .unwrap_or(true)
}

/// 1-minute load average, if the platform exposes it.
pub fn load_average() -> Option<f64> {
    let loadavg = fs::read_to_string("/proc/loadavg").ok()?;
    loadavg.split_whitespace().next()?.parse().ok()
}

/// Block until the 1-minute load average drops to `max_load`.
pub fn wait_for_load(max_load: Option<f64>) {
    let max = match max_load {
        Some(max) => max,
        None => return,
    };
    while let Some(load) = load_average() {
        if load <= max {
            break;
        }
        info!("load average {} above {}, waiting", load, max);
        std::thread::sleep(Duration::from_secs(30));
    }
}
