//! # File I/O Module
//!
//! JSON-file storage for [`Simulation`] records:
//! - **Atomic saves**: write to `.tmp`, sync, rename over the target
//! - **File locking**: advisory lock while a record is being written
//! - **Version validation**: refuse records from an incompatible schema
//!
//! ## File Format
//!
//! Each simulation is stored as `<id>.bsim.json` in the store directory.
//! While a save is in progress a `<id>.bsim.json.lock` file holds metadata
//! about the writer.
//!
//! ## Example
//!
//! ```rust,no_run
//! use batical_core::calculations::CalculationItem;
//! use batical_core::file_io::JsonFileStore;
//! use batical_core::settings::Settings;
//! use batical_core::simulation::{Simulation, SimulationStore};
//!
//! let store = JsonFileStore::open("simulations")?;
//! let simulation = Simulation::run(CalculationItem::example("slab")?, &Settings::default())?;
//! store.save(&simulation)?;
//! let loaded = store.load(simulation.id)?;
//! # Ok::<(), batical_core::errors::CalcError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CalcError, CalcResult};
use crate::simulation::{Simulation, SimulationStore, SimulationSummary, SCHEMA_VERSION};

/// Suffix of stored simulation files
pub const SIMULATION_SUFFIX: &str = ".bsim.json";

/// Locks older than this are considered abandoned
const STALE_LOCK_HOURS: i64 = 24;

/// Lock file metadata stored in `.lock` files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User name of the writer
    pub user_id: String,
    /// Machine name where lock was acquired
    pub machine: String,
    /// Process ID that holds the lock
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "batical".to_string())
}

/// File lock guard that releases the lock when dropped.
///
/// Combines an OS-level advisory lock (fs2) with a `.lock` file whose JSON
/// content tells other users who holds it.
#[derive(Debug)]
pub struct FileLock {
    target_path: PathBuf,
    lock_path: PathBuf,
    /// Keeps the OS lock alive
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on `path`.
    ///
    /// # Errors
    ///
    /// * `CalcError::FileLocked` - another live process holds the lock
    /// * `CalcError::FileError` - the lock file cannot be written
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CalcResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if let Some(existing) = FileLock::check(path) {
            return Err(CalcError::file_locked(
                path.display().to_string(),
                format!("{} ({})", existing.user_id, existing.machine),
                existing.locked_at.to_rfc3339(),
            ));
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| CalcError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        // Only the holder of the OS lock may clear the previous contents.
        lock_file.try_lock_exclusive().map_err(|_| {
            CalcError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json = serde_json::to_string_pretty(&info).map_err(CalcError::serialization)?;
        lock_file
            .set_len(0)
            .and_then(|_| lock_file.write_all(lock_json.as_bytes()))
            .and_then(|_| lock_file.sync_all())
            .map_err(|e| CalcError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;

        Ok(FileLock {
            target_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Current holder of the lock on `path`, if any live one exists.
    pub fn check(path: &Path) -> Option<LockInfo> {
        let lock_path = lock_path_for(path);
        if !lock_path.exists() {
            return None;
        }
        read_lock_info(&lock_path).ok().filter(|info| !is_lock_stale(info))
    }

    /// File protected by this lock
    pub fn target_path(&self) -> &Path {
        &self.target_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

fn lock_path_for(path: &Path) -> PathBuf {
    let mut lock_path = path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

fn read_lock_info(lock_path: &Path) -> CalcResult<LockInfo> {
    let contents = read_to_string(lock_path)?;
    serde_json::from_str(&contents).map_err(CalcError::serialization)
}

/// A lock is stale when its process is gone (same machine) or it is too old.
fn is_lock_stale(info: &LockInfo) -> bool {
    #[cfg(unix)]
    {
        if hostname().as_deref() == Some(info.machine.as_str())
            && fs::metadata(format!("/proc/{}", info.pid)).is_err()
        {
            return true;
        }
    }
    (Utc::now() - info.locked_at).num_hours() > STALE_LOCK_HOURS
}

fn read_to_string(path: &Path) -> CalcResult<String> {
    let mut file =
        File::open(path).map_err(|e| CalcError::file_error("open", path.display().to_string(), e.to_string()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;
    Ok(contents)
}

/// Write `contents` to `path` through a synced temporary file and a rename.
pub fn write_atomic(path: &Path, contents: &[u8]) -> CalcResult<()> {
    let tmp_path = {
        let mut p = path.as_os_str().to_owned();
        p.push(".tmp");
        PathBuf::from(p)
    };

    let mut tmp_file = File::create(&tmp_path)
        .map_err(|e| CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp_file
        .write_all(contents)
        .and_then(|_| tmp_file.sync_all())
        .map_err(|e| CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })
}

/// Save a simulation to `path` atomically.
pub fn save_simulation(simulation: &Simulation, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(simulation).map_err(CalcError::serialization)?;
    write_atomic(path, json.as_bytes())
}

/// Load a simulation from `path` and check its schema version.
///
/// # Errors
///
/// * `CalcError::VersionMismatch` - the file was written by an incompatible schema
/// * `CalcError::SerializationError` - invalid JSON
/// * `CalcError::FileError` - I/O error
pub fn load_simulation(path: &Path) -> CalcResult<Simulation> {
    let contents = read_to_string(path)?;
    let simulation: Simulation = serde_json::from_str(&contents)
        .map_err(|e| CalcError::serialization(format!("Invalid JSON in {}: {}", path.display(), e)))?;
    validate_version(&simulation.version)?;
    Ok(simulation)
}

/// Major versions must match; in 0.x, files from a newer minor are rejected.
pub fn validate_version(file_version: &str) -> CalcResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version);
    let current_parts = parse(SCHEMA_VERSION);

    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    match (file_parts.as_slice(), current_parts.as_slice()) {
        ([file_major, ..], [current_major, ..]) if file_major != current_major => Err(mismatch()),
        ([0, file_minor, ..], [0, current_minor, ..]) if file_minor > current_minor => Err(mismatch()),
        ([_, ..], [_, ..]) => Ok(()),
        _ => Err(mismatch()),
    }
}

/// Directory of `<id>.bsim.json` files.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> CalcResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| CalcError::file_error("create directory", dir.display().to_string(), e.to_string()))?;
        Ok(JsonFileStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding simulation `id`
    pub fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}{SIMULATION_SUFFIX}"))
    }
}

impl SimulationStore for JsonFileStore {
    fn save(&self, simulation: &Simulation) -> CalcResult<()> {
        let path = self.path_for(simulation.id);
        let _lock = FileLock::acquire(&path, current_user())?;
        save_simulation(simulation, &path)?;
        tracing::debug!(id = %simulation.id, path = %path.display(), "Simulation saved");
        Ok(())
    }

    fn load(&self, id: Uuid) -> CalcResult<Simulation> {
        load_simulation(&self.path_for(id))
    }

    fn list(&self) -> CalcResult<Vec<SimulationSummary>> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| CalcError::file_error("list", self.dir.display().to_string(), e.to_string()))?;

        let mut summaries = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let is_simulation = path
                .file_name()
                .map(|name| name.to_string_lossy().ends_with(SIMULATION_SUFFIX))
                .unwrap_or(false);
            if !is_simulation {
                continue;
            }
            match load_simulation(&path) {
                Ok(simulation) => summaries.push(SimulationSummary::from(&simulation)),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable simulation"),
            }
        }
        summaries.sort_by_key(|s| s.created);
        Ok(summaries)
    }
}
