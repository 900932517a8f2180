// File: ./src/storage.rs
// Local files: the manual cancellation list and the generated calendar.
use crate::model::{AcademicYear, CalendarDate, parse_date_string};
use anyhow::{Context, Result};
use fs2::FileExt;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

pub struct LocalStorage;

impl LocalStorage {
    /// Sidecar lock file next to `file_path` (`x.ics` -> `x.ics.lock`).
    fn get_lock_path(file_path: &Path) -> PathBuf {
        let mut lock_path = file_path.to_path_buf();
        if let Some(ext) = lock_path.extension() {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".lock");
            lock_path.set_extension(new_ext);
        } else {
            lock_path.set_extension("lock");
        }
        lock_path
    }

    /// Runs `f` while holding an exclusive lock on the sidecar file, so two
    /// scheduled runs never interleave their writes.
    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    /// Atomic write: Write to .tmp file then rename
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }

    /// Writes the rendered calendar. Subscribers polling the file never see
    /// a half-written feed.
    pub fn write_output(path: &Path, ics: &str) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        Self::with_lock(path, || Self::atomic_write(path, ics))
            .with_context(|| format!("Failed to write calendar '{}'", path.display()))
    }

    /// Reads the manual cancellation list: one `D/M` or `D/M/YYYY` per line,
    /// `#` comments and blank lines ignored. Bad lines are logged and skipped.
    pub fn load_cancelled_dates(path: &Path, year: AcademicYear) -> BTreeSet<CalendarDate> {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!(
                    "No manual cancellation file at {}, skipping",
                    path.display()
                );
                return BTreeSet::new();
            }
            Err(e) => {
                log::warn!("Could not read {}: {}", path.display(), e);
                return BTreeSet::new();
            }
        };

        let dates = parse_cancelled_dates(&contents, year);
        log::info!(
            "Loaded {} manually cancelled dates from {}",
            dates.len(),
            path.display()
        );
        dates
    }
}

fn parse_cancelled_dates(contents: &str, year: AcademicYear) -> BTreeSet<CalendarDate> {
    let mut dates = BTreeSet::new();
    for (idx, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_date_string(line, year) {
            Some(date) => {
                dates.insert(date);
            }
            None => log::warn!("Line {}: could not parse date '{}'", idx + 1, line),
        }
    }
    dates
}
