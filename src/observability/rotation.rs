//! Append-only line file with size-based rotation.
//!
//! When the next line would push the file past its limit, the file is
//! shifted into numbered backups (`name.1` newest, `name.N` oldest) and a
//! fresh file is started. At most [`MAX_BACKUPS`] backups are kept.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Default size limit for the trace file (10 MiB).
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Number of rotated backups kept next to the live file.
pub const MAX_BACKUPS: usize = 3;

#[derive(Debug)]
struct OpenFile {
    file: File,
    len: u64,
}

/// Line writer that rotates its file by size.
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    open: Option<OpenFile>,
}

impl RotatingFile {
    /// Creates a writer for `path`. Nothing is opened until the first write.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self::with_limit(path, DEFAULT_MAX_BYTES)
    }

    #[must_use]
    pub const fn with_limit(path: PathBuf, max_bytes: u64) -> Self {
        Self {
            path,
            max_bytes,
            open: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the `index`-th backup (1 is the most recent).
    #[must_use]
    pub fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    /// Appends `line` plus a newline and flushes.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from rotating, opening or writing the file.
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        let incoming = line.len() as u64 + 1;

        let current = self.current()?;
        if current.len > 0 && current.len + incoming > self.max_bytes {
            self.open = None;
            self.rotate()?;
        }

        let current = self.current()?;
        writeln!(current.file, "{line}")?;
        current.file.flush()?;
        current.len += incoming;
        Ok(())
    }

    fn current(&mut self) -> io::Result<&mut OpenFile> {
        if self.open.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            let len = file.metadata()?.len();
            self.open = Some(OpenFile { file, len });
        }

        self.open
            .as_mut()
            .ok_or_else(|| io::Error::other("trace file not open"))
    }

    fn rotate(&self) -> io::Result<()> {
        let oldest = self.backup_path(MAX_BACKUPS);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        for index in (1..MAX_BACKUPS).rev() {
            let from = self.backup_path(index);
            if from.exists() {
                fs::rename(&from, self.backup_path(index + 1))?;
            }
        }

        if self.path.exists() {
            fs::rename(&self.path, self.backup_path(1))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_lines_without_rotation_under_limit() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = RotatingFile::new(dir.path().join("trace.json"));

        file.write_line("{\"a\":1}").unwrap();
        file.write_line("{\"b\":2}").unwrap();

        let content = fs::read_to_string(file.path()).unwrap();
        assert_eq!(content, "{\"a\":1}\n{\"b\":2}\n");
        assert!(!file.backup_path(1).exists());
    }

    #[test]
    fn rotates_into_numbered_backups() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = RotatingFile::with_limit(dir.path().join("trace.json"), 8);

        for line in ["first", "second", "third"] {
            file.write_line(line).unwrap();
        }

        assert_eq!(fs::read_to_string(file.path()).unwrap(), "third\n");
        assert_eq!(fs::read_to_string(file.backup_path(1)).unwrap(), "second\n");
        assert_eq!(fs::read_to_string(file.backup_path(2)).unwrap(), "first\n");
    }

    #[test]
    fn keeps_at_most_max_backups() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = RotatingFile::with_limit(dir.path().join("trace.json"), 4);

        for i in 0..10 {
            file.write_line(&format!("l{i}")).unwrap();
        }

        for index in 1..=MAX_BACKUPS {
            assert!(file.backup_path(index).exists());
        }
        assert!(!file.backup_path(MAX_BACKUPS + 1).exists());
        assert_eq!(fs::read_to_string(file.backup_path(MAX_BACKUPS)).unwrap(), "l6\n");
    }

    #[test]
    fn resumes_size_of_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.json");
        fs::write(&path, "existing\n").unwrap();

        let mut file = RotatingFile::with_limit(path, 12);
        file.write_line("next").unwrap();

        assert_eq!(fs::read_to_string(file.backup_path(1)).unwrap(), "existing\n");
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "next\n");
    }
}
