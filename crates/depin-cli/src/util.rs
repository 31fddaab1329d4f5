//! Utility functions for CLI operations.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use time::{Date, OffsetDateTime};

/// Write output to file or stdout
pub fn write_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}

/// Write an export file, creating its directory if needed.
pub fn write_export(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write export: {}", path.display()))
}

/// Destination of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    Stdout,
    File(PathBuf),
}

impl ExportTarget {
    /// `-` selects stdout; no path means `file_name` inside `dir`.
    pub fn resolve(explicit: Option<PathBuf>, dir: &Path, file_name: &str) -> Self {
        match explicit {
            Some(path) if path.as_os_str() == "-" => ExportTarget::Stdout,
            Some(path) => ExportTarget::File(path),
            None => ExportTarget::File(dir.join(file_name)),
        }
    }

    pub fn is_stdout(&self) -> bool {
        matches!(self, ExportTarget::Stdout)
    }

    /// Write `content`, ending stdout output with a newline.
    pub fn write(&self, content: &str) -> Result<()> {
        match self {
            ExportTarget::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(content.as_bytes())?;
                if !content.ends_with('\n') {
                    stdout.write_all(b"\n")?;
                }
                stdout.flush()?;
                Ok(())
            }
            ExportTarget::File(path) => write_export(path, content),
        }
    }
}

impl fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportTarget::Stdout => write!(f, "stdout"),
            ExportTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Today's date, used in export file names.
pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_target_prefers_explicit() {
        let dir = Path::new("/exports");
        assert_eq!(
            ExportTarget::resolve(Some(PathBuf::from("a.csv")), dir, "b.csv"),
            ExportTarget::File(PathBuf::from("a.csv"))
        );
        assert_eq!(
            ExportTarget::resolve(None, dir, "b.csv"),
            ExportTarget::File(dir.join("b.csv"))
        );
    }

    #[test]
    fn test_export_target_dash_is_stdout() {
        let target = ExportTarget::resolve(Some(PathBuf::from("-")), Path::new("/exports"), "b.csv");
        assert!(target.is_stdout());
        assert_eq!(target.to_string(), "stdout");
        // "./-" still names a file.
        assert!(!ExportTarget::resolve(Some(PathBuf::from("./-")), Path::new("."), "b.csv").is_stdout());
    }

    #[test]
    fn test_write_export_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        write_export(&path, "ID\n1").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "ID\n1");
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write_output(Some(&path), "hello\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }
}
