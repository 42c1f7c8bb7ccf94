// src/infrastructure/renderer.rs
use crate::constants::BROWSER_LAUNCH_DELAY_MS;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::Builder;
use tracing::instrument;

/// Writes rendered note pages to a temp directory and opens them in a browser.
#[derive(Debug, Default)]
pub struct ContentRenderer {
    // Keep last temp dir alive to prevent deletion
    _temp_dir: Option<Arc<tempfile::TempDir>>,
}

impl ContentRenderer {
    pub fn new() -> Self {
        Self { _temp_dir: None }
    }

    pub fn create_temp_file(&mut self, content: &str) -> Result<PathBuf> {
        let temp_dir = Builder::new()
            .prefix("studynotes-")
            .rand_bytes(5)
            .tempdir()
            .context("Failed to create temporary directory")?;

        let file_path = temp_dir.path().join("note.html");

        File::create(&file_path)
            .with_context(|| format!("Failed to create temp file at {}", file_path.display()))?
            .write_all(content.as_bytes())
            .context("Failed to write content to temporary file")?;

        self._temp_dir = Some(Arc::new(temp_dir));

        Ok(file_path)
    }

    #[instrument(level = "debug")]
    pub fn open_in_browser(&mut self, path: &Path) -> Result<()> {
        let path_str = path.to_str().context("Failed to convert path to string")?;

        #[cfg(target_os = "macos")]
        {
            std::process::Command::new("open")
                .arg(path_str)
                .spawn()
                .context("Failed to open browser")?;
        }
        #[cfg(target_os = "windows")]
        {
            std::process::Command::new("cmd")
                .args(["/C", "start", path_str])
                .spawn()
                .context("Failed to open browser")?;
        }
        #[cfg(target_os = "linux")]
        {
            std::process::Command::new("xdg-open")
                .arg(path_str)
                .spawn()
                .context("Failed to open browser")?;
        }

        // The browser reads the file after spawn returns
        std::thread::sleep(std::time::Duration::from_millis(BROWSER_LAUNCH_DELAY_MS));

        Ok(())
    }
}
