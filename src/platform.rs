//! # Platform-specific utilities
//!
//! Questo modulo centralizza la risoluzione dei tool esterni usati per i video
//! (`ffmpeg`, `ffprobe`). L'ordine di ricerca è:
//! 1. Variabile d'ambiente `TOOLS_DIR` (override diretto, utile per tool bundled)
//! 2. `PATH` di sistema tramite `which`
//!
//! La risoluzione viene fatta una sola volta e memorizzata nel singleton.

use crate::error::ConvertError;
use anyhow::Result;
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

/// Tools the video pipeline shells out to
pub const VIDEO_TOOLS: &[&str] = &["ffmpeg", "ffprobe"];

/// Platform-specific command manager with tool resolution
pub struct PlatformCommands {
    resolved: HashMap<&'static str, Option<PathBuf>>,
}

impl PlatformCommands {
    /// Get the singleton instance
    pub fn instance() -> &'static Self {
        static INSTANCE: OnceLock<PlatformCommands> = OnceLock::new();
        INSTANCE.get_or_init(Self::new)
    }

    fn new() -> Self {
        let tools_dir = env::var_os("TOOLS_DIR").map(PathBuf::from);
        let resolved = VIDEO_TOOLS
            .iter()
            .map(|tool| (*tool, Self::resolve(tool, tools_dir.as_deref())))
            .collect();
        Self { resolved }
    }

    fn resolve(tool: &str, tools_dir: Option<&Path>) -> Option<PathBuf> {
        if let Some(dir) = tools_dir {
            let bundled = dir.join(Self::executable_name(tool));
            if bundled.is_file() {
                debug!("Using bundled tool: {} -> {}", tool, bundled.display());
                return Some(bundled);
            }
            debug!("Bundled path does not exist: {}", bundled.display());
        }

        match which::which(tool) {
            Ok(path) => {
                debug!("Using system tool: {} -> {}", tool, path.display());
                Some(path)
            }
            Err(_) => None,
        }
    }

    /// Platform-specific executable file name
    pub fn executable_name(base_name: &str) -> String {
        if cfg!(windows) {
            format!("{}.exe", base_name)
        } else {
            base_name.to_string()
        }
    }

    /// Check if a tool was found
    pub fn is_command_available(&self, base_name: &str) -> bool {
        matches!(self.resolved.get(base_name), Some(Some(_)))
    }

    /// Resolved path to a tool, or `MissingDependency`
    pub fn tool_path(&self, base_name: &str) -> Result<&Path> {
        match self.resolved.get(base_name) {
            Some(Some(path)) => Ok(path.as_path()),
            _ => Err(ConvertError::MissingDependency(format!(
                "{} is required for video conversion",
                base_name
            ))
            .into()),
        }
    }

    /// Names of the video tools that could not be found
    pub fn missing_video_tools(&self) -> Vec<&'static str> {
        VIDEO_TOOLS
            .iter()
            .copied()
            .filter(|tool| !self.is_command_available(tool))
            .collect()
    }
}
