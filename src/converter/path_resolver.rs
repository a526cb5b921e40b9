//! # Path Resolution Module
//!
//! Centralizza tutta la logica di calcolo dei path di output.
//! L'albero di output rispecchia quello di input rispetto alla radice:
//!
//! ```text
//! Input:  img/2023/vacation/IMG_001.JPG
//! Root:   img
//! Output: converted_img/2023/vacation/IMG_001.webp
//! ```

use crate::error::ConvertError;
use crate::file_manager::MediaKind;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Utility per calcolare i path di output in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// Mirrored output path for `input_path`, with the extension for `kind`
    pub fn get_output_path(
        input_path: &Path,
        input_root: &Path,
        output_root: &Path,
        kind: MediaKind,
    ) -> Result<PathBuf> {
        let file_stem = input_path
            .file_stem()
            .ok_or_else(|| anyhow::anyhow!("Invalid file name: {}", input_path.display()))?
            .to_string_lossy();
        let filename = format!("{}.{}", file_stem, kind.output_extension());

        let relative_dir = Self::relative_dir(input_path, input_root)?;
        let result = output_root.join(relative_dir).join(filename);
        debug!("Resolved output path: {} -> {}", input_path.display(), result.display());

        Ok(result)
    }

    /// Directory of `input_path` relative to `input_root`
    pub fn relative_dir<'a>(input_path: &'a Path, input_root: &Path) -> Result<&'a Path> {
        let relative = input_path.strip_prefix(input_root).map_err(|_| {
            ConvertError::Validation(format!(
                "{} is not inside {}",
                input_path.display(),
                input_root.display()
            ))
        })?;
        Ok(relative.parent().unwrap_or(Path::new("")))
    }

    /// Crea le directory parent se necessario.
    ///
    /// Idempotente: nessun errore se la directory esiste già, anche se creata
    /// in parallelo da un altro worker.
    pub fn ensure_parent_dirs(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConvertError::filesystem(parent, e))?;
        }
        Ok(())
    }
}
