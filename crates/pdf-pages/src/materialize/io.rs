//! Document I/O operations

use super::{OutputDocument, SourceDocument};
use crate::types::*;
use std::path::{Path, PathBuf};

/// Load a source document; its name is the file name of `path`
pub async fn load_source(path: impl AsRef<Path>) -> Result<SourceDocument> {
    let path = path.as_ref().to_owned();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());
    let bytes = tokio::fs::read(&path).await?;
    let mut source =
        tokio::task::spawn_blocking(move || SourceDocument::from_bytes(name, &bytes)).await??;
    source.origin = Some(path);
    Ok(source)
}

/// Write each output document into `dir` under its own name.
///
/// Fails before writing anything if an output would replace the file its
/// source was loaded from.
pub async fn save_outputs(
    outputs: Vec<OutputDocument>,
    dir: impl AsRef<Path>,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref().to_owned();
    tokio::fs::create_dir_all(&dir).await?;

    let mut targets = Vec::with_capacity(outputs.len());
    for output in outputs {
        let path = dir.join(&output.name);
        if let Some(origin) = &output.origin {
            if is_same_file(origin, &path).await {
                return Err(PageError::Config(format!(
                    "Refusing to overwrite source document {}; choose another output directory",
                    path.display()
                )));
            }
        }
        targets.push((path, output));
    }

    let mut written = Vec::with_capacity(targets.len());
    for (path, output) in targets {
        let bytes = tokio::task::spawn_blocking(move || output.to_bytes()).await??;
        tokio::fs::write(&path, bytes).await?;
        written.push(path);
    }
    Ok(written)
}

async fn is_same_file(a: &Path, b: &Path) -> bool {
    match (tokio::fs::canonicalize(a).await, tokio::fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
