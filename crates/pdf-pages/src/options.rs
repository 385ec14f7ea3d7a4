use crate::materialize::SplitMarkers;
use crate::selection::{self, SelectionPreview};
use crate::transform::{TransformMode, rearrange};
use crate::types::*;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A saved reorganization: which transform to run and where to split
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReorganizeOptions {
    // Input
    pub input_file: PathBuf,

    // Page order
    pub mode: TransformMode,
    /// Selection expression for `Custom`, transform parameter otherwise
    pub page_order: String,

    // Output splitting
    pub split_after: SplitMarkers,

    /// Reject malformed custom page orders instead of falling back to a
    /// comma-separated reading
    pub strict: bool,
}

impl ReorganizeOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| PageError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PageError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.input_file.as_os_str().is_empty() {
            return Err(PageError::Config("No input file specified".to_string()));
        }

        if self.mode == TransformMode::Custom && self.strict && !self.page_order.trim().is_empty()
        {
            selection::parse(&self.page_order)?;
        }

        Ok(())
    }

    /// Page order for a document with `total_pages` pages.
    ///
    /// Lenient custom orders are resolved with the comma-separated fallback;
    /// the warning is logged and returned alongside the pages.
    pub fn plan(&self, total_pages: usize) -> Result<SelectionPreview> {
        if self.mode == TransformMode::Custom && !self.strict {
            let preview = selection::resolve_with_diagnostics(&self.page_order, total_pages);
            if let Some(warning) = &preview.warning {
                log::warn!("{warning}");
            }
            return Ok(preview);
        }

        Ok(SelectionPreview {
            pages: rearrange(self.mode, &self.page_order, total_pages)?,
            warning: None,
        })
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::*;
    use serde::{Deserialize, Serialize};

    impl Serialize for TransformMode {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            serializer.serialize_str(self.tag())
        }
    }

    impl<'de> Deserialize<'de> for TransformMode {
        fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        }
    }
}
