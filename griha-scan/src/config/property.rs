//! Property file location section.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Property settings section
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertySection {
    /// Property file name
    #[serde(default = "defaults::file_name")]
    pub file_name: String,

    /// Directory holding the property file
    #[serde(default = "defaults::document_dir")]
    pub document_dir: String,
}

impl Default for PropertySection {
    fn default() -> Self {
        Self {
            file_name: defaults::file_name(),
            document_dir: defaults::document_dir(),
        }
    }
}

impl PropertySection {
    /// `document_dir/file_name`
    pub fn path(&self) -> PathBuf {
        PathBuf::from(&self.document_dir).join(&self.file_name)
    }
}
