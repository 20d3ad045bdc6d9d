//! Catalog file loading.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::types::{EndpointDefinition, Tenant};

/// On-disk catalog: every tenant and endpoint definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogFile {
    pub tenants: Vec<Tenant>,
    pub endpoints: Vec<EndpointDefinition>,
}

/// Error type for catalog loading.
#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Io(e) => write!(f, "IO error: {}", e),
            CatalogError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Read a JSON catalog file. Definitions are validated when stored.
pub fn load_catalog(path: &Path) -> Result<CatalogFile, CatalogError> {
    let content = fs::read_to_string(path).map_err(CatalogError::Io)?;
    serde_json::from_str(&content).map_err(CatalogError::Parse)
}
