mod spreadsheet;

use crate::error::{ImportError, Result};
use std::path::Path;
use tapp_import_common::{DataFormat, Snapshot};

pub use spreadsheet::read_rows;

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Decode an import file into a raw payload.
///
/// `.json` files are passed through as-is; workbooks are read from their
/// first worksheet, with the first row as headers.
pub fn load(path: &Path) -> Result<DataFormat> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    if !is_supported(path) {
        return Err(ImportError::UnsupportedFile(path.display().to_string()));
    }

    if extension(path) == "json" {
        let content = std::fs::read_to_string(path)?;
        let data = serde_json::from_str(&content)?;
        Ok(DataFormat::Json(data))
    } else {
        let rows = read_rows(path)?;
        tracing::debug!("Read {} row(s) from {}", rows.len(), path.display());
        Ok(DataFormat::Spreadsheet(rows))
    }
}

/// Read the collections an import is diffed against.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn is_supported(path: &Path) -> bool {
    let ext = extension(path);
    ext == "json" || SPREADSHEET_EXTENSIONS.contains(&ext.as_str())
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported(Path::new("positions.JSON")));
        assert!(is_supported(Path::new("positions.xlsx")));
        assert!(is_supported(Path::new("positions.ods")));
        assert!(!is_supported(Path::new("positions.csv")));
        assert!(!is_supported(Path::new("positions")));
    }
}
