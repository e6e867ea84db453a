use std::{fs, path::Path};
use tracing::debug;

use super::{ColumnTypes, Descriptor};
use crate::error::{ConvertError, Result};

/// Load a column-type descriptor.
///
/// - `.json` files are parsed with serde_json, everything else as YAML
/// - a missing file is `FileNotFound`, a file that doesn't parse is `MalformedInput`
pub fn load_column_types<P: AsRef<Path>>(path: P) -> Result<ColumnTypes> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| ConvertError::open(path, e))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let descriptor: Descriptor = if is_json {
        serde_json::from_str(&text).map_err(|e| {
            ConvertError::MalformedInput(format!("parsing {}: {}", path.display(), e))
        })?
    } else if text.trim().is_empty() {
        Descriptor::default()
    } else {
        serde_yaml::from_str(&text).map_err(|e| {
            ConvertError::MalformedInput(format!("parsing {}: {}", path.display(), e))
        })?
    };

    debug!(
        path = %path.display(),
        columns = descriptor.columns.len(),
        "loaded column types"
    );
    Ok(descriptor.into())
}
