// src/schema/types.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Columns that are written unquoted when nothing else is configured.
pub const DEFAULT_NUMERIC_COLUMNS: [&str; 2] = ["status", "rate"];

/// How a column's raw value is rendered into the statement.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Single-quoted string literal with embedded quotes doubled.
    #[default]
    Text,
    /// Raw value, no quoting and no validation.
    Numeric,
}

/// On-disk shape of a column-type descriptor (YAML or JSON).
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct Descriptor {
    #[serde(default)]
    pub default: ColumnKind,
    #[serde(default)]
    pub columns: BTreeMap<String, ColumnKind>,
}

/// Column name → kind, with a fallback for columns not listed.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnTypes {
    fallback: ColumnKind,
    kinds: BTreeMap<String, ColumnKind>,
}

impl Default for ColumnTypes {
    fn default() -> Self {
        Self::with_numeric(DEFAULT_NUMERIC_COLUMNS)
    }
}

impl ColumnTypes {
    /// Every column is quoted.
    pub fn text_only() -> Self {
        Self {
            fallback: ColumnKind::Text,
            kinds: BTreeMap::new(),
        }
    }

    /// Exactly `names` are numeric; everything else is text.
    pub fn with_numeric<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut types = Self::text_only();
        for name in names {
            types.set(name, ColumnKind::Numeric);
        }
        types
    }

    pub fn set(&mut self, name: impl Into<String>, kind: ColumnKind) -> &mut Self {
        self.kinds.insert(name.into(), kind);
        self
    }

    /// Lookup is exact: `Status` and `status` are different columns.
    pub fn kind_of(&self, name: &str) -> ColumnKind {
        self.kinds.get(name).copied().unwrap_or(self.fallback)
    }

    /// Resolve the kind of every header column, in header order.
    pub fn resolve(&self, headers: &[String]) -> Vec<ColumnKind> {
        headers.iter().map(|h| self.kind_of(h)).collect()
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &str> {
        self.kinds
            .iter()
            .filter(|(_, k)| **k == ColumnKind::Numeric)
            .map(|(n, _)| n.as_str())
    }
}

impl From<Descriptor> for ColumnTypes {
    fn from(d: Descriptor) -> Self {
        Self {
            fallback: d.default,
            kinds: d.columns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allowlist_is_status_and_rate() {
        let types = ColumnTypes::default();
        assert_eq!(types.kind_of("status"), ColumnKind::Numeric);
        assert_eq!(types.kind_of("rate"), ColumnKind::Numeric);
        assert_eq!(types.kind_of("address"), ColumnKind::Text);
        assert_eq!(types.kind_of("Status"), ColumnKind::Text);
        assert_eq!(
            types.numeric_columns().collect::<Vec<_>>(),
            vec!["rate", "status"]
        );
    }

    #[test]
    fn resolve_follows_header_order() {
        let headers: Vec<String> = ["rate", "id", "status"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            ColumnTypes::default().resolve(&headers),
            vec![ColumnKind::Numeric, ColumnKind::Text, ColumnKind::Numeric]
        );
    }

    #[test]
    fn descriptor_fallback_applies_to_unlisted_columns() {
        let mut d = Descriptor::default();
        d.default = ColumnKind::Numeric;
        d.columns.insert("name".into(), ColumnKind::Text);
        let types = ColumnTypes::from(d);
        assert_eq!(types.kind_of("name"), ColumnKind::Text);
        assert_eq!(types.kind_of("qty"), ColumnKind::Numeric);
    }
}
