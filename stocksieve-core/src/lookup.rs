//! Symbol lookup table — injected name/industry metadata.
//!
//! The decoder resolves descriptive fields through an explicit table passed
//! in by the caller, never a process-wide constant. Tables are loaded from a
//! TOML config file; a small built-in table covers the common demo universe.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Descriptive fields for one symbol, keyed by its bare 6-digit code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub name: String,
    pub industry: String,
}

/// Code → name/industry lookup table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolTable {
    symbols: BTreeMap<String, SymbolInfo>,
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("read symbol table {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("parse symbol table TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

impl SymbolTable {
    /// Load a table from a TOML file.
    ///
    /// ```toml
    /// [symbols."600519"]
    /// name = "贵州茅台"
    /// industry = "酿酒行业"
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, TableError> {
        let content = std::fs::read_to_string(path).map_err(|source| TableError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a table from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, TableError> {
        Ok(toml::from_str(content)?)
    }

    /// Look up a bare 6-digit code.
    pub fn get(&self, code: &str) -> Option<&SymbolInfo> {
        self.symbols.get(code)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn insert(&mut self, code: impl Into<String>, name: impl Into<String>, industry: impl Into<String>) {
        self.symbols.insert(
            code.into(),
            SymbolInfo {
                name: name.into(),
                industry: industry.into(),
            },
        );
    }

    /// Built-in table for the common large-cap demo universe.
    pub fn default_cn() -> Self {
        let entries = [
            ("600519", "贵州茅台", "酿酒行业"),
            ("000858", "五粮液", "酿酒行业"),
            ("000002", "万科A", "房地产"),
            ("002594", "比亚迪", "汽车行业"),
            ("000333", "美的集团", "家电行业"),
            ("601888", "中国中免", "旅游酒店"),
            ("600900", "长江电力", "电力行业"),
            ("600036", "招商银行", "银行"),
            ("000001", "平安银行", "银行"),
            ("601318", "中国平安", "保险"),
            ("000725", "京东方A", "电子元件"),
            ("002415", "海康威视", "电子元件"),
            ("000538", "云南白药", "医药制造"),
            ("600276", "恒瑞医药", "医药制造"),
            ("600000", "浦发银行", "银行"),
            ("600030", "中信证券", "证券"),
            ("601166", "兴业银行", "银行"),
            ("002236", "大华股份", "电子元件"),
            ("000895", "双汇发展", "食品饮料"),
            ("000723", "美锦能源", "煤炭采选"),
        ];
        let mut table = Self::default();
        for (code, name, industry) in entries {
            table.insert(code, name, industry);
        }
        table
    }

    /// Serialize the table to TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_resolves_known_codes() {
        let table = SymbolTable::default_cn();
        let info = table.get("600519").unwrap();
        assert_eq!(info.name, "贵州茅台");
        assert_eq!(info.industry, "酿酒行业");
        assert!(table.get("999999").is_none());
    }

    #[test]
    fn toml_roundtrip() {
        let table = SymbolTable::default_cn();
        let toml_str = table.to_toml().unwrap();
        let parsed = SymbolTable::from_toml(&toml_str).unwrap();
        assert_eq!(parsed.len(), table.len());
        assert_eq!(parsed.get("000858"), table.get("000858"));
    }

    #[test]
    fn parses_explicit_toml() {
        let table = SymbolTable::from_toml(
            r#"
            [symbols."600519"]
            name = "贵州茅台"
            industry = "酿酒行业"
            "#,
        )
        .unwrap();
        assert_eq!(table.get("600519").unwrap().industry, "酿酒行业");
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(SymbolTable::from_toml("symbols = 3").is_err());
    }
}
