use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::columns::{column_letter_to_index, DetectionOptions};
use crate::error::AnalyzerError;

// ---------------------------------------------------------------------------
// Sheet configuration
// ---------------------------------------------------------------------------

/// One configured sheet and its result column letters, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetEntry {
    pub name: String,
    pub columns: Vec<String>,
}

/// Sheet name -> result column letters. Order is preserved and drives analysis order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetConfig {
    entries: Vec<SheetEntry>,
}

impl SheetConfig {
    /// Build from `(sheet, [letters])` pairs.
    pub fn from_pairs<I, S, L>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, L)>,
        S: Into<String>,
        L: IntoIterator,
        L::Item: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(name, cols)| SheetEntry {
                name: name.into(),
                columns: cols.into_iter().map(Into::into).collect(),
            })
            .collect();
        Self { entries }
    }

    pub fn columns_for(&self, sheet: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.name == sheet)
            .map(|e| e.columns.as_slice())
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn entries(&self) -> &[SheetEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn validate(&self) -> Result<(), AnalyzerError> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.name.as_str()) {
                return Err(AnalyzerError::ConfigValidation(format!(
                    "sheet '{}' is configured more than once",
                    entry.name
                )));
            }
            if entry.columns.is_empty() {
                return Err(AnalyzerError::ConfigValidation(format!(
                    "sheet '{}' has no result columns",
                    entry.name
                )));
            }
            for letter in &entry.columns {
                column_letter_to_index(letter).map_err(|e| {
                    AnalyzerError::ConfigValidation(format!("sheet '{}': {e}", entry.name))
                })?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// Everything one analysis run needs. Passed explicitly into the workbook analyzer;
/// nothing is held in process-wide state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisConfig {
    /// `None` = auto-detect result columns in every sheet.
    pub sheets: Option<SheetConfig>,
    pub detection: DetectionOptions,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    detection: DetectionOptions,
    #[serde(default)]
    sheet: Vec<SheetEntry>,
}

impl AnalysisConfig {
    pub fn auto_detect() -> Self {
        Self::default()
    }

    pub fn configured(sheets: SheetConfig) -> Self {
        Self { sheets: Some(sheets), detection: DetectionOptions::default() }
    }

    /// Parse a TOML run config. A file without `[[sheet]]` entries selects auto-detect.
    pub fn from_toml(input: &str) -> Result<Self, AnalyzerError> {
        let raw: RawConfig =
            toml::from_str(input).map_err(|e| AnalyzerError::ConfigParse(e.to_string()))?;
        let sheets = SheetConfig { entries: raw.sheet };
        let config = Self {
            sheets: (!sheets.is_empty()).then_some(sheets),
            detection: raw.detection,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnalyzerError> {
        let threshold = self.detection.density_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(AnalyzerError::ConfigValidation(format!(
                "density_threshold must be between 0 and 1, got {threshold}"
            )));
        }
        if self.detection.sample_size == 0 {
            return Err(AnalyzerError::ConfigValidation(
                "sample_size must be at least 1".into(),
            ));
        }
        if let Some(ref sheets) = self.sheets {
            sheets.validate()?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
