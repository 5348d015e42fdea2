//! Lenient roster validation: collects diagnostics instead of failing fast,
//! so one pass reports everything an operator needs to fix.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::data::{Attribute, ATTRIBUTE_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }
}

/// Validate a roster CSV without loading it. Errors mean the strict loader
/// would reject the file; warnings mean cells will silently resolve to the
/// neutral multiplier; info entries flag suspicious but legal rows.
pub fn validate_roster_file(path: impl AsRef<Path>) -> Result<ValidationReport, String> {
    let path = path.as_ref();
    let mut csv_reader = csv::Reader::from_path(path)
        .map_err(|err| format!("unable to read '{}': {err}", path.display()))?;
    let header = csv_reader
        .headers()
        .map_err(|err| format!("unable to parse csv header: {err}"))?
        .clone();

    let mut report = ValidationReport::default();

    let find = |name: &str| -> Option<usize> {
        header
            .iter()
            .position(|column| column.trim().eq_ignore_ascii_case(name))
    };
    let name_column = find("name");
    let primary_column = find("type1");
    let secondary_column = find("type2");
    if name_column.is_none() {
        report.push(ValidationSeverity::Error, "header", "missing 'name' column");
    }
    if primary_column.is_none() {
        report.push(ValidationSeverity::Error, "header", "missing 'type1' column");
    }

    let mut profile_columns = [None; ATTRIBUTE_COUNT];
    for attribute in Attribute::ALL {
        profile_columns[attribute.index()] = find(attribute.as_str());
        if profile_columns[attribute.index()].is_none() {
            report.push(
                ValidationSeverity::Warning,
                "header",
                format!("missing '{attribute}' column; that multiplier defaults to neutral"),
            );
        }
    }

    let mut seen_names: HashSet<String> = HashSet::new();
    let mut row_count = 0usize;

    for (row_index, record) in csv_reader.records().enumerate() {
        let row = row_index + 2; // 1-based, after the header row
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                report.push(
                    ValidationSeverity::Error,
                    format!("row {row}"),
                    format!("unreadable record: {err}"),
                );
                continue;
            }
        };

        let name = name_column
            .and_then(|index| record.get(index))
            .map(str::trim)
            .unwrap_or_default();
        if name.is_empty() {
            report.push(
                ValidationSeverity::Info,
                format!("row {row}"),
                "blank name; row is skipped by the loader",
            );
            continue;
        }
        row_count += 1;
        let context = format!("candidate '{name}'");

        if !seen_names.insert(name.to_string()) {
            report.push(ValidationSeverity::Error, context.as_str(), "duplicate name");
        }

        let primary = primary_column
            .and_then(|index| record.get(index))
            .map(str::trim)
            .unwrap_or_default();
        if Attribute::parse(primary).is_none() {
            report.push(
                ValidationSeverity::Error,
                context.as_str(),
                format!("unknown primary attribute '{primary}'"),
            );
        }
        if let Some(secondary) = secondary_column.and_then(|index| record.get(index)) {
            let secondary = secondary.trim();
            if !secondary.is_empty() && Attribute::parse(secondary).is_none() {
                report.push(
                    ValidationSeverity::Error,
                    context.as_str(),
                    format!("unknown secondary attribute '{secondary}'"),
                );
            }
        }

        let mut neutral_cells = 0usize;
        for attribute in Attribute::ALL {
            let Some(column) = profile_columns[attribute.index()] else {
                neutral_cells += 1;
                continue;
            };
            let cell = record.get(column).map(str::trim).unwrap_or_default();
            if cell.is_empty() {
                neutral_cells += 1;
                continue;
            }
            match cell.replace(',', ".").parse::<f64>() {
                Ok(value) if value.is_finite() && value >= 0.0 => {
                    if value == 1.0 {
                        neutral_cells += 1;
                    }
                }
                _ => {
                    neutral_cells += 1;
                    report.push(
                        ValidationSeverity::Warning,
                        context.as_str(),
                        format!("multiplier '{cell}' for {attribute} resolves to neutral"),
                    );
                }
            }
        }
        if neutral_cells == ATTRIBUTE_COUNT {
            report.push(
                ValidationSeverity::Info,
                context.as_str(),
                "profile is entirely neutral; every matchup term scores 0",
            );
        }
    }

    if row_count == 0 {
        report.push(ValidationSeverity::Error, "roster", "no candidate rows");
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::{validate_roster_file, ValidationSeverity};
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "metadex-validate-{name}-{}.csv",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).expect("temp file");
        file.write_all(contents.as_bytes()).expect("write temp file");
        path
    }

    #[test]
    fn clean_roster_produces_no_errors() {
        let path = write_temp(
            "clean",
            "name,type1,type2,fire,water,grass\nVulpix,fire,,0.5,2,0.5\n",
        );
        let report = validate_roster_file(&path).expect("report");
        std::fs::remove_file(&path).ok();

        assert!(!report.has_errors(), "diagnostics: {:?}", report.diagnostics);
    }

    #[test]
    fn duplicates_and_unknown_attributes_are_errors() {
        let path = write_temp("dups", "name,type1\nMew,psychic\nMew,psychic\nGlitch,cyber\n");
        let report = validate_roster_file(&path).expect("report");
        std::fs::remove_file(&path).ok();

        assert!(report.has_errors());
        let messages: Vec<&str> = report
            .diagnostics
            .iter()
            .filter(|diag| diag.severity == ValidationSeverity::Error)
            .map(|diag| diag.message.as_str())
            .collect();
        assert!(messages.iter().any(|m| m.contains("duplicate name")));
        assert!(messages
            .iter()
            .any(|m| m.contains("unknown primary attribute 'cyber'")));
    }

    #[test]
    fn garbled_multiplier_is_a_warning_not_an_error() {
        let path = write_temp("garbled", "name,type1,fire\nDitto,normal,oops\n");
        let report = validate_roster_file(&path).expect("report");
        std::fs::remove_file(&path).ok();

        assert!(!report.has_errors());
        assert!(report
            .diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Warning
                && diag.message.contains("resolves to neutral")));
    }
}
