//! Load the candidate roster CSV.
//!
//! Expected columns: `name`, `type1`, optional `type2`, then one column per
//! domain attribute (`bug` .. `water`) holding the candidate's defensive
//! multiplier against that attribute. Columns are located by header name;
//! multiplier cells go through the effectiveness resolver, so a missing or
//! garbled cell degrades to neutral instead of failing the load.

use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::Path;

use crate::data::{Attribute, Candidate, InvalidInput, ATTRIBUTE_COUNT};
use crate::scoring::resolver::resolve_multiplier;

pub const DEFAULT_ROSTER_PATH: &str = "data/candidates.csv";

#[derive(Debug)]
pub enum RosterError {
    Csv(csv::Error),
    Invalid(InvalidInput),
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "failed to read roster csv: {err}"),
            Self::Invalid(err) => write!(f, "invalid roster: {err}"),
        }
    }
}

impl std::error::Error for RosterError {}

impl From<InvalidInput> for RosterError {
    fn from(err: InvalidInput) -> Self {
        Self::Invalid(err)
    }
}

/// Column indices for a roster file, derived from the header row by name.
struct RosterColumns {
    name: usize,
    primary: usize,
    secondary: Option<usize>,
    profile: [Option<usize>; ATTRIBUTE_COUNT],
}

fn find_roster_columns(header: &csv::StringRecord) -> Result<RosterColumns, InvalidInput> {
    fn find(header: &csv::StringRecord, name: &str) -> Option<usize> {
        header
            .iter()
            .position(|column| column.trim().eq_ignore_ascii_case(name))
    }

    let name = find(header, "name").ok_or(InvalidInput::MissingColumn("name"))?;
    let primary = find(header, "type1").ok_or(InvalidInput::MissingColumn("type1"))?;
    let secondary = find(header, "type2");

    let mut profile = [None; ATTRIBUTE_COUNT];
    for attribute in Attribute::ALL {
        profile[attribute.index()] = find(header, attribute.as_str());
    }

    Ok(RosterColumns {
        name,
        primary,
        secondary,
        profile,
    })
}

/// Return None for empty cells so absent values stay absent.
fn optional_cell(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|cell| !cell.is_empty())
}

/// Read a roster from any CSV source. Fails on duplicate names or attribute
/// values outside the domain; multiplier cells never fail.
pub fn read_roster<R: io::Read>(reader: R) -> Result<Vec<Candidate>, RosterError> {
    parse_roster(csv::Reader::from_reader(reader))
}

/// Load a roster from disk. See [read_roster].
pub fn load_roster(path: impl AsRef<Path>) -> Result<Vec<Candidate>, RosterError> {
    parse_roster(csv::Reader::from_path(path).map_err(RosterError::Csv)?)
}

fn parse_roster<R: io::Read>(
    mut csv_reader: csv::Reader<R>,
) -> Result<Vec<Candidate>, RosterError> {
    let columns = find_roster_columns(csv_reader.headers().map_err(RosterError::Csv)?)?;

    let mut candidates = Vec::new();
    let mut seen_names: HashSet<String> = HashSet::new();

    for record in csv_reader.records() {
        let record = record.map_err(RosterError::Csv)?;

        // Rows without a name are skipped, matching spreadsheet padding rows.
        let Some(name) = optional_cell(record.get(columns.name)) else {
            continue;
        };
        let name = name.to_string();
        if !seen_names.insert(name.clone()) {
            return Err(InvalidInput::DuplicateName(name).into());
        }

        let primary_raw = optional_cell(record.get(columns.primary)).unwrap_or_default();
        let primary =
            Attribute::parse(primary_raw).ok_or_else(|| InvalidInput::UnknownAttribute {
                candidate: name.clone(),
                value: primary_raw.to_string(),
            })?;

        let secondary_cell = columns
            .secondary
            .and_then(|index| optional_cell(record.get(index)));
        let secondary = match secondary_cell {
            Some(raw) => {
                Some(
                    Attribute::parse(raw).ok_or_else(|| InvalidInput::UnknownAttribute {
                        candidate: name.clone(),
                        value: raw.to_string(),
                    })?,
                )
            }
            None => None,
        };

        let mut profile = [0.0; ATTRIBUTE_COUNT];
        for attribute in Attribute::ALL {
            let cell = columns.profile[attribute.index()].and_then(|index| record.get(index));
            profile[attribute.index()] = resolve_multiplier(cell);
        }

        candidates.push(Candidate::new(name, primary, secondary, profile));
    }

    if candidates.is_empty() {
        return Err(InvalidInput::EmptyRoster.into());
    }

    Ok(candidates)
}
