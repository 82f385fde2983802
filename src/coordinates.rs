use crate::error::{AnalysisError, Result};
use crate::records::{read_rows, read_text_lossy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

const DEFAULT_STADIUMS: &str = include_str!("../data/stadium_coordinates.csv");
const DEFAULT_COUNTRIES: &str = include_str!("../data/country_coordinates.csv");

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(AnalysisError::MissingData(format!(
                "coordinates ({}, {}) are not a valid position",
                latitude, longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateEntry {
    pub year: Option<i32>,
    pub label: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    year: Option<i32>,
    label: String,
    latitude: f64,
    longitude: f64,
}

/// Fixed coordinate rows for the finals. With a `year` column the rows are
/// looked up by year; without one, row `i` belongs to the `i`-th final in
/// year order.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateTable {
    entries: Vec<CoordinateEntry>,
}

impl CoordinateTable {
    pub fn new(entries: Vec<CoordinateEntry>) -> Self {
        Self { entries }
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(Self::new(parse_entries(text, "stadium coordinates")?))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Self::parse(&read_text_lossy(path)?)
    }

    /// One row per tournament, 1930 through 2014, keyed by year.
    pub fn default_stadiums() -> Result<Self> {
        Self::parse(DEFAULT_STADIUMS)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CoordinateEntry] {
        &self.entries
    }

    /// Year-keyed rows, or `None` when the table has no year column. A table
    /// where only some rows carry a year is rejected.
    pub fn by_year(&self) -> Result<Option<HashMap<i32, &CoordinateEntry>>> {
        let keyed = self.entries.iter().filter(|e| e.year.is_some()).count();
        if keyed == 0 {
            return Ok(None);
        }
        if keyed != self.entries.len() {
            return Err(AnalysisError::MissingData(format!(
                "{} of {} stadium coordinate rows have no year",
                self.entries.len() - keyed,
                self.entries.len()
            )));
        }

        let mut by_year = HashMap::with_capacity(self.entries.len());
        for entry in &self.entries {
            let Some(year) = entry.year else { continue };
            if by_year.insert(year, entry).is_some() {
                return Err(AnalysisError::DataAlignment(format!(
                    "more than one stadium coordinate row for {}",
                    year
                )));
            }
        }
        Ok(Some(by_year))
    }
}

/// Country name to map position.
#[derive(Debug, Clone, Default)]
pub struct CountryCoordinates {
    by_name: HashMap<String, Coordinates>,
}

impl CountryCoordinates {
    pub fn parse(text: &str) -> Result<Self> {
        let by_name = parse_entries(text, "country coordinates")?
            .into_iter()
            .map(|entry| (entry.label, entry.coordinates))
            .collect();
        Ok(Self { by_name })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Self::parse(&read_text_lossy(path)?)
    }

    pub fn default_countries() -> Result<Self> {
        Self::parse(DEFAULT_COUNTRIES)
    }

    pub fn insert(&mut self, country: impl Into<String>, coordinates: Coordinates) {
        self.by_name.insert(country.into(), coordinates);
    }

    pub fn get(&self, country: &str) -> Option<Coordinates> {
        self.by_name.get(country.trim()).copied()
    }
}

fn parse_entries(text: &str, table: &str) -> Result<Vec<CoordinateEntry>> {
    let raw: Vec<RawEntry> = read_rows(text, table, &["label", "latitude", "longitude"])?;
    raw.into_iter()
        .map(|row| {
            Ok(CoordinateEntry {
                year: row.year,
                label: row.label.trim().to_string(),
                coordinates: Coordinates::new(row.latitude, row.longitude)?,
            })
        })
        .collect()
}
