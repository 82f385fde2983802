use crate::error::{AnalysisError, Result};
use csv::{ReaderBuilder, StringRecord};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One match row. Optional fields are blank in some source rows; the
/// aggregators decide whether a blank is skipped or fatal.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub year: Option<i32>,
    pub match_id: Option<i64>,
    pub stage: String,
    pub stadium: Option<String>,
    pub attendance: Option<i64>,
    pub home_team: String,
    pub away_team: String,
    pub home_goals: Option<u32>,
    pub away_goals: Option<u32>,
}

impl MatchRecord {
    pub fn is_final(&self) -> bool {
        self.stage.trim().eq_ignore_ascii_case("final")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TournamentSummary {
    pub year: i32,
    pub country: Option<String>,
    pub winner: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerEventRecord {
    pub player_name: String,
    pub event: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Matches,
    Players,
    Summaries,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Table::Matches => "matches",
            Table::Players => "players",
            Table::Summaries => "summaries",
        };
        f.write_str(name)
    }
}

/// Data-access seam: hands back the raw text of one table.
pub trait TableSource {
    fn read_table(&self, table: Table) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct TableFiles {
    pub matches: String,
    pub players: String,
    pub summaries: String,
}

impl Default for TableFiles {
    fn default() -> Self {
        Self {
            matches: "WorldCupMatches.csv".to_string(),
            players: "WorldCupPlayers.csv".to_string(),
            summaries: "WorldCups.csv".to_string(),
        }
    }
}

/// Reads the three CSV files from one directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
    files: TableFiles,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>, files: TableFiles) -> Self {
        Self {
            dir: dir.into(),
            files,
        }
    }

    fn path_for(&self, table: Table) -> PathBuf {
        let name = match table {
            Table::Matches => &self.files.matches,
            Table::Players => &self.files.players,
            Table::Summaries => &self.files.summaries,
        };
        self.dir.join(name)
    }
}

impl TableSource for DirSource {
    fn read_table(&self, table: Table) -> Result<String> {
        read_text_lossy(&self.path_for(table))
    }
}

/// The source files are not clean UTF-8; invalid bytes become U+FFFD, which
/// is the form the name correction tables are keyed on.
pub fn read_text_lossy(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| AnalysisError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub matches: Vec<MatchRecord>,
    pub players: Vec<PlayerEventRecord>,
    pub summaries: Vec<TournamentSummary>,
}

impl Dataset {
    pub fn load(source: &dyn TableSource) -> Result<Self> {
        let matches = parse_matches(&source.read_table(Table::Matches)?)?;
        let players = parse_players(&source.read_table(Table::Players)?)?;
        let summaries = parse_summaries(&source.read_table(Table::Summaries)?)?;

        info!(
            matches = matches.len(),
            players = players.len(),
            summaries = summaries.len(),
            "loaded dataset"
        );

        Ok(Self {
            matches,
            players,
            summaries,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawMatch {
    #[serde(rename = "Year", default, deserialize_with = "lenient_i64")]
    year: Option<i64>,
    #[serde(rename = "MatchID", default, deserialize_with = "lenient_i64")]
    match_id: Option<i64>,
    #[serde(rename = "Stage", default)]
    stage: Option<String>,
    #[serde(rename = "Stadium", default)]
    stadium: Option<String>,
    #[serde(rename = "Attendance", default, deserialize_with = "lenient_i64")]
    attendance: Option<i64>,
    #[serde(rename = "Home Team Name", default)]
    home_team: Option<String>,
    #[serde(rename = "Away Team Name", default)]
    away_team: Option<String>,
    #[serde(rename = "Home Team Goals", default, deserialize_with = "lenient_u32")]
    home_goals: Option<u32>,
    #[serde(rename = "Away Team Goals", default, deserialize_with = "lenient_u32")]
    away_goals: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawPlayer {
    #[serde(rename = "Player Name", default)]
    player_name: Option<String>,
    #[serde(rename = "Event", default)]
    event: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSummary {
    #[serde(rename = "Year", default, deserialize_with = "lenient_i64")]
    year: Option<i64>,
    #[serde(rename = "Country", default)]
    country: Option<String>,
    #[serde(rename = "Winner", default)]
    winner: Option<String>,
}

const MATCH_COLUMNS: &[&str] = &[
    "Year",
    "Stage",
    "Stadium",
    "Attendance",
    "Home Team Name",
    "Away Team Name",
    "Home Team Goals",
    "Away Team Goals",
];
const PLAYER_COLUMNS: &[&str] = &["Player Name", "Event"];
const SUMMARY_COLUMNS: &[&str] = &["Year", "Winner"];

pub fn parse_matches(text: &str) -> Result<Vec<MatchRecord>> {
    let raw: Vec<RawMatch> = read_rows(text, "matches", MATCH_COLUMNS)?;
    let mut seen_ids: HashSet<i64> = HashSet::new();
    let mut matches = Vec::with_capacity(raw.len());
    let mut duplicates = 0usize;

    for row in raw {
        if let Some(id) = row.match_id {
            if !seen_ids.insert(id) {
                duplicates += 1;
                continue;
            }
        }

        let year = match row.year {
            Some(y) => Some(i32::try_from(y).map_err(|_| {
                AnalysisError::MissingData(format!("match year {} out of range", y))
            })?),
            None => None,
        };

        matches.push(MatchRecord {
            year,
            match_id: row.match_id,
            stage: row.stage.unwrap_or_default().trim().to_string(),
            stadium: non_blank(row.stadium),
            attendance: row.attendance,
            home_team: row.home_team.unwrap_or_default(),
            away_team: row.away_team.unwrap_or_default(),
            home_goals: row.home_goals,
            away_goals: row.away_goals,
        });
    }

    if duplicates > 0 {
        warn!(duplicates, "dropped repeated match rows");
    }

    Ok(matches)
}

pub fn parse_players(text: &str) -> Result<Vec<PlayerEventRecord>> {
    let raw: Vec<RawPlayer> = read_rows(text, "players", PLAYER_COLUMNS)?;
    Ok(raw
        .into_iter()
        .map(|row| PlayerEventRecord {
            player_name: row.player_name.unwrap_or_default(),
            event: row.event.unwrap_or_default(),
        })
        .collect())
}

pub fn parse_summaries(text: &str) -> Result<Vec<TournamentSummary>> {
    let raw: Vec<RawSummary> = read_rows(text, "summaries", SUMMARY_COLUMNS)?;
    let mut summaries = Vec::with_capacity(raw.len());

    for row in raw {
        let Some(year) = row.year else {
            return Err(AnalysisError::MissingData(
                "tournament summary without a year".to_string(),
            ));
        };
        let year = i32::try_from(year).map_err(|_| {
            AnalysisError::MissingData(format!("tournament year {} out of range", year))
        })?;
        let Some(winner) = non_blank(row.winner) else {
            return Err(AnalysisError::MissingData(format!(
                "tournament {} has no winner",
                year
            )));
        };

        summaries.push(TournamentSummary {
            year,
            country: non_blank(row.country),
            winner,
        });
    }

    Ok(summaries)
}

/// Deserializes every non-blank row of a headed CSV. Columns listed in
/// `required` must be present in the header.
pub(crate) fn read_rows<T: DeserializeOwned>(
    text: &str,
    table: &str,
    required: &[&str],
) -> Result<Vec<T>> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|source| csv_error(table, source))?
        .clone();
    let headers = StringRecord::from(headers.iter().map(str::trim).collect::<Vec<_>>());

    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(AnalysisError::MissingData(format!(
                "column '{}' absent from {} table",
                column, table
            )));
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| csv_error(table, source))?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let row: T = record
            .deserialize(Some(&headers))
            .map_err(|source| csv_error(table, source))?;
        rows.push(row);
    }

    Ok(rows)
}

fn csv_error(table: &str, source: csv::Error) -> AnalysisError {
    AnalysisError::Csv {
        table: table.to_string(),
        source,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// Numeric columns show up as "1930", "1930.0" or blank depending on the export.
fn parse_whole_number(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    let value = trimmed.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 {
        Some(value as i64)
    } else {
        None
    }
}

fn lenient_i64<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse_whole_number(text)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("'{}' is not a whole number", text))),
    }
}

fn lenient_u32<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match lenient_i64(deserializer)? {
        None => Ok(None),
        Some(value) => u32::try_from(value)
            .map(Some)
            .map_err(|_| {
                D::Error::custom(format!("goal count {} is negative or too large", value))
            }),
    }
}
