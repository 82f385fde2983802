use crate::coordinates::{Coordinates, CountryCoordinates};
use crate::corrections::NameCorrections;
use crate::error::{AnalysisError, Result};
use crate::records::MatchRecord;
use polars::prelude::*;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, warn};

static MALFORMED_PREFIX: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryGoalsTotal {
    pub country: String,
    pub home_goals: u32,
    pub away_goals: u32,
    pub total_goals: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryGoalsRow {
    #[serde(flatten)]
    pub totals: CountryGoalsTotal,
    pub coordinates: Option<Coordinates>,
}

/// Some team names in the export carry a leftover HTML fragment such as
/// `rn">` in front of the real name.
pub fn normalize_team_name(raw: &str) -> String {
    let prefix = MALFORMED_PREFIX
        .get_or_init(|| Regex::new(r#"^\s*[a-z]{1,4}">"#).expect("static pattern"));
    prefix.replace(raw, "").trim().to_string()
}

/// Home and away goals per country, merged so that every country seen on
/// either side gets a row (the missing side counts as zero), then patched.
///
/// Rows with a blank goal cell are dropped.
pub fn aggregate_country_goals(
    matches: &[MatchRecord],
    patches: &NameCorrections,
) -> Result<Vec<CountryGoalsTotal>> {
    let mut home_teams: Vec<String> = Vec::with_capacity(matches.len());
    let mut home_goals: Vec<i64> = Vec::with_capacity(matches.len());
    let mut away_teams: Vec<String> = Vec::with_capacity(matches.len());
    let mut away_goals: Vec<i64> = Vec::with_capacity(matches.len());
    let mut dropped = 0usize;

    for record in matches {
        let (Some(home), Some(away)) = (record.home_goals, record.away_goals) else {
            dropped += 1;
            continue;
        };
        home_teams.push(required_team(&record.home_team, record)?);
        home_goals.push(i64::from(home));
        away_teams.push(required_team(&record.away_team, record)?);
        away_goals.push(i64::from(away));
    }

    if dropped > 0 {
        warn!(dropped, "skipped matches without a goal count");
    }
    if home_teams.is_empty() {
        return Ok(Vec::new());
    }

    let home_table = side_totals(home_teams, home_goals, "home_goals", "away_goals")?;
    let away_table = side_totals(away_teams, away_goals, "away_goals", "home_goals")?;

    let merged = concat([home_table, away_table], UnionArgs::default())?
        .group_by([col("country")])
        .agg([
            col("home_goals").sum().cast(DataType::Int64),
            col("away_goals").sum().cast(DataType::Int64),
        ])
        .sort("country", SortOptions::default())
        .collect()?;

    let totals = frame_to_totals(&merged)?;
    Ok(apply_patches(totals, patches))
}

/// Sums one side per country and adds the other side as a zero column, so
/// the two sides stack into one frame with the same schema.
fn side_totals(
    teams: Vec<String>,
    goals: Vec<i64>,
    goals_column: &str,
    other_column: &str,
) -> Result<LazyFrame> {
    let frame = DataFrame::new(vec![
        Series::new("country", teams),
        Series::new(goals_column, goals),
    ])?;

    Ok(frame
        .lazy()
        .group_by([col("country")])
        .agg([col(goals_column).sum().cast(DataType::Int64)])
        .with_column(lit(0i64).alias(other_column))
        .select([col("country"), col("home_goals"), col("away_goals")]))
}

fn frame_to_totals(frame: &DataFrame) -> Result<Vec<CountryGoalsTotal>> {
    let countries = frame.column("country")?.str()?;
    let home_column = frame.column("home_goals")?.i64()?;
    let away_column = frame.column("away_goals")?.i64()?;

    let mut totals = Vec::with_capacity(frame.height());
    for idx in 0..frame.height() {
        let (Some(country), Some(home), Some(away)) = (
            countries.get(idx),
            home_column.get(idx),
            away_column.get(idx),
        )
        else {
            return Err(AnalysisError::MissingData(format!(
                "merged goals table has an empty cell in row {}",
                idx
            )));
        };
        let home = goal_count(home)?;
        let away = goal_count(away)?;
        totals.push(CountryGoalsTotal {
            country: country.to_string(),
            home_goals: home,
            away_goals: away,
            total_goals: home + away,
        });
    }
    Ok(totals)
}

fn goal_count(value: i64) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| AnalysisError::MissingData(format!("goal sum {} out of range", value)))
}

/// Folds every patched row into its canonical country and re-sorts by total.
pub fn apply_patches(
    totals: Vec<CountryGoalsTotal>,
    patches: &NameCorrections,
) -> Vec<CountryGoalsTotal> {
    let mut order: Vec<String> = Vec::with_capacity(totals.len());
    let mut by_country: HashMap<String, CountryGoalsTotal> = HashMap::with_capacity(totals.len());

    for row in totals {
        let country = match patches.get(&row.country) {
            Some(canonical) => {
                debug!(from = %row.country, to = canonical, "patched country row");
                canonical.to_string()
            }
            None => row.country.clone(),
        };

        match by_country.get_mut(&country) {
            Some(existing) => {
                existing.home_goals += row.home_goals;
                existing.away_goals += row.away_goals;
                existing.total_goals = existing.home_goals + existing.away_goals;
            }
            None => {
                order.push(country.clone());
                by_country.insert(
                    country.clone(),
                    CountryGoalsTotal {
                        country,
                        home_goals: row.home_goals,
                        away_goals: row.away_goals,
                        total_goals: row.home_goals + row.away_goals,
                    },
                );
            }
        }
    }

    let mut rows: Vec<CountryGoalsTotal> = order
        .into_iter()
        .filter_map(|country| by_country.remove(&country))
        .collect();
    rows.sort_by(|a, b| {
        b.total_goals
            .cmp(&a.total_goals)
            .then_with(|| a.country.cmp(&b.country))
    });
    rows
}

pub fn attach_coordinates(
    totals: Vec<CountryGoalsTotal>,
    coordinates: &CountryCoordinates,
) -> Vec<CountryGoalsRow> {
    totals
        .into_iter()
        .map(|totals| {
            let position = coordinates.get(&totals.country);
            if position.is_none() {
                warn!(country = %totals.country, "no map position for country");
            }
            CountryGoalsRow {
                totals,
                coordinates: position,
            }
        })
        .collect()
}

fn required_team(raw: &str, record: &MatchRecord) -> Result<String> {
    let name = normalize_team_name(raw);
    if name.is_empty() {
        return Err(AnalysisError::MissingData(format!(
            "match {} ({}) has a blank team name",
            record
                .match_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "without id".to_string()),
            record.year.map(|y| y.to_string()).unwrap_or_default()
        )));
    }
    Ok(name)
}
