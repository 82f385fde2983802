use crate::coordinates::{CoordinateTable, CountryCoordinates};
use crate::corrections::NameCorrections;
use crate::country_goals::{aggregate_country_goals, attach_coordinates, CountryGoalsRow};
use crate::error::Result;
use crate::flags::{CountryCodes, FlagCodeResolver};
use crate::records::Dataset;
use crate::render::{self, ChartPayload, MapPayload};
use crate::scorers::{top_scorers, PlayerGoalsTotal};
use crate::stadiums::{aggregate_stadiums, StadiumInfo};
use chrono::Utc;
use serde::Serialize;
use std::path::Path;

/// The fixed lookup tables and correction tables every run needs.
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    pub stadium_coordinates: CoordinateTable,
    pub country_coordinates: CountryCoordinates,
    pub flags: FlagCodeResolver,
    pub display_names: NameCorrections,
    pub country_patches: NameCorrections,
    pub player_names: NameCorrections,
}

impl ReferenceTables {
    /// Embedded defaults, each replaceable by a CSV file.
    pub fn load(
        stadium_coordinates: Option<&Path>,
        country_coordinates: Option<&Path>,
        country_codes: Option<&Path>,
    ) -> Result<Self> {
        let stadium_coordinates = match stadium_coordinates {
            Some(path) => CoordinateTable::from_path(path)?,
            None => CoordinateTable::default_stadiums()?,
        };
        let country_coordinates = match country_coordinates {
            Some(path) => CountryCoordinates::from_path(path)?,
            None => CountryCoordinates::default_countries()?,
        };
        let codes = match country_codes {
            Some(path) => CountryCodes::from_path(path)?,
            None => CountryCodes::default_codes()?,
        };

        Ok(Self {
            stadium_coordinates,
            country_coordinates,
            flags: FlagCodeResolver::new(codes),
            display_names: NameCorrections::display_names(),
            country_patches: NameCorrections::country_patches(),
            player_names: NameCorrections::player_names(),
        })
    }

    pub fn stadiums(&self, dataset: &Dataset) -> Result<Vec<StadiumInfo>> {
        aggregate_stadiums(
            &dataset.summaries,
            &dataset.matches,
            &self.stadium_coordinates,
            &self.display_names,
        )
    }

    pub fn country_goals(&self, dataset: &Dataset) -> Result<Vec<CountryGoalsRow>> {
        let totals = aggregate_country_goals(&dataset.matches, &self.country_patches)?;
        Ok(attach_coordinates(totals, &self.country_coordinates))
    }

    pub fn top_scorers(&self, dataset: &Dataset, top_n: usize) -> Result<Vec<PlayerGoalsTotal>> {
        top_scorers(&dataset.players, top_n, &self.player_names)
    }

    /// Flag emoji for a country or team name as it appears in the data.
    pub fn flag(&self, country: &str) -> Result<String> {
        self.flags.flag_for_team(country)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: String,
    pub stadiums: Vec<StadiumInfo>,
    pub country_goals: Vec<CountryGoalsRow>,
    pub top_scorers: Vec<PlayerGoalsTotal>,
    pub map: MapPayload,
    pub charts: Vec<ChartPayload>,
}

pub fn build_report(dataset: &Dataset, tables: &ReferenceTables, top_n: usize) -> Result<Report> {
    let stadiums = tables.stadiums(dataset)?;
    let country_goals = tables.country_goals(dataset)?;
    let scorers = tables.top_scorers(dataset, top_n)?;
    let map = render::build_map(&stadiums, &country_goals, &tables.flags)?;
    let charts = vec![
        render::country_goals_chart(&country_goals),
        render::top_scorers_chart(&scorers),
    ];

    Ok(Report {
        generated_at: Utc::now().to_rfc3339(),
        stadiums,
        country_goals,
        top_scorers: scorers,
        map,
        charts,
    })
}

pub fn print_stadiums(rows: &[StadiumInfo]) {
    println!("== World Cup finals ==");
    for row in rows {
        println!(
            "  {:<6}{:<22}{:<40}{:>10}  ({:.4}, {:.4})",
            row.year,
            row.winner,
            row.stadium,
            render::thousands(row.attendance),
            row.latitude,
            row.longitude
        );
    }
}

pub fn print_country_goals(rows: &[CountryGoalsRow]) {
    println!("== Goals per country ==");
    println!("  {:<28}{:>6}{:>6}{:>7}", "country", "home", "away", "total");
    for row in rows {
        println!(
            "  {:<28}{:>6}{:>6}{:>7}",
            row.totals.country, row.totals.home_goals, row.totals.away_goals, row.totals.total_goals
        );
    }
}

pub fn print_top_scorers(rows: &[PlayerGoalsTotal]) {
    println!("== Top {} goal scorers ==", rows.len());
    for (rank, row) in rows.iter().enumerate() {
        println!("  {:>2}. {:<28}{:>4}", rank + 1, row.player, row.goals);
    }
}
