use crate::coordinates::{CoordinateEntry, CoordinateTable};
use crate::corrections::NameCorrections;
use crate::error::{AnalysisError, Result};
use crate::records::{MatchRecord, TournamentSummary};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StadiumInfo {
    pub year: i32,
    pub winner: String,
    pub stadium: String,
    pub attendance: i64,
    pub latitude: f64,
    pub longitude: f64,
}

/// One row per final: winner from the tournament summary, stadium and
/// attendance from the final match, position from the fixed coordinate table.
/// Summaries and year-keyed coordinate rows are joined by year; a table
/// without a year column is zipped with the finals in year order and must
/// have exactly one row per final.
///
/// `matches` may be the full match list; only final-stage rows are used.
/// Tournaments without a final-stage match are skipped.
pub fn aggregate_stadiums(
    summaries: &[TournamentSummary],
    matches: &[MatchRecord],
    coordinates: &CoordinateTable,
    display_names: &NameCorrections,
) -> Result<Vec<StadiumInfo>> {
    let mut finals: Vec<(i32, &MatchRecord)> = Vec::new();
    for record in matches.iter().filter(|m| m.is_final()) {
        let Some(year) = record.year else {
            return Err(AnalysisError::MissingData(format!(
                "final {} vs {} has no year",
                record.home_team, record.away_team
            )));
        };
        finals.push((year, record));
    }
    finals.sort_by_key(|(year, _)| *year);

    if let Some(pair) = finals.windows(2).find(|pair| pair[0].0 == pair[1].0) {
        return Err(AnalysisError::DataAlignment(format!(
            "more than one final recorded for {}",
            pair[0].0
        )));
    }

    let mut by_year: HashMap<i32, &TournamentSummary> = HashMap::with_capacity(summaries.len());
    for summary in summaries {
        if by_year.insert(summary.year, summary).is_some() {
            return Err(AnalysisError::DataAlignment(format!(
                "more than one tournament summary for {}",
                summary.year
            )));
        }
    }

    for summary in summaries {
        if finals.binary_search_by_key(&summary.year, |(year, _)| *year).is_err() {
            warn!(year = summary.year, "tournament has no final-stage match; skipped");
        }
    }

    let positions: Vec<&CoordinateEntry> = match coordinates.by_year()? {
        Some(keyed) => finals
            .iter()
            .map(|(year, _)| {
                keyed.get(year).copied().ok_or_else(|| {
                    AnalysisError::DataAlignment(format!(
                        "final of {} has no stadium coordinate row",
                        year
                    ))
                })
            })
            .collect::<Result<_>>()?,
        None => {
            if coordinates.len() != finals.len() {
                return Err(AnalysisError::DataAlignment(format!(
                    "{} final matches but {} coordinate rows",
                    finals.len(),
                    coordinates.len()
                )));
            }
            coordinates.entries().iter().collect()
        }
    };

    let mut rows = Vec::with_capacity(finals.len());
    for ((year, record), entry) in finals.into_iter().zip(positions) {
        let Some(summary) = by_year.get(&year) else {
            return Err(AnalysisError::DataAlignment(format!(
                "final of {} has no tournament summary",
                year
            )));
        };

        let stadium = record.stadium.clone().ok_or_else(|| {
            AnalysisError::MissingData(format!("final of {} has no stadium", year))
        })?;
        let attendance = record.attendance.ok_or_else(|| {
            AnalysisError::MissingData(format!("final of {} has no attendance", year))
        })?;

        let winner = display_names.apply(summary.winner.trim()).to_string();
        debug!(year, %winner, %stadium, coordinates = %entry.label, "paired final");

        rows.push(StadiumInfo {
            year,
            winner,
            stadium,
            attendance,
            latitude: entry.coordinates.latitude,
            longitude: entry.coordinates.longitude,
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinates::Coordinates;

    fn final_match(year: i32, stadium: &str, attendance: i64) -> MatchRecord {
        MatchRecord {
            year: Some(year),
            match_id: None,
            stage: "Final".to_string(),
            stadium: Some(stadium.to_string()),
            attendance: Some(attendance),
            home_team: "A".to_string(),
            away_team: "B".to_string(),
            home_goals: Some(1),
            away_goals: Some(0),
        }
    }

    fn summary(year: i32, winner: &str) -> TournamentSummary {
        TournamentSummary {
            year,
            country: None,
            winner: winner.to_string(),
        }
    }

    fn table(n: usize) -> CoordinateTable {
        CoordinateTable::new(
            (0..n)
                .map(|i| CoordinateEntry {
                    year: None,
                    label: format!("row {}", i),
                    coordinates: Coordinates::new(i as f64, -(i as f64)).unwrap(),
                })
                .collect(),
        )
    }

    fn keyed_table(years: &[i32]) -> CoordinateTable {
        CoordinateTable::new(
            years
                .iter()
                .map(|&year| CoordinateEntry {
                    year: Some(year),
                    label: format!("ground {}", year),
                    coordinates: Coordinates::new(f64::from(year - 1900) / 2.0, 0.0).unwrap(),
                })
                .collect(),
        )
    }

    #[test]
    fn joins_by_year_and_zips_coordinates_in_year_order() {
        let summaries = vec![summary(1966, "England"), summary(1954, "Germany FR")];
        let mut group = final_match(1966, "Group stage ground", 1);
        group.stage = "Group 1".to_string();
        let matches = vec![
            final_match(1966, "Wembley Stadium", 96924),
            group,
            final_match(1954, "Wankdorf Stadium", 62500),
        ];

        let names = NameCorrections::display_names();
        let rows = aggregate_stadiums(&summaries, &matches, &table(2), &names)
            .expect("aligned inputs");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].year, 1954);
        assert_eq!(rows[0].winner, "Germany");
        assert_eq!(rows[0].stadium, "Wankdorf Stadium");
        assert_eq!((rows[0].latitude, rows[0].longitude), (0.0, 0.0));
        assert_eq!(rows[1].winner, "United Kingdom");
        assert_eq!(rows[1].attendance, 96924);
        assert_eq!((rows[1].latitude, rows[1].longitude), (1.0, -1.0));
    }

    #[test]
    fn keyed_table_skips_tournaments_without_a_final() {
        let summaries = vec![
            summary(1938, "Italy"),
            summary(1950, "Uruguay"),
            summary(1954, "Germany FR"),
        ];
        let matches = vec![
            final_match(1954, "Wankdorf Stadium", 62500),
            final_match(1938, "Stade Olympique de Colombes", 45000),
        ];
        let coordinates = keyed_table(&[1938, 1950, 1954]);

        let names = NameCorrections::default();
        let rows = aggregate_stadiums(&summaries, &matches, &coordinates, &names)
            .expect("summary without a final is skipped");

        assert_eq!(rows.iter().map(|r| r.year).collect::<Vec<_>>(), vec![1938, 1954]);
        assert_eq!(rows[0].latitude, 19.0);
        assert_eq!(rows[1].latitude, 27.0);
    }

    #[test]
    fn final_without_keyed_coordinate_row_is_alignment_error() {
        let summaries = vec![summary(1930, "Uruguay"), summary(1934, "Italy")];
        let matches = vec![
            final_match(1930, "Estadio Centenario", 68346),
            final_match(1934, "Stadio Nazionale PNF", 55000),
        ];
        let coordinates = keyed_table(&[1930, 1938]);
        let names = NameCorrections::default();
        let err = aggregate_stadiums(&summaries, &matches, &coordinates, &names).unwrap_err();
        assert!(matches!(err, AnalysisError::DataAlignment(ref m) if m.contains("1934")));
    }

    #[test]
    fn positional_count_mismatch_is_alignment_error() {
        let summaries = vec![summary(1930, "Uruguay"), summary(1934, "Italy")];
        let matches = vec![final_match(1930, "Estadio Centenario", 68346)];
        let err = aggregate_stadiums(&summaries, &matches, &table(2), &NameCorrections::default())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::DataAlignment(_)));
    }

    #[test]
    fn duplicate_summary_year_is_alignment_error() {
        let summaries = vec![summary(1930, "Uruguay"), summary(1930, "Argentina")];
        let matches = vec![
            final_match(1930, "Estadio Centenario", 68346),
            final_match(1934, "Stadio Nazionale PNF", 55000),
        ];
        let err = aggregate_stadiums(&summaries, &matches, &table(2), &NameCorrections::default())
            .unwrap_err();
        assert!(
            matches!(err, AnalysisError::DataAlignment(ref m) if m.contains("tournament summary"))
        );
    }

    #[test]
    fn two_finals_in_one_year_is_alignment_error() {
        let summaries = vec![summary(1930, "Uruguay"), summary(1934, "Italy")];
        let matches = vec![
            final_match(1930, "Estadio Centenario", 68346),
            final_match(1930, "Estadio Pocitos", 1000),
        ];
        let err = aggregate_stadiums(&summaries, &matches, &table(2), &NameCorrections::default())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::DataAlignment(ref m) if m.contains("one final")));
    }

    #[test]
    fn final_without_summary_is_alignment_error() {
        let summaries = vec![summary(1930, "Uruguay")];
        let matches = vec![final_match(1934, "Stadio Nazionale PNF", 55000)];
        let err = aggregate_stadiums(&summaries, &matches, &table(1), &NameCorrections::default())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::DataAlignment(_)));
    }

    #[test]
    fn final_without_attendance_is_missing_data() {
        let summaries = vec![summary(1930, "Uruguay")];
        let mut record = final_match(1930, "Estadio Centenario", 0);
        record.attendance = None;
        let err = aggregate_stadiums(&summaries, &[record], &table(1), &NameCorrections::default())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::MissingData(_)));
    }
}
