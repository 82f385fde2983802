use crate::country_goals::CountryGoalsRow;
use crate::flags::FlagCodeResolver;
use crate::error::Result;
use crate::scorers::PlayerGoalsTotal;
use crate::stadiums::StadiumInfo;
use serde::Serialize;

pub const COUNTRY_CHART_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    pub popup_html: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerLayer {
    pub name: String,
    pub markers: Vec<Marker>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPayload {
    pub center: [f64; 2],
    pub zoom: u8,
    pub layers: Vec<MarkerLayer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Column,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<u32>,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    pub stacked: bool,
    pub horizontal_labels: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPayload {
    pub title: String,
    pub kind: ChartKind,
    pub categories: Vec<String>,
    pub series: Vec<ChartSeries>,
    pub style: ChartStyle,
}

/// Finals layer plus a goals-by-country layer. Every final needs a flag for
/// its winner; countries without a known flag are shown without one.
pub fn build_map(
    stadiums: &[StadiumInfo],
    countries: &[CountryGoalsRow],
    flags: &FlagCodeResolver,
) -> Result<MapPayload> {
    let mut finals = Vec::with_capacity(stadiums.len());
    for info in stadiums {
        let flag = flags.flag_for(&info.winner)?;
        finals.push(Marker {
            lat: info.latitude,
            lon: info.longitude,
            popup_html: format!(
                "<b>{}</b><br>{}<br>Winner: {} {}<br>Attendance: {}",
                info.year,
                escape_html(&info.stadium),
                flag,
                escape_html(&info.winner),
                thousands(info.attendance)
            ),
        });
    }

    let goals = countries
        .iter()
        .filter_map(|row| {
            let position = row.coordinates?;
            let name = match flags.flag_for_team(&row.totals.country) {
                Ok(flag) => format!("{} {}", flag, escape_html(&row.totals.country)),
                Err(_) => escape_html(&row.totals.country),
            };
            Some(Marker {
                lat: position.latitude,
                lon: position.longitude,
                popup_html: format!(
                    "<b>{}</b><br>Home goals: {}<br>Away goals: {}<br>Total: {}",
                    name, row.totals.home_goals, row.totals.away_goals, row.totals.total_goals
                ),
            })
        })
        .collect();

    Ok(MapPayload {
        center: [20.0, 0.0],
        zoom: 2,
        layers: vec![
            MarkerLayer {
                name: "World Cup finals".to_string(),
                markers: finals,
            },
            MarkerLayer {
                name: "Goals by country".to_string(),
                markers: goals,
            },
        ],
    })
}

/// Stacked home/away bars for the highest-scoring countries.
pub fn country_goals_chart(countries: &[CountryGoalsRow]) -> ChartPayload {
    let top: Vec<&CountryGoalsRow> = countries.iter().take(COUNTRY_CHART_LIMIT).collect();

    ChartPayload {
        title: "Goals per country".to_string(),
        kind: ChartKind::Bar,
        categories: top.iter().map(|r| r.totals.country.clone()).collect(),
        series: vec![
            ChartSeries {
                name: "Home goals".to_string(),
                values: top.iter().map(|r| r.totals.home_goals).collect(),
                color: "#1f77b4".to_string(),
            },
            ChartSeries {
                name: "Away goals".to_string(),
                values: top.iter().map(|r| r.totals.away_goals).collect(),
                color: "#ff7f0e".to_string(),
            },
        ],
        style: ChartStyle {
            width: 900,
            height: 600,
            stacked: true,
            horizontal_labels: false,
        },
    }
}

pub fn top_scorers_chart(scorers: &[PlayerGoalsTotal]) -> ChartPayload {
    ChartPayload {
        title: format!("Top {} goal scorers", scorers.len()),
        kind: ChartKind::Column,
        categories: scorers.iter().map(|s| s.player.clone()).collect(),
        series: vec![ChartSeries {
            name: "Goals".to_string(),
            values: scorers.iter().map(|s| s.goals).collect(),
            color: "#2ca02c".to_string(),
        }],
        style: ChartStyle {
            width: 800,
            height: 500,
            stacked: false,
            horizontal_labels: true,
        },
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// `98765` -> `98,765`
pub fn thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
