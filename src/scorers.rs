use crate::corrections::NameCorrections;
use crate::error::{AnalysisError, Result};
use crate::records::PlayerEventRecord;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::OnceLock;
use tracing::debug;

pub const TOP_N_RANGE: RangeInclusive<usize> = 5..=15;
pub const DEFAULT_TOP_N: usize = 10;

static GOAL_TOKEN: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerGoalsTotal {
    pub player: String,
    pub goals: u32,
}

pub fn validate_top_n(top_n: usize) -> Result<usize> {
    if TOP_N_RANGE.contains(&top_n) {
        Ok(top_n)
    } else {
        Err(AnalysisError::InvalidRange {
            value: top_n,
            min: *TOP_N_RANGE.start(),
            max: *TOP_N_RANGE.end(),
        })
    }
}

/// Goal tokens in one event cell, e.g. `"G43' Y60' G87'"` has two.
pub fn count_goal_tokens(event: &str) -> u32 {
    let token = GOAL_TOKEN.get_or_init(|| Regex::new(r"G\d{2}'").expect("static pattern"));
    u32::try_from(token.find_iter(event).count()).unwrap_or(u32::MAX)
}

/// Top `top_n` goal scorers, most goals first. Players with equal counts
/// keep the order in which they first appear in `players`.
pub fn top_scorers(
    players: &[PlayerEventRecord],
    top_n: usize,
    name_fixes: &NameCorrections,
) -> Result<Vec<PlayerGoalsTotal>> {
    let top_n = validate_top_n(top_n)?;

    let mut order: Vec<String> = Vec::new();
    let mut goals: HashMap<String, u32> = HashMap::new();

    for record in players.iter().filter(|r| !r.event.trim().is_empty()) {
        let scored = count_goal_tokens(&record.event);
        if scored == 0 {
            continue;
        }
        let name = record.player_name.trim().to_uppercase();
        if name.is_empty() {
            return Err(AnalysisError::MissingData(format!(
                "goal event '{}' has no player name",
                record.event
            )));
        }
        add_goals(&mut order, &mut goals, name, scored);
    }

    let mut totals = apply_name_fixes(order, goals, name_fixes);
    totals.sort_by(|a, b| b.goals.cmp(&a.goals));
    totals.truncate(top_n);
    Ok(totals)
}

fn add_goals(
    order: &mut Vec<String>,
    goals: &mut HashMap<String, u32>,
    name: String,
    scored: u32,
) {
    match goals.get_mut(&name) {
        Some(total) => *total += scored,
        None => {
            order.push(name.clone());
            goals.insert(name, scored);
        }
    }
}

fn apply_name_fixes(
    order: Vec<String>,
    goals: HashMap<String, u32>,
    name_fixes: &NameCorrections,
) -> Vec<PlayerGoalsTotal> {
    let mut fixed_order: Vec<String> = Vec::with_capacity(order.len());
    let mut fixed: HashMap<String, u32> = HashMap::with_capacity(goals.len());

    for name in order {
        let scored = goals.get(&name).copied().unwrap_or_default();
        let corrected = match name_fixes.get(&name) {
            Some(corrected) => {
                debug!(from = %name, to = corrected, "corrected player name");
                corrected.to_string()
            }
            None => name,
        };
        add_goals(&mut fixed_order, &mut fixed, corrected, scored);
    }

    fixed_order
        .into_iter()
        .map(|player| {
            let goals = fixed.get(&player).copied().unwrap_or_default();
            PlayerGoalsTotal { player, goals }
        })
        .collect()
}
