//! Safety-weighted exit selection
//!
//! Every candidate exit gets a cost made of three parts:
//! - the straight-line distance from the current position
//! - a fixed penalty for each restricted area the exit sits inside
//! - inverse-distance penalties from nearby incidents, scaled by severity
//!
//! The cheapest exit wins; ties go to the exit listed first.

use thiserror::Error;
use tracing::debug;

use crate::config::ScoringConfig;
use crate::domain::{Exit, Incident, Point, RestrictedArea};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoreError {
    #[error("no candidate exits to choose from")]
    NoCandidateExits,
    #[error("position ({lat}, {lng}) is not a finite coordinate")]
    InvalidPosition { lat: f64, lng: f64 },
}

/// Cost breakdown for one exit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitScore {
    /// Index into the exit slice that was scored
    pub exit_index: usize,
    pub base_distance: f64,
    pub restricted_penalty: f64,
    pub incident_penalty: f64,
}

impl ExitScore {
    pub fn total(&self) -> f64 {
        self.base_distance + self.restricted_penalty + self.incident_penalty
    }
}

/// The selected exit together with how it was scored
#[derive(Debug, Clone, PartialEq)]
pub struct ExitChoice {
    pub exit: Exit,
    /// Position the exit was scored from
    pub position: Point,
    pub score: ExitScore,
}

fn score_exit(
    index: usize,
    position: Point,
    exit: &Exit,
    restricted: &[RestrictedArea],
    incidents: &[Incident],
    config: &ScoringConfig,
) -> ExitScore {
    let base_distance = position.distance(&exit.location);

    let restricted_penalty = restricted
        .iter()
        .filter(|area| area.is_valid() && area.contains(exit.location))
        .map(|_| config.restricted_penalty)
        .sum();

    let incident_penalty = incidents
        .iter()
        .filter(|incident| incident.location.is_finite())
        .map(|incident| {
            let d = incident.location.distance(&exit.location);
            incident.weight() / d.max(config.distance_floor)
        })
        .sum();

    ExitScore {
        exit_index: index,
        base_distance,
        restricted_penalty,
        incident_penalty,
    }
}

/// Score every usable exit, in input order.
///
/// Exits with non-finite locations are left out; restricted areas and
/// incidents with malformed geometry are ignored rather than rejected.
pub fn score_exits(
    position: Point,
    exits: &[Exit],
    restricted: &[RestrictedArea],
    incidents: &[Incident],
    config: &ScoringConfig,
) -> Result<Vec<ExitScore>, ScoreError> {
    if !position.is_finite() {
        return Err(ScoreError::InvalidPosition {
            lat: position.lat,
            lng: position.lng,
        });
    }

    let scores: Vec<ExitScore> = exits
        .iter()
        .enumerate()
        .filter(|(_, exit)| exit.location.is_finite())
        .map(|(i, exit)| score_exit(i, position, exit, restricted, incidents, config))
        .collect();

    if scores.is_empty() {
        return Err(ScoreError::NoCandidateExits);
    }

    Ok(scores)
}

/// Pick the exit with the strictly lowest score
pub fn select_exit(
    position: Point,
    exits: &[Exit],
    restricted: &[RestrictedArea],
    incidents: &[Incident],
    config: &ScoringConfig,
) -> Result<ExitChoice, ScoreError> {
    let scores = score_exits(position, exits, restricted, incidents, config)?;

    let mut best = scores[0];
    for score in &scores[1..] {
        if score.total() < best.total() {
            best = *score;
        }
    }

    let exit = exits[best.exit_index].clone();
    debug!(
        exit = %exit.name,
        score = best.total(),
        candidates = scores.len(),
        "selected exit"
    );

    Ok(ExitChoice {
        exit,
        position,
        score: best,
    })
}
