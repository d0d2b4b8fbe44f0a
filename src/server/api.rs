//! Request parsing and response payloads, independent of the HTTP framework.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::parse_start_at;
use crate::data::Fighter;
use crate::draft::{
    classify_fighters, clamp_pick_delay, estimate_run, rank_pool_with_scores, run_batch_draft,
    DraftEstimate, DraftExport, DraftSlot, RankedFighter,
};

#[derive(Debug)]
pub enum RequestError {
    Parse(serde_json::Error),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "Invalid request body: {err}"),
        }
    }
}

impl std::error::Error for RequestError {}

/// Empty bodies mean "all defaults".
fn parse_body<T>(body: &str) -> Result<T, RequestError>
where
    T: for<'de> Deserialize<'de> + Default,
{
    if body.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(body).map_err(RequestError::Parse)
}

pub fn health_payload() -> serde_json::Value {
    serde_json::json!({
        "status": "ok",
        "service": "draftroom-api",
        "version": env!("CARGO_PKG_VERSION")
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamSummary {
    pub name: String,
    pub members: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PoolResponse {
    pub pool_size: usize,
    pub teams: Vec<TeamSummary>,
    pub ranking: Vec<RankedFighter>,
}

pub fn pool_payload(fighters: &[Fighter]) -> PoolResponse {
    let classification = classify_fighters(fighters);
    PoolResponse {
        pool_size: classification.pool.len(),
        teams: classification
            .roster_groups
            .iter()
            .map(|group| TeamSummary {
                name: group.name.clone(),
                members: group.members.len(),
            })
            .collect(),
        ranking: rank_pool_with_scores(&classification.pool),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftRequest {
    pub pick_delay_secs: Option<f64>,
    pub start_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftResponse {
    pub status: &'static str,
    pub ranked: Vec<String>,
    pub slots: Vec<DraftSlot>,
    pub export: DraftExport,
}

pub fn batch_draft_payload(
    fighters: &[Fighter],
    body: &str,
    now: DateTime<Utc>,
) -> Result<DraftResponse, RequestError> {
    let request: DraftRequest = parse_body(body)?;
    let outcome = run_batch_draft(fighters);
    let export = DraftExport::from_slots(
        &outcome.slots,
        now,
        clamp_pick_delay(request.pick_delay_secs),
        parse_start_at(request.start_at.as_deref()),
    );
    Ok(DraftResponse {
        status: "ok",
        ranked: outcome.ranked.iter().map(|fighter| fighter.id.clone()).collect(),
        slots: outcome.slots,
        export,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EstimateQuery {
    pub delay: Option<f64>,
    pub start: Option<String>,
}

pub fn estimate_payload(fighters: &[Fighter], query: &EstimateQuery, now: DateTime<Utc>) -> DraftEstimate {
    let picks = classify_fighters(fighters).pool.len();
    estimate_run(
        picks,
        clamp_pick_delay(query.delay),
        parse_start_at(query.start.as_deref()),
        now,
    )
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LiveRequest {
    pub pick_delay_secs: Option<f64>,
    pub start_at: Option<String>,
    pub use_override: Option<bool>,
    pub seed: Option<u64>,
}

pub fn parse_live_request(body: &str) -> Result<LiveRequest, RequestError> {
    parse_body(body)
}

#[derive(Debug, Clone, Serialize)]
pub struct LiveStarted {
    pub status: &'static str,
    pub session_id: String,
    pub pick_delay_secs: f64,
    pub start_at: Option<DateTime<Utc>>,
    pub use_override: bool,
    pub events_url: String,
    pub board_url: String,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fighters() -> Vec<Fighter> {
        vec![
            Fighter::new("1", "A", [80.0, 50.0, 50.0, 50.0]),
            Fighter::new("2", "B", [20.0, 50.0, 50.0, 50.0]),
            Fighter::new("3", "Vet", [60.0; 4]).with_team("Hawks"),
        ]
    }

    #[test]
    fn empty_body_uses_defaults() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let response = batch_draft_payload(&fighters(), "", now).expect("empty body is valid");
        assert_eq!(response.ranked, vec!["1", "2"]);
        assert_eq!(response.export.pick_delay_secs, 10.0);
        assert_eq!(response.export.teams[0].picks.len(), 2);
    }

    #[test]
    fn malformed_body_is_rejected() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let err = batch_draft_payload(&fighters(), "{bad", now).expect_err("body should fail");
        assert!(err.to_string().contains("Invalid request body"));
    }

    #[test]
    fn estimate_counts_pool_only() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let estimate = estimate_payload(
            &fighters(),
            &EstimateQuery {
                delay: Some(30.0),
                start: None,
            },
            now,
        );
        assert_eq!(estimate.picks, 2);
        assert_eq!(estimate.total_seconds, 60.0);
    }
}
