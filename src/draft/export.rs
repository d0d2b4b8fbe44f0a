//! Read-only summary of a finished draft, as JSON or CSV.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::draft::allocate::DraftSlot;
use crate::error::ExportError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickExport {
    pub order: u32,
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamExport {
    pub name: String,
    pub pre_draft_count: usize,
    pub picks: Vec<PickExport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftExport {
    pub started_at: DateTime<Utc>,
    pub pick_delay_secs: f64,
    pub start_time: Option<DateTime<Utc>>,
    pub teams: Vec<TeamExport>,
}

impl DraftExport {
    pub fn from_slots(
        slots: &[DraftSlot],
        started_at: DateTime<Utc>,
        pick_delay_secs: f64,
        start_time: Option<DateTime<Utc>>,
    ) -> Self {
        let teams = slots
            .iter()
            .map(|slot| TeamExport {
                name: slot.name.clone(),
                pre_draft_count: slot.pre_draft_count(),
                picks: slot
                    .picks
                    .iter()
                    .map(|pick| PickExport {
                        order: pick.number,
                        id: pick.fighter.id.clone(),
                        name: pick.fighter.display_name(),
                    })
                    .collect(),
            })
            .collect();
        Self {
            started_at,
            pick_delay_secs,
            start_time,
            teams,
        }
    }

    pub fn total_picks(&self) -> usize {
        self.teams.iter().map(|team| team.picks.len()).sum()
    }

    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// One row per pick, ordered by team then pick order.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ExportError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["team", "pre_draft_count", "order", "id", "name"])?;
        for team in &self.teams {
            let pre_draft = team.pre_draft_count.to_string();
            for pick in &team.picks {
                let order = pick.order.to_string();
                csv_writer.write_record([
                    team.name.as_str(),
                    pre_draft.as_str(),
                    order.as_str(),
                    pick.id.as_str(),
                    pick.name.as_str(),
                ])?;
            }
        }
        csv_writer.flush()?;
        Ok(())
    }
}
