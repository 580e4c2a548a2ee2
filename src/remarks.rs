use std::collections::BTreeMap;
use std::fmt;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{HrError, Result};
use crate::summary::{self, Applied, EntityEvent, Latest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemarkStatus {
    Unacknowledged,
    Acknowledged,
}

impl fmt::Display for RemarkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RemarkStatus::Unacknowledged => "unacknowledged",
            RemarkStatus::Acknowledged => "acknowledged",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Remark {
    pub id: u64,
    pub employee_id: String,
    pub employee_name: String,
    pub department: String,
    pub remark_type: String,
    pub content: String,
    pub status: RemarkStatus,
    pub date: NaiveDate,
    #[serde(default)]
    pub employee_comment: Option<String>,
    #[serde(default)]
    pub acknowledged_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl EntityEvent for Remark {
    fn entity_id(&self) -> &str {
        &self.employee_id
    }

    fn event_date(&self) -> NaiveDate {
        self.date
    }
}

#[derive(Debug, Clone)]
pub struct NewRemark {
    pub employee_id: String,
    pub employee_name: String,
    pub department: String,
    pub remark_type: String,
    pub content: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RemarkAction {
    Acknowledge { id: u64, comment: Option<String> },
    Cancel { id: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemarkSummary {
    pub employee_id: String,
    pub employee_name: String,
    pub department: String,
    pub total_remarks: usize,
    pub type_counts: BTreeMap<String, usize>,
    pub acknowledged: usize,
    pub unacknowledged: usize,
    pub latest: Option<Latest>,
    pub latest_type: Option<String>,
}

impl RemarkSummary {
    fn seed(remark: &Remark) -> Self {
        Self {
            employee_id: remark.employee_id.clone(),
            employee_name: remark.employee_name.clone(),
            department: remark.department.clone(),
            total_remarks: 0,
            type_counts: BTreeMap::new(),
            acknowledged: 0,
            unacknowledged: 0,
            latest: None,
            latest_type: None,
        }
    }

    fn add(&mut self, remark: &Remark) {
        self.total_remarks += 1;
        *self
            .type_counts
            .entry(remark.remark_type.clone())
            .or_insert(0) += 1;
        match remark.status {
            RemarkStatus::Acknowledged => self.acknowledged += 1,
            RemarkStatus::Unacknowledged => self.unacknowledged += 1,
        }
        let before = self.latest;
        Latest::offer(&mut self.latest, remark.id, remark.date);
        if self.latest != before {
            self.latest_type = Some(remark.remark_type.clone());
        }
    }

    pub fn count(&self, remark_type: &str) -> usize {
        self.type_counts.get(remark_type).copied().unwrap_or(0)
    }
}

pub fn aggregate(remarks: &[Remark]) -> Vec<RemarkSummary> {
    summary::fold_by_entity(remarks, RemarkSummary::seed, RemarkSummary::add)
}

/// In-memory remark list with acknowledgement.
#[derive(Debug, Clone, Default)]
pub struct RemarkStore {
    remarks: Vec<Remark>,
    /// Highest id handed out or loaded so far.
    last_id: u64,
}

impl RemarkStore {
    pub fn new(remarks: Vec<Remark>) -> Self {
        let last_id = remarks.iter().map(|r| r.id).max().unwrap_or(0);
        Self { remarks, last_id }
    }

    pub fn all(&self) -> &[Remark] {
        &self.remarks
    }

    pub fn get(&self, id: u64) -> Option<&Remark> {
        self.remarks.iter().find(|r| r.id == id)
    }

    pub fn unacknowledged(&self) -> Vec<&Remark> {
        self.remarks
            .iter()
            .filter(|r| r.status == RemarkStatus::Unacknowledged)
            .collect()
    }

    pub fn add(&mut self, new: NewRemark) -> Result<&Remark> {
        if new.remark_type.trim().is_empty() {
            return Err(HrError::InvalidInput("remark type is required".into()));
        }
        let now = Local::now().naive_local();
        let id = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| HrError::InvalidInput("no remark ids left".into()))?;
        self.last_id = id;
        let remark = Remark {
            id,
            employee_id: new.employee_id,
            employee_name: new.employee_name,
            department: new.department,
            remark_type: new.remark_type,
            content: new.content,
            status: RemarkStatus::Unacknowledged,
            date: new.date,
            employee_comment: None,
            acknowledged_at: None,
            created_at: now,
            updated_at: now,
        };
        info!(id, employee = %remark.employee_id, kind = %remark.remark_type, "remark added");
        self.remarks.push(remark);
        Ok(&self.remarks[self.remarks.len() - 1])
    }

    /// Apply one action. Unknown ids are a no-op.
    pub fn apply(&mut self, action: RemarkAction) -> Result<Applied> {
        match action {
            RemarkAction::Cancel { id } => {
                let Some(pos) = self.remarks.iter().position(|r| r.id == id) else {
                    debug!(id, "remark not found");
                    return Ok(Applied::NotFound);
                };
                self.remarks.remove(pos);
                info!(id, "remark cancelled");
                Ok(Applied::Updated)
            }
            RemarkAction::Acknowledge { id, comment } => {
                let Some(remark) = self.remarks.iter_mut().find(|r| r.id == id) else {
                    debug!(id, "remark not found");
                    return Ok(Applied::NotFound);
                };
                if remark.status == RemarkStatus::Acknowledged {
                    return Err(HrError::InvalidTransition {
                        id,
                        from: remark.status.to_string(),
                        action: "acknowledge",
                    });
                }
                let now = Local::now().naive_local();
                remark.status = RemarkStatus::Acknowledged;
                remark.employee_comment = comment;
                remark.acknowledged_at = Some(now);
                remark.updated_at = now;
                debug!(id, "remark acknowledged");
                Ok(Applied::Updated)
            }
        }
    }

    pub fn summaries(&self) -> Vec<RemarkSummary> {
        aggregate(&self.remarks)
    }

    pub fn history_for(&self, employee_id: &str) -> Vec<&Remark> {
        summary::history_for(&self.remarks, employee_id)
    }
}
