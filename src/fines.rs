use std::collections::BTreeMap;
use std::fmt;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{HrError, Result};
use crate::summary::{self, Applied, EntityEvent, Latest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FineStatus {
    Pending,
    Approved,
    Rejected,
    Deducted,
}

impl FineStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FineStatus::Pending => "pending",
            FineStatus::Approved => "approved",
            FineStatus::Rejected => "rejected",
            FineStatus::Deducted => "deducted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Some(FineStatus::Pending),
            "approved" => Some(FineStatus::Approved),
            "rejected" => Some(FineStatus::Rejected),
            "deducted" => Some(FineStatus::Deducted),
            _ => None,
        }
    }
}

impl fmt::Display for FineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fine {
    pub id: u64,
    pub employee_id: String,
    pub employee_name: String,
    pub department: String,
    pub amount: f64,
    pub reason: String,
    pub status: FineStatus,
    pub date: NaiveDate,
    #[serde(default)]
    pub manager_comment: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl EntityEvent for Fine {
    fn entity_id(&self) -> &str {
        &self.employee_id
    }

    fn event_date(&self) -> NaiveDate {
        self.date
    }
}

/// Input for [`FineStore::add`].
#[derive(Debug, Clone)]
pub struct NewFine {
    pub employee_id: String,
    pub employee_name: String,
    pub department: String,
    pub amount: f64,
    pub reason: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FineAction {
    Approve { id: u64, comment: Option<String> },
    Reject { id: u64, comment: Option<String> },
    /// Payroll took the approved amount.
    Deduct { id: u64 },
    Cancel { id: u64 },
}

impl FineAction {
    pub fn id(&self) -> u64 {
        match self {
            FineAction::Approve { id, .. }
            | FineAction::Reject { id, .. }
            | FineAction::Deduct { id }
            | FineAction::Cancel { id } => *id,
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            FineAction::Approve { .. } => "approve",
            FineAction::Reject { .. } => "reject",
            FineAction::Deduct { .. } => "deduct",
            FineAction::Cancel { .. } => "cancel",
        }
    }

    /// Status after the action, or `None` when `from` does not allow it.
    fn target(&self, from: FineStatus) -> Option<FineStatus> {
        match (self, from) {
            (FineAction::Approve { .. }, FineStatus::Pending) => Some(FineStatus::Approved),
            (FineAction::Reject { .. }, FineStatus::Pending) => Some(FineStatus::Rejected),
            (FineAction::Deduct { .. }, FineStatus::Approved) => Some(FineStatus::Deducted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FineSummary {
    pub employee_id: String,
    pub employee_name: String,
    pub department: String,
    /// Approved plus deducted amounts.
    pub total_fines: f64,
    pub total_deducted: f64,
    /// Approved but not yet deducted.
    pub pending_amount: f64,
    pub next_deduction_amount: f64,
    pub active_fines: usize,
    pub fine_count: usize,
    pub status_counts: BTreeMap<FineStatus, usize>,
    pub latest: Option<Latest>,
}

impl FineSummary {
    fn seed(fine: &Fine) -> Self {
        Self {
            employee_id: fine.employee_id.clone(),
            employee_name: fine.employee_name.clone(),
            department: fine.department.clone(),
            total_fines: 0.0,
            total_deducted: 0.0,
            pending_amount: 0.0,
            next_deduction_amount: 0.0,
            active_fines: 0,
            fine_count: 0,
            status_counts: BTreeMap::new(),
            latest: None,
        }
    }

    fn add(&mut self, fine: &Fine) {
        self.fine_count += 1;
        *self.status_counts.entry(fine.status).or_insert(0) += 1;
        match fine.status {
            FineStatus::Approved => {
                self.active_fines += 1;
                self.total_fines += fine.amount;
                self.pending_amount += fine.amount;
                self.next_deduction_amount += fine.amount;
            }
            FineStatus::Deducted => {
                self.total_fines += fine.amount;
                self.total_deducted += fine.amount;
            }
            FineStatus::Pending | FineStatus::Rejected => {}
        }
        Latest::offer(&mut self.latest, fine.id, fine.date);
    }

    pub fn count(&self, status: FineStatus) -> usize {
        self.status_counts.get(&status).copied().unwrap_or(0)
    }
}

/// One summary per employee, in first-seen order.
pub fn aggregate(fines: &[Fine]) -> Vec<FineSummary> {
    summary::fold_by_entity(fines, FineSummary::seed, FineSummary::add)
}

/// In-memory fine list with the approval workflow.
#[derive(Debug, Clone, Default)]
pub struct FineStore {
    fines: Vec<Fine>,
    /// Highest id handed out or loaded so far.
    last_id: u64,
}

impl FineStore {
    pub fn new(fines: Vec<Fine>) -> Self {
        let last_id = fines.iter().map(|f| f.id).max().unwrap_or(0);
        Self { fines, last_id }
    }

    pub fn all(&self) -> &[Fine] {
        &self.fines
    }

    pub fn get(&self, id: u64) -> Option<&Fine> {
        self.fines.iter().find(|f| f.id == id)
    }

    pub fn with_status(&self, status: FineStatus) -> Vec<&Fine> {
        self.fines.iter().filter(|f| f.status == status).collect()
    }

    pub fn add(&mut self, new: NewFine) -> Result<&Fine> {
        if !new.amount.is_finite() || new.amount <= 0.0 {
            return Err(HrError::InvalidInput(format!(
                "fine amount must be positive, got {}",
                new.amount
            )));
        }
        let now = Local::now().naive_local();
        let id = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| HrError::InvalidInput("no fine ids left".into()))?;
        self.last_id = id;
        let fine = Fine {
            id,
            employee_id: new.employee_id,
            employee_name: new.employee_name,
            department: new.department,
            amount: new.amount,
            reason: new.reason,
            status: FineStatus::Pending,
            date: new.date,
            manager_comment: None,
            created_at: now,
            updated_at: now,
        };
        info!(id, employee = %fine.employee_id, amount = fine.amount, "fine added");
        self.fines.push(fine);
        Ok(&self.fines[self.fines.len() - 1])
    }

    /// Apply one workflow action. Unknown ids are a no-op.
    pub fn apply(&mut self, action: FineAction) -> Result<Applied> {
        let id = action.id();
        let Some(pos) = self.fines.iter().position(|f| f.id == id) else {
            debug!(id, action = action.verb(), "fine not found");
            return Ok(Applied::NotFound);
        };

        if let FineAction::Cancel { .. } = action {
            self.fines.remove(pos);
            info!(id, "fine cancelled");
            return Ok(Applied::Updated);
        }

        let fine = &mut self.fines[pos];
        let next = action
            .target(fine.status)
            .ok_or_else(|| HrError::InvalidTransition {
                id,
                from: fine.status.to_string(),
                action: action.verb(),
            })?;

        if let FineAction::Approve { comment, .. } | FineAction::Reject { comment, .. } = action {
            if comment.is_some() {
                fine.manager_comment = comment;
            }
        }
        debug!(id, from = %fine.status, to = %next, "fine status change");
        fine.status = next;
        fine.updated_at = Local::now().naive_local();
        Ok(Applied::Updated)
    }

    pub fn summaries(&self) -> Vec<FineSummary> {
        aggregate(&self.fines)
    }

    pub fn history_for(&self, employee_id: &str) -> Vec<&Fine> {
        summary::history_for(&self.fines, employee_id)
    }
}
