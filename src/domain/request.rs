use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ValidationError, WithdrawalRecord, WithdrawalStatus};

/// A locally-validated withdrawal form, as posted by the owning user.
/// Creation always produces a `pending` record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWithdrawal {
    pub currency: String,
    pub network: String,
    pub destination_address: String,
    pub amount: f64,
    pub memo: Option<String>,
}

impl CreateWithdrawal {
    /// Synchronous pre-validation. Violations never reach the network.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.amount <= 0.0 || !self.amount.is_finite() {
            return Err(ValidationError::NonPositiveAmount);
        }
        if self.destination_address.trim().is_empty() {
            return Err(ValidationError::MissingDestination);
        }
        if self.currency.trim().is_empty() {
            return Err(ValidationError::MissingCurrency);
        }
        if self.network.trim().is_empty() {
            return Err(ValidationError::MissingNetwork);
        }
        Ok(())
    }
}

/// Identity of the requesting user, attached server-side from the signed
/// request envelope rather than trusted from the form body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerIdentity {
    pub owner_id: String,
    pub display_name: String,
}

impl OwnerIdentity {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.owner_id.trim().is_empty() {
            return Err(ValidationError::MissingOwner);
        }
        Ok(())
    }
}

/// Filter for the paginated list endpoint. All criteria are conjunctive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordFilter {
    pub status: Option<WithdrawalStatus>,
    pub owner_id: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

impl RecordFilter {
    pub fn matches(&self, record: &WithdrawalRecord) -> bool {
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        if let Some(owner_id) = &self.owner_id {
            if &record.owner_id != owner_id {
                return false;
            }
        }
        if let Some(after) = self.created_after {
            if record.created_at < after {
                return false;
            }
        }
        if let Some(before) = self.created_before {
            if record.created_at > before {
                return false;
            }
        }
        true
    }
}

/// One-based page request with a bounded page size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl PageRequest {
    pub const MAX_LIMIT: usize = 100;

    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1) * self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 20)
    }
}

/// Per-status counts over the *filtered* set, returned with every list page.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl StatusSummary {
    pub fn tally(&mut self, status: WithdrawalStatus) {
        match status {
            WithdrawalStatus::Pending => self.pending += 1,
            WithdrawalStatus::Processing => self.processing += 1,
            WithdrawalStatus::Completed => self.completed += 1,
            WithdrawalStatus::Failed => self.failed += 1,
            WithdrawalStatus::Cancelled => self.cancelled += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.processing + self.completed + self.failed + self.cancelled
    }
}

/// One page of list results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPage {
    pub records: Vec<WithdrawalRecord>,
    pub page: usize,
    pub limit: usize,
    pub total_matching: usize,
    pub summary: StatusSummary,
}

impl RecordPage {
    pub fn has_more(&self) -> bool {
        self.page * self.limit < self.total_matching
    }
}
