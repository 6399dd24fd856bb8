use std::collections::HashMap;
use std::fs::File;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use crate::{
    domain::{
        CreateWithdrawal, OwnerIdentity, PageRequest, RecordFilter, WithdrawalId, WithdrawalStatus,
    },
    port::WithdrawalRepository,
    service::{ReviewForm, ReviewOrchestrator, SubmissionOrchestrator, SubmissionOutcome,
        SubmissionPhase},
};

/// Flat CSV row; `try_into` turns it into a typed operation.
#[derive(Debug, Deserialize)]
struct CsvRow {
    op: String,
    #[serde(default)]
    actor: Option<String>,
    owner: String,
    #[serde(default)]
    amount: Option<f64>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    network: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    reference: Option<String>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    note: Option<String>,
}

/// One replayable operation. Transitions and notes address "the owner's most
/// recently created record", since record ids are assigned at runtime.
#[derive(Debug)]
enum Operation {
    Submit {
        owner: String,
        form: CreateWithdrawal,
    },
    Transition {
        actor: String,
        owner: String,
        target: WithdrawalStatus,
        reference: Option<String>,
        reason: Option<String>,
        note: Option<String>,
    },
    Note {
        actor: String,
        owner: String,
        text: String,
    },
}

impl TryFrom<CsvRow> for Operation {
    type Error = String;

    fn try_from(row: CsvRow) -> Result<Self, Self::Error> {
        match row.op.to_lowercase().as_str() {
            "submit" => {
                let amount = row.amount.ok_or_else(|| "submit requires amount".to_string())?;
                Ok(Self::Submit {
                    owner: row.owner,
                    form: CreateWithdrawal {
                        currency: row.currency.unwrap_or_default(),
                        network: row.network.unwrap_or_default(),
                        destination_address: row.address.unwrap_or_default(),
                        amount,
                        memo: row.note,
                    },
                })
            }
            "transition" => {
                let target = row
                    .target
                    .ok_or_else(|| "transition requires target".to_string())?;
                let target = WithdrawalStatus::from_str(&target)?;
                Ok(Self::Transition {
                    actor: row.actor.unwrap_or_else(|| "ops-admin".to_string()),
                    owner: row.owner,
                    target,
                    reference: row.reference,
                    reason: row.reason,
                    note: row.note,
                })
            }
            "note" => {
                let text = row.note.ok_or_else(|| "note requires note text".to_string())?;
                Ok(Self::Note {
                    actor: row.actor.unwrap_or_else(|| "ops-admin".to_string()),
                    owner: row.owner,
                    text,
                })
            }
            other => Err(format!("unknown operation: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub enum DriverMode {
    Csv { file_path: String },
}

/// Replays an operations CSV through the real orchestrators.
///
/// Rows that fail validation or hit a conflict are logged and skipped; the
/// replay continues, matching how a partner feed would be processed.
pub struct CsvDriver {
    gateway: Arc<dyn WithdrawalRepository>,
    mode: DriverMode,
}

impl CsvDriver {
    pub fn new(gateway: Arc<dyn WithdrawalRepository>, mode: DriverMode) -> Self {
        Self { gateway, mode }
    }

    pub async fn process(&self) -> Result<(), Box<dyn std::error::Error>> {
        let DriverMode::Csv { file_path } = self.mode.clone();
        self.process_csv(&file_path).await
    }

    async fn process_csv(&self, file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let file_handle = File::open(file_path)?;
        let mut rdr = csv::Reader::from_reader(file_handle);

        // owner -> most recently created record (for transition/note rows)
        let mut latest_record: HashMap<String, WithdrawalId> = HashMap::new();
        let mut line_num = 0;

        for result in rdr.deserialize() {
            line_num += 1;
            let row: CsvRow = result?;
            let operation: Operation = match row.try_into() {
                Ok(op) => op,
                Err(e) => {
                    eprintln!("Skipping line {}: {}", line_num, e);
                    continue;
                }
            };

            if let Err(e) = self.apply(operation, &mut latest_record).await {
                eprintln!("Error processing line {}: {}", line_num, e);
            }
        }

        Ok(())
    }

    async fn apply(
        &self,
        operation: Operation,
        latest_record: &mut HashMap<String, WithdrawalId>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match operation {
            Operation::Submit { owner, form } => {
                let identity = OwnerIdentity {
                    owner_id: owner.clone(),
                    display_name: owner.clone(),
                };
                let mut submission =
                    SubmissionOrchestrator::new(self.gateway.clone(), identity, form)?;
                match submission.confirm().await {
                    SubmissionPhase::Result(SubmissionOutcome::Created { id }) => {
                        latest_record.insert(owner, id);
                        Ok(())
                    }
                    SubmissionPhase::Result(SubmissionOutcome::Failed(e)) => Err(e.into()),
                    SubmissionPhase::Result(SubmissionOutcome::Unknown) => {
                        Err("submission outcome unknown - check history".into())
                    }
                    phase => Err(format!("unexpected submission phase: {:?}", phase).into()),
                }
            }
            Operation::Transition {
                actor,
                owner,
                target,
                reference,
                reason,
                note,
            } => {
                let id = latest_record
                    .get(&owner)
                    .ok_or_else(|| format!("no record submitted for owner {}", owner))?
                    .clone();

                let mut review = ReviewOrchestrator::new(self.gateway.clone(), actor);
                review.open(&id).await?;
                review.propose_transition(
                    target,
                    ReviewForm {
                        target_status: Some(target),
                        settlement_reference: reference,
                        failure_reason: reason,
                        note,
                    },
                )?;
                let outcome = review.confirm_and_submit().await?;
                tracing::debug!(owner = %owner, outcome = ?outcome, "transition replayed");
                Ok(())
            }
            Operation::Note { actor, owner, text } => {
                let id = latest_record
                    .get(&owner)
                    .ok_or_else(|| format!("no record submitted for owner {}", owner))?
                    .clone();

                let mut review = ReviewOrchestrator::new(self.gateway.clone(), actor);
                review.open(&id).await?;
                review.append_note(&text).await?;
                Ok(())
            }
        }
    }

    /// Write every record as CSV to stdout, in creation order, with the
    /// status summary on stderr.
    pub async fn output_csv(&self) -> Result<(), Box<dyn std::error::Error>> {
        let mut wtr = csv::Writer::from_writer(std::io::stdout());
        wtr.write_record([
            "id", "owner", "amount", "currency", "status", "reference", "reason", "audit_len",
        ])?;

        let mut page = PageRequest::new(1, PageRequest::MAX_LIMIT);
        loop {
            let result = self.gateway.list(&RecordFilter::default(), page).await?;

            for record in &result.records {
                wtr.write_record([
                    &record.id.to_string(),
                    &record.owner_id,
                    &format!("{:.4}", record.amount),
                    &record.currency,
                    record.status.as_str(),
                    record.settlement_reference.as_deref().unwrap_or(""),
                    record.failure_reason.as_deref().unwrap_or(""),
                    &record.audit_trail.len().to_string(),
                ])?;
            }

            if !result.has_more() {
                eprintln!(
                    "{} records: {} pending, {} processing, {} completed, {} failed, {} cancelled",
                    result.summary.total(),
                    result.summary.pending,
                    result.summary.processing,
                    result.summary.completed,
                    result.summary.failed,
                    result.summary.cancelled,
                );
                break;
            }
            page = PageRequest::new(page.page + 1, page.limit);
        }

        wtr.flush()?;
        Ok(())
    }
}
