use crate::{
    common::PageRequest,
    db::DbPool,
    entities::{inventory_transaction::Model as MovementModel, MovementKind},
    errors::ServiceError,
    events::{Event, EventSender},
    repositories::{MovementLogStore, MovementRepository, StockLedgerRepository, StockLedgerStore},
};
use chrono::Utc;
use metrics::counter;
use sea_orm::{DatabaseTransaction, TransactionTrait};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

/// A goods movement as submitted, before it touches the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovement {
    pub movement_id: String,
    pub product_id: String,
    pub warehouse_id: i32,
    pub quantity: i32,
    pub note: Option<String>,
}

impl NewMovement {
    fn validate(&self) -> Result<(), ServiceError> {
        if self.movement_id.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "movement id is required".to_string(),
            ));
        }
        if self.product_id.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "product id is required".to_string(),
            ));
        }
        if self.warehouse_id == 0 {
            return Err(ServiceError::ValidationError(
                "warehouse id is required".to_string(),
            ));
        }
        if self.quantity < 0 {
            return Err(ServiceError::ValidationError(
                "quantity must be greater than or equal to 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Keeps the movement log and the stock ledger in agreement.
///
/// Every recorded movement appends one log row and adjusts one ledger row
/// inside a single database transaction. The two writes run concurrently
/// and either both commit or neither does.
#[derive(Clone)]
pub struct LedgerReconciliationService {
    db: Arc<DbPool>,
    ledger: Arc<dyn StockLedgerStore>,
    movements: Arc<dyn MovementLogStore>,
    event_sender: EventSender,
}

impl LedgerReconciliationService {
    pub fn new(
        db: Arc<DbPool>,
        ledger: Arc<dyn StockLedgerStore>,
        movements: Arc<dyn MovementLogStore>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            db,
            ledger,
            movements,
            event_sender,
        }
    }

    /// Wires the service to the sea-orm stores backed by `db`.
    pub fn with_database(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        let ledger = Arc::new(StockLedgerRepository::new(db.clone()));
        let movements = Arc::new(MovementRepository::new(db.clone()));
        Self::new(db, ledger, movements, event_sender)
    }

    /// Records goods coming in. A missing ledger row is provisioned at zero
    /// before the movement is applied.
    #[instrument(
        skip(self, movement, cancel),
        fields(
            movement_id = %movement.movement_id,
            product_id = %movement.product_id,
            warehouse_id = movement.warehouse_id,
            quantity = movement.quantity
        )
    )]
    pub async fn record_receipt(
        &self,
        movement: NewMovement,
        cancel: &CancellationToken,
    ) -> Result<MovementModel, ServiceError> {
        movement.validate()?;
        ensure_not_cancelled(cancel, &movement.movement_id, MovementKind::Receipt)?;
        self.ensure_ledger_row(&movement.product_id, movement.warehouse_id)
            .await?;
        self.reconcile(movement, MovementKind::Receipt, cancel).await
    }

    /// Records goods going out. The ledger row must already exist and hold
    /// at least `quantity` units.
    #[instrument(
        skip(self, movement, cancel),
        fields(
            movement_id = %movement.movement_id,
            product_id = %movement.product_id,
            warehouse_id = movement.warehouse_id,
            quantity = movement.quantity
        )
    )]
    pub async fn record_issue(
        &self,
        movement: NewMovement,
        cancel: &CancellationToken,
    ) -> Result<MovementModel, ServiceError> {
        movement.validate()?;
        ensure_not_cancelled(cancel, &movement.movement_id, MovementKind::Issue)?;

        let row = self
            .ledger
            .find(&movement.product_id, movement.warehouse_id)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "no stock entry for product {} in warehouse {}",
                    movement.product_id, movement.warehouse_id
                ))
            })?;

        if row.quantity < movement.quantity {
            counter!("stockroom_ledger.issue.insufficient_stock", 1);
            return Err(ServiceError::InsufficientStock {
                requested: movement.quantity,
                available: row.quantity,
            });
        }

        self.reconcile(movement, MovementKind::Issue, cancel).await
    }

    /// Removes a movement from the log. The ledger is left as it is.
    #[instrument(skip(self))]
    pub async fn delete_movement(&self, movement_id: &str) -> Result<(), ServiceError> {
        if movement_id.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "movement id is required".to_string(),
            ));
        }

        if !self.movements.delete(movement_id).await? {
            return Err(ServiceError::NotFound(format!(
                "movement {} not found",
                movement_id
            )));
        }

        info!(movement_id, "movement deleted");
        self.publish(Event::MovementDeleted {
            movement_id: movement_id.to_string(),
        })
        .await;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_movement(&self, movement_id: &str) -> Result<MovementModel, ServiceError> {
        self.movements
            .find(movement_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("movement {} not found", movement_id)))
    }

    /// Newest movements first, with the total number of movements.
    #[instrument(skip(self))]
    pub async fn list_movements(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<MovementModel>, u64), ServiceError> {
        self.movements.list(page.page, page.limit).await
    }

    async fn ensure_ledger_row(&self, product_id: &str, warehouse_id: i32) -> Result<(), ServiceError> {
        match self.ledger.find(product_id, warehouse_id).await {
            Ok(Some(_)) => return Ok(()),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "stock lookup failed, provisioning the entry anyway"),
        }

        self.ledger
            .provision(product_id, warehouse_id)
            .await
            .map_err(|e| {
                error!(error = %e, "failed to provision stock entry");
                ServiceError::DependencyError(format!(
                    "provision stock entry for product {} in warehouse {}: {}",
                    product_id, warehouse_id, e
                ))
            })
    }

    async fn reconcile(
        &self,
        movement: NewMovement,
        kind: MovementKind,
        cancel: &CancellationToken,
    ) -> Result<MovementModel, ServiceError> {
        ensure_not_cancelled(cancel, &movement.movement_id, kind)?;

        let record = MovementModel {
            transaction_id: movement.movement_id,
            product_id: movement.product_id,
            warehouse_id: movement.warehouse_id,
            quantity: movement.quantity,
            transaction_type: kind,
            transaction_date: Utc::now(),
            note: movement.note,
        };

        let txn = self.db.begin().await.map_err(|e| {
            error!(error = %e, "failed to open ledger transaction");
            ServiceError::DatabaseError(e)
        })?;

        let (verb, adjust) = match kind {
            MovementKind::Receipt => (
                "increment",
                self.ledger
                    .increment(&txn, &record.product_id, record.warehouse_id, record.quantity),
            ),
            MovementKind::Issue => (
                "decrement",
                self.ledger
                    .decrement(&txn, &record.product_id, record.warehouse_id, record.quantity),
            ),
        };
        let (appended, adjusted) = tokio::join!(self.movements.append(&txn, &record), adjust);

        let mut failures = Vec::new();
        let mut stock_rejection = None;
        if let Err(e) = appended {
            failures.push(format!("append movement {}: {}", record.transaction_id, e));
        }
        if let Err(e) = adjusted {
            failures.push(format!(
                "{} quantity for product {} in warehouse {}: {}",
                verb, record.product_id, record.warehouse_id, e
            ));
            if matches!(e, ServiceError::InsufficientStock { .. }) {
                stock_rejection = Some(e);
            }
        }

        if !failures.is_empty() {
            if let Err(e) = rollback(txn).await {
                failures.push(e);
            }
            counter!("stockroom_ledger.movement.rolled_back", 1, "kind" => kind.to_string());
            warn!(failures = ?failures, "movement rolled back");

            return match stock_rejection {
                Some(rejection) if failures.len() == 1 => Err(rejection),
                _ => Err(ServiceError::reconciliation(failures)),
            };
        }

        if cancel.is_cancelled() {
            if let Err(e) = rollback(txn).await {
                error!(error = %e, "rollback after cancellation failed");
            }
            counter!("stockroom_ledger.movement.cancelled", 1, "kind" => kind.to_string());
            return Err(ServiceError::Cancelled(format!(
                "movement {} cancelled before commit",
                record.transaction_id
            )));
        }

        txn.commit().await.map_err(|e| {
            counter!("stockroom_ledger.movement.commit_failed", 1);
            error!(error = %e, "failed to commit movement");
            ServiceError::CommitError(format!("movement {}: {}", record.transaction_id, e))
        })?;

        counter!("stockroom_ledger.movement.committed", 1, "kind" => kind.to_string());
        info!(
            movement_id = %record.transaction_id,
            kind = %kind,
            "movement committed"
        );

        self.publish(Event::MovementRecorded {
            movement_id: record.transaction_id.clone(),
            product_id: record.product_id.clone(),
            warehouse_id: record.warehouse_id,
            kind,
            quantity: record.quantity,
        })
        .await;

        Ok(record)
    }

    async fn publish(&self, event: Event) {
        if let Err(e) = self.event_sender.send(event).await {
            warn!(error = %e, "failed to publish ledger event");
        }
    }
}

fn ensure_not_cancelled(
    cancel: &CancellationToken,
    movement_id: &str,
    kind: MovementKind,
) -> Result<(), ServiceError> {
    if cancel.is_cancelled() {
        counter!("stockroom_ledger.movement.cancelled", 1, "kind" => kind.to_string());
        return Err(ServiceError::Cancelled(format!(
            "movement {} cancelled before it was applied",
            movement_id
        )));
    }
    Ok(())
}

async fn rollback(txn: DatabaseTransaction) -> Result<(), String> {
    txn.rollback().await.map_err(|e| {
        error!(error = %e, "ledger transaction rollback failed");
        format!("rollback: {}", e)
    })
}

/// Runs `operation` with a token that is cancelled once `deadline` passes.
///
/// The operation is still driven to completion after cancellation so that
/// an open transaction is rolled back rather than abandoned.
pub async fn with_deadline<F, Fut, T>(deadline: Duration, operation: F) -> Result<T, ServiceError>
where
    F: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    let token = CancellationToken::new();
    let work = operation(token.clone());
    tokio::pin!(work);

    tokio::select! {
        result = &mut work => result,
        _ = tokio::time::sleep(deadline) => {
            warn!(?deadline, "movement deadline elapsed, cancelling");
            token.cancel();
            work.await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn movement(quantity: i32) -> NewMovement {
        NewMovement {
            movement_id: "HD261016000001".to_string(),
            product_id: "HD261016000042".to_string(),
            warehouse_id: 1,
            quantity,
            note: None,
        }
    }

    #[test]
    fn validation_rejects_missing_fields() {
        assert!(movement(5).validate().is_ok());
        assert!(movement(0).validate().is_ok());

        let mut m = movement(5);
        m.movement_id = " ".into();
        assert_matches!(m.validate(), Err(ServiceError::ValidationError(msg)) if msg == "movement id is required");

        let mut m = movement(5);
        m.product_id.clear();
        assert_matches!(m.validate(), Err(ServiceError::ValidationError(msg)) if msg == "product id is required");

        let mut m = movement(5);
        m.warehouse_id = 0;
        assert_matches!(m.validate(), Err(ServiceError::ValidationError(msg)) if msg == "warehouse id is required");

        assert_matches!(
            movement(-1).validate(),
            Err(ServiceError::ValidationError(msg)) if msg == "quantity must be greater than or equal to 0"
        );
    }

    #[tokio::test]
    async fn deadline_cancels_token_and_waits_for_work() {
        let result = with_deadline(Duration::from_millis(10), |token| async move {
            token.cancelled().await;
            Err::<(), _>(ServiceError::Cancelled("stopped".into()))
        })
        .await;

        assert_matches!(result, Err(ServiceError::Cancelled(_)));
    }

    #[tokio::test]
    async fn deadline_passes_through_fast_results() {
        let result = with_deadline(Duration::from_secs(5), |token| async move {
            assert!(!token.is_cancelled());
            Ok::<_, ServiceError>(7)
        })
        .await;

        assert_eq!(result.unwrap(), 7);
    }
}
