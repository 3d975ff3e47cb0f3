mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseTransaction, DbErr};
use stockroom_api::{
    common::PageRequest,
    db::DbPool,
    entities::{
        inventory_transaction::Model as MovementModel, product_warehouse::Model as LedgerRow,
        MovementKind,
    },
    errors::{AppError, ServiceError},
    events::{Event, EventSender},
    repositories::{MovementLogStore, MovementRepository, StockLedgerRepository, StockLedgerStore},
    services::ledger_reconciliation::{LedgerReconciliationService, NewMovement},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn movement(id: &str, product: &str, warehouse: i32, quantity: i32) -> NewMovement {
    NewMovement {
        movement_id: id.to_string(),
        product_id: product.to_string(),
        warehouse_id: warehouse,
        quantity,
        note: None,
    }
}

/// Real stores plus a receiver for the events the engine publishes.
struct Harness {
    db: Arc<DbPool>,
    ledger: Arc<StockLedgerRepository>,
    movements: Arc<MovementRepository>,
    events: mpsc::Receiver<Event>,
    sender: EventSender,
    _dir: tempfile::TempDir,
}

impl Harness {
    async fn new() -> Self {
        let (db, _cfg, dir) = common::test_database().await;
        let (tx, rx) = mpsc::channel(64);
        Self {
            ledger: Arc::new(StockLedgerRepository::new(db.clone())),
            movements: Arc::new(MovementRepository::new(db.clone())),
            db,
            events: rx,
            sender: EventSender::new(tx),
            _dir: dir,
        }
    }

    fn engine(&self) -> LedgerReconciliationService {
        LedgerReconciliationService::new(
            self.db.clone(),
            self.ledger.clone(),
            self.movements.clone(),
            self.sender.clone(),
        )
    }

    fn engine_with(
        &self,
        ledger: Arc<dyn StockLedgerStore>,
        movements: Arc<dyn MovementLogStore>,
    ) -> LedgerReconciliationService {
        LedgerReconciliationService::new(self.db.clone(), ledger, movements, self.sender.clone())
    }

    async fn quantity(&self, product: &str, warehouse: i32) -> Option<i32> {
        self.ledger
            .find(product, warehouse)
            .await
            .unwrap()
            .map(|row| row.quantity)
    }

    async fn movement_count(&self) -> u64 {
        self.movements.list(1, 100).await.unwrap().1
    }
}

/// Movement log whose appends always fail.
struct FailingMovementLog {
    inner: Arc<MovementRepository>,
}

#[async_trait]
impl MovementLogStore for FailingMovementLog {
    async fn append(&self, _txn: &DatabaseTransaction, _movement: &MovementModel) -> Result<(), AppError> {
        Err(AppError::DatabaseError(DbErr::Custom("movement log unavailable".into())))
    }

    async fn find(&self, movement_id: &str) -> Result<Option<MovementModel>, AppError> {
        self.inner.find(movement_id).await
    }

    async fn delete(&self, movement_id: &str) -> Result<bool, AppError> {
        self.inner.delete(movement_id).await
    }

    async fn list(&self, page: u64, limit: u64) -> Result<(Vec<MovementModel>, u64), AppError> {
        self.inner.list(page, limit).await
    }
}

/// Ledger whose quantity writes fail after delegating reads and provisioning.
/// With a token attached it instead cancels that token and succeeds.
struct FlakyLedger {
    inner: Arc<StockLedgerRepository>,
    cancel_on_write: Option<CancellationToken>,
}

impl FlakyLedger {
    fn failing(inner: Arc<StockLedgerRepository>) -> Self {
        Self { inner, cancel_on_write: None }
    }

    fn cancelling(inner: Arc<StockLedgerRepository>, token: CancellationToken) -> Self {
        Self { inner, cancel_on_write: Some(token) }
    }

    async fn write(
        &self,
        txn: &DatabaseTransaction,
        product_id: &str,
        warehouse_id: i32,
        quantity: i32,
    ) -> Result<(), AppError> {
        match &self.cancel_on_write {
            Some(token) => {
                self.inner.increment(txn, product_id, warehouse_id, quantity).await?;
                token.cancel();
                Ok(())
            }
            None => Err(AppError::DatabaseError(DbErr::Custom("ledger locked".into()))),
        }
    }
}

#[async_trait]
impl StockLedgerStore for FlakyLedger {
    async fn find(&self, product_id: &str, warehouse_id: i32) -> Result<Option<LedgerRow>, AppError> {
        self.inner.find(product_id, warehouse_id).await
    }

    async fn provision(&self, product_id: &str, warehouse_id: i32) -> Result<(), AppError> {
        self.inner.provision(product_id, warehouse_id).await
    }

    async fn increment(
        &self,
        txn: &DatabaseTransaction,
        product_id: &str,
        warehouse_id: i32,
        quantity: i32,
    ) -> Result<(), AppError> {
        self.write(txn, product_id, warehouse_id, quantity).await
    }

    async fn decrement(
        &self,
        txn: &DatabaseTransaction,
        product_id: &str,
        warehouse_id: i32,
        quantity: i32,
    ) -> Result<(), AppError> {
        self.write(txn, product_id, warehouse_id, quantity).await
    }

    async fn list(&self, page: u64, limit: u64) -> Result<(Vec<LedgerRow>, u64), AppError> {
        self.inner.list(page, limit).await
    }
}

/// Ledger whose lookup or provisioning fails on demand. Counts the quantity
/// writes it is asked to make.
struct UnreliableLookups {
    inner: Arc<StockLedgerRepository>,
    fail_find: bool,
    fail_provision: bool,
    writes: AtomicUsize,
}

impl UnreliableLookups {
    fn new(inner: Arc<StockLedgerRepository>, fail_find: bool, fail_provision: bool) -> Self {
        Self {
            inner,
            fail_find,
            fail_provision,
            writes: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl StockLedgerStore for UnreliableLookups {
    async fn find(&self, product_id: &str, warehouse_id: i32) -> Result<Option<LedgerRow>, AppError> {
        if self.fail_find {
            return Err(AppError::DatabaseError(DbErr::Custom("lookup timed out".into())));
        }
        self.inner.find(product_id, warehouse_id).await
    }

    async fn provision(&self, product_id: &str, warehouse_id: i32) -> Result<(), AppError> {
        if self.fail_provision {
            return Err(AppError::DatabaseError(DbErr::Custom("ledger is read-only".into())));
        }
        self.inner.provision(product_id, warehouse_id).await
    }

    async fn increment(
        &self,
        txn: &DatabaseTransaction,
        product_id: &str,
        warehouse_id: i32,
        quantity: i32,
    ) -> Result<(), AppError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.increment(txn, product_id, warehouse_id, quantity).await
    }

    async fn decrement(
        &self,
        txn: &DatabaseTransaction,
        product_id: &str,
        warehouse_id: i32,
        quantity: i32,
    ) -> Result<(), AppError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.decrement(txn, product_id, warehouse_id, quantity).await
    }

    async fn list(&self, page: u64, limit: u64) -> Result<(Vec<LedgerRow>, u64), AppError> {
        self.inner.list(page, limit).await
    }
}

#[tokio::test]
async fn receipt_then_issues_track_the_ledger() {
    let h = Harness::new().await;
    let engine = h.engine();
    let token = CancellationToken::new();

    let received = engine
        .record_receipt(movement("M1", "P1", 1, 100), &token)
        .await
        .unwrap();
    assert_eq!(received.transaction_type, MovementKind::Receipt);
    assert_eq!(h.quantity("P1", 1).await, Some(100));

    engine
        .record_issue(movement("M2", "P1", 1, 40), &token)
        .await
        .unwrap();
    assert_eq!(h.quantity("P1", 1).await, Some(60));

    let err = engine
        .record_issue(movement("M3", "P1", 1, 90), &token)
        .await
        .unwrap_err();
    assert_matches!(
        err,
        ServiceError::InsufficientStock {
            requested: 90,
            available: 60
        }
    );
    assert_eq!(h.quantity("P1", 1).await, Some(60));
    assert_eq!(h.movement_count().await, 2);
    assert!(engine.get_movement("M3").await.is_err());
}

#[tokio::test]
async fn zero_quantity_receipt_provisions_and_logs() {
    let h = Harness::new().await;
    let engine = h.engine();

    let recorded = engine
        .record_receipt(movement("M1", "P2", 1, 0), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(recorded.quantity, 0);
    assert_eq!(h.quantity("P2", 1).await, Some(0));
    assert_eq!(engine.get_movement("M1").await.unwrap().quantity, 0);
}

#[tokio::test]
async fn issue_without_stock_entry_is_not_found() {
    let h = Harness::new().await;
    let err = h
        .engine()
        .record_issue(movement("M1", "P9", 3, 1), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::NotFound(_));
    assert_eq!(h.quantity("P9", 3).await, None);
    assert_eq!(h.movement_count().await, 0);
}

#[tokio::test]
async fn invalid_movements_never_touch_the_stores() {
    let h = Harness::new().await;
    let engine = h.engine();
    let token = CancellationToken::new();

    assert_matches!(
        engine.record_receipt(movement("M1", "P1", 0, 5), &token).await,
        Err(ServiceError::ValidationError(msg)) if msg == "warehouse id is required"
    );
    assert_matches!(
        engine.record_issue(movement("M1", "P1", 1, -5), &token).await,
        Err(ServiceError::ValidationError(_))
    );
    assert_eq!(h.quantity("P1", 1).await, None);
    assert_eq!(h.movement_count().await, 0);
}

#[tokio::test]
async fn deleting_a_movement_keeps_the_ledger() {
    let h = Harness::new().await;
    let engine = h.engine();

    engine
        .record_receipt(movement("M1", "P1", 1, 25), &CancellationToken::new())
        .await
        .unwrap();

    engine.delete_movement("M1").await.unwrap();
    assert_matches!(engine.get_movement("M1").await, Err(ServiceError::NotFound(_)));
    assert_eq!(h.quantity("P1", 1).await, Some(25));

    assert_matches!(engine.delete_movement("M1").await, Err(ServiceError::NotFound(_)));
    assert_matches!(engine.delete_movement("unknown").await, Err(ServiceError::NotFound(_)));
    assert_matches!(engine.delete_movement("").await, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn failed_append_rolls_back_the_ledger_change() {
    let h = Harness::new().await;
    h.engine()
        .record_receipt(movement("M1", "P1", 1, 10), &CancellationToken::new())
        .await
        .unwrap();

    let engine = h.engine_with(
        h.ledger.clone(),
        Arc::new(FailingMovementLog {
            inner: h.movements.clone(),
        }),
    );
    let err = engine
        .record_receipt(movement("M2", "P1", 1, 5), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::ReconciliationError { ref failures } if failures.len() == 1);
    assert!(err.to_string().contains("append movement M2"));
    assert_eq!(h.quantity("P1", 1).await, Some(10));
    assert_eq!(h.movement_count().await, 1);
}

#[tokio::test]
async fn failed_ledger_write_rolls_back_the_append() {
    let h = Harness::new().await;
    let engine = h.engine_with(
        Arc::new(FlakyLedger::failing(h.ledger.clone())),
        h.movements.clone(),
    );

    let err = engine
        .record_receipt(movement("M1", "P1", 1, 5), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::ReconciliationError { .. });
    assert!(err
        .to_string()
        .contains("increment quantity for product P1 in warehouse 1"));
    assert_eq!(h.movement_count().await, 0);
    assert_eq!(h.quantity("P1", 1).await, Some(0));
}

#[tokio::test]
async fn both_failures_are_reported_together() {
    let h = Harness::new().await;
    let engine = h.engine_with(
        Arc::new(FlakyLedger::failing(h.ledger.clone())),
        Arc::new(FailingMovementLog {
            inner: h.movements.clone(),
        }),
    );

    let err = engine
        .record_receipt(movement("M1", "P1", 1, 5), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::ReconciliationError { ref failures } if failures.len() == 2);
    assert_eq!(h.movement_count().await, 0);
}

#[tokio::test]
async fn failed_provisioning_is_a_dependency_error() {
    let h = Harness::new().await;
    let ledger = Arc::new(UnreliableLookups::new(h.ledger.clone(), false, true));
    let engine = h.engine_with(ledger.clone(), h.movements.clone());

    let err = engine
        .record_receipt(movement("M1", "P1", 1, 5), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::DependencyError(ref msg) if msg.contains("product P1 in warehouse 1"));
    assert_eq!(ledger.writes.load(Ordering::SeqCst), 0);
    assert_eq!(h.movement_count().await, 0);
    assert_eq!(h.quantity("P1", 1).await, None);
}

#[tokio::test]
async fn failed_lookup_still_provisions_and_commits() {
    let h = Harness::new().await;
    let ledger = Arc::new(UnreliableLookups::new(h.ledger.clone(), true, false));
    let engine = h.engine_with(ledger.clone(), h.movements.clone());

    let recorded = engine
        .record_receipt(movement("M1", "P1", 1, 5), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(recorded.quantity, 5);
    assert_eq!(ledger.writes.load(Ordering::SeqCst), 1);
    assert_eq!(h.quantity("P1", 1).await, Some(5));
    assert_eq!(h.movement_count().await, 1);
}

#[tokio::test]
async fn commit_failure_leaves_nothing_recorded() {
    let h = Harness::new().await;
    // Every logged movement adds a dangling deferred reference, so the
    // statements succeed and COMMIT is rejected.
    for sql in [
        "CREATE TABLE commit_guard_parent (id INTEGER PRIMARY KEY)",
        "CREATE TABLE commit_guard (parent_id INTEGER REFERENCES commit_guard_parent(id) DEFERRABLE INITIALLY DEFERRED)",
        "CREATE TRIGGER guard_movements AFTER INSERT ON inventory_transactions BEGIN INSERT INTO commit_guard (parent_id) VALUES (1); END",
    ] {
        h.db.execute_unprepared(sql).await.unwrap();
    }

    let err = h
        .engine()
        .record_receipt(movement("M1", "P1", 1, 5), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::CommitError(ref msg) if msg.starts_with("movement M1"));
    assert_eq!(h.movement_count().await, 0);
    assert_eq!(h.quantity("P1", 1).await, Some(0));
}

#[tokio::test]
async fn cancelled_token_persists_nothing() {
    let h = Harness::new().await;
    let token = CancellationToken::new();
    token.cancel();

    let err = h
        .engine()
        .record_receipt(movement("M1", "P1", 1, 5), &token)
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::Cancelled(_));
    assert_eq!(h.quantity("P1", 1).await, None);
    assert_eq!(h.movement_count().await, 0);
}

#[tokio::test]
async fn cancellation_before_commit_rolls_back_both_writes() {
    let h = Harness::new().await;
    let token = CancellationToken::new();
    let engine = h.engine_with(
        Arc::new(FlakyLedger::cancelling(h.ledger.clone(), token.clone())),
        h.movements.clone(),
    );

    let err = engine
        .record_receipt(movement("M1", "P1", 1, 5), &token)
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::Cancelled(_));
    assert_eq!(h.quantity("P1", 1).await, Some(0));
    assert_eq!(h.movement_count().await, 0);
}

#[tokio::test]
async fn committed_movements_publish_events() {
    let mut h = Harness::new().await;
    let engine = h.engine();

    engine
        .record_receipt(movement("M1", "P1", 2, 7), &CancellationToken::new())
        .await
        .unwrap();
    engine.delete_movement("M1").await.unwrap();

    assert_eq!(
        h.events.recv().await,
        Some(Event::MovementRecorded {
            movement_id: "M1".into(),
            product_id: "P1".into(),
            warehouse_id: 2,
            kind: MovementKind::Receipt,
            quantity: 7,
        })
    );
    assert_eq!(
        h.events.recv().await,
        Some(Event::MovementDeleted {
            movement_id: "M1".into()
        })
    );
}

#[tokio::test]
async fn closed_event_channel_does_not_fail_a_commit() {
    let h = Harness::new().await;
    let engine = h.engine();
    drop(h.events);

    let recorded = engine
        .record_receipt(movement("M1", "P1", 1, 3), &CancellationToken::new())
        .await;

    assert!(recorded.is_ok());
}

#[tokio::test]
async fn movements_list_newest_first_with_total() {
    let h = Harness::new().await;
    let engine = h.engine();
    let token = CancellationToken::new();

    for (i, qty) in [5, 6, 7].into_iter().enumerate() {
        engine
            .record_receipt(movement(&format!("M{}", i + 1), "P1", 1, qty), &token)
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let (page, total) = engine
        .list_movements(PageRequest { page: 1, limit: 2 })
        .await
        .unwrap();
    assert_eq!(total, 3);
    let ids: Vec<_> = page.iter().map(|m| m.transaction_id.as_str()).collect();
    assert_eq!(ids, vec!["M3", "M2"]);

    let (page, _) = engine
        .list_movements(PageRequest { page: 2, limit: 2 })
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].transaction_id, "M1");
}
