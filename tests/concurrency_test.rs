mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use sea_orm::DatabaseTransaction;
use stockroom_api::{
    entities::product_warehouse::Model as LedgerRow,
    errors::{AppError, ServiceError},
    events::EventSender,
    repositories::{MovementLogStore, MovementRepository, StockLedgerRepository, StockLedgerStore},
    services::ledger_reconciliation::{LedgerReconciliationService, NewMovement},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn issue(id: String, quantity: i32) -> NewMovement {
    NewMovement {
        movement_id: id,
        product_id: "P1".to_string(),
        warehouse_id: 1,
        quantity,
        note: None,
    }
}

/// Reports a fixed quantity on lookups so the issue pre-check always passes.
struct StaleReads {
    inner: Arc<StockLedgerRepository>,
    reported: i32,
}

#[async_trait]
impl StockLedgerStore for StaleReads {
    async fn find(&self, product_id: &str, warehouse_id: i32) -> Result<Option<LedgerRow>, AppError> {
        Ok(self.inner.find(product_id, warehouse_id).await?.map(|row| LedgerRow {
            quantity: self.reported,
            ..row
        }))
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
        self.inner.increment(txn, product_id, warehouse_id, quantity).await
    }

    async fn decrement(
        &self,
        txn: &DatabaseTransaction,
        product_id: &str,
        warehouse_id: i32,
        quantity: i32,
    ) -> Result<(), AppError> {
        self.inner.decrement(txn, product_id, warehouse_id, quantity).await
    }

    async fn list(&self, page: u64, limit: u64) -> Result<(Vec<LedgerRow>, u64), AppError> {
        self.inner.list(page, limit).await
    }
}

#[tokio::test]
async fn concurrent_issues_never_drive_stock_negative() {
    let (db, _cfg, _dir) = common::test_database().await;
    let (tx, _rx) = mpsc::channel(256);
    let engine = Arc::new(LedgerReconciliationService::with_database(
        db.clone(),
        EventSender::new(tx),
    ));

    engine
        .record_receipt(issue("R1".into(), 50), &CancellationToken::new())
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..20 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .record_issue(issue(format!("I{}", i), 5), &CancellationToken::new())
                .await
        }));
    }

    let mut committed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => committed += 1,
            Err(e) => assert_matches!(e, ServiceError::InsufficientStock { requested: 5, .. }),
        }
    }

    let ledger = StockLedgerRepository::new(db.clone());
    let remaining = ledger.find("P1", 1).await.unwrap().unwrap().quantity;
    assert_eq!(committed, 10);
    assert_eq!(remaining, 0);

    let (_, logged) = MovementRepository::new(db).list(1, 100).await.unwrap();
    assert_eq!(logged, 1 + committed as u64);
}

#[tokio::test]
async fn stale_precheck_is_caught_by_the_conditional_decrement() {
    let (db, _cfg, _dir) = common::test_database().await;
    let (tx, _rx) = mpsc::channel(16);
    let ledger = Arc::new(StockLedgerRepository::new(db.clone()));
    let movements = Arc::new(MovementRepository::new(db.clone()));

    let honest = LedgerReconciliationService::new(
        db.clone(),
        ledger.clone(),
        movements.clone(),
        EventSender::new(tx.clone()),
    );
    honest
        .record_receipt(issue("R1".into(), 10), &CancellationToken::new())
        .await
        .unwrap();

    let stale = LedgerReconciliationService::new(
        db.clone(),
        Arc::new(StaleReads {
            inner: ledger.clone(),
            reported: 1_000,
        }),
        movements.clone(),
        EventSender::new(tx),
    );
    let err = stale
        .record_issue(issue("I1".into(), 30), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_matches!(
        err,
        ServiceError::InsufficientStock {
            requested: 30,
            available: 10
        }
    );
    assert_eq!(ledger.find("P1", 1).await.unwrap().unwrap().quantity, 10);
    assert!(movements.find("I1").await.unwrap().is_none());
}
