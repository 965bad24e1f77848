use std::sync::Arc;
use wallet_ledger::application::engine::LedgerEngine;
use wallet_ledger::domain::wallet::DeltaMode;
use wallet_ledger::infrastructure::in_memory::InMemoryWalletStore;
use wallet_ledger::interfaces::facade::{Body, Outcome, WalletFacade, WalletRequest};

mod common;

#[tokio::test]
async fn test_store_failure_is_internal_error_without_detail() {
    let engine = LedgerEngine::new(Box::new(common::UnavailableStore));
    let facade = WalletFacade::new(Arc::new(engine));

    let responses = [
        facade.create(Some("p1"), Some("10")).await,
        facade.get("1").await,
        facade.adjust("1", Some("5"), DeltaMode::Credit).await,
    ];

    for response in responses {
        assert_eq!(response.outcome, Outcome::InternalError);
        assert_eq!(response.status_code(), 500);
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("10.0.0.3"), "leaked detail: {json}");
        assert!(!json.contains("postgres"), "leaked detail: {json}");
    }
}

#[tokio::test]
async fn test_sustained_contention_is_conflict() {
    let store = common::ContendedStore {
        inner: InMemoryWalletStore::new(),
    };
    let facade = WalletFacade::new(Arc::new(LedgerEngine::new(Box::new(store))));
    facade.create(Some("p1"), Some("10")).await;

    let response = facade
        .handle(WalletRequest::Credit {
            id: "1".to_string(),
            amount: Some("5".to_string()),
        })
        .await;
    assert_eq!(response.outcome, Outcome::Conflict);
    assert_eq!(response.status_code(), 409);
}

#[tokio::test]
async fn test_create_read_credit_debit_round() {
    let facade = WalletFacade::new(common::in_memory_engine());

    let created = facade
        .handle(WalletRequest::Create {
            player_id: Some("player123".to_string()),
            balance: Some("100".to_string()),
        })
        .await;
    assert_eq!(created.outcome, Outcome::Created);
    let id = created.wallet_body().unwrap().id.to_string();
    assert_eq!(created.location, Some(format!("/v1/wallet/{id}")));

    let credited = facade
        .handle(WalletRequest::Credit {
            id: id.clone(),
            amount: Some("50".to_string()),
        })
        .await;
    assert_eq!(credited.wallet_body().unwrap().balance, 150);

    let rejected = facade
        .handle(WalletRequest::Debit {
            id: id.clone(),
            amount: Some("200".to_string()),
        })
        .await;
    assert_eq!(rejected.outcome, Outcome::BadRequest);
    assert!(matches!(rejected.body, Body::Error(ref msg) if msg.contains("Insufficient funds")));

    let read = facade.handle(WalletRequest::Get { id }).await;
    assert_eq!(read.outcome, Outcome::Ok);
    assert_eq!(read.wallet_body().unwrap().balance, 150);
    assert_eq!(read.wallet_body().unwrap().version.0, 1);
}

#[tokio::test]
async fn test_unknown_wallet_is_not_found_for_every_action() {
    let facade = WalletFacade::new(common::in_memory_engine());

    assert_eq!(facade.get("999").await.outcome, Outcome::NotFound);
    assert_eq!(
        facade.adjust("999", Some("1"), DeltaMode::Credit).await.outcome,
        Outcome::NotFound
    );
    assert_eq!(
        facade.adjust("999", Some("1"), DeltaMode::Debit).await.outcome,
        Outcome::NotFound
    );
}
