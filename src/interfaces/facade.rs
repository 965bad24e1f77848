use crate::application::engine::LedgerEngine;
use crate::domain::wallet::{DeltaMode, Wallet, WalletId};
use crate::error::LedgerError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

/// A raw request as it arrives from the outside, before any validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletRequest {
    Create {
        player_id: Option<String>,
        balance: Option<String>,
    },
    Get {
        id: String,
    },
    Credit {
        id: String,
        amount: Option<String>,
    },
    Debit {
        id: String,
        amount: Option<String>,
    },
}

impl WalletRequest {
    fn action(&self) -> &'static str {
        match self {
            WalletRequest::Create { .. } => "create",
            WalletRequest::Get { .. } => "get",
            WalletRequest::Credit { .. } => "credit",
            WalletRequest::Debit { .. } => "debit",
        }
    }
}

/// Transport-level outcome of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Ok,
    BadRequest,
    NotFound,
    Conflict,
    InternalError,
}

impl Outcome {
    pub fn status_code(&self) -> u16 {
        match self {
            Outcome::Created => 201,
            Outcome::Ok => 200,
            Outcome::BadRequest => 400,
            Outcome::NotFound => 404,
            Outcome::Conflict => 409,
            Outcome::InternalError => 500,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status_code())
    }
}

impl From<&LedgerError> for Outcome {
    fn from(err: &LedgerError) -> Self {
        match err {
            LedgerError::InvalidAmount(_) | LedgerError::InsufficientFunds { .. } => {
                Outcome::BadRequest
            }
            LedgerError::WalletNotFound(_) => Outcome::NotFound,
            LedgerError::ConcurrentUpdateExhausted { .. } | LedgerError::AmbiguousOutcome(_) => {
                Outcome::Conflict
            }
            LedgerError::StoreUnavailable(_) => Outcome::InternalError,
        }
    }
}

/// Response payload, serialized as `{"wallet": {...}}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Body {
    Wallet(Wallet),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    #[serde(rename = "status", serialize_with = "serialize_status")]
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub body: Body,
}

fn serialize_status<S>(outcome: &Outcome, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u16(outcome.status_code())
}

impl Response {
    fn wallet(outcome: Outcome, wallet: Wallet) -> Self {
        Self {
            outcome,
            location: None,
            body: Body::Wallet(wallet),
        }
    }

    fn created(wallet: Wallet) -> Self {
        Self {
            outcome: Outcome::Created,
            location: Some(format!("/v1/wallet/{}", wallet.id)),
            body: Body::Wallet(wallet),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::BadRequest,
            location: None,
            body: Body::Error(message.into()),
        }
    }

    fn from_error(err: &LedgerError) -> Self {
        Self {
            outcome: Outcome::from(err),
            location: None,
            body: Body::Error(err.client_message()),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.outcome.status_code()
    }

    pub fn wallet_body(&self) -> Option<&Wallet> {
        match &self.body {
            Body::Wallet(wallet) => Some(wallet),
            Body::Error(_) => None,
        }
    }
}

fn parse_id(raw: &str) -> Result<WalletId, Response> {
    raw.parse::<WalletId>()
        .map_err(|_| Response::bad_request(format!("invalid wallet id: {:?}", raw)))
}

fn parse_integer(raw: Option<&str>, field: &str) -> Result<i64, Response> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Response::bad_request(format!("{field} is required")))?;
    raw.parse::<i64>()
        .map_err(|_| Response::bad_request(format!("{field} must be an integer, got {:?}", raw)))
}

/// Maps external wallet requests onto `LedgerEngine` calls.
///
/// Validates input shape only; every business rule lives in the engine.
#[derive(Clone)]
pub struct WalletFacade {
    engine: Arc<LedgerEngine>,
}

impl WalletFacade {
    pub fn new(engine: Arc<LedgerEngine>) -> Self {
        Self { engine }
    }

    pub async fn handle(&self, request: WalletRequest) -> Response {
        let action = request.action();
        let response = match request {
            WalletRequest::Create { player_id, balance } => {
                self.create(player_id.as_deref(), balance.as_deref()).await
            }
            WalletRequest::Get { id } => self.get(&id).await,
            WalletRequest::Credit { id, amount } => {
                self.adjust(&id, amount.as_deref(), DeltaMode::Credit).await
            }
            WalletRequest::Debit { id, amount } => {
                self.adjust(&id, amount.as_deref(), DeltaMode::Debit).await
            }
        };

        info!(action, status = %response.outcome, "request handled");
        response
    }

    /// A missing initial balance means an empty wallet.
    pub async fn create(&self, player_id: Option<&str>, balance: Option<&str>) -> Response {
        let player_id = match player_id.map(str::trim).filter(|p| !p.is_empty()) {
            Some(player_id) => player_id,
            None => return Response::bad_request("playerId is required"),
        };
        let balance = match balance.map(str::trim).filter(|b| !b.is_empty()) {
            None => 0,
            Some(raw) => match parse_integer(Some(raw), "balance") {
                Ok(balance) => balance,
                Err(response) => return response,
            },
        };

        match self.engine.create_wallet(player_id, balance).await {
            Ok(wallet) => Response::created(wallet),
            Err(e) => self.failure(e),
        }
    }

    pub async fn get(&self, id: &str) -> Response {
        let id = match parse_id(id) {
            Ok(id) => id,
            Err(response) => return response,
        };

        match self.engine.get_balance(id).await {
            Ok(wallet) => Response::wallet(Outcome::Ok, wallet),
            Err(e) => self.failure(e),
        }
    }

    pub async fn adjust(&self, id: &str, amount: Option<&str>, mode: DeltaMode) -> Response {
        let id = match parse_id(id) {
            Ok(id) => id,
            Err(response) => return response,
        };
        let amount = match parse_integer(amount, "amount") {
            Ok(amount) => amount,
            Err(response) => return response,
        };

        match self.engine.apply_delta(id, amount, mode).await {
            Ok(wallet) => Response::wallet(Outcome::Ok, wallet),
            Err(e) => self.failure(e),
        }
    }

    fn failure(&self, err: LedgerError) -> Response {
        if let LedgerError::StoreUnavailable(detail) = &err {
            error!(detail = %detail, "store failure");
        }
        Response::from_error(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::InMemoryWalletStore;

    fn facade() -> WalletFacade {
        let engine = LedgerEngine::new(Box::new(InMemoryWalletStore::new()));
        WalletFacade::new(Arc::new(engine))
    }

    #[tokio::test]
    async fn test_create_sets_location() {
        let facade = facade();
        let response = facade.create(Some("player123"), Some("100")).await;

        assert_eq!(response.outcome, Outcome::Created);
        assert_eq!(response.status_code(), 201);
        assert_eq!(response.location.as_deref(), Some("/v1/wallet/1"));
        assert_eq!(response.wallet_body().unwrap().balance, 100);
    }

    #[tokio::test]
    async fn test_create_defaults_balance_to_zero() {
        let facade = facade();
        let response = facade.create(Some("p1"), None).await;
        assert_eq!(response.wallet_body().unwrap().balance, 0);
    }

    #[tokio::test]
    async fn test_create_requires_player() {
        let facade = facade();
        assert_eq!(facade.create(None, Some("1")).await.outcome, Outcome::BadRequest);
        assert_eq!(facade.create(Some("  "), Some("1")).await.outcome, Outcome::BadRequest);
    }

    #[tokio::test]
    async fn test_create_negative_balance_is_bad_request() {
        let facade = facade();
        let response = facade.create(Some("p1"), Some("-1")).await;
        assert_eq!(response.outcome, Outcome::BadRequest);
    }

    #[tokio::test]
    async fn test_get_malformed_and_unknown_ids() {
        let facade = facade();
        assert_eq!(facade.get("abc").await.outcome, Outcome::BadRequest);
        assert_eq!(facade.get("-3").await.outcome, Outcome::BadRequest);
        assert_eq!(facade.get("+1").await.outcome, Outcome::BadRequest);

        let missing = facade.get("999").await;
        assert_eq!(missing.outcome, Outcome::NotFound);
        assert_eq!(missing.body, Body::Error("wallet not found".to_string()));
    }

    #[tokio::test]
    async fn test_adjust_amount_validation() {
        let facade = facade();
        facade.create(Some("p1"), Some("100")).await;

        for amount in [None, Some(""), Some("ten"), Some("1.5")] {
            let response = facade.adjust("1", amount, DeltaMode::Credit).await;
            assert_eq!(response.outcome, Outcome::BadRequest, "amount {:?}", amount);
        }
        for amount in ["0", "-5"] {
            let response = facade.adjust("1", Some(amount), DeltaMode::Credit).await;
            assert_eq!(response.outcome, Outcome::BadRequest);
        }

        let current = facade.get("1").await;
        assert_eq!(current.wallet_body().unwrap().balance, 100);
    }

    #[tokio::test]
    async fn test_credit_and_debit_flow() {
        let facade = facade();
        facade.create(Some("p1"), Some("100")).await;

        let credited = facade.adjust("1", Some("50"), DeltaMode::Credit).await;
        assert_eq!(credited.outcome, Outcome::Ok);
        assert_eq!(credited.wallet_body().unwrap().balance, 150);

        let overdrawn = facade.adjust("1", Some("151"), DeltaMode::Debit).await;
        assert_eq!(overdrawn.outcome, Outcome::BadRequest);

        let debited = facade.adjust("1", Some("150"), DeltaMode::Debit).await;
        assert_eq!(debited.wallet_body().unwrap().balance, 0);
    }

    #[tokio::test]
    async fn test_handle_dispatches_requests() {
        let facade = facade();
        let created = facade
            .handle(WalletRequest::Create {
                player_id: Some("p1".to_string()),
                balance: Some("10".to_string()),
            })
            .await;
        assert_eq!(created.outcome, Outcome::Created);

        let debited = facade
            .handle(WalletRequest::Debit {
                id: "1".to_string(),
                amount: Some("4".to_string()),
            })
            .await;
        assert_eq!(debited.wallet_body().unwrap().balance, 6);
    }

    #[test]
    fn test_error_outcome_mapping() {
        let cases = [
            (LedgerError::InvalidAmount("x".into()), 400),
            (
                LedgerError::InsufficientFunds {
                    balance: 1,
                    requested: 2,
                },
                400,
            ),
            (LedgerError::WalletNotFound(WalletId(1)), 404),
            (LedgerError::ConcurrentUpdateExhausted { attempts: 5 }, 409),
            (LedgerError::AmbiguousOutcome("compare_and_update"), 409),
            (LedgerError::StoreUnavailable("disk on fire".into()), 500),
        ];
        for (err, status) in cases {
            assert_eq!(Outcome::from(&err).status_code(), status, "{err}");
        }
    }

    #[test]
    fn test_response_serialization() {
        let response = Response::created(Wallet::new(WalletId(3), "p1", 7));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": 201,
                "location": "/v1/wallet/3",
                "body": {"wallet": {"id": 3, "playerId": "p1", "balance": 7, "version": 0}}
            })
        );

        let failure = Response::from_error(&LedgerError::StoreUnavailable("secret".into()));
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": 500, "body": {"error": "internal server error"}})
        );
    }
}
