//! Nomination handshake abstraction.
//!
//! Confirming or declining a successor nomination goes through an external
//! actor in a real deployment (a backing store or network call). The engine
//! only applies the ledger mutation after the gateway acknowledges; a gateway
//! failure leaves the nomination `proposed` and retryable.

use async_trait::async_trait;
use std::fmt;

use crate::domain::NominationId;
use crate::error::EngineError;

/// Error type for gateway operations.
#[derive(Debug, Clone)]
pub enum GatewayError {
    /// Network error (e.g., connection timeout, DNS failure).
    Network(String),
    /// Backing-store error.
    Backing(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Network(msg) => write!(f, "Network error: {}", msg),
            GatewayError::Backing(msg) => write!(f, "Backing-store error: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<GatewayError> for EngineError {
    fn from(err: GatewayError) -> Self {
        EngineError::TransientOperation(err.to_string())
    }
}

/// External acknowledgement for the nomination handshake.
#[async_trait]
pub trait NominationGateway: Send + Sync + fmt::Debug {
    /// Acknowledge a confirmation before the engine applies it.
    async fn confirm(&self, id: &NominationId) -> Result<(), GatewayError>;

    /// Acknowledge a decline before the engine applies it.
    async fn decline(&self, id: &NominationId) -> Result<(), GatewayError>;
}

/// In-process gateway for simulation runs: always acknowledges.
#[derive(Debug, Default, Clone)]
pub struct InProcessGateway;

#[async_trait]
impl NominationGateway for InProcessGateway {
    async fn confirm(&self, _id: &NominationId) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn decline(&self, _id: &NominationId) -> Result<(), GatewayError> {
        Ok(())
    }
}

/// Gateway that always fails, for exercising the retry path in tests.
#[derive(Debug, Default, Clone)]
pub struct FailingGateway;

#[async_trait]
impl NominationGateway for FailingGateway {
    async fn confirm(&self, _id: &NominationId) -> Result<(), GatewayError> {
        Err(GatewayError::Network("confirm unreachable".to_string()))
    }

    async fn decline(&self, _id: &NominationId) -> Result<(), GatewayError> {
        Err(GatewayError::Network("decline unreachable".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::Network("connection timeout".to_string());
        assert_eq!(err.to_string(), "Network error: connection timeout");

        let err = GatewayError::Backing("row locked".to_string());
        assert_eq!(err.to_string(), "Backing-store error: row locked");
    }

    #[test]
    fn test_gateway_error_maps_to_transient() {
        let err: EngineError = GatewayError::Network("x".to_string()).into();
        assert!(matches!(err, EngineError::TransientOperation(_)));
    }

    #[tokio::test]
    async fn test_in_process_gateway_acknowledges() {
        let gateway = InProcessGateway;
        let id = NominationId::new("n1");
        assert!(gateway.confirm(&id).await.is_ok());
        assert!(gateway.decline(&id).await.is_ok());
    }
}
