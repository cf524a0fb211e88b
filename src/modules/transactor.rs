//! Transaction submission with phase reporting

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::B256;
use alloy::rpc::types::TransactionRequest;

use crate::domain::error::error_message;
use crate::infrastructure::ethereum::{EthereumProvider, ReceiptSummary};

/// Shown when a write has no sending account
pub const NO_ACCOUNT: &str = "Cannot access account";

/// Where a submitted transaction stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxPhase {
    Idle,
    AwaitingSignature,
    AwaitingInclusion { hash: B256 },
    Completed(ReceiptSummary),
    Failed(String),
}

impl TxPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TxPhase::Completed(_) | TxPhase::Failed(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            TxPhase::AwaitingSignature | TxPhase::AwaitingInclusion { .. }
        )
    }
}

impl fmt::Display for TxPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxPhase::Idle => f.write_str("idle"),
            TxPhase::AwaitingSignature => f.write_str("awaiting signature"),
            TxPhase::AwaitingInclusion { hash } => write!(f, "waiting for {}", hash),
            TxPhase::Completed(receipt) if receipt.status => f.write_str("confirmed"),
            TxPhase::Completed(_) => f.write_str("reverted"),
            TxPhase::Failed(message) => write!(f, "failed: {}", message),
        }
    }
}

/// Drives one transaction from submission to receipt. Each submission uses a
/// fresh transactor; nothing is retried.
pub struct Transactor {
    provider: Arc<dyn EthereumProvider>,
    receipt_timeout: Duration,
    phase: TxPhase,
}

impl Transactor {
    pub fn new(provider: Arc<dyn EthereumProvider>, receipt_timeout: Duration) -> Self {
        Self {
            provider,
            receipt_timeout,
            phase: TxPhase::Idle,
        }
    }

    pub fn phase(&self) -> &TxPhase {
        &self.phase
    }

    fn advance(&mut self, phase: TxPhase, notify: &mut impl FnMut(&TxPhase)) {
        tracing::debug!(phase = %phase, "transaction phase");
        self.phase = phase;
        notify(&self.phase);
    }

    /// Submit `request` and wait for inclusion, reporting every phase change.
    /// Returns the terminal phase.
    pub async fn submit(
        mut self,
        request: TransactionRequest,
        mut notify: impl FnMut(&TxPhase),
    ) -> TxPhase {
        if request.from.is_none() {
            self.advance(TxPhase::Failed(NO_ACCOUNT.to_string()), &mut notify);
            return self.phase;
        }

        self.advance(TxPhase::AwaitingSignature, &mut notify);
        let hash = match self.provider.send_transaction(request).await {
            Ok(hash) => hash,
            Err(err) => {
                let message = error_message(&err);
                tracing::warn!(error = %message, "transaction rejected");
                self.advance(TxPhase::Failed(message), &mut notify);
                return self.phase;
            }
        };

        tracing::info!(%hash, "transaction submitted");
        self.advance(TxPhase::AwaitingInclusion { hash }, &mut notify);
        match self
            .provider
            .wait_for_receipt(hash, self.receipt_timeout)
            .await
        {
            Ok(receipt) => {
                tracing::info!(%hash, status = receipt.status, block = ?receipt.block_number, "transaction included");
                self.advance(TxPhase::Completed(receipt), &mut notify);
            }
            Err(err) => {
                let message = error_message(&err);
                tracing::warn!(%hash, error = %message, "no receipt");
                self.advance(TxPhase::Failed(message), &mut notify);
            }
        }
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, U256};

    use super::*;
    use crate::infrastructure::ethereum::mock::MockProvider;

    fn request(from: Option<Address>) -> TransactionRequest {
        let request = TransactionRequest::default()
            .to(Address::with_last_byte(9))
            .value(U256::from(1u64));
        match from {
            Some(from) => request.from(from),
            None => request,
        }
    }

    #[tokio::test]
    async fn test_successful_submission_reports_every_phase() {
        let provider = Arc::new(MockProvider::new(31337));
        let transactor = Transactor::new(provider.clone(), Duration::from_secs(1));
        let mut phases = Vec::new();

        let last = transactor
            .submit(request(Some(Address::with_last_byte(1))), |p| phases.push(p.clone()))
            .await;

        assert!(matches!(last, TxPhase::Completed(ref r) if r.status));
        assert_eq!(phases.len(), 3);
        assert_eq!(phases[0], TxPhase::AwaitingSignature);
        assert!(matches!(phases[1], TxPhase::AwaitingInclusion { .. }));
        assert!(phases[2].is_terminal());
        assert_eq!(provider.with(|s| s.sent.len()), 1);
    }

    #[tokio::test]
    async fn test_missing_account_fails_without_sending() {
        let provider = Arc::new(MockProvider::new(31337));
        let transactor = Transactor::new(provider.clone(), Duration::from_secs(1));
        let mut phases = Vec::new();

        let last = transactor.submit(request(None), |p| phases.push(p.clone())).await;

        assert_eq!(last, TxPhase::Failed(NO_ACCOUNT.to_string()));
        assert_eq!(phases, vec![TxPhase::Failed(NO_ACCOUNT.to_string())]);
        assert!(provider.with(|s| s.sent.is_empty()));
    }

    #[tokio::test]
    async fn test_rejection_is_normalized() {
        let provider = Arc::new(MockProvider::new(31337));
        provider.with(|s| s.send_error = Some("insufficient funds for gas".into()));
        let transactor = Transactor::new(provider, Duration::from_secs(1));

        let last = transactor
            .submit(request(Some(Address::with_last_byte(1))), |_| {})
            .await;
        assert_eq!(last, TxPhase::Failed("insufficient funds for gas".into()));
    }

    #[tokio::test]
    async fn test_missing_receipt_times_out() {
        let provider = Arc::new(MockProvider::new(31337));
        let transactor = Transactor::new(provider.clone(), Duration::from_millis(10));
        let mut phases = Vec::new();

        // drop receipts as soon as they are recorded
        let last = transactor
            .submit(request(Some(Address::with_last_byte(1))), |p| {
                if matches!(p, TxPhase::AwaitingInclusion { .. }) {
                    provider.with(|s| s.receipts.clear());
                }
                phases.push(p.clone());
            })
            .await;

        assert!(matches!(last, TxPhase::Failed(ref m) if m.contains("Timed out")));
        assert_eq!(phases.len(), 3);
    }
}
