//! Single-writer actor around the gateway.
//!
//! Every mutation of the pool reads and rewrites the shared aggregates, so
//! all calls are funnelled through one tokio task that owns the gateway.
//! Reads go through the same mailbox and therefore never observe a
//! half-applied operation.
//!
//! ```text
//!   PoolHandle (Clone) ──┐
//!   PoolHandle (Clone) ──┼── mpsc (bounded) ──▶ PoolActor ──▶ Gateway ──▶ ShareLedger
//!   PoolHandle (Clone) ──┘                         │
//!                                                  └── oneshot reply per message
//! ```

use sharepool_ledger::{AccessControl, EventSink, ValueCustody};
use sharepool_types::{
    AccountId, DepositReceipt, PoolSnapshot, Result, SharePoolError, Value, WithdrawReceipt,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::gateway::{Call, Gateway, Outcome};

/// Message sent to the pool actor.
#[derive(Debug)]
pub enum PoolMessage {
    /// Route a boundary call through the gateway.
    Call {
        call: Call,
        response: oneshot::Sender<Result<Outcome>>,
    },

    /// Retry delivery of a pending payout.
    ClaimPending {
        account: AccountId,
        response: oneshot::Sender<Result<Value>>,
    },

    Snapshot {
        response: oneshot::Sender<PoolSnapshot>,
    },

    PendingPayout {
        account: AccountId,
        response: oneshot::Sender<Value>,
    },

    /// Run both conservation audits.
    VerifyConservation {
        response: oneshot::Sender<Result<()>>,
    },

    /// Stop after the messages already queued ahead of this one.
    Shutdown,
}

/// Owns the gateway and applies messages one at a time.
pub struct PoolActor<A, C, S> {
    gateway: Gateway<A, C, S>,
    mailbox: mpsc::Receiver<PoolMessage>,
}

impl<A, C, S> PoolActor<A, C, S>
where
    A: AccessControl,
    C: ValueCustody,
    S: EventSink,
{
    #[must_use]
    pub fn new(gateway: Gateway<A, C, S>, mailbox: mpsc::Receiver<PoolMessage>) -> Self {
        Self { gateway, mailbox }
    }

    /// Process messages until `Shutdown` or until every handle is dropped.
    /// Returns the gateway so its final state can be inspected.
    pub async fn run(mut self) -> Gateway<A, C, S> {
        tracing::info!("Pool actor started");
        while let Some(msg) = self.mailbox.recv().await {
            if matches!(msg, PoolMessage::Shutdown) {
                tracing::info!("Pool actor shutting down");
                break;
            }
            self.handle_message(msg);
        }
        self.mailbox.close();
        tracing::info!(
            participants = self.gateway.ledger().participant_count(),
            total_value = %self.gateway.ledger().total_value(),
            "Pool actor stopped"
        );
        self.gateway
    }

    fn handle_message(&mut self, msg: PoolMessage) {
        // A dropped receiver means the caller gave up; the operation still
        // stands.
        match msg {
            PoolMessage::Call { call, response } => {
                let result = self.gateway.dispatch(call);
                if let Err(e) = &result {
                    tracing::debug!(call = ?call, error = %e, "Call rejected");
                }
                let _ = response.send(result);
            }
            PoolMessage::ClaimPending { account, response } => {
                let _ = response.send(self.gateway.ledger_mut().claim_pending(account));
            }
            PoolMessage::Snapshot { response } => {
                let _ = response.send(self.gateway.ledger().snapshot());
            }
            PoolMessage::PendingPayout { account, response } => {
                let _ = response.send(self.gateway.ledger().pending_payout(&account));
            }
            PoolMessage::VerifyConservation { response } => {
                let _ = response.send(self.gateway.ledger().verify_conservation());
            }
            PoolMessage::Shutdown => {}
        }
    }
}

/// Cloneable handle for talking to the pool actor.
#[derive(Debug, Clone)]
pub struct PoolHandle {
    sender: mpsc::Sender<PoolMessage>,
}

impl PoolHandle {
    #[must_use]
    pub fn new(sender: mpsc::Sender<PoolMessage>) -> Self {
        Self { sender }
    }

    /// Send a raw boundary call.
    pub async fn call(&self, call: Call) -> Result<Outcome> {
        self.request(|response| PoolMessage::Call { call, response }).await?
    }

    pub async fn deposit(&self, from: AccountId, value: Value) -> Result<DepositReceipt> {
        match self.call(Call::Deposit { from, value }).await? {
            Outcome::Deposited(receipt) => Ok(receipt),
            other => Err(unexpected("deposit", other)),
        }
    }

    /// Send value with no instruction; the pool treats it as a deposit.
    pub async fn transfer(&self, from: AccountId, value: Value) -> Result<DepositReceipt> {
        match self.call(Call::Transfer { from, value }).await? {
            Outcome::Deposited(receipt) => Ok(receipt),
            other => Err(unexpected("transfer", other)),
        }
    }

    pub async fn withdraw(&self, from: AccountId) -> Result<WithdrawReceipt> {
        match self.call(Call::Withdraw { from }).await? {
            Outcome::Withdrawn(receipt) => Ok(receipt),
            other => Err(unexpected("withdraw", other)),
        }
    }

    pub async fn deposit_reward(&self, from: AccountId, value: Value) -> Result<()> {
        match self.call(Call::DepositReward { from, value }).await? {
            Outcome::RewardAccepted => Ok(()),
            other => Err(unexpected("deposit_reward", other)),
        }
    }

    pub async fn balance_of(&self, account: AccountId) -> Result<Value> {
        match self.call(Call::BalanceOf { account }).await? {
            Outcome::Balance(value) => Ok(value),
            other => Err(unexpected("balance_of", other)),
        }
    }

    pub async fn claim_pending(&self, account: AccountId) -> Result<Value> {
        self.request(|response| PoolMessage::ClaimPending { account, response })
            .await?
    }

    pub async fn pending_payout(&self, account: AccountId) -> Result<Value> {
        self.request(|response| PoolMessage::PendingPayout { account, response })
            .await
    }

    pub async fn snapshot(&self) -> Result<PoolSnapshot> {
        self.request(|response| PoolMessage::Snapshot { response }).await
    }

    pub async fn verify_conservation(&self) -> Result<()> {
        self.request(|response| PoolMessage::VerifyConservation { response })
            .await?
    }

    /// Ask the actor to stop once the messages queued before this one are done.
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(PoolMessage::Shutdown)
            .await
            .map_err(|_| SharePoolError::ServiceUnavailable)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> PoolMessage,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .map_err(|_| SharePoolError::ServiceUnavailable)?;
        rx.await.map_err(|_| SharePoolError::ServiceUnavailable)
    }
}

fn unexpected(operation: &str, outcome: Outcome) -> SharePoolError {
    SharePoolError::Internal(format!("{operation} produced unexpected outcome {outcome:?}"))
}

/// Spawn the actor on the current tokio runtime.
///
/// The join handle resolves to the gateway once the actor stops.
///
/// # Errors
/// `Configuration` if `mailbox_capacity` is zero.
pub fn spawn_pool_actor<A, C, S>(
    gateway: Gateway<A, C, S>,
    mailbox_capacity: usize,
) -> Result<(PoolHandle, JoinHandle<Gateway<A, C, S>>)>
where
    A: AccessControl + Send + 'static,
    C: ValueCustody + Send + 'static,
    S: EventSink + Send + 'static,
{
    if mailbox_capacity == 0 {
        return Err(SharePoolError::Configuration("mailbox capacity must be > 0".into()));
    }
    let (tx, rx) = mpsc::channel(mailbox_capacity);
    let actor = PoolActor::new(gateway, rx);
    let join = tokio::spawn(actor.run());
    Ok((PoolHandle::new(tx), join))
}

#[cfg(test)]
mod tests {
    use sharepool_ledger::{EventJournal, InMemoryCustody, ShareLedger, SingleOperator};
    use sharepool_types::PoolConfig;

    use super::*;

    type TestGateway = Gateway<SingleOperator, InMemoryCustody, EventJournal>;

    fn spawn() -> (PoolHandle, JoinHandle<TestGateway>, AccountId) {
        let team = AccountId::random();
        let ledger = ShareLedger::from_config(
            &PoolConfig::new(team),
            InMemoryCustody::new(),
            EventJournal::new(128),
        );
        let (handle, join) = spawn_pool_actor(Gateway::new(ledger), 16).unwrap();
        (handle, join, team)
    }

    #[tokio::test]
    async fn zero_mailbox_rejected() {
        let ledger = ShareLedger::from_config(
            &PoolConfig::new(AccountId::random()),
            InMemoryCustody::new(),
            EventJournal::new(4),
        );
        let result = spawn_pool_actor(Gateway::new(ledger), 0);
        assert!(matches!(result, Err(SharePoolError::Configuration(_))));
    }

    #[tokio::test]
    async fn deposit_reward_withdraw_through_handle() {
        let (handle, join, team) = spawn();
        let alice = AccountId::random();

        let receipt = handle.deposit(alice, 100).await.unwrap();
        assert_eq!(receipt.shares_minted, 100);
        handle.deposit_reward(team, 50).await.unwrap();
        assert_eq!(handle.balance_of(alice).await.unwrap(), 150);

        let paid = handle.withdraw(alice).await.unwrap();
        assert_eq!(paid.amount_paid, 150);
        assert!(handle.snapshot().await.unwrap().is_empty());
        handle.verify_conservation().await.unwrap();

        handle.shutdown().await.unwrap();
        let gateway = join.await.unwrap();
        assert_eq!(gateway.ledger().custody().paid_to(&alice), 150);
    }

    #[tokio::test]
    async fn errors_are_returned_to_caller() {
        let (handle, _join, team) = spawn();
        assert_eq!(
            handle.deposit_reward(team, 1).await,
            Err(SharePoolError::EmptyPool)
        );
        let stranger = AccountId::random();
        assert_eq!(
            handle.withdraw(stranger).await,
            Err(SharePoolError::NoBalance(stranger))
        );
        assert_eq!(
            handle.claim_pending(stranger).await,
            Err(SharePoolError::NoPendingPayout(stranger))
        );
    }

    #[tokio::test]
    async fn calls_after_shutdown_are_unavailable() {
        let (handle, join, _) = spawn();
        handle.shutdown().await.unwrap();
        join.await.unwrap();

        let alice = AccountId::random();
        assert_eq!(
            handle.deposit(alice, 1).await,
            Err(SharePoolError::ServiceUnavailable)
        );
        assert_eq!(handle.shutdown().await, Err(SharePoolError::ServiceUnavailable));
    }

    #[tokio::test]
    async fn dropping_all_handles_stops_actor() {
        let (handle, join, _) = spawn();
        handle.transfer(AccountId::random(), 5).await.unwrap();
        drop(handle);
        let gateway = join.await.unwrap();
        assert_eq!(gateway.ledger().total_value(), 5);
    }
}
