//! # sharepool-service
//!
//! Boundary and service layer around the **SharePool** ledger.
//!
//! - [`Gateway`]: takes value into custody, routes [`Call`]s to the ledger,
//!   refunds value on rejection
//! - [`PoolActor`] / [`PoolHandle`]: single-writer tokio actor with a
//!   cloneable async handle
//! - [`BroadcastSink`]: live event subscription
//! - [`config`]: TOML configuration loading
//! - [`logging`]: `tracing-subscriber` initialisation

pub mod actor;
pub mod config;
pub mod gateway;
pub mod logging;
pub mod sink;

pub use actor::{PoolActor, PoolHandle, PoolMessage, spawn_pool_actor};
pub use config::{load_config, parse_config, validate};
pub use gateway::{Call, Gateway, Outcome};
pub use logging::{LogFormat, init_logging};
pub use sink::BroadcastSink;

use sharepool_ledger::{InMemoryCustody, ShareLedger, SingleOperator, TracingEventSink};
use sharepool_types::{Result, SharePoolConfig};
use tokio::task::JoinHandle;

/// Events go to the log and to live subscribers.
pub type ServiceSink = (TracingEventSink, BroadcastSink);

/// Gateway over in-memory custody with the configured single operator.
pub type InMemoryGateway = Gateway<SingleOperator, InMemoryCustody, ServiceSink>;

/// A running in-memory pool service.
pub struct PoolService {
    pub handle: PoolHandle,
    pub events: BroadcastSink,
    pub task: JoinHandle<InMemoryGateway>,
}

impl PoolService {
    /// Validate `config`, build the ledger from it and spawn its actor on
    /// the current runtime.
    ///
    /// # Errors
    /// `Configuration` if `config` fails [`validate`].
    pub fn start_in_memory(config: &SharePoolConfig) -> Result<Self> {
        validate(config)?;
        let events = BroadcastSink::new(config.service.event_buffer)?;
        let ledger = ShareLedger::from_config(
            &config.pool,
            InMemoryCustody::new(),
            (TracingEventSink, events.clone()),
        );
        let (handle, task) = spawn_pool_actor(Gateway::new(ledger), config.service.mailbox_capacity)?;
        tracing::info!(
            engine = sharepool_types::constants::ENGINE_NAME,
            version = sharepool_types::constants::VERSION,
            operator = %config.pool.operator,
            dust_policy = %config.pool.dust_policy,
            mailbox_capacity = config.service.mailbox_capacity,
            "Pool service started"
        );
        Ok(Self {
            handle,
            events,
            task,
        })
    }
}
