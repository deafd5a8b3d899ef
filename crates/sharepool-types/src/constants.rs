//! System-wide constants for the SharePool ledger.

/// Default capacity of the pool service mailbox (bounded `mpsc` channel).
pub const DEFAULT_MAILBOX_CAPACITY: usize = 1024;

/// Default log filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default per-subscriber buffer of the live event broadcast.
pub const DEFAULT_EVENT_BUFFER: usize = 256;

/// Default capacity of an in-memory event journal.
pub const DEFAULT_JOURNAL_CAPACITY: usize = 10_000;

/// Domain separator for the ledger state digest.
pub const STATE_DIGEST_DOMAIN: &[u8] = b"sharepool:state:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "SharePool";
