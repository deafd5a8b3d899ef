//! Configuration types for the pool ledger and its service wrapper.

use serde::{Deserialize, Serialize};

use crate::{AccountId, constants};

/// What happens to residual value in a pool nobody holds shares in.
///
/// The policy is applied when the next deposit bootstraps the pool at 1:1.
/// Such dust only exists in a restored state, since the last holder to
/// withdraw redeems everything that is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DustPolicy {
    /// Leave dust in `total_value`; the bootstrap depositor absorbs it.
    #[default]
    Retain,
    /// Remove dust from the pool into a separate swept counter.
    Sweep,
    /// Park dust and add it to the next reward injection.
    CarryToNextReward,
}

impl std::fmt::Display for DustPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Retain => write!(f, "RETAIN"),
            Self::Sweep => write!(f, "SWEEP"),
            Self::CarryToNextReward => write!(f, "CARRY_TO_NEXT_REWARD"),
        }
    }
}

/// Ledger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// The single identity allowed to inject rewards.
    pub operator: AccountId,
    /// Disposition of residual value found at bootstrap.
    #[serde(default)]
    pub dust_policy: DustPolicy,
}

impl PoolConfig {
    /// Config with the given operator and the default dust policy.
    #[must_use]
    pub fn new(operator: AccountId) -> Self {
        Self {
            operator,
            dust_policy: DustPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_dust_policy(mut self, dust_policy: DustPolicy) -> Self {
        self.dust_policy = dust_policy;
        self
    }
}

/// Settings for the service wrapper around the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Bounded mailbox size for the single-writer actor.
    pub mailbox_capacity: usize,
    /// Log filter used when `RUST_LOG` is not set.
    pub log_level: String,
    /// Emit newline-delimited JSON logs instead of human-readable lines.
    pub log_json: bool,
    /// Buffered events per live subscriber before it starts lagging.
    pub event_buffer: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: constants::DEFAULT_MAILBOX_CAPACITY,
            log_level: constants::DEFAULT_LOG_LEVEL.to_string(),
            log_json: false,
            event_buffer: constants::DEFAULT_EVENT_BUFFER,
        }
    }
}

/// Top-level configuration file layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharePoolConfig {
    pub pool: PoolConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dust_policy_default_is_retain() {
        assert_eq!(DustPolicy::default(), DustPolicy::Retain);
        assert_eq!(format!("{}", DustPolicy::CarryToNextReward), "CARRY_TO_NEXT_REWARD");
    }

    #[test]
    fn service_config_defaults() {
        let cfg = ServiceConfig::default();
        assert_eq!(cfg.mailbox_capacity, 1024);
        assert_eq!(cfg.log_level, "info");
        assert!(!cfg.log_json);
        assert_eq!(cfg.event_buffer, 256);
    }

    #[test]
    fn pool_config_builder() {
        let op = AccountId::from_bytes([9; 20]);
        let cfg = PoolConfig::new(op).with_dust_policy(DustPolicy::Sweep);
        assert_eq!(cfg.operator, op);
        assert_eq!(cfg.dust_policy, DustPolicy::Sweep);
    }

    #[test]
    fn config_serde_roundtrip_with_defaults() {
        let json = format!(r#"{{"pool":{{"operator":"0x{}"}}}}"#, "11".repeat(20));
        let cfg: SharePoolConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.pool.operator, AccountId::from_bytes([0x11; 20]));
        assert_eq!(cfg.pool.dust_policy, DustPolicy::Retain);
        assert_eq!(cfg.service, ServiceConfig::default());
    }
}
