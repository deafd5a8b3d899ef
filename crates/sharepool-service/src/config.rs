//! TOML configuration loading.
//!
//! ```toml
//! [pool]
//! operator = "0x1111111111111111111111111111111111111111"
//! dust_policy = "sweep"          # retain | sweep | carry_to_next_reward
//!
//! [service]                      # optional, every field has a default
//! mailbox_capacity = 1024
//! log_level = "info"
//! log_json = false
//! event_buffer = 256
//! ```

use std::path::Path;

use sharepool_types::{Result, SharePoolConfig, SharePoolError};

/// Parse and validate a configuration document.
pub fn parse_config(text: &str) -> Result<SharePoolConfig> {
    let config: SharePoolConfig =
        toml::from_str(text).map_err(|e| SharePoolError::Configuration(e.to_string()))?;
    validate(&config)?;
    Ok(config)
}

/// Read, parse and validate the configuration file at `path`.
pub fn load_config(path: impl AsRef<Path>) -> Result<SharePoolConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let config = parse_config(&text)?;
    tracing::info!(
        path = %path.display(),
        operator = %config.pool.operator,
        dust_policy = %config.pool.dust_policy,
        "Configuration loaded"
    );
    Ok(config)
}

/// Check settings that deserialization alone cannot enforce.
///
/// Called by [`parse_config`]; call it directly for configs built in code.
pub fn validate(config: &SharePoolConfig) -> Result<()> {
    if config.service.mailbox_capacity == 0 {
        return Err(SharePoolError::Configuration(
            "service.mailbox_capacity must be > 0".into(),
        ));
    }
    if config.service.event_buffer == 0 {
        return Err(SharePoolError::Configuration(
            "service.event_buffer must be > 0".into(),
        ));
    }
    Ok(())
}
