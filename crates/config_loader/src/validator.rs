//! Config validation
//!
//! Rules:
//! - structural checks declared with `validator` derive (non-empty names)
//! - messenger names unique
//! - dispatch timeout > 0 when set
//! - required fields present per messenger type

use std::collections::HashSet;

use ::validator::Validate;
use contracts::{MessengerConfig, MessengerKind, NofyConfig, NofyError};

/// Validate a parsed config
///
/// Returns the first error encountered.
pub fn validate(config: &NofyConfig) -> Result<(), NofyError> {
    config
        .validate()
        .map_err(|e| NofyError::config("messengers", e.to_string()))?;
    validate_dispatch(config)?;
    validate_unique_names(config)?;
    for messenger in &config.messengers {
        validate_messenger(messenger)?;
    }
    Ok(())
}

fn validate_dispatch(config: &NofyConfig) -> Result<(), NofyError> {
    if config.dispatch.timeout_ms == Some(0) {
        return Err(NofyError::config(
            "dispatch.timeout_ms",
            "dispatch.timeout_ms must be > 0",
        ));
    }
    Ok(())
}

fn validate_unique_names(config: &NofyConfig) -> Result<(), NofyError> {
    let mut seen = HashSet::new();
    for messenger in &config.messengers {
        if !seen.insert(messenger.name.as_str()) {
            return Err(NofyError::config(
                format!("messengers[name={}]", messenger.name),
                format!("duplicate messenger name '{}'", messenger.name),
            ));
        }
    }
    Ok(())
}

fn validate_messenger(messenger: &MessengerConfig) -> Result<(), NofyError> {
    let require = |ok: bool, field: &str| {
        if ok {
            Ok(())
        } else {
            Err(NofyError::config(
                format!("messengers[{}].{field}", messenger.name),
                format!("messenger '{}': missing {field}", messenger.name),
            ))
        }
    };

    match &messenger.kind {
        MessengerKind::Slack(slack) => {
            require(!slack.token.is_empty(), "token")?;
            require(slack.timeout_ms > 0, "timeout_ms")?;
            require(!slack.channel.is_empty(), "channel")?;
            require(!slack.blocks.is_empty(), "blocks")?;
        }
        MessengerKind::Resend(resend) => {
            require(!resend.token.is_empty(), "token")?;
            require(resend.timeout_ms > 0, "timeout_ms")?;
            require(!resend.from.is_empty(), "from")?;
            require(!resend.to.is_empty(), "to")?;
            require(!resend.subject.is_empty(), "subject")?;
        }
        MessengerKind::Log(log) => {
            require(!log.message.is_empty(), "message")?;
        }
    }
    Ok(())
}
