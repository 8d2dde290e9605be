//! Shared helpers for command handlers.

use std::io::IsTerminal;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal there is nobody to ask, so the command is refused
/// instead of hanging.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Map a dialoguer failure into CliError.
pub fn prompt_err(e: dialoguer::Error) -> CliError {
    CliError::Io(std::io::Error::other(e))
}

/// Parse an auto-off delay: `30s`, `2m`, `1m 30s`, or bare milliseconds.
pub fn parse_off_timer(raw: &str) -> Result<i64, CliError> {
    let invalid = |reason: String| CliError::Validation {
        field: "off-timer".into(),
        reason,
    };
    let trimmed = raw.trim();
    if let Ok(ms) = trimmed.parse::<i64>() {
        return if ms < 0 {
            Err(invalid("must not be negative".into()))
        } else {
            Ok(ms)
        };
    }
    let duration = humantime::parse_duration(trimmed).map_err(|e| invalid(e.to_string()))?;
    i64::try_from(duration.as_millis()).map_err(|_| invalid("too long".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_timer_accepts_durations_and_millis() {
        assert_eq!(parse_off_timer("30s").expect("30s"), 30_000);
        assert_eq!(parse_off_timer("2m").expect("2m"), 120_000);
        assert_eq!(parse_off_timer("1m 30s").expect("1m 30s"), 90_000);
        assert_eq!(parse_off_timer("5000").expect("bare ms"), 5000);
    }

    #[test]
    fn off_timer_rejects_garbage() {
        assert!(parse_off_timer("soon").is_err());
        assert!(parse_off_timer("-1").is_err());
    }
}
