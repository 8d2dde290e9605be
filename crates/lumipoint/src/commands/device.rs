//! One-shot device handlers: `state`, `set`, `command`.

use lumipoint_core::{CommandAction, Controller, StatePatch};

use crate::cli::{CommandArgs, DeviceCommand, OutputFormat, SetArgs};
use crate::error::CliError;
use crate::output;

use super::util;

impl From<DeviceCommand> for CommandAction {
    fn from(cmd: DeviceCommand) -> Self {
        match cmd {
            DeviceCommand::LedOn => Self::LedOn,
            DeviceCommand::LedOff => Self::LedOff,
            DeviceCommand::Reboot => Self::Reboot,
        }
    }
}

pub async fn state(controller: &Controller, format: OutputFormat) -> Result<String, CliError> {
    let state = controller.fetch_state().await?;
    output::render_device(format, &state)
}

/// Build the partial record for `set`. At least one field is required.
pub fn patch_from_args(args: &SetArgs) -> Result<StatePatch, CliError> {
    let patch = StatePatch {
        is_night_light_mode: args.night_light.map(crate::cli::Toggle::is_on),
        brightness: args.brightness,
        off_timer_ms: args
            .off_timer
            .as_deref()
            .map(util::parse_off_timer)
            .transpose()?,
        ..StatePatch::default()
    };
    if patch.is_empty() {
        return Err(CliError::EmptyUpdate);
    }
    Ok(patch)
}

pub async fn set(
    controller: &Controller,
    args: &SetArgs,
    format: OutputFormat,
) -> Result<String, CliError> {
    let patch = patch_from_args(args)?;
    tracing::debug!(?patch, "writing settings");
    let state = controller.patch_state(&patch).await?;
    output::render_device(format, &state)
}

/// POST a command. Reboot asks first. The acknowledgement is the HTTP
/// status only, so there is nothing to render on success.
pub async fn command(controller: &Controller, args: &CommandArgs, yes: bool) -> Result<String, CliError> {
    let action = CommandAction::from(args.action);
    if action == CommandAction::Reboot
        && !util::confirm("Reboot the outlet?", "command reboot", yes)?
    {
        return Ok("Cancelled".into());
    }
    controller.send_command(action).await?;
    Ok(format!("Sent {action}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Toggle;

    fn args(night_light: Option<Toggle>, brightness: Option<i64>, off_timer: Option<&str>) -> SetArgs {
        SetArgs {
            night_light,
            brightness,
            off_timer: off_timer.map(str::to_owned),
        }
    }

    #[test]
    fn set_only_sends_given_fields() {
        let patch = patch_from_args(&args(Some(Toggle::On), None, Some("30s"))).expect("patch");
        assert_eq!(patch.is_night_light_mode, Some(true));
        assert_eq!(patch.brightness, None);
        assert_eq!(patch.off_timer_ms, Some(30_000));
    }

    #[test]
    fn set_without_fields_is_rejected() {
        assert!(matches!(
            patch_from_args(&args(None, None, None)),
            Err(CliError::EmptyUpdate)
        ));
    }

    #[test]
    fn cli_commands_map_to_wire_actions() {
        assert_eq!(CommandAction::from(DeviceCommand::LedOff).to_string(), "LED_OFF");
        assert_eq!(CommandAction::from(DeviceCommand::Reboot), CommandAction::Reboot);
    }
}
