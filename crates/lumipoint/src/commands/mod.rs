//! Command handlers, one module per command group.

pub mod config_cmd;
pub mod device;
pub mod serve;
pub mod util;
pub mod watch;

use lumipoint_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

/// Dispatch the device-facing commands. `config` and `completions` are
/// handled in `main` because they never touch the network.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::resolve(global)?;
    let format = config::output_format(global, &cfg);
    let color = output::should_color(config::color_mode(global, &cfg));

    match cmd {
        Command::Serve(args) => serve::handle(&cfg, &args).await,
        Command::Watch(args) => {
            watch::handle(cfg.to_controller_config()?, &args, color, global.quiet).await
        }
        Command::State => {
            let controller = Controller::oneshot(cfg.to_controller_config()?)?;
            let out = device::state(&controller, format).await?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        Command::Set(args) => {
            let controller = Controller::oneshot(cfg.to_controller_config()?)?;
            let out = device::set(&controller, &args, format).await?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        Command::Command(args) => {
            let controller = Controller::oneshot(cfg.to_controller_config()?)?;
            let out = device::command(&controller, &args, global.yes).await?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions are not device commands".into(),
        )),
    }
}
