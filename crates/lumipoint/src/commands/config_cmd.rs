//! Config subcommand handlers.

use dialoguer::{Input, Select};

use lumipoint_core::display::REFRESH_OPTIONS_MS;
use lumipoint_core::{MAX_POLL_INTERVAL, MIN_POLL_INTERVAL, parse_api_base};

use crate::cli::{ConfigArgs, ConfigCommand, ConfigInitArgs, GlobalOpts, OutputFormat};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::util::{self, prompt_err};

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::resolve(global)?;
            let out = match config::output_format(global, &cfg) {
                // The file format is the most useful "table" for a config.
                OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(&cfg)
                    .map_err(|e| CliError::Config(e.into()))?,
                structured => output::render_structured(structured, &cfg)?,
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::active_path(global).display().to_string(), false);
            Ok(())
        }

        ConfigCommand::Init(ref init) => init_config(init, global),
    }
}

// ── Init ────────────────────────────────────────────────────────────

fn init_config(args: &ConfigInitArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::active_path(global);
    if path.exists()
        && !args.force
        && !util::confirm(
            &format!("{} exists. Overwrite?", path.display()),
            "config init (overwrite)",
            global.yes,
        )?
    {
        eprintln!("Left {} unchanged", path.display());
        return Ok(());
    }

    // Flags and env are the starting point; `--yes` takes them as-is.
    let mut cfg = config::resolve(global)?;
    if !global.yes {
        prompt_values(&mut cfg)?;
    }
    cfg.to_controller_config()?;
    cfg.to_gateway_settings()?;

    lumipoint_config::save_config_to(&cfg, &path)?;
    eprintln!("Configuration written to {}", path.display());
    if cfg.api_base_url.is_some() {
        eprintln!("  Test it: lumipoint state");
    } else {
        eprintln!("  No API base set; try `lumipoint serve` and point api_base_url at it.");
    }
    Ok(())
}

fn prompt_values(cfg: &mut Config) -> Result<(), CliError> {
    eprintln!("lumipoint configuration wizard\n");

    let api_base: String = Input::new()
        .with_prompt("Device API base URL (blank for none)")
        .allow_empty(true)
        .with_initial_text(cfg.api_base_url.clone().unwrap_or_default())
        .validate_with(|raw: &String| parse_api_base(raw).map(|_| ()).map_err(|e| e.to_string()))
        .interact_text()
        .map_err(prompt_err)?;
    cfg.api_base_url = Some(api_base.trim().to_owned()).filter(|s| !s.is_empty());

    let labels: Vec<String> = REFRESH_OPTIONS_MS
        .iter()
        .map(|ms| format!("{}s", ms / 1000))
        .collect();
    let current = REFRESH_OPTIONS_MS
        .iter()
        .position(|&ms| ms == cfg.poll_interval_ms)
        .unwrap_or(1);
    let picked = Select::new()
        .with_prompt(format!(
            "Refresh interval ({}-{}s)",
            MIN_POLL_INTERVAL.as_secs(),
            MAX_POLL_INTERVAL.as_secs()
        ))
        .items(&labels)
        .default(current)
        .interact()
        .map_err(prompt_err)?;
    if let Some(&ms) = REFRESH_OPTIONS_MS.get(picked) {
        cfg.poll_interval_ms = ms;
    }

    let upstream: String = Input::new()
        .with_prompt("Gateway upstream URL (blank for mock mode)")
        .allow_empty(true)
        .with_initial_text(cfg.gateway.upstream_url.clone().unwrap_or_default())
        .validate_with(|raw: &String| parse_api_base(raw).map(|_| ()).map_err(|e| e.to_string()))
        .interact_text()
        .map_err(prompt_err)?;
    cfg.gateway.upstream_url = Some(upstream.trim().to_owned()).filter(|s| !s.is_empty());

    Ok(())
}
