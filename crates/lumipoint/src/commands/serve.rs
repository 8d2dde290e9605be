//! `serve`: run the state gateway until Ctrl-C.

use lumipoint_config::Config;
use lumipoint_core::parse_api_base;
use lumipoint_gateway::GatewaySettings;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::ServeArgs;
use crate::error::CliError;

/// Config-file `[gateway]` values with flag overrides applied.
pub fn settings(cfg: &Config, args: &ServeArgs) -> Result<GatewaySettings, CliError> {
    let mut settings = cfg.to_gateway_settings()?;
    if let Some(ref listen) = args.listen {
        settings.listen = listen.parse().map_err(|_| CliError::Validation {
            field: "listen".into(),
            reason: format!("expected host:port, got '{listen}'"),
        })?;
    }
    if let Some(ref upstream) = args.upstream {
        settings.upstream = parse_api_base(upstream).map_err(|e| CliError::Validation {
            field: "upstream".into(),
            reason: e.to_string(),
        })?;
    }
    if args.mock {
        settings.upstream = None;
    }
    settings.strict_patch |= args.strict_patch;
    Ok(settings)
}

pub async fn handle(cfg: &Config, args: &ServeArgs) -> Result<(), CliError> {
    let settings = settings(cfg, args)?;

    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, shutting down");
        }
        on_signal.cancel();
    });

    lumipoint_gateway::serve(settings, shutdown).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(listen: Option<&str>, upstream: Option<&str>, mock: bool) -> ServeArgs {
        ServeArgs {
            listen: listen.map(str::to_owned),
            upstream: upstream.map(str::to_owned),
            mock,
            strict_patch: false,
        }
    }

    #[test]
    fn flags_override_gateway_table() {
        let s = settings(
            &Config::default(),
            &args(Some("0.0.0.0:9000"), Some("http://outlet.local"), false),
        )
        .expect("settings");
        assert_eq!(s.listen.port(), 9000);
        assert_eq!(s.upstream.as_ref().and_then(url::Url::host_str), Some("outlet.local"));
    }

    #[test]
    fn mock_flag_drops_configured_upstream() {
        let mut cfg = Config::default();
        cfg.gateway.upstream_url = Some("http://outlet.local".into());
        let s = settings(&cfg, &args(None, None, true)).expect("settings");
        assert!(s.upstream.is_none());
        assert_eq!(s.listen.port(), 3000);
    }

    #[test]
    fn bad_listen_is_a_validation_error() {
        assert!(matches!(
            settings(&Config::default(), &args(Some("port 80"), None, false)),
            Err(CliError::Validation { .. })
        ));
    }
}
