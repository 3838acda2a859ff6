//! Bridges `unipoll-config` with CLI flag overrides.

use std::path::PathBuf;

use tracing::debug;

use unipoll_config::{
    Config, ExporterSettings, SystemSecrets, load_config, profile_to_controller_config,
};
use unipoll_core::ControllerConfig;

use crate::cli::{GlobalOpts, ServeArgs};
use crate::error::CliError;

/// Everything a command needs to reach the controller.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub profile: String,
    pub controller: ControllerConfig,
    pub exporter: ExporterSettings,
    /// File SIGHUP re-reads. `None` means the platform default.
    pub config_path: Option<PathBuf>,
}

/// Load the config file and resolve the active profile.
pub fn resolve(global: &GlobalOpts, overrides: &ServeArgs) -> Result<Resolved, CliError> {
    let config = load_config(global.config.as_deref())?;
    resolve_from(&config, global, overrides)
}

fn resolve_from(
    config: &Config,
    global: &GlobalOpts,
    overrides: &ServeArgs,
) -> Result<Resolved, CliError> {
    let (name, profile) = config.profile(global.profile.as_deref())?;
    debug!(profile = name, controller = %profile.controller, "resolved profile");

    let mut profile = profile.clone();
    if global.insecure {
        profile.insecure = Some(true);
    }
    let controller = profile_to_controller_config(&profile, name, &SystemSecrets)?;

    let mut exporter = config.exporter.clone();
    apply_overrides(&mut exporter, overrides);
    exporter.validate()?;

    Ok(Resolved {
        profile: name.to_owned(),
        controller,
        exporter,
        config_path: global.config.clone(),
    })
}

/// Re-read exporter settings, keeping CLI overrides on top.
pub fn reload_exporter(
    path: Option<&std::path::Path>,
    overrides: &ServeArgs,
) -> Result<ExporterSettings, CliError> {
    let mut exporter = load_config(path)?.exporter;
    apply_overrides(&mut exporter, overrides);
    exporter.validate()?;
    Ok(exporter)
}

fn apply_overrides(exporter: &mut ExporterSettings, overrides: &ServeArgs) {
    if let Some(listen) = overrides.listen {
        exporter.listen = listen;
    }
    if let Some(ttl) = overrides.cache_ttl {
        exporter.cache_ttl = ttl.as_secs();
    }
    if let Some(timeout) = overrides.refresh_timeout {
        exporter.refresh_timeout = timeout.as_secs();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn flags_override_file_settings() {
        let mut exporter = ExporterSettings::default();
        let overrides = ServeArgs {
            listen: Some("127.0.0.1:9100".parse().unwrap()),
            cache_ttl: Some(Duration::from_secs(90)),
            refresh_timeout: None,
        };

        apply_overrides(&mut exporter, &overrides);

        assert_eq!(exporter.listen.port(), 9100);
        assert_eq!(exporter.cache_ttl, 90);
        assert_eq!(
            exporter.refresh_timeout,
            ExporterSettings::default().refresh_timeout
        );
    }

    #[test]
    fn sub_second_refresh_timeout_is_rejected() {
        let mut exporter = ExporterSettings::default();
        let overrides = ServeArgs {
            refresh_timeout: Some(Duration::from_millis(500)),
            ..ServeArgs::default()
        };

        apply_overrides(&mut exporter, &overrides);
        assert!(exporter.validate().is_err());
    }
}
