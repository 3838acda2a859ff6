//! `unipoll serve`: the long-running exporter.

use std::sync::Arc;

use tracing::info;

use unipoll_core::{CancellationToken, LegacyFetcher, SnapshotFetcher, SnapshotSource};

use crate::cli::{GlobalOpts, ServeArgs};
use crate::config;
use crate::error::CliError;
use crate::metrics::Exporter;
use crate::server::{self, AppState};

pub async fn handle(args: ServeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let resolved = config::resolve(global, &args)?;
    let settings = &resolved.exporter;
    let shutdown = CancellationToken::new();

    let fetcher =
        Arc::new(LegacyFetcher::connect(&resolved.controller, settings.snapshot_settings()).await?);
    let source = Arc::new(SnapshotSource::new(
        Arc::clone(&fetcher) as Arc<dyn SnapshotFetcher>,
        settings.cache_ttl(),
        settings.refresh_timeout(),
        shutdown.clone(),
    ));
    let exporter = Arc::new(Exporter::new(Arc::clone(&source))?);

    info!(
        profile = %resolved.profile,
        controller = %resolved.controller.url,
        site = %resolved.controller.site,
        cache_ttl_secs = settings.cache_ttl,
        "starting exporter"
    );

    server::spawn_reload_on_hangup(
        Arc::clone(&source),
        resolved.config_path.clone(),
        args,
        shutdown.clone(),
    );

    let state = AppState {
        exporter,
        source,
        scrape_timeout: settings.scrape_timeout(),
        shutdown,
    };
    let served = server::serve(state, settings.listen).await;
    fetcher.sign_out().await;
    served
}
