//! `unipoll snapshot`: one fetch, printed as JSON.

use std::sync::Arc;

use tracing::debug;

use unipoll_core::{CancellationToken, LegacyFetcher, SnapshotSource};

use crate::cli::{GlobalOpts, ServeArgs, SnapshotArgs};
use crate::config;
use crate::error::CliError;

pub async fn handle(args: SnapshotArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let overrides = ServeArgs {
        refresh_timeout: args.refresh_timeout,
        ..ServeArgs::default()
    };
    let resolved = config::resolve(global, &overrides)?;
    let shutdown = CancellationToken::new();

    let fetcher = LegacyFetcher::connect(
        &resolved.controller,
        resolved.exporter.snapshot_settings(),
    )
    .await?;
    let source = SnapshotSource::new(
        Arc::new(fetcher),
        resolved.exporter.cache_ttl(),
        resolved.exporter.refresh_timeout(),
        shutdown.clone(),
    );

    let request_token = CancellationToken::new();
    let snapshot = tokio::select! {
        result = source.get_cached_data(&request_token) => result?,
        _ = tokio::signal::ctrl_c() => {
            shutdown.cancel();
            return Err(CliError::Interrupted);
        }
    };
    debug!(
        clients = snapshot.clients.len(),
        access_points = snapshot.access_points.len(),
        wlans = snapshot.wlans.len(),
        "snapshot fetched"
    );

    let json = if args.compact {
        serde_json::to_string(&*snapshot)?
    } else {
        serde_json::to_string_pretty(&*snapshot)?
    };
    println!("{json}");
    Ok(())
}
