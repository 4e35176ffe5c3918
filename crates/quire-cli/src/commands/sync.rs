use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use quire_assets::Externalizer;
use quire_config::QuireConfig;
use quire_store::{CommandExecutor, LibsqlExecutor, WranglerExecutor};
use quire_sync::{DocumentFilter, SyncEngine, SyncSettings, SyncSummary};
use tokio_util::sync::CancellationToken;

use crate::bootstrap;
use crate::cli::{GlobalFlags, SyncArgs};
use crate::commands::changes;
use crate::commands::storage::AssetBackend;
use crate::output::output;
use crate::progress::ProgressObserver;

/// Handle `quire sync`.
pub async fn handle(
    args: &SyncArgs,
    mut config: QuireConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    bootstrap::apply_sync_overrides(&mut config, args);
    let local = args.local_db.is_some();
    bootstrap::validate(&config, local)?;

    let filter = match &args.changed_since {
        Some(rev) => changes::changed_since(rev, &PathBuf::from(&config.content.root))?,
        None => DocumentFilter::All,
    };

    let storage = AssetBackend::from_config(&config.r2, local)
        .context("failed to set up object storage")?;
    let externalizer = Arc::new(Externalizer::new(
        Arc::new(storage),
        config.r2.bucket_name.clone(),
        config.sync.upload_concurrency,
        config.sync.upload_timeout(),
    ));
    let mut settings = SyncSettings::from_config(&config)?;

    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn(cancel_on_interrupt(cancel.clone()));

    let categories = args.category.categories();
    let summary = if let Some(path) = &args.local_db {
        settings.ensure_schema = true;
        let executor = LibsqlExecutor::open(&path.to_string_lossy())
            .await
            .with_context(|| format!("failed to open local database {}", path.display()))?;
        run(Arc::new(executor), externalizer, settings, &categories, &filter, &cancel).await
    } else {
        let executor = WranglerExecutor::from_config(&config);
        run(Arc::new(executor), externalizer, settings, &categories, &filter, &cancel).await
    };
    interrupt.abort();

    output(&summary, flags.format)?;

    if summary.cancelled {
        bail!("sync interrupted; {} documents skipped", summary.skipped);
    }
    if args.fail_on_abort && summary.aborted > 0 {
        bail!("{} documents aborted", summary.aborted);
    }
    Ok(())
}

async fn run<E: CommandExecutor>(
    executor: Arc<E>,
    externalizer: Arc<Externalizer<AssetBackend>>,
    settings: SyncSettings,
    categories: &[quire_core::Category],
    filter: &DocumentFilter,
    cancel: &CancellationToken,
) -> SyncSummary {
    SyncEngine::new(executor, externalizer, settings)
        .with_observer(Arc::new(ProgressObserver::default()))
        .run(categories, filter, cancel)
        .await
}

async fn cancel_on_interrupt(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::warn!("interrupt received; finishing in-flight documents");
        cancel.cancel();
    }
}
