use std::sync::Arc;

use anyhow::Context;
use quire_config::QuireConfig;
use quire_store::{CommandExecutor, LibsqlExecutor, RemoteStore, TableNames, WranglerExecutor};
use serde::Serialize;

use crate::cli::{GlobalFlags, SchemaArgs};
use crate::output::output;

#[derive(Debug, Serialize)]
struct SchemaReport {
    category: quire_core::Category,
    database: String,
    sql: String,
    applied: bool,
}

/// Handle `quire schema`.
pub async fn handle(
    args: &SchemaArgs,
    config: &QuireConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    config.validate_local().context("invalid configuration")?;
    let tables = TableNames::from_config(&config.content)?;

    let mut reports: Vec<SchemaReport> = args
        .category
        .categories()
        .into_iter()
        .map(|category| SchemaReport {
            category,
            database: config.d1.database_for(category),
            sql: tables.schema_for(category).sql().to_string(),
            applied: false,
        })
        .collect();

    if args.apply {
        if let Some(path) = &args.local_db {
            let executor = LibsqlExecutor::open(&path.to_string_lossy())
                .await
                .with_context(|| format!("failed to open local database {}", path.display()))?;
            apply(Arc::new(executor), &tables, config, &mut reports).await?;
        } else {
            apply(
                Arc::new(WranglerExecutor::from_config(config)),
                &tables,
                config,
                &mut reports,
            )
            .await?;
        }
    }

    output(&reports, flags.format)
}

async fn apply<E: CommandExecutor>(
    executor: Arc<E>,
    tables: &TableNames,
    config: &QuireConfig,
    reports: &mut [SchemaReport],
) -> anyhow::Result<()> {
    for report in reports {
        let store = RemoteStore::new(
            Arc::clone(&executor),
            report.database.as_str(),
            tables.clone(),
            config.sync.remote_timeout(),
        );
        store
            .ensure_schema(report.category)
            .await
            .with_context(|| format!("failed to apply {} schema", report.category))?;
        tracing::info!(category = %report.category, database = %report.database, "schema applied");
        report.applied = true;
    }
    Ok(())
}
