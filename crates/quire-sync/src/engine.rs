//! Per-category sync passes.
//!
//! Blog: `parse → externalize → upsert_post`, documents in parallel.
//! Wiki: every document is parsed first, the directory plan is resolved
//! parents-first, then pages run one at a time:
//! `externalize → resolve parent → upsert_node → find_node → upsert_content`.
//!
//! A failing document is recorded and skipped; nothing here stops the run.
//! Cancellation stops dispatching new documents and lets in-flight ones
//! finish.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use futures::future::ready;
use futures::stream;
use quire_assets::{Externalized, Externalizer, ObjectStorage};
use quire_config::QuireConfig;
use quire_core::{Category, Document, NodeContent, PostRecord, RelDir};
use quire_parser::{MetadataDefaults, parse_document};
use quire_store::{CommandExecutor, RemoteStore, StoreError, TableNames};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::discover::{DocumentFilter, discover_documents};
use crate::error::SyncError;
use crate::resolver::{ParentChainResolver, TreePlan};
use crate::summary::{
    AbortedDocument, CategorySummary, SyncStep, SyncSummary, SyncWarning, WarningKind,
};

/// Everything a run needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub blog_root: PathBuf,
    pub wiki_root: PathBuf,
    pub blog_database: String,
    pub wiki_database: String,
    pub tables: TableNames,
    pub defaults: MetadataDefaults,
    pub concurrency: usize,
    pub remote_timeout: Duration,
    /// Create missing tables before the first document of each category.
    pub ensure_schema: bool,
}

impl SyncSettings {
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidIdentifier`] for a bad table name.
    pub fn from_config(config: &QuireConfig) -> Result<Self, StoreError> {
        Ok(Self {
            blog_root: config.content.category_root(Category::Blog),
            wiki_root: config.content.category_root(Category::Wiki),
            blog_database: config.d1.database_for(Category::Blog),
            wiki_database: config.d1.database_for(Category::Wiki),
            tables: TableNames::from_config(&config.content)?,
            defaults: MetadataDefaults {
                post_category: config.content.default_post_category.clone(),
                thumbnail: config.content.default_thumbnail.clone(),
            },
            concurrency: config.sync.concurrency.max(1),
            remote_timeout: config.sync.remote_timeout(),
            ensure_schema: false,
        })
    }

    #[must_use]
    pub fn root(&self, category: Category) -> &Path {
        match category {
            Category::Blog => &self.blog_root,
            Category::Wiki => &self.wiki_root,
        }
    }

    #[must_use]
    pub fn database(&self, category: Category) -> &str {
        match category {
            Category::Blog => &self.blog_database,
            Category::Wiki => &self.wiki_database,
        }
    }
}

/// Progress hooks; every method defaults to doing nothing.
pub trait SyncObserver: Send + Sync {
    fn category_started(&self, _category: Category, _documents: usize) {}
    fn document_finished(&self, _category: Category, _title: &str, _synced: bool) {}
    fn category_finished(&self, _summary: &CategorySummary) {}
}

pub struct SilentObserver;

impl SyncObserver for SilentObserver {}

/// What happened to one document.
struct DocumentReport {
    title: String,
    path: PathBuf,
    warnings: Vec<SyncWarning>,
    result: Result<(), SyncError>,
}

impl DocumentReport {
    fn record(self, summary: &mut CategorySummary) {
        summary.warnings.extend(self.warnings);
        match self.result {
            Ok(()) => {
                info!(category = %summary.category, title = %self.title, path = %self.path.display(), "document synced");
                summary.synced += 1;
            }
            Err(error) => {
                let step = error.step();
                warn!(
                    category = %summary.category,
                    title = %self.title,
                    path = %self.path.display(),
                    %step,
                    %error,
                    "document aborted"
                );
                summary.aborted.push(AbortedDocument {
                    title: self.title,
                    path: self.path,
                    step,
                    reason: error.to_string(),
                });
            }
        }
    }
}

pub struct SyncEngine<E, S> {
    executor: Arc<E>,
    externalizer: Arc<Externalizer<S>>,
    settings: SyncSettings,
    observer: Arc<dyn SyncObserver>,
}

impl<E: CommandExecutor, S: ObjectStorage> SyncEngine<E, S> {
    pub fn new(executor: Arc<E>, externalizer: Arc<Externalizer<S>>, settings: SyncSettings) -> Self {
        Self {
            executor,
            externalizer,
            settings,
            observer: Arc::new(SilentObserver),
        }
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn SyncObserver>) -> Self {
        self.observer = observer;
        self
    }

    #[must_use]
    pub const fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Store handle for one category's database.
    #[must_use]
    pub fn store(&self, category: Category) -> RemoteStore<E> {
        RemoteStore::new(
            Arc::clone(&self.executor),
            self.settings.database(category),
            self.settings.tables.clone(),
            self.settings.remote_timeout,
        )
    }

    /// Sync the given categories in order.
    pub async fn run(
        &self,
        categories: &[Category],
        filter: &DocumentFilter,
        cancel: &CancellationToken,
    ) -> SyncSummary {
        let mut summaries = Vec::with_capacity(categories.len());
        for &category in categories {
            summaries.push(self.sync_category(category, filter, cancel).await);
        }
        SyncSummary::from_categories(summaries, cancel.is_cancelled())
    }

    async fn sync_category(
        &self,
        category: Category,
        filter: &DocumentFilter,
        cancel: &CancellationToken,
    ) -> CategorySummary {
        let root = self.settings.root(category);
        let store = self.store(category);
        let mut summary = CategorySummary::new(category, store.database());

        let Some(paths) = discover_documents(category, root, filter) else {
            info!(%category, root = %root.display(), "category directory not found, skipping");
            summary.root_found = false;
            return summary;
        };
        summary.discovered = paths.len();
        self.observer.category_started(category, paths.len());

        if cancel.is_cancelled() {
            summary.skipped = paths.len();
        } else if !paths.is_empty() {
            if self.settings.ensure_schema
                && let Err(error) = store.ensure_schema(category).await
            {
                warn!(%category, %error, "schema bootstrap failed");
            }
            match category {
                Category::Blog => self.sync_posts(&store, root, paths, cancel, &mut summary).await,
                Category::Wiki => self.sync_pages(&store, root, paths, cancel, &mut summary).await,
            }
        }

        summary.sort();
        info!(
            %category,
            synced = summary.synced,
            aborted = summary.aborted.len(),
            warnings = summary.warnings.len(),
            skipped = summary.skipped,
            "category pass finished"
        );
        self.observer.category_finished(&summary);
        summary
    }

    async fn sync_posts(
        &self,
        store: &RemoteStore<E>,
        root: &Path,
        paths: Vec<PathBuf>,
        cancel: &CancellationToken,
        summary: &mut CategorySummary,
    ) {
        let total = paths.len();
        let reports: Vec<DocumentReport> = stream::iter(paths)
            .take_while(|_| ready(!cancel.is_cancelled()))
            .map(|path| self.sync_post(store, root, path))
            .buffer_unordered(self.settings.concurrency)
            .collect()
            .await;

        summary.skipped = total - reports.len();
        for report in reports {
            report.record(summary);
        }
    }

    async fn sync_post(&self, store: &RemoteStore<E>, root: &Path, path: PathBuf) -> DocumentReport {
        let document = match parse_document(Category::Blog, &path, root, &self.settings.defaults).await {
            Ok(document) => document,
            Err(error) => return self.parse_failure(Category::Blog, path, error.into()),
        };

        let externalized = self.externalize(&document).await;
        let warnings = document_warnings(&document, &externalized);

        let result = match document.post_meta() {
            Some(meta) => {
                let record = PostRecord::from_meta(&document.title, meta, externalized.body);
                store
                    .upsert_post(&record)
                    .await
                    .map_err(SyncError::store(SyncStep::UpsertPost))
            }
            None => Err(SyncError::Metadata("document carries no post metadata".to_string())),
        };

        self.observer
            .document_finished(Category::Blog, &document.title, result.is_ok());
        DocumentReport {
            title: document.title,
            path,
            warnings,
            result,
        }
    }

    async fn sync_pages(
        &self,
        store: &RemoteStore<E>,
        root: &Path,
        paths: Vec<PathBuf>,
        cancel: &CancellationToken,
        summary: &mut CategorySummary,
    ) {
        let mut pages: Vec<(Document, RelDir)> = Vec::with_capacity(paths.len());
        for path in paths {
            match parse_document(Category::Wiki, &path, root, &self.settings.defaults).await {
                Ok(document) => {
                    let dir = document.ancestor_dir();
                    pages.push((document, dir));
                }
                Err(error) => self
                    .parse_failure(Category::Wiki, path, error.into())
                    .record(summary),
            }
        }

        let mut resolver = ParentChainResolver::new(store.clone());
        let plan = TreePlan::from_dirs(pages.iter().map(|(_, dir)| dir));
        if !cancel.is_cancelled() {
            let resolved = resolver.warm(&plan).await;
            info!(directories = plan.len(), resolved, "directory plan resolved");
        }

        for (document, dir) in pages {
            if cancel.is_cancelled() {
                summary.skipped += 1;
                continue;
            }
            self.sync_page(store, &mut resolver, document, &dir)
                .await
                .record(summary);
        }
    }

    async fn sync_page(
        &self,
        store: &RemoteStore<E>,
        resolver: &mut ParentChainResolver<E>,
        document: Document,
        dir: &RelDir,
    ) -> DocumentReport {
        let externalized = self.externalize(&document).await;
        let warnings = document_warnings(&document, &externalized);
        let result = write_page(store, resolver, &document.title, dir, externalized.body).await;

        self.observer
            .document_finished(Category::Wiki, &document.title, result.is_ok());
        DocumentReport {
            title: document.title,
            path: document.source_path,
            warnings,
            result,
        }
    }

    async fn externalize(&self, document: &Document) -> Externalized {
        self.externalizer
            .externalize(
                &document.body,
                document.document_dir(),
                document.category.as_str(),
            )
            .await
    }

    fn parse_failure(&self, category: Category, path: PathBuf, error: SyncError) -> DocumentReport {
        let title = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.observer.document_finished(category, &title, false);
        DocumentReport {
            title,
            path,
            warnings: Vec::new(),
            result: Err(error),
        }
    }
}

async fn write_page<E: CommandExecutor>(
    store: &RemoteStore<E>,
    resolver: &mut ParentChainResolver<E>,
    title: &str,
    dir: &RelDir,
    body: String,
) -> Result<(), SyncError> {
    let parent_id = resolver.resolve(dir).await?;
    store
        .upsert_node(title, parent_id, true)
        .await
        .map_err(SyncError::store(SyncStep::UpsertNode))?;
    let node_id = store
        .find_node(title, parent_id)
        .await
        .map_err(SyncError::store(SyncStep::FindNode))?
        .ok_or_else(|| SyncError::Store {
            step: SyncStep::FindNode,
            source: StoreError::MissingNode {
                title: title.to_string(),
                parent_id,
            },
        })?;
    store
        .upsert_content(&NodeContent { node_id, body })
        .await
        .map_err(SyncError::store(SyncStep::UpsertContent))
}

fn document_warnings(document: &Document, externalized: &Externalized) -> Vec<SyncWarning> {
    for note in &document.notes {
        warn!(title = %document.title, path = %document.source_path.display(), %note, "front matter note");
    }
    let notes = document.notes.iter().map(|note| SyncWarning {
        document: document.title.clone(),
        path: document.source_path.clone(),
        kind: WarningKind::FrontMatter,
        detail: note.clone(),
    });
    let assets = externalized.warnings.iter().map(|warning| SyncWarning {
        document: document.title.clone(),
        path: document.source_path.clone(),
        kind: WarningKind::Asset,
        detail: warning.to_string(),
    });
    notes.chain(assets).collect()
}
