//! Idempotent upserts against one database.

use std::sync::Arc;
use std::time::Duration;

use quire_core::{Category, NodeContent, PostRecord, TreeNode};
use serde_json::Value;
use tracing::debug;

use crate::error::StoreError;
use crate::executor::{CommandExecutor, CommandOutput};
use crate::response::{self, integer};
use crate::schema::TableNames;
use crate::sql::{Command, Insert, OnConflict, Select, SqlValue};

const POST_COLUMNS: [&str; 9] = [
    "title",
    "category",
    "post_type",
    "language",
    "is_open_source",
    "project_name",
    "content",
    "thumb_url",
    "date",
];

/// Upserts scoped to one database and table set.
///
/// Every call is bounded by `timeout`; an executor that reports failure
/// becomes [`StoreError::RemoteCommand`].
pub struct RemoteStore<E> {
    executor: Arc<E>,
    database: String,
    tables: TableNames,
    timeout: Duration,
}

impl<E> Clone for RemoteStore<E> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            database: self.database.clone(),
            tables: self.tables.clone(),
            timeout: self.timeout,
        }
    }
}

impl<E: CommandExecutor> RemoteStore<E> {
    pub fn new(
        executor: Arc<E>,
        database: impl Into<String>,
        tables: TableNames,
        timeout: Duration,
    ) -> Self {
        Self {
            executor,
            database: database.into(),
            tables,
            timeout,
        }
    }

    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    #[must_use]
    pub const fn tables(&self) -> &TableNames {
        &self.tables
    }

    /// Insert or fully replace a post, keyed by title.
    ///
    /// # Errors
    ///
    /// Any [`StoreError`] from the executor.
    pub async fn upsert_post(&self, post: &PostRecord) -> Result<(), StoreError> {
        let date = post.published_at.map_or(SqlValue::CurrentTimestamp, |at| {
            SqlValue::Text(at.format("%Y-%m-%d %H:%M:%S").to_string())
        });
        let command = Insert::into_table(&self.tables.posts)
            .value("title", post.title.as_str())
            .value("category", post.category.as_str())
            .value("post_type", post.post_type.as_str())
            .value("language", post.language.as_str())
            .value("is_open_source", post.is_open_source)
            .value("project_name", post.project_name.as_str())
            .value("content", post.body.as_str())
            .value("thumb_url", post.thumbnail_url.as_str())
            .value("date", date)
            .on_conflict(
                &["title"],
                OnConflict::Update(POST_COLUMNS[1..].to_vec()),
            )
            .build();
        self.run(&command).await.map(drop)
    }

    /// Create a tree node if `(title, parent_id)` is new.
    ///
    /// Ancestors (`has_content == false`) never touch an existing row, so a
    /// content node is never downgraded. Content nodes set `has_content = 1`
    /// on an existing row. The node id never changes.
    ///
    /// # Errors
    ///
    /// Any [`StoreError`] from the executor.
    pub async fn upsert_node(
        &self,
        title: &str,
        parent_id: i64,
        has_content: bool,
    ) -> Result<(), StoreError> {
        let action = if has_content {
            OnConflict::Update(vec!["has_content"])
        } else {
            OnConflict::Nothing
        };
        let command = Insert::into_table(&self.tables.nodes)
            .value("title", title)
            .value("parent_id", parent_id)
            .value("has_content", has_content)
            .on_conflict(&["title", "parent_id"], action)
            .build();
        self.run(&command).await.map(drop)
    }

    /// Id of the node `(title, parent_id)`, if present.
    ///
    /// # Errors
    ///
    /// Any [`StoreError`] from the executor or an unreadable response.
    pub async fn find_node(&self, title: &str, parent_id: i64) -> Result<Option<i64>, StoreError> {
        let command = Select::from_table(&self.tables.nodes, &["id"])
            .filter("title", title)
            .filter("parent_id", parent_id)
            .limit(1)
            .build();
        let output = self.run(&command).await?;
        response::first_row_id(&output.stdout)
    }

    /// [`Self::upsert_node`] then [`Self::find_node`]; a missing row after the
    /// upsert is [`StoreError::MissingNode`].
    ///
    /// # Errors
    ///
    /// Any [`StoreError`] from either step.
    pub async fn ensure_node(
        &self,
        title: &str,
        parent_id: i64,
        has_content: bool,
    ) -> Result<i64, StoreError> {
        self.upsert_node(title, parent_id, has_content).await?;
        self.find_node(title, parent_id)
            .await?
            .ok_or_else(|| StoreError::MissingNode {
                title: title.to_string(),
                parent_id,
            })
    }

    /// Insert or replace a node's body.
    ///
    /// # Errors
    ///
    /// Any [`StoreError`] from the executor.
    pub async fn upsert_content(&self, content: &NodeContent) -> Result<(), StoreError> {
        let command = Insert::into_table(&self.tables.contents)
            .value("node_id", content.node_id)
            .value("content", content.body.as_str())
            .on_conflict(&["node_id"], OnConflict::Update(vec!["content"]))
            .build();
        self.run(&command).await.map(drop)
    }

    /// Create the category's tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Any [`StoreError`] from the executor.
    pub async fn ensure_schema(&self, category: Category) -> Result<(), StoreError> {
        self.run(&self.tables.schema_for(category)).await.map(drop)
    }

    /// Every tree node, ordered by id.
    ///
    /// # Errors
    ///
    /// Any [`StoreError`] from the executor or an unreadable response.
    pub async fn list_nodes(&self) -> Result<Vec<TreeNode>, StoreError> {
        let command = Select::from_table(
            &self.tables.nodes,
            &["id", "title", "parent_id", "has_content"],
        )
        .order_by("id")
        .build();
        let output = self.run(&command).await?;
        response::rows(&output.stdout)?
            .into_iter()
            .map(|row| {
                let field = |name: &str| row.get(name).and_then(integer);
                Ok(TreeNode {
                    id: field("id")
                        .ok_or_else(|| StoreError::Response(format!("node row without id: {row:?}")))?,
                    title: row
                        .get("title")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    parent_id: field("parent_id").unwrap_or_default(),
                    has_content: field("has_content").is_some_and(|flag| flag != 0),
                })
            })
            .collect()
    }

    /// Titles of every stored post, ordered by id.
    ///
    /// # Errors
    ///
    /// Any [`StoreError`] from the executor or an unreadable response.
    pub async fn post_titles(&self) -> Result<Vec<String>, StoreError> {
        let command = Select::from_table(&self.tables.posts, &["title"])
            .order_by("id")
            .build();
        let output = self.run(&command).await?;
        Ok(response::rows(&output.stdout)?
            .into_iter()
            .filter_map(|row| row.get("title").and_then(Value::as_str).map(String::from))
            .collect())
    }

    async fn run(&self, command: &Command) -> Result<CommandOutput, StoreError> {
        debug!(
            database = %self.database,
            kind = ?command.kind(),
            bytes = command.sql().len(),
            "running remote command"
        );
        let output = tokio::time::timeout(
            self.timeout,
            self.executor.execute(&self.database, command),
        )
        .await
        .map_err(|_| StoreError::Timeout {
            database: self.database.clone(),
            after: self.timeout,
        })??;

        if output.success && !response::reports_failure(&output.stdout) {
            Ok(output)
        } else {
            Err(StoreError::RemoteCommand {
                database: self.database.clone(),
                diagnostic: output.diagnostic(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LibsqlExecutor;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use quire_core::ROOT_PARENT_ID;
    use std::future::Future;

    async fn store(category: Category) -> RemoteStore<LibsqlExecutor> {
        let executor = Arc::new(LibsqlExecutor::open_in_memory().await.unwrap());
        let store = RemoteStore::new(
            executor,
            "quire-test",
            TableNames::default(),
            Duration::from_secs(5),
        );
        store.ensure_schema(category).await.unwrap();
        store
    }

    fn post(title: &str, body: &str) -> PostRecord {
        PostRecord {
            title: title.into(),
            category: "thoughts".into(),
            post_type: String::new(),
            language: String::new(),
            is_open_source: false,
            project_name: String::new(),
            thumbnail_url: "backgrounds/wall1.jpg".into(),
            body: body.into(),
            published_at: None,
        }
    }

    #[tokio::test]
    async fn post_upsert_is_last_write_wins() {
        let store = store(Category::Blog).await;
        store.upsert_post(&post("Bob's post", "first")).await.unwrap();

        let mut updated = post("Bob's post", "second 'quoted'");
        updated.is_open_source = true;
        updated.published_at = NaiveDate::from_ymd_opt(2024, 3, 5)
            .and_then(|date| date.and_hms_opt(8, 0, 0));
        store.upsert_post(&updated).await.unwrap();

        assert_eq!(store.post_titles().await.unwrap(), vec!["Bob's post"]);
        let select = Select::from_table(&store.tables().posts, &["content", "is_open_source", "date"]).build();
        let output = store.run(&select).await.unwrap();
        let rows = response::rows(&output.stdout).unwrap();
        assert_eq!(rows[0]["content"], Value::from("second 'quoted'"));
        assert_eq!(rows[0]["is_open_source"], Value::from(1));
        assert_eq!(rows[0]["date"], Value::from("2024-03-05 08:00:00"));
    }

    #[tokio::test]
    async fn node_ids_are_stable_and_never_downgraded() {
        let store = store(Category::Wiki).await;
        let content_id = store.ensure_node("install", ROOT_PARENT_ID, true).await.unwrap();
        let ancestor_id = store.ensure_node("install", ROOT_PARENT_ID, false).await.unwrap();
        assert_eq!(content_id, ancestor_id);

        let nodes = store.list_nodes().await.unwrap();
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].has_content);
    }

    #[tokio::test]
    async fn ancestor_upgraded_to_content_keeps_id() {
        let store = store(Category::Wiki).await;
        let first = store.ensure_node("guides", ROOT_PARENT_ID, false).await.unwrap();
        let second = store.ensure_node("guides", ROOT_PARENT_ID, true).await.unwrap();
        assert_eq!(first, second);
        assert!(store.list_nodes().await.unwrap()[0].has_content);
    }

    #[tokio::test]
    async fn same_title_under_different_parents_are_distinct() {
        let store = store(Category::Wiki).await;
        let a = store.ensure_node("intro", ROOT_PARENT_ID, true).await.unwrap();
        let b = store.ensure_node("intro", a, true).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.find_node("intro", b).await.unwrap(), None);
    }

    #[tokio::test]
    async fn content_is_replaced() {
        let store = store(Category::Wiki).await;
        let id = store.ensure_node("page", ROOT_PARENT_ID, true).await.unwrap();
        for body in ["v1", "v2"] {
            store
                .upsert_content(&NodeContent { node_id: id, body: body.into() })
                .await
                .unwrap();
        }
        let select = Select::from_table(&store.tables().contents, &["node_id", "content"]).build();
        let rows = response::rows(&store.run(&select).await.unwrap().stdout).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["content"], Value::from("v2"));
    }

    #[tokio::test]
    async fn failing_command_is_a_remote_error() {
        let executor = Arc::new(LibsqlExecutor::open_in_memory().await.unwrap());
        let store = RemoteStore::new(executor, "empty", TableNames::default(), Duration::from_secs(5));
        let err = store.upsert_post(&post("x", "y")).await.unwrap_err();
        assert!(matches!(err, StoreError::RemoteCommand { ref database, .. } if database == "empty"));
    }

    /// Exits cleanly but reports the statement as failed in its envelope.
    struct RejectingEnvelope;

    impl CommandExecutor for RejectingEnvelope {
        fn execute(
            &self,
            _database: &str,
            _command: &Command,
        ) -> impl Future<Output = Result<CommandOutput, StoreError>> + Send {
            std::future::ready(Ok(CommandOutput::ok(
                r#"[{"results":[],"success":false,"error":"UNIQUE constraint failed"}]"#,
            )))
        }
    }

    #[tokio::test]
    async fn failed_envelope_is_a_remote_command_error() {
        let store = RemoteStore::new(
            Arc::new(RejectingEnvelope),
            "wiki",
            TableNames::default(),
            Duration::from_secs(5),
        );
        let err = store
            .upsert_content(&NodeContent {
                node_id: 1,
                body: "text".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::RemoteCommand { ref diagnostic, .. } if diagnostic.contains("UNIQUE")));
    }

    struct Stalled;

    impl CommandExecutor for Stalled {
        fn execute(
            &self,
            _database: &str,
            _command: &Command,
        ) -> impl Future<Output = Result<CommandOutput, StoreError>> + Send {
            std::future::pending()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_executor_times_out() {
        let store = RemoteStore::new(
            Arc::new(Stalled),
            "slow",
            TableNames::default(),
            Duration::from_secs(60),
        );
        let err = store.find_node("a", 0).await.unwrap_err();
        assert!(matches!(err, StoreError::Timeout { .. }));
        assert!(err.is_transport());
    }
}
