//! Local libSQL database as a [`CommandExecutor`].
//!
//! Used for `--local-db` runs and as the store double in tests. Query rows
//! are rendered in wrangler's JSON envelope so callers share one parsing
//! path.

use std::future::Future;

use libsql::{Builder, Connection, Database};
use serde_json::{Map, Number, Value, json};
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::executor::{CommandExecutor, CommandOutput};
use crate::sql::{Command, CommandKind};

/// One libSQL database; the `database` argument of [`CommandExecutor::execute`]
/// is ignored.
pub struct LibsqlExecutor {
    /// Held so the database outlives `conn`.
    _db: Database,
    conn: Mutex<Connection>,
}

impl LibsqlExecutor {
    /// Open (or create) a database file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::LibSql`] if the database cannot be opened.
    pub async fn open(path: &str) -> Result<Self, StoreError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        Ok(Self {
            _db: db,
            conn: Mutex::new(conn),
        })
    }

    /// # Errors
    ///
    /// Returns [`StoreError::LibSql`] if the database cannot be created.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::open(":memory:").await
    }

    async fn run(&self, command: &Command) -> Result<String, libsql::Error> {
        let conn = self.conn.lock().await;
        match command.kind() {
            CommandKind::Schema => {
                conn.execute_batch(command.sql()).await?;
                Ok(envelope(Vec::new()))
            }
            CommandKind::Write => {
                conn.execute(command.sql(), ()).await?;
                Ok(envelope(Vec::new()))
            }
            CommandKind::Query => {
                let mut rows = conn.query(command.sql(), ()).await?;
                let columns: Vec<String> = (0..rows.column_count())
                    .map(|index| rows.column_name(index).unwrap_or_default().to_string())
                    .collect();
                let mut rendered = Vec::new();
                while let Some(row) = rows.next().await? {
                    let mut object = Map::new();
                    for (index, name) in (0_i32..).zip(&columns) {
                        object.insert(name.clone(), json_value(row.get_value(index)?));
                    }
                    rendered.push(Value::Object(object));
                }
                Ok(envelope(rendered))
            }
        }
    }
}

impl CommandExecutor for LibsqlExecutor {
    fn execute(
        &self,
        _database: &str,
        command: &Command,
    ) -> impl Future<Output = Result<CommandOutput, StoreError>> + Send {
        async move {
            Ok(match self.run(command).await {
                Ok(stdout) => CommandOutput::ok(stdout),
                Err(error) => CommandOutput::failed(error.to_string()),
            })
        }
    }
}

fn envelope(results: Vec<Value>) -> String {
    json!([{ "results": results, "success": true }]).to_string()
}

fn json_value(value: libsql::Value) -> Value {
    match value {
        libsql::Value::Null => Value::Null,
        libsql::Value::Integer(n) => Value::from(n),
        libsql::Value::Real(x) => Number::from_f64(x).map_or(Value::Null, Value::Number),
        libsql::Value::Text(text) => Value::String(text),
        libsql::Value::Blob(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{first_row_id, rows};
    use crate::schema::TableNames;
    use crate::sql::{Insert, Select};
    use pretty_assertions::assert_eq;
    use quire_core::Category;

    async fn wiki_db() -> (LibsqlExecutor, TableNames) {
        let executor = LibsqlExecutor::open_in_memory().await.unwrap();
        let tables = TableNames::default();
        let output = executor
            .execute("local", &tables.schema_for(Category::Wiki))
            .await
            .unwrap();
        assert!(output.success, "{}", output.stderr);
        (executor, tables)
    }

    #[tokio::test]
    async fn query_rows_use_wrangler_envelope() {
        let (executor, tables) = wiki_db().await;
        let insert = Insert::into_table(&tables.nodes)
            .value("title", "guides")
            .value("parent_id", 0_i64)
            .build();
        assert!(executor.execute("local", &insert).await.unwrap().success);

        let select = Select::from_table(&tables.nodes, &["id", "title", "has_content"])
            .filter("title", "guides")
            .build();
        let output = executor.execute("local", &select).await.unwrap();
        assert!(output.success);
        assert_eq!(first_row_id(&output.stdout).unwrap(), Some(1));
        let rows = rows(&output.stdout).unwrap();
        assert_eq!(rows[0]["title"], Value::from("guides"));
        assert_eq!(rows[0]["has_content"], Value::from(0));
    }

    #[tokio::test]
    async fn sql_errors_are_unsuccessful_output() {
        let executor = LibsqlExecutor::open_in_memory().await.unwrap();
        let select = Select::from_table(&TableNames::default().posts, &["id"]).build();
        let output = executor.execute("local", &select).await.unwrap();
        assert!(!output.success);
        assert!(output.stderr.contains("posts"), "{}", output.stderr);
    }

    #[tokio::test]
    async fn schema_is_repeatable() {
        let (executor, tables) = wiki_db().await;
        let again = executor
            .execute("local", &tables.schema_for(Category::Wiki))
            .await
            .unwrap();
        assert!(again.success);
    }

    #[tokio::test]
    async fn opens_a_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quire.db");
        let executor = LibsqlExecutor::open(path.to_str().unwrap()).await.unwrap();
        let ddl = TableNames::default().schema_for(Category::Blog);
        assert!(executor.execute("local", &ddl).await.unwrap().success);
        assert!(path.exists());
    }
}
