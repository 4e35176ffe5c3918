//! Command building with centralized escaping.
//!
//! The command channel is plain text (`wrangler d1 execute --command=...`),
//! so every value is embedded as a literal. [`Command`] can only be produced
//! by the builders in this crate, which route every text value through
//! [`quote_text`] and every table name through a validated [`Ident`]. Column
//! names are `&'static str`, so document text can never reach an identifier
//! position.

use std::fmt;

use crate::error::StoreError;

/// Quote a string as an SQL literal: wrap in `'` and double every embedded `'`.
#[must_use]
pub fn quote_text(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            quoted.push('\'');
        }
        quoted.push(ch);
    }
    quoted.push('\'');
    quoted
}

/// A validated SQL identifier (`[A-Za-z_][A-Za-z0-9_]*`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident(pub(crate) String);

impl Ident {
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidIdentifier`] for anything but a plain name.
    pub fn new(name: &str) -> Result<Self, StoreError> {
        let mut chars = name.chars();
        let valid = chars
            .next()
            .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
            && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
        if valid {
            Ok(Self(name.to_string()))
        } else {
            Err(StoreError::InvalidIdentifier(name.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A value embedded in a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
    Bool(bool),
    Null,
    /// The store's own clock.
    CurrentTimestamp,
}

impl SqlValue {
    fn render(&self) -> String {
        match self {
            Self::Text(text) => quote_text(text),
            Self::Integer(n) => n.to_string(),
            Self::Bool(flag) => u8::from(*flag).to_string(),
            Self::Null => String::from("NULL"),
            Self::CurrentTimestamp => String::from("CURRENT_TIMESTAMP"),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Returns rows.
    Query,
    /// Changes rows.
    Write,
    /// One or more DDL statements.
    Schema,
}

/// A finished command, ready for an executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    sql: String,
    kind: CommandKind,
}

impl Command {
    pub(crate) const fn new(sql: String, kind: CommandKind) -> Self {
        Self { sql, kind }
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        self.kind
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// What an insert does when the conflict target already exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnConflict {
    /// Keep the existing row untouched.
    Nothing,
    /// Overwrite the listed columns with the incoming values.
    Update(Vec<&'static str>),
}

/// `INSERT ... ON CONFLICT ...` builder.
#[derive(Debug, Clone)]
pub struct Insert {
    table: Ident,
    values: Vec<(&'static str, SqlValue)>,
    conflict: Option<(Vec<&'static str>, OnConflict)>,
}

impl Insert {
    #[must_use]
    pub fn into_table(table: &Ident) -> Self {
        Self {
            table: table.clone(),
            values: Vec::new(),
            conflict: None,
        }
    }

    #[must_use]
    pub fn value(mut self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.values.push((column, value.into()));
        self
    }

    #[must_use]
    pub fn on_conflict(mut self, target: &[&'static str], action: OnConflict) -> Self {
        self.conflict = Some((target.to_vec(), action));
        self
    }

    #[must_use]
    pub fn build(self) -> Command {
        let columns: Vec<&str> = self.values.iter().map(|(column, _)| *column).collect();
        let values: Vec<String> = self.values.iter().map(|(_, value)| value.render()).collect();
        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(", "),
            values.join(", ")
        );

        if let Some((target, action)) = self.conflict {
            sql.push_str(&format!(" ON CONFLICT({}) ", target.join(", ")));
            match action {
                OnConflict::Nothing => sql.push_str("DO NOTHING"),
                OnConflict::Update(set) => {
                    let assignments: Vec<String> = set
                        .iter()
                        .map(|column| format!("{column} = excluded.{column}"))
                        .collect();
                    sql.push_str(&format!("DO UPDATE SET {}", assignments.join(", ")));
                }
            }
        }

        Command::new(sql, CommandKind::Write)
    }
}

/// `SELECT ... WHERE a = .. AND b = ..` builder.
#[derive(Debug, Clone)]
pub struct Select {
    table: Ident,
    columns: Vec<&'static str>,
    filters: Vec<(&'static str, SqlValue)>,
    order_by: Vec<&'static str>,
    limit: Option<u32>,
}

impl Select {
    #[must_use]
    pub fn from_table(table: &Ident, columns: &[&'static str]) -> Self {
        Self {
            table: table.clone(),
            columns: columns.to_vec(),
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    #[must_use]
    pub fn filter(mut self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.filters.push((column, value.into()));
        self
    }

    #[must_use]
    pub fn order_by(mut self, column: &'static str) -> Self {
        self.order_by.push(column);
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn build(self) -> Command {
        let mut sql = format!("SELECT {} FROM {}", self.columns.join(", "), self.table);
        if !self.filters.is_empty() {
            let clauses: Vec<String> = self
                .filters
                .iter()
                .map(|(column, value)| match value {
                    SqlValue::Null => format!("{column} IS NULL"),
                    other => format!("{column} = {}", other.render()),
                })
                .collect();
            sql.push_str(&format!(" WHERE {}", clauses.join(" AND ")));
        }
        if !self.order_by.is_empty() {
            sql.push_str(&format!(" ORDER BY {}", self.order_by.join(", ")));
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        Command::new(sql, CommandKind::Query)
    }
}
