//! # quire-store
//!
//! Remote store access for Quire:
//! - [`sql`]: command builders; the only way to produce a [`Command`]
//! - [`CommandExecutor`]: the seam to whatever runs commands
//!   ([`WranglerExecutor`] for D1, [`LibsqlExecutor`] for local databases)
//! - [`RemoteStore`]: idempotent upserts for posts, tree nodes and contents
//!
//! Text values are only ever embedded through [`sql::quote_text`]; table
//! names are validated [`Ident`]s.

pub mod error;
pub mod executor;
pub mod local;
pub mod remote;
pub mod response;
pub mod schema;
pub mod sql;
pub mod wrangler;

pub use error::StoreError;
pub use executor::{CommandExecutor, CommandOutput};
pub use local::LibsqlExecutor;
pub use remote::RemoteStore;
pub use schema::TableNames;
pub use sql::{Command, CommandKind, Ident};
pub use wrangler::WranglerExecutor;
