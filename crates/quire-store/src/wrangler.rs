//! `wrangler d1 execute` as a [`CommandExecutor`].

use std::ffi::OsString;
use std::future::Future;
use std::process::Stdio;

use quire_config::QuireConfig;
use tracing::debug;

use crate::error::StoreError;
use crate::executor::{CommandExecutor, CommandOutput};
use crate::sql::Command;

/// Spawns `{program} {program_args..} d1 execute <db> --remote --json --command=<sql>`.
///
/// Arguments are passed as argv, never through a shell.
#[derive(Debug, Clone)]
pub struct WranglerExecutor {
    program: String,
    program_args: Vec<String>,
    remote: bool,
    account_id: String,
}

impl WranglerExecutor {
    #[must_use]
    pub fn new(program: impl Into<String>, program_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            program_args,
            remote: true,
            account_id: String::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: &QuireConfig) -> Self {
        Self {
            program: config.d1.program.clone(),
            program_args: config.d1.program_args.clone(),
            remote: config.d1.remote,
            account_id: config.r2.account_id.clone(),
        }
    }

    /// Arguments after the program name.
    #[must_use]
    pub fn argv(&self, database: &str, command: &Command) -> Vec<OsString> {
        let mut argv: Vec<OsString> = self.program_args.iter().map(OsString::from).collect();
        argv.extend(["d1", "execute", database].map(OsString::from));
        argv.push(OsString::from(if self.remote { "--remote" } else { "--local" }));
        argv.push(OsString::from("--json"));
        argv.push(OsString::from(format!("--command={}", command.sql())));
        argv
    }
}

impl CommandExecutor for WranglerExecutor {
    fn execute(
        &self,
        database: &str,
        command: &Command,
    ) -> impl Future<Output = Result<CommandOutput, StoreError>> + Send {
        let mut process = tokio::process::Command::new(&self.program);
        process
            .args(self.argv(database, command))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if !self.account_id.trim().is_empty() {
            process.env("CLOUDFLARE_ACCOUNT_ID", self.account_id.trim());
        }
        let program = self.program.clone();
        let database = database.to_string();

        async move {
            debug!(%program, %database, "spawning wrangler");
            let output = process
                .output()
                .await
                .map_err(|source| StoreError::Spawn { program, source })?;
            Ok(CommandOutput {
                success: output.status.success(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TableNames;
    use crate::sql::Insert;
    use pretty_assertions::assert_eq;

    fn rendered(argv: &[OsString]) -> Vec<String> {
        argv.iter().map(|arg| arg.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn argv_matches_wrangler_cli() {
        let executor = WranglerExecutor::new("npx", vec!["wrangler".into()]);
        let command = Insert::into_table(&TableNames::default().posts)
            .value("title", "It's here")
            .build();

        assert_eq!(
            rendered(&executor.argv("quire-blog", &command)),
            vec![
                "wrangler",
                "d1",
                "execute",
                "quire-blog",
                "--remote",
                "--json",
                "--command=INSERT INTO posts (title) VALUES ('It''s here')",
            ]
        );
    }

    #[test]
    fn non_remote_config_targets_local_database() {
        let mut config = QuireConfig::default();
        config.d1.program_args = Vec::new();
        config.d1.remote = false;
        let executor = WranglerExecutor::from_config(&config);
        let command = TableNames::default().schema_for(quire_core::Category::Wiki);
        let argv = rendered(&executor.argv("quire-wiki", &command));
        assert_eq!(argv[0], "d1");
        assert!(argv.contains(&"--local".to_string()));
        assert!(!argv.contains(&"--remote".to_string()));
    }

    #[test]
    fn from_config_copies_d1_settings() {
        let mut config = QuireConfig::default();
        config.d1.program = "bunx".into();
        config.d1.remote = false;
        config.r2.account_id = "acct".into();
        let executor = WranglerExecutor::from_config(&config);
        assert_eq!(executor.program, "bunx");
        assert!(!executor.remote);
        assert_eq!(executor.account_id, "acct");
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let executor = WranglerExecutor::new("quire-no-such-program-on-path", Vec::new());
        let command = TableNames::default().schema_for(quire_core::Category::Blog);
        let err = executor.execute("db", &command).await.unwrap_err();
        assert!(matches!(err, StoreError::Spawn { .. }));
        assert!(err.is_transport());
    }
}
