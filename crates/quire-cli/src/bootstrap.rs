use anyhow::Context;
use quire_config::QuireConfig;

use crate::cli::SyncArgs;

/// Read `.env` and every config layer.
pub fn load_config() -> anyhow::Result<QuireConfig> {
    QuireConfig::load_with_dotenv().context("failed to load quire configuration")
}

/// Fold `sync` flags into the loaded config so everything downstream reads
/// a single source.
pub fn apply_sync_overrides(config: &mut QuireConfig, args: &SyncArgs) {
    if let Some(root) = &args.root {
        config.content.root = root.display().to_string();
    }
    if let Some(concurrency) = args.concurrency {
        config.sync.concurrency = concurrency;
    }
}

/// Local runs never need D1 credentials; remote runs need all of them.
pub fn validate(config: &QuireConfig, local: bool) -> anyhow::Result<()> {
    if local {
        config.validate_local()
    } else {
        config.validate_for_sync()
    }
    .context("invalid configuration")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::cli::CategoryArg;

    fn args() -> SyncArgs {
        SyncArgs {
            category: CategoryArg::All,
            root: Some(PathBuf::from("site")),
            changed_since: None,
            local_db: None,
            concurrency: Some(0),
            fail_on_abort: false,
        }
    }

    #[test]
    fn flags_override_config() {
        let mut config = QuireConfig::default();
        apply_sync_overrides(&mut config, &args());
        assert_eq!(config.content.root, "site");
        assert_eq!(config.sync.concurrency, 0);
    }

    #[test]
    fn zero_concurrency_fails_validation_even_locally() {
        let mut config = QuireConfig::default();
        apply_sync_overrides(&mut config, &args());
        let error = validate(&config, true).unwrap_err();
        assert!(format!("{error:#}").contains("sync.concurrency"));
    }

    #[test]
    fn remote_runs_need_credentials() {
        let config = QuireConfig::default();
        assert!(validate(&config, true).is_ok());
        assert!(validate(&config, false).is_err());
    }
}
