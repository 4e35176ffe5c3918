use quire_config::QuireConfig;

use crate::cli::GlobalFlags;
use crate::output::output;

/// Handle `quire config`.
pub fn handle(config: &QuireConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&config.redacted(), flags.format)
}
