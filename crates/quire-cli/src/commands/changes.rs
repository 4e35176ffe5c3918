//! `--changed-since`: markdown files touched between a revision and `HEAD`.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, bail};
use quire_sync::DocumentFilter;

/// Filter admitting only the markdown files `git diff --name-only <rev> HEAD`
/// reports for the repository containing `content_root`.
pub fn changed_since(rev: &str, content_root: &Path) -> anyhow::Result<DocumentFilter> {
    let toplevel = git(content_root, &["rev-parse", "--show-toplevel"])?;
    let names = git(content_root, &["diff", "--name-only", rev, "HEAD"])?;
    let paths = changed_markdown(Path::new(toplevel.trim()), &names);
    tracing::info!(rev, files = paths.len(), "changed markdown files");
    Ok(DocumentFilter::changed(paths))
}

fn git(dir: &Path, args: &[&str]) -> anyhow::Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .with_context(|| format!("failed to run git {}", args.join(" ")))?;
    if !output.status.success() {
        bail!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Absolute paths of the `.md` entries in a `--name-only` listing.
fn changed_markdown(toplevel: &Path, names: &str) -> Vec<PathBuf> {
    names
        .lines()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| toplevel.join(name))
        .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn listing_keeps_markdown_only() {
        let paths = changed_markdown(
            Path::new("/repo"),
            "blog/a.md\n\nwiki/guides/b.md\nblog/images/c.png\nREADME\n",
        );
        assert_eq!(
            paths,
            vec![PathBuf::from("/repo/blog/a.md"), PathBuf::from("/repo/wiki/guides/b.md")]
        );
    }

    #[test]
    fn outside_a_repository_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(changed_since("HEAD~1", dir.path()).is_err());
    }
}
