//! Directory path → tree node id.
//!
//! Each directory segment is a node whose parent is the node of the
//! enclosing directory; the category root is `parent_id = 0`. Resolution
//! walks the prefixes shortest first, creating missing ancestors and caching
//! every id for the rest of the run. A prefix that failed once fails every
//! later lookup below it without touching the store again.

use std::collections::{BTreeSet, HashMap};

use quire_core::{ROOT_PARENT_ID, RelDir};
use quire_store::{CommandExecutor, RemoteStore};
use tracing::{debug, warn};

use crate::error::SyncError;

pub struct ParentChainResolver<E> {
    store: RemoteStore<E>,
    cache: HashMap<RelDir, i64>,
    failed: HashMap<RelDir, String>,
}

impl<E: CommandExecutor> ParentChainResolver<E> {
    pub fn new(store: RemoteStore<E>) -> Self {
        Self {
            store,
            cache: HashMap::new(),
            failed: HashMap::new(),
        }
    }

    /// Node id that documents in `dir` hang under.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Parent`] naming the first prefix that could not
    /// be upserted or read back.
    pub async fn resolve(&mut self, dir: &RelDir) -> Result<i64, SyncError> {
        let mut parent_id = ROOT_PARENT_ID;
        for prefix in dir.prefixes() {
            if let Some(id) = self.cache.get(&prefix) {
                parent_id = *id;
                continue;
            }
            if let Some(reason) = self.failed.get(&prefix) {
                return Err(SyncError::Parent {
                    dir: prefix.to_string(),
                    reason: reason.clone(),
                });
            }

            let title = prefix.name().unwrap_or_default();
            match self.store.ensure_node(title, parent_id, false).await {
                Ok(id) => {
                    debug!(dir = %prefix, id, parent_id, "resolved directory node");
                    self.cache.insert(prefix, id);
                    parent_id = id;
                }
                Err(error) => {
                    let reason = error.to_string();
                    warn!(dir = %prefix, %reason, "directory node unavailable");
                    self.failed.insert(prefix.clone(), reason.clone());
                    return Err(SyncError::Parent {
                        dir: prefix.to_string(),
                        reason,
                    });
                }
            }
        }
        Ok(parent_id)
    }

    /// Resolve every directory of a plan, parents before children. Failures
    /// are remembered; documents under them fail when they resolve.
    pub async fn warm(&mut self, plan: &TreePlan) -> usize {
        let mut resolved = 0;
        for dir in plan.dirs() {
            if self.resolve(dir).await.is_ok() {
                resolved += 1;
            }
        }
        resolved
    }

    #[must_use]
    pub fn cached(&self, dir: &RelDir) -> Option<i64> {
        self.cache.get(dir).copied()
    }

    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub const fn store(&self) -> &RemoteStore<E> {
        &self.store
    }
}

/// Every directory prefix a set of documents needs, ordered by depth then
/// path, so a directory always comes after its parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreePlan {
    dirs: BTreeSet<(usize, RelDir)>,
}

impl TreePlan {
    #[must_use]
    pub fn from_dirs<'a, I>(dirs: I) -> Self
    where
        I: IntoIterator<Item = &'a RelDir>,
    {
        let dirs = dirs
            .into_iter()
            .flat_map(RelDir::prefixes)
            .map(|prefix| (prefix.depth(), prefix))
            .collect();
        Self { dirs }
    }

    pub fn dirs(&self) -> impl Iterator<Item = &RelDir> {
        self.dirs.iter().map(|(_, dir)| dir)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}
