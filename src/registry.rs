//! # Registry: Dependency-Closed Certificate Sets
//!
//! A registry is a flat list of proofs keyed by `n`. It is valid when every
//! proof checks on its own and every prime a proof cites is itself the `n` of
//! some proof in the same registry. Together the proofs form a Pratt-style
//! certificate DAG whose leaves are all `n = 2`.
//!
//! Dependencies are resolved by value through an index (`n` → position), not
//! by pointers, so the structure carries no ownership cycles.
//!
//! ## Closure vs. well-foundedness
//!
//! `check()` verifies membership only: it does not reject citation cycles.
//! `check_well_founded()` adds a depth-first cycle search on top. For proofs
//! that pass `Proof::check` every cited prime is below `n`, so a cycle cannot
//! actually arise, but the stricter pass does not rely on that argument.
//!
//! ## Persistence
//!
//! Registries are stored as pretty-printed JSON (`{"proofs": [...]}`). Files
//! are written atomically: write to a temp file, then rename.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rug::Integer;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::certificate::Proof;
use crate::error::CertError;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    pub proofs: Vec<Proof>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

impl Registry {
    pub fn new(proofs: Vec<Proof>) -> Self {
        Registry { proofs }
    }

    pub fn len(&self) -> usize {
        self.proofs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proofs.is_empty()
    }

    /// Position of the first proof for each `n`.
    pub fn index(&self) -> HashMap<&Integer, usize> {
        let mut index = HashMap::with_capacity(self.proofs.len());
        for (i, proof) in self.proofs.iter().enumerate() {
            index.entry(&proof.n).or_insert(i);
        }
        index
    }

    pub fn get(&self, n: &Integer) -> Option<&Proof> {
        self.proofs.iter().find(|p| p.n == *n)
    }

    /// Check that every proof is correct and the set is self-contained.
    ///
    /// Fails fast: the first invalid proof, or the first missing dependency,
    /// is returned.
    pub fn check(&self) -> Result<(), CertError> {
        // if any proof is incorrect, there is no way the registry is correct
        for proof in &self.proofs {
            proof.check()?;
        }
        let known = self.index();
        for proof in &self.proofs {
            if let Some(missing) = proof.dep().into_iter().find(|d| !known.contains_key(d)) {
                return Err(CertError::MissingDependency {
                    n: proof.n.clone(),
                    dependency: missing.clone(),
                });
            }
        }
        info!(proofs = self.proofs.len(), distinct = known.len(), "registry verified");
        Ok(())
    }

    /// `check()` plus rejection of citation cycles, so that every chain of
    /// dependencies provably bottoms out at `n = 2`.
    pub fn check_well_founded(&self) -> Result<(), CertError> {
        self.check()?;
        if let Some(n) = self.dependency_cycle() {
            return Err(CertError::CircularDependency { n: n.clone() });
        }
        Ok(())
    }

    /// Some `n` lying on a dependency cycle, if any. Dependencies with no
    /// proof in the registry are ignored here.
    pub fn dependency_cycle(&self) -> Option<&Integer> {
        let index = self.index();
        let mut marks = vec![Mark::Unvisited; self.proofs.len()];
        for root in 0..self.proofs.len() {
            if marks[root] != Mark::Unvisited {
                continue;
            }
            marks[root] = Mark::InProgress;
            let mut stack = vec![(root, 0usize)];
            while let Some((node, next)) = stack.pop() {
                let deps = self.proofs[node].dep();
                if next >= deps.len() {
                    marks[node] = Mark::Done;
                    continue;
                }
                stack.push((node, next + 1));
                let Some(&child) = index.get(deps[next]) else {
                    continue;
                };
                match marks[child] {
                    Mark::InProgress => return Some(&self.proofs[child].n),
                    Mark::Unvisited => {
                        marks[child] = Mark::InProgress;
                        stack.push((child, 0));
                    }
                    Mark::Done => {}
                }
            }
        }
        None
    }

    /// Decode a registry from its JSON wire form.
    pub fn from_json(text: &str) -> Result<Self, CertError> {
        serde_json::from_str(text).map_err(|e| CertError::Deserialization(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Read and decode a registry file.
pub fn load(path: &Path) -> Result<Registry> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    Registry::from_json(&text).with_context(|| format!("failed to decode {}", path.display()))
}

/// Write a registry as pretty JSON with a trailing newline, atomically.
pub fn save(path: &Path, registry: &Registry) -> Result<()> {
    let mut json = registry.to_json_pretty()?;
    json.push('\n');
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("failed to rename to {}", path.display()))?;
    Ok(())
}
