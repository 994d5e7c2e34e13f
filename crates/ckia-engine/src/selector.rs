//! Include/exclude filtering of registered check identifiers

use ckia_core::{CheckId, CkiaError, Result};
use std::collections::BTreeSet;
use tracing::warn;

/// Caller-supplied check filters.
///
/// A non-empty include set takes sole precedence; the exclude set only
/// applies when nothing is included explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunRequest {
    pub include: BTreeSet<CheckId>,
    pub exclude: BTreeSet<CheckId>,
}

impl RunRequest {
    /// Request that runs every registered check
    pub fn all() -> Self {
        Self::default()
    }

    pub fn include<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CheckId>,
    {
        self.include.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn exclude<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CheckId>,
    {
        self.exclude.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Build a request from raw filter strings (CLI flags, config file)
    pub fn from_filters(include: &[String], exclude: &[String]) -> Result<Self> {
        let parse = |raw: &[String]| -> Result<BTreeSet<CheckId>> {
            raw.iter()
                .map(|s| {
                    let s = s.trim();
                    if s.is_empty() {
                        Err(CkiaError::Config("empty check identifier in filter".into()))
                    } else {
                        Ok(CheckId::new(s))
                    }
                })
                .collect()
        };

        Ok(Self {
            include: parse(include)?,
            exclude: parse(exclude)?,
        })
    }

    pub fn is_unfiltered(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}

/// Apply `request` to `all_ids`, returning the eligible identifiers sorted
pub fn select(all_ids: &[CheckId], request: &RunRequest) -> Vec<CheckId> {
    let registered: BTreeSet<&CheckId> = all_ids.iter().collect();

    if !request.include.is_empty() {
        if !request.exclude.is_empty() {
            warn!(
                "Both include and exclude filters given; ignoring {} excluded check(s)",
                request.exclude.len()
            );
        }
        for id in request.include.iter().filter(|id| !registered.contains(id)) {
            warn!("Included check {} is not registered", id);
        }
        return registered
            .into_iter()
            .filter(|id| request.include.contains(*id))
            .cloned()
            .collect();
    }

    for id in request.exclude.iter().filter(|id| !registered.contains(id)) {
        warn!("Excluded check {} is not registered", id);
    }

    registered
        .into_iter()
        .filter(|id| !request.exclude.contains(*id))
        .cloned()
        .collect()
}
