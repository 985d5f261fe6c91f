// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Blocking-workflow rules: the fleet-wide gate that decides whether a
//! backup is allowed to start.
//!
//! Deliberately preserves the original's first-match-wins counting: a
//! tenancy running two storage-intensive workflow types still contributes
//! to exactly one counter (the first to match, in a fixed precedence
//! order). This is not "fixed" to a multi-count scheme even though it
//! looks like it under-counts, because the rule thresholds were tuned
//! against that exact counting behaviour.

use crate::config::ConfigError;
use std::collections::HashSet;
use std::str::FromStr;

/// Workflow types the blocking rules can reason about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowType {
    Backup,
    Install,
    Restore,
    Rollback,
    Upgrade,
}

impl WorkflowType {
    /// Precedence order used when a tenancy has several active storage
    /// workflows: the first type in this order that matches wins, and
    /// all others are ignored for that tenancy's single counter slot.
    pub const PRECEDENCE: [WorkflowType; 5] = [
        WorkflowType::Backup,
        WorkflowType::Restore,
        WorkflowType::Install,
        WorkflowType::Upgrade,
        WorkflowType::Rollback,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowType::Backup => "backup",
            WorkflowType::Install => "install",
            WorkflowType::Restore => "restore",
            WorkflowType::Rollback => "rollback",
            WorkflowType::Upgrade => "upgrade",
        }
    }
}

impl FromStr for WorkflowType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "backup" => Ok(WorkflowType::Backup),
            "install" => Ok(WorkflowType::Install),
            "restore" => Ok(WorkflowType::Restore),
            "rollback" => Ok(WorkflowType::Rollback),
            "upgrade" => Ok(WorkflowType::Upgrade),
            other => Err(ConfigError::UnknownWorkflowType(other.to_string())),
        }
    }
}

/// A single `(count, types)` blocking rule: violated once the summed
/// count of active workflows of any listed type reaches `threshold`.
#[derive(Debug, Clone)]
pub struct BlockingRule {
    pub threshold: u32,
    pub types: HashSet<WorkflowType>,
}

impl BlockingRule {
    /// Parses `"N:t1|t2|…,M:t3,…"` into a list of rules.
    pub fn parse_rules(spec: &str) -> Result<Vec<BlockingRule>, ConfigError> {
        spec.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Self::parse_one)
            .collect()
    }

    fn parse_one(rule: &str) -> Result<BlockingRule, ConfigError> {
        let (count_str, types_str) = rule
            .split_once(':')
            .ok_or_else(|| ConfigError::InvalidBlockingRule(rule.to_string()))?;
        let threshold: u32 = count_str
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidBlockingRule(rule.to_string()))?;
        let types = types_str
            .split('|')
            .map(|t| t.trim().parse())
            .collect::<Result<HashSet<_>, _>>()?;
        if types.is_empty() {
            return Err(ConfigError::InvalidBlockingRule(rule.to_string()));
        }
        Ok(BlockingRule { threshold, types })
    }
}

/// Per-tenancy workflow-type count vector, evaluated against each
/// configured [`BlockingRule`] threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkflowTypeCounts {
    pub backup: u32,
    pub install: u32,
    pub restore: u32,
    pub rollback: u32,
    pub upgrade: u32,
}

impl WorkflowTypeCounts {
    pub fn get(&self, t: WorkflowType) -> u32 {
        match t {
            WorkflowType::Backup => self.backup,
            WorkflowType::Install => self.install,
            WorkflowType::Restore => self.restore,
            WorkflowType::Rollback => self.rollback,
            WorkflowType::Upgrade => self.upgrade,
        }
    }

    fn increment(&mut self, t: WorkflowType) {
        match t {
            WorkflowType::Backup => self.backup += 1,
            WorkflowType::Install => self.install += 1,
            WorkflowType::Restore => self.restore += 1,
            WorkflowType::Rollback => self.rollback += 1,
            WorkflowType::Upgrade => self.upgrade += 1,
        }
    }

    /// Record one tenancy's contribution, using first-match-wins over
    /// [`WorkflowType::PRECEDENCE`]. A no-op if `active_types` is empty.
    pub fn record_tenancy(&mut self, active_types: &HashSet<WorkflowType>) {
        if let Some(first) = WorkflowType::PRECEDENCE
            .into_iter()
            .find(|t| active_types.contains(t))
        {
            self.increment(first);
        }
    }

    pub fn total(&self) -> u32 {
        self.backup + self.install + self.restore + self.rollback + self.upgrade
    }
}

/// Applies the blocking rules to a count vector: `true` iff allowed to proceed.
///
/// Monotone in every component of `counts` by construction (increasing any
/// component can only increase a rule's summed count, never decrease it).
pub fn evaluate(counts: &WorkflowTypeCounts, rules: &[BlockingRule]) -> bool {
    if counts.total() == 0 {
        return true;
    }
    for rule in rules {
        let sum: u32 = rule.types.iter().map(|t| counts.get(*t)).sum();
        if sum >= rule.threshold {
            return false;
        }
    }
    true
}

#[cfg(test)]
#[path = "blocking_tests.rs"]
mod tests;
