// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The three-way result every stage produces.
//!
//! A stage is never just pass/fail: a transient or unknowable observation
//! (LCM unreachable, deadline elapsed without a terminal workflow state) is
//! a distinct outcome from a definite failure, because only the latter is
//! worth mailing about and the former just means "try again". Modelling it
//! as a dedicated enum instead of `Option<bool>` keeps that distinction
//! explicit at every call site instead of relying on a `None` convention.

use std::fmt;

/// Outcome of running a single stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// The stage advanced (or observed) the intended state.
    Success,
    /// An invariant-violating observation. Worth a failure mail.
    Failure,
    /// Transient or unknowable; the caller may re-run the stage.
    Indeterminate,
}

impl StageOutcome {
    /// Collapse a plain boolean into Success/Failure.
    pub fn from_bool(ok: bool) -> Self {
        if ok {
            StageOutcome::Success
        } else {
            StageOutcome::Failure
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, StageOutcome::Success)
    }

    pub fn is_failure(self) -> bool {
        matches!(self, StageOutcome::Failure)
    }

    pub fn is_indeterminate(self) -> bool {
        matches!(self, StageOutcome::Indeterminate)
    }

    /// Process exit code the dispatcher returns for this outcome: 0/1/2.
    pub fn exit_code(self) -> i32 {
        match self {
            StageOutcome::Success => 0,
            StageOutcome::Failure => 1,
            StageOutcome::Indeterminate => 2,
        }
    }
}

impl fmt::Display for StageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StageOutcome::Success => "success",
            StageOutcome::Failure => "failure",
            StageOutcome::Indeterminate => "indeterminate",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod tests;
