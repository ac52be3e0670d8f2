// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Explicit wizard state machine shared by every vault backend.
//!
//! Backends never count steps. On every `wiz_next` they compute the first
//! step whose answers are still missing and hand it to
//! [`WizardMachine::advance`]; the machine enforces which calls are legal
//! in which state.

use std::fmt::Debug;

use serde::Serialize;
use strum::{Display, EnumString};

use crate::error::{Result, TetherError};

/// Named wizard states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WizardState {
    /// Not started, or aborted.
    Cold,
    /// Answers are being collected.
    Collecting,
    /// Every step is satisfied; waiting for finalization.
    Complete,
    /// Finalized and warmed up.
    Ready,
}

/// Inputs that move the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum WizardEvent {
    Warmup,
    Prompt,
    Exhausted,
    Finalize,
    Abort,
}

use WizardEvent as E;
use WizardState as S;

/// Every legal `(from, event) -> to` edge. Anything else is rejected.
const TRANSITIONS: &[(WizardState, WizardEvent, WizardState)] = &[
    (S::Cold, E::Warmup, S::Collecting),
    (S::Ready, E::Warmup, S::Collecting),
    (S::Collecting, E::Prompt, S::Collecting),
    (S::Collecting, E::Exhausted, S::Complete),
    (S::Complete, E::Exhausted, S::Complete),
    (S::Ready, E::Exhausted, S::Ready),
    (S::Complete, E::Finalize, S::Ready),
    (S::Cold, E::Abort, S::Cold),
    (S::Collecting, E::Abort, S::Cold),
    (S::Complete, E::Abort, S::Cold),
    (S::Ready, E::Abort, S::Cold),
];

/// Looks up the target state for an event, if the edge exists.
pub fn transition(from: WizardState, event: WizardEvent) -> Option<WizardState> {
    TRANSITIONS
        .iter()
        .find(|(f, e, _)| *f == from && *e == event)
        .map(|(_, _, to)| *to)
}

/// State plus the step currently shown to the user.
#[derive(Debug, Clone)]
pub struct WizardMachine<Step> {
    state: WizardState,
    pending: Option<Step>,
}

impl<Step> Default for WizardMachine<Step> {
    fn default() -> Self {
        Self {
            state: WizardState::Cold,
            pending: None,
        }
    }
}

impl<Step: Copy + PartialEq + Debug> WizardMachine<Step> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    /// Step whose form was last returned and not yet answered.
    pub fn pending(&self) -> Option<Step> {
        self.pending
    }

    fn fire(&mut self, event: WizardEvent) -> Result<WizardState> {
        let to = transition(self.state, event).ok_or_else(|| {
            TetherError::Validation(format!(
                "wizard cannot handle '{event}' while {}",
                self.state
            ))
        })?;
        tracing::trace!(from = %self.state, %event, %to, "wizard transition");
        self.state = to;
        Ok(to)
    }

    /// Enters `Collecting`.
    pub fn begin(&mut self) -> Result<()> {
        self.pending = None;
        self.fire(E::Warmup).map(|_| ())
    }

    /// Records the next unsatisfied step computed by the backend.
    ///
    /// Once the machine has left `Collecting` this keeps returning `None`
    /// regardless of `next`.
    pub fn advance(&mut self, next: Option<Step>) -> Result<Option<Step>> {
        match self.state {
            S::Cold => Err(TetherError::Validation(
                "wizard has not been warmed up".into(),
            )),
            S::Complete | S::Ready => {
                self.fire(E::Exhausted)?;
                Ok(None)
            }
            S::Collecting => match next {
                Some(step) => {
                    self.fire(E::Prompt)?;
                    self.pending = Some(step);
                    Ok(Some(step))
                }
                None => {
                    self.fire(E::Exhausted)?;
                    self.pending = None;
                    Ok(None)
                }
            },
        }
    }

    /// Step an incoming answer set belongs to.
    pub fn expecting(&self) -> Result<Step> {
        match (self.state, self.pending) {
            (S::Collecting, Some(step)) => Ok(step),
            _ => Err(TetherError::Validation(
                "no wizard form is waiting for answers".into(),
            )),
        }
    }

    /// Clears the pending step after its answers were accepted.
    pub fn answered(&mut self) {
        self.pending = None;
    }

    /// Moves `Complete -> Ready`.
    pub fn finish(&mut self) -> Result<()> {
        self.fire(E::Finalize).map(|_| ())
    }

    /// Returns to `Cold` and forgets the pending step.
    pub fn abort(&mut self) {
        self.pending = None;
        self.state = S::Cold;
    }
}
