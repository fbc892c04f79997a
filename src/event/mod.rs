// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Lifecycle events emitted by a story runner.
//!
//! Every moment a runner can report is a variant of [`LifecycleEvent`], so a
//! sink handles all of them through a single [`EventSink::handle_event()`]
//! dispatch, and a deferred call is just an owned [`LifecycleEvent`].
//!
//! Events are nested in the following order:
//! ```text
//! StoryStart
//!   Narrative, Lifecycle, GivenStories, ...
//!   ScenarioStart
//!     Meta
//!     ExamplesStart
//!       ExampleRow
//!         StepStart
//!         StepSuccess | StepSkippedIgnorable | StepPending |
//!         StepNotPerformed | StepFailed
//!     ExamplesEnd
//!   ScenarioEnd
//! StoryEnd
//! ```
//!
//! [`EventSink::handle_event()`]: crate::EventSink::handle_event

mod examples;
mod step;
mod story;

use derive_more::with_trait::Display;

pub use self::{
    examples::{ExamplesTable, Row},
    step::{Cause, OutcomesTable, VerifiedOutcome},
    story::{
        GivenStories, GivenStory, Lifecycle, Meta, Narrative, Scenario, Story,
        StoryDuration,
    },
};

/// Single lifecycle moment reported by a story runner.
///
/// Immutable once constructed: sinks receive it by reference, and a
/// [`DeferredQueue`] owns it until replay.
///
/// [`DeferredQueue`]: crate::DeferredQueue
#[derive(Clone, Debug, PartialEq)]
pub enum LifecycleEvent {
    /// [`Story`] execution started.
    StoryStart {
        /// Started [`Story`].
        story: Story,

        /// Whether this [`Story`] is run as a given story of another one.
        given_story: bool,
    },

    /// Current [`Story`] finished.
    StoryEnd {
        /// Whether the finished [`Story`] was run as a given story.
        given_story: bool,
    },

    /// [`Story`] was excluded by a meta filter.
    StoryNotAllowed {
        /// Excluded [`Story`].
        story: Story,

        /// Filter excluding the [`Story`].
        filter: String,
    },

    /// [`Story`] was cancelled on timeout.
    StoryCancelled {
        /// Cancelled [`Story`].
        story: Story,

        /// Timing of the cancelled [`Story`].
        duration: StoryDuration,
    },

    /// The whole [`Story`] is restarted after a failure.
    RestartedStory {
        /// Restarted [`Story`].
        story: Story,

        /// Failure causing the restart.
        cause: Cause,
    },

    /// [`Narrative`] of the current [`Story`].
    Narrative(Narrative),

    /// [`Lifecycle`] steps of the current [`Story`].
    Lifecycle(Lifecycle),

    /// [`GivenStories`] of the current [`Story`] or [`Scenario`].
    GivenStories(GivenStories),

    /// [`Scenario`] was excluded by a meta filter.
    ScenarioNotAllowed {
        /// Excluded [`Scenario`].
        scenario: Scenario,

        /// Filter excluding the [`Scenario`].
        filter: String,
    },

    /// [`Scenario`] execution started.
    ///
    /// The title lists all the example-driven variants separated by `|`, if
    /// there are many.
    ScenarioStart {
        /// Title of the started [`Scenario`].
        title: String,
    },

    /// [`Meta`] of the current [`Scenario`].
    Meta(Meta),

    /// Current [`Scenario`] finished.
    ScenarioEnd,

    /// Examples table of the current [`Scenario`] is about to be run.
    ExamplesStart {
        /// Steps run for every example row.
        steps: Vec<String>,

        /// Examples table.
        table: ExamplesTable,
    },

    /// Single example [`Row`] is about to be run.
    ExampleRow(Row),

    /// All the examples of the current [`Scenario`] were run.
    ExamplesEnd,

    /// Step execution started.
    StepStart {
        /// Step text.
        step: String,
    },

    /// Step passed.
    StepSuccess {
        /// Step text.
        step: String,
    },

    /// Step is ignorable (commented out in the story).
    StepSkippedIgnorable {
        /// Step text.
        step: String,
    },

    /// Step has no matching implementation yet.
    StepPending {
        /// Step text.
        step: String,
    },

    /// Step wasn't performed because of a previous failure.
    StepNotPerformed {
        /// Step text.
        step: String,
    },

    /// Step failed.
    StepFailed {
        /// Step text.
        step: String,

        /// Failure of the step, as wrapped by the runner.
        cause: Cause,
    },

    /// Step failed on verifying an [`OutcomesTable`].
    FailedOutcomes {
        /// Step text.
        step: String,

        /// Verified outcomes.
        table: OutcomesTable,
    },

    /// Step is restarted after a failure.
    Restarted {
        /// Step text.
        step: String,

        /// Failure causing the restart.
        cause: Cause,
    },

    /// Runner works in a dry-run mode.
    DryRun,

    /// Runner collected methods to be implemented for the pending steps.
    PendingMethods(Vec<String>),
}

/// Tag of a [`LifecycleEvent`] without its payload.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum EventKind {
    /// [`LifecycleEvent::StoryStart`].
    StoryStart,
    /// [`LifecycleEvent::StoryEnd`].
    StoryEnd,
    /// [`LifecycleEvent::StoryNotAllowed`].
    StoryNotAllowed,
    /// [`LifecycleEvent::StoryCancelled`].
    StoryCancelled,
    /// [`LifecycleEvent::RestartedStory`].
    RestartedStory,
    /// [`LifecycleEvent::Narrative`].
    Narrative,
    /// [`LifecycleEvent::Lifecycle`].
    Lifecycle,
    /// [`LifecycleEvent::GivenStories`].
    GivenStories,
    /// [`LifecycleEvent::ScenarioNotAllowed`].
    ScenarioNotAllowed,
    /// [`LifecycleEvent::ScenarioStart`].
    ScenarioStart,
    /// [`LifecycleEvent::Meta`].
    Meta,
    /// [`LifecycleEvent::ScenarioEnd`].
    ScenarioEnd,
    /// [`LifecycleEvent::ExamplesStart`].
    ExamplesStart,
    /// [`LifecycleEvent::ExampleRow`].
    ExampleRow,
    /// [`LifecycleEvent::ExamplesEnd`].
    ExamplesEnd,
    /// [`LifecycleEvent::StepStart`].
    StepStart,
    /// [`LifecycleEvent::StepSuccess`].
    StepSuccess,
    /// [`LifecycleEvent::StepSkippedIgnorable`].
    StepSkippedIgnorable,
    /// [`LifecycleEvent::StepPending`].
    StepPending,
    /// [`LifecycleEvent::StepNotPerformed`].
    StepNotPerformed,
    /// [`LifecycleEvent::StepFailed`].
    StepFailed,
    /// [`LifecycleEvent::FailedOutcomes`].
    FailedOutcomes,
    /// [`LifecycleEvent::Restarted`].
    Restarted,
    /// [`LifecycleEvent::DryRun`].
    DryRun,
    /// [`LifecycleEvent::PendingMethods`].
    PendingMethods,
}

impl LifecycleEvent {
    /// Returns the [`EventKind`] of this [`LifecycleEvent`].
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::StoryStart { .. } => EventKind::StoryStart,
            Self::StoryEnd { .. } => EventKind::StoryEnd,
            Self::StoryNotAllowed { .. } => EventKind::StoryNotAllowed,
            Self::StoryCancelled { .. } => EventKind::StoryCancelled,
            Self::RestartedStory { .. } => EventKind::RestartedStory,
            Self::Narrative(_) => EventKind::Narrative,
            Self::Lifecycle(_) => EventKind::Lifecycle,
            Self::GivenStories(_) => EventKind::GivenStories,
            Self::ScenarioNotAllowed { .. } => EventKind::ScenarioNotAllowed,
            Self::ScenarioStart { .. } => EventKind::ScenarioStart,
            Self::Meta(_) => EventKind::Meta,
            Self::ScenarioEnd => EventKind::ScenarioEnd,
            Self::ExamplesStart { .. } => EventKind::ExamplesStart,
            Self::ExampleRow(_) => EventKind::ExampleRow,
            Self::ExamplesEnd => EventKind::ExamplesEnd,
            Self::StepStart { .. } => EventKind::StepStart,
            Self::StepSuccess { .. } => EventKind::StepSuccess,
            Self::StepSkippedIgnorable { .. } => {
                EventKind::StepSkippedIgnorable
            }
            Self::StepPending { .. } => EventKind::StepPending,
            Self::StepNotPerformed { .. } => EventKind::StepNotPerformed,
            Self::StepFailed { .. } => EventKind::StepFailed,
            Self::FailedOutcomes { .. } => EventKind::FailedOutcomes,
            Self::Restarted { .. } => EventKind::Restarted,
            Self::DryRun => EventKind::DryRun,
            Self::PendingMethods(_) => EventKind::PendingMethods,
        }
    }

    /// Returns the step text, if this is a step-level event.
    #[must_use]
    pub fn step(&self) -> Option<&str> {
        match self {
            Self::StepStart { step }
            | Self::StepSuccess { step }
            | Self::StepSkippedIgnorable { step }
            | Self::StepPending { step }
            | Self::StepNotPerformed { step }
            | Self::StepFailed { step, .. }
            | Self::FailedOutcomes { step, .. }
            | Self::Restarted { step, .. } => Some(step),
            _ => None,
        }
    }

    /// Indicates whether this event finishes an outermost (non-given)
    /// [`Story`].
    #[must_use]
    pub const fn ends_story(&self) -> bool {
        matches!(self, Self::StoryEnd { given_story: false })
    }

    /// Shortcut for a [`LifecycleEvent::StoryStart`] of a non-given [`Story`].
    #[must_use]
    pub fn story_started(name: impl Into<String>) -> Self {
        Self::StoryStart {
            story: Story::new(name, ""),
            given_story: false,
        }
    }

    /// Shortcut for a [`LifecycleEvent::StoryEnd`] of a non-given [`Story`].
    #[must_use]
    pub const fn story_finished() -> Self {
        Self::StoryEnd { given_story: false }
    }

    /// Shortcut for a [`LifecycleEvent::ScenarioStart`].
    #[must_use]
    pub fn scenario_started(title: impl Into<String>) -> Self {
        Self::ScenarioStart {
            title: title.into(),
        }
    }

    /// Shortcut for a [`LifecycleEvent::StepSuccess`].
    #[must_use]
    pub fn step_passed(step: impl Into<String>) -> Self {
        Self::StepSuccess { step: step.into() }
    }

    /// Shortcut for a [`LifecycleEvent::StepFailed`].
    #[must_use]
    pub fn step_failed(step: impl Into<String>, cause: Cause) -> Self {
        Self::StepFailed {
            step: step.into(),
            cause,
        }
    }
}
