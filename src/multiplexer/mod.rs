// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Fan-out Multiplexer of a single story's [`LifecycleEvent`]s.

mod builder;

use crate::{
    classify::{Classifier, StepResult},
    error::Result,
    event::LifecycleEvent,
    hierarchy::Tracker,
    queue::DeferredQueue,
    report::{Memory, ReportWriter},
    sink::{Discard, EventSink, Shared},
};

pub use self::builder::Builder;

/// Way the primary sink of a [`Multiplexer`] is fed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ConcurrencyMode {
    /// Stories run one by one, so the primary sink is called inline.
    #[default]
    Sequential,

    /// Stories run concurrently, so the primary sink is fed by replaying a
    /// [`DeferredQueue`] of the whole story under its lock.
    Concurrent,
}

impl ConcurrencyMode {
    /// Indicates whether this is [`ConcurrencyMode::Concurrent`].
    #[must_use]
    pub const fn is_concurrent(self) -> bool {
        matches!(self, Self::Concurrent)
    }
}

impl From<bool> for ConcurrencyMode {
    fn from(concurrent: bool) -> Self {
        if concurrent {
            Self::Concurrent
        } else {
            Self::Sequential
        }
    }
}

/// State of a [`Multiplexer`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum State {
    /// No events handled yet.
    #[default]
    Idle,

    /// Events are being handled.
    Active,

    /// Primary sink received everything handled so far.
    Replayed,
}

/// Fan-out Multiplexer owned by the thread running a single story.
///
/// Every handled [`LifecycleEvent`] is:
/// 1. tracked into the report hierarchy, classifying step results;
/// 2. forwarded to the secondary [`EventSink`];
/// 3. forwarded to the [`Shared`] primary [`EventSink`] inline in
///    [`ConcurrencyMode::Sequential`], or recorded into a [`DeferredQueue`] in
///    [`ConcurrencyMode::Concurrent`].
///
/// Events handled after [`Multiplexer::replay()`] are still forwarded to the
/// secondary [`EventSink`], and in [`ConcurrencyMode::Concurrent`] are
/// recorded into a new batch, needing another [`Multiplexer::replay()`].
#[derive(Debug)]
pub struct Multiplexer<P, S = Discard, R = Memory> {
    /// Primary [`EventSink`] shared between stories.
    primary: Shared<P>,

    /// Secondary [`EventSink`] called synchronously.
    secondary: S,

    /// Tracker of the report nodes.
    tracker: Tracker<R>,

    /// Classifier of the step results.
    classifier: Classifier,

    /// Way the primary sink is fed.
    mode: ConcurrencyMode,

    /// Indicates whether the end of a non-given story triggers
    /// [`Multiplexer::replay()`].
    replay_on_story_end: bool,

    /// Calls deferred for the primary sink.
    queue: DeferredQueue,

    /// Current [`State`].
    state: State,
}

impl<P> Multiplexer<P> {
    /// Starts building a [`Multiplexer`] feeding the given `primary` sink.
    #[must_use]
    pub fn builder(primary: Shared<P>) -> Builder<P> {
        Builder::new(primary)
    }
}

impl<P, S, R> Multiplexer<P, S, R>
where
    P: EventSink,
    S: EventSink,
    R: ReportWriter,
{
    /// Creates a new [`Multiplexer`] without screenshots, replaying at the end
    /// of a story in [`ConcurrencyMode::Concurrent`].
    #[must_use]
    pub fn new(
        primary: Shared<P>,
        secondary: S,
        report: R,
        mode: ConcurrencyMode,
    ) -> Self {
        Builder::new(primary)
            .secondary(secondary)
            .report(report)
            .mode(mode)
            .build()
    }

    /// Handles the given [`LifecycleEvent`].
    ///
    /// # Errors
    ///
    /// - If the report writer fails;
    /// - If the secondary or inline primary sink fails;
    /// - If the replay triggered by the end of the story fails.
    pub fn handle(&mut self, event: LifecycleEvent) -> Result<()> {
        if self.state == State::Replayed && self.mode.is_concurrent() {
            tracing::warn!(
                kind = %event.kind(),
                "event after replay, recording it into a new batch"
            );
        }
        self.state = State::Active;

        self.track(&event)?;
        self.secondary.handle_event(&event)?;

        let ends_story = event.ends_story();
        match self.mode {
            ConcurrencyMode::Sequential => self.primary.handle_event(&event)?,
            ConcurrencyMode::Concurrent => {
                tracing::debug!(kind = %event.kind(), "recording deferred call");
                self.queue.record(event);
            }
        }

        if ends_story && self.replay_on_story_end {
            let _ = self.replay()?;
        }
        Ok(())
    }

    fn track(&mut self, event: &LifecycleEvent) -> Result<()> {
        match event {
            LifecycleEvent::StoryStart { story, .. } => {
                let _ = self.tracker.story_started(&story.name)?;
            }
            LifecycleEvent::ScenarioStart { title } => {
                let _ = self.tracker.scenario_started(title)?;
            }
            LifecycleEvent::ScenarioEnd => self.tracker.scenario_finished()?,
            LifecycleEvent::StoryEnd { .. } => self.tracker.story_finished()?,
            ev => {
                if let Some((step, result)) = StepResult::of(ev) {
                    let outcome = self.classifier.classify(step, result);
                    self.tracker.step_finished(&outcome)?;
                }
            }
        }
        Ok(())
    }

    /// Delivers the deferred calls to the primary sink at once, holding its
    /// lock.
    ///
    /// Returns the number of delivered calls, which is always `0` in
    /// [`ConcurrencyMode::Sequential`] and for an already replayed batch.
    ///
    /// # Errors
    ///
    /// If a deferred call fails. Calls before it took effect, while it and the
    /// later ones are retried by the next [`Multiplexer::replay()`].
    pub fn replay(&mut self) -> Result<usize> {
        let delivered = if self.mode.is_concurrent() {
            self.queue.replay(&self.primary)?
        } else {
            0
        };
        self.state = State::Replayed;
        Ok(delivered)
    }
}

impl<P, S, R> Multiplexer<P, S, R> {
    /// Returns the current [`State`].
    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    /// Returns the [`ConcurrencyMode`].
    #[must_use]
    pub const fn mode(&self) -> ConcurrencyMode {
        self.mode
    }

    /// Indicates whether the primary sink received everything handled so
    /// far.
    #[must_use]
    pub fn is_replayed(&self) -> bool {
        self.state == State::Replayed
    }

    /// Returns the number of calls waiting for [`Multiplexer::replay()`].
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Returns the primary sink.
    #[must_use]
    pub const fn primary(&self) -> &Shared<P> {
        &self.primary
    }

    /// Returns the secondary sink.
    #[must_use]
    pub const fn secondary(&self) -> &S {
        &self.secondary
    }

    /// Returns the report hierarchy [`Tracker`].
    #[must_use]
    pub const fn tracker(&self) -> &Tracker<R> {
        &self.tracker
    }

    /// Returns the report written into.
    #[must_use]
    pub const fn report(&self) -> &R {
        self.tracker.report()
    }
}

impl<P, S, R> Drop for Multiplexer<P, S, R> {
    fn drop(&mut self) {
        if !self.queue.is_empty() {
            tracing::warn!(
                pending = self.queue.len(),
                "multiplexer dropped with deferred calls never replayed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{io, path::Path};

    use super::*;
    use crate::{
        error::ReportError,
        event::Cause,
        report::{Level, NodeId},
        sink::{Recorder, SinkExt as _},
        Error, EventKind,
    };

    fn story() -> Vec<LifecycleEvent> {
        vec![
            LifecycleEvent::story_started("Checkout"),
            LifecycleEvent::scenario_started("pay"),
            LifecycleEvent::StepStart {
                step: "Given a cart".into(),
            },
            LifecycleEvent::step_passed("Given a cart"),
            LifecycleEvent::step_failed("Then paid", Cause::new("Error", "declined")),
            LifecycleEvent::ScenarioEnd,
            LifecycleEvent::story_finished(),
        ]
    }

    #[test]
    fn state_transitions() {
        let primary = Recorder::new().shared();
        let mut mux = Multiplexer::builder(primary)
            .mode(ConcurrencyMode::Concurrent)
            .replay_on_story_end(false)
            .build();
        assert_eq!(mux.state(), State::Idle);

        mux.handle(LifecycleEvent::DryRun).unwrap();
        assert_eq!(mux.state(), State::Active);
        assert_eq!(mux.pending(), 1);

        assert_eq!(mux.replay().unwrap(), 1);
        assert!(mux.is_replayed());
        assert_eq!(mux.pending(), 0);
    }

    #[test]
    fn sequential_replay_is_noop() {
        let primary = Recorder::new().shared();
        let mut mux = Multiplexer::builder(primary.clone()).build();

        for ev in story() {
            mux.handle(ev).unwrap();
        }
        assert_eq!(primary.lock().unwrap().len(), 7);

        assert_eq!(mux.replay().unwrap(), 0);
        assert!(mux.is_replayed());
        assert_eq!(primary.lock().unwrap().len(), 7);
    }

    #[test]
    fn tracks_report_hierarchy() {
        let primary = Recorder::new().shared();
        let mut mux = Multiplexer::builder(primary).build();

        for ev in story() {
            mux.handle(ev).unwrap();
        }

        let report = mux.report();
        let story = report.roots().next().unwrap();
        assert_eq!(story.label, "Checkout");
        let scenario = report.children(story.id).next().unwrap();
        let levels = scenario.log.iter().map(|e| e.level).collect::<Vec<_>>();
        assert_eq!(levels, [Level::Pass, Level::Fail]);
        assert!(scenario.log[1].message.contains("Error: declined"));
        assert!(report.is_closed());
    }

    #[test]
    fn story_end_replays_automatically() {
        let primary = Recorder::new().shared();
        let mut mux = Multiplexer::builder(primary.clone())
            .mode(ConcurrencyMode::Concurrent)
            .build();

        for ev in story() {
            mux.handle(ev).unwrap();
        }

        assert!(mux.is_replayed());
        assert_eq!(primary.lock().unwrap().events(), story());
    }

    #[test]
    fn given_story_end_does_not_replay() {
        let primary = Recorder::new().shared();
        let mut mux = Multiplexer::builder(primary.clone())
            .mode(ConcurrencyMode::Concurrent)
            .build();

        mux.handle(LifecycleEvent::story_started("Outer")).unwrap();
        mux.handle(LifecycleEvent::story_started("Given")).unwrap();
        mux.handle(LifecycleEvent::StoryEnd { given_story: true })
            .unwrap();

        assert!(!mux.is_replayed());
        assert!(primary.lock().unwrap().is_empty());
        assert_eq!(mux.pending(), 3);
        let _ = mux.replay().unwrap();
    }

    #[test]
    fn late_event_needs_another_replay() {
        let primary = Recorder::new().shared();
        let secondary = Recorder::new().shared();
        let mut mux = Multiplexer::builder(primary.clone())
            .secondary(secondary.clone())
            .mode(ConcurrencyMode::Concurrent)
            .build();

        for ev in story() {
            mux.handle(ev).unwrap();
        }
        mux.handle(LifecycleEvent::PendingMethods(vec!["pay()".into()]))
            .unwrap();

        assert_eq!(mux.state(), State::Active);
        assert_eq!(mux.pending(), 1);
        assert_eq!(secondary.lock().unwrap().len(), 8);
        assert_eq!(primary.lock().unwrap().len(), 7);

        assert_eq!(mux.replay().unwrap(), 1);
        assert_eq!(
            primary.lock().unwrap().kinds().last(),
            Some(&EventKind::PendingMethods),
        );
    }

    /// [`ReportWriter`] refusing new nodes.
    #[derive(Debug)]
    struct Full;

    impl ReportWriter for Full {
        fn start_node(&mut self, _: &str) -> Result<NodeId, ReportError> {
            Err(ReportError::Io(io::ErrorKind::Other.into()))
        }

        fn append_child(&mut self, _: NodeId, _: NodeId) -> Result<(), ReportError> {
            Ok(())
        }

        fn log(&mut self, _: NodeId, _: Level, _: &str) -> Result<(), ReportError> {
            Ok(())
        }

        fn add_screen_capture(
            &mut self,
            _: NodeId,
            _: &Path,
        ) -> Result<String, ReportError> {
            Ok(String::new())
        }

        fn end_node(&mut self, _: NodeId) -> Result<(), ReportError> {
            Ok(())
        }

        fn flush(&mut self) -> Result<(), ReportError> {
            Ok(())
        }

        fn close(&mut self) -> Result<(), ReportError> {
            Ok(())
        }
    }

    #[test]
    fn report_errors_stop_fan_out() {
        let primary = Recorder::new().shared();
        let secondary = Recorder::new().shared();
        let mut mux = Multiplexer::builder(primary.clone())
            .secondary(secondary.clone())
            .report(Full)
            .build();

        let err = mux.handle(LifecycleEvent::story_started("S")).unwrap_err();

        assert!(matches!(err, Error::Report(ReportError::Io(_))));
        assert!(secondary.lock().unwrap().is_empty());
        assert!(primary.lock().unwrap().is_empty());
    }
}
