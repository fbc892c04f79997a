// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Deferred Invocation Queue.

use derive_more::with_trait::{Deref, From};

use crate::{
    error::{ReplayError, SinkError},
    event::{EventKind, LifecycleEvent},
    sink::{EventSink, Shared},
};

/// Recorded sink call, replayed later with its event.
#[derive(Clone, Debug, Deref, From, PartialEq)]
pub struct DeferredCall(LifecycleEvent);

impl DeferredCall {
    /// Returns the [`EventKind`] of the recorded call.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        self.0.kind()
    }

    /// Returns the recorded [`LifecycleEvent`].
    #[must_use]
    pub const fn event(&self) -> &LifecycleEvent {
        &self.0
    }

    /// Delivers the recorded [`LifecycleEvent`] to the given `sink`.
    ///
    /// # Errors
    ///
    /// If the `sink` fails to handle it.
    pub fn deliver<S>(&self, sink: &mut S) -> Result<(), SinkError>
    where
        S: EventSink + ?Sized,
    {
        sink.handle_event(&self.0)
    }
}

/// Ordered batch of [`DeferredCall`]s of a single story.
///
/// Replaying delivers the whole batch to a [`Shared`] sink while holding its
/// lock, so batches of different stories never interleave. A successfully
/// replayed batch isn't delivered again; recording after it starts a new
/// batch.
#[derive(Clone, Debug, Default)]
pub struct DeferredQueue {
    /// Calls not delivered yet, in recording order.
    calls: Vec<DeferredCall>,

    /// Indicates whether the current batch has been replayed.
    invoked: bool,
}

impl DeferredQueue {
    /// Creates a new empty [`DeferredQueue`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            calls: Vec::new(),
            invoked: false,
        }
    }

    /// Appends a call with the given [`LifecycleEvent`] to the batch.
    pub fn record(&mut self, event: LifecycleEvent) {
        self.invoked = false;
        self.calls.push(event.into());
    }

    /// Replays the recorded calls in order into the given `target`, holding
    /// its lock for the whole batch.
    ///
    /// Returns the number of delivered calls, which is `0` for an already
    /// replayed batch.
    ///
    /// # Errors
    ///
    /// If the lock is poisoned, or a call fails. Calls before the failed one
    /// took effect and are removed from the queue, while the failed call is
    /// retried by the next [`DeferredQueue::replay()`].
    pub fn replay<S: EventSink>(
        &mut self,
        target: &Shared<S>,
    ) -> Result<usize, ReplayError> {
        if self.invoked {
            return Ok(0);
        }

        let mut sink = target
            .lock()
            .map_err(|source| ReplayError { index: 0, source })?;

        let mut delivered = 0;
        let result: Result<(), ReplayError> = self.calls.iter().try_for_each(|call| {
            call.deliver(&mut *sink).map_err(|source| ReplayError {
                index: delivered,
                source,
            })?;
            delivered += 1;
            Ok(())
        });
        drop(sink);

        drop(self.calls.drain(..delivered));
        result?;
        self.invoked = true;
        tracing::debug!(delivered, "deferred calls replayed");
        Ok(delivered)
    }

    /// Indicates whether the current batch has been replayed.
    #[must_use]
    pub const fn is_invoked(&self) -> bool {
        self.invoked
    }

    /// Returns the recorded calls not delivered yet.
    #[must_use]
    pub fn calls(&self) -> &[DeferredCall] {
        &self.calls
    }

    /// Returns the number of calls not delivered yet.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Indicates whether there is nothing to deliver.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::Recorder;

    /// [`EventSink`] failing on the `n`th call once.
    #[derive(Default)]
    struct FailOnce {
        seen: Vec<EventKind>,
        fail_at: Option<usize>,
    }

    impl EventSink for FailOnce {
        fn handle_event(&mut self, ev: &LifecycleEvent) -> Result<(), SinkError> {
            if self.fail_at == Some(self.seen.len()) {
                self.fail_at = None;
                return Err(SinkError::unavailable("disk full"));
            }
            self.seen.push(ev.kind());
            Ok(())
        }
    }

    fn story() -> Vec<LifecycleEvent> {
        vec![
            LifecycleEvent::story_started("S"),
            LifecycleEvent::scenario_started("A"),
            LifecycleEvent::step_passed("Given x"),
            LifecycleEvent::ScenarioEnd,
            LifecycleEvent::story_finished(),
        ]
    }

    #[test]
    fn replays_in_recording_order() {
        let target = Shared::new(Recorder::new());
        let mut queue = DeferredQueue::new();
        for ev in story() {
            queue.record(ev);
        }
        assert_eq!(queue.len(), 5);
        assert!(target.lock().unwrap().is_empty());

        assert_eq!(queue.replay(&target).unwrap(), 5);

        assert_eq!(target.lock().unwrap().events(), story());
        assert!(queue.is_empty());
        assert!(queue.is_invoked());
    }

    #[test]
    fn second_replay_is_noop() {
        let target = Shared::new(Recorder::new());
        let mut queue = DeferredQueue::new();
        queue.record(LifecycleEvent::DryRun);

        assert_eq!(queue.replay(&target).unwrap(), 1);
        assert_eq!(queue.replay(&target).unwrap(), 0);
        assert_eq!(target.lock().unwrap().len(), 1);
    }

    #[test]
    fn empty_batch_replays_nothing() {
        let target = Shared::new(Recorder::new());
        let mut queue = DeferredQueue::new();

        assert_eq!(queue.replay(&target).unwrap(), 0);
        assert!(queue.is_invoked());
    }

    #[test]
    fn recording_after_replay_starts_new_batch() {
        let target = Shared::new(Recorder::new());
        let mut queue = DeferredQueue::new();
        queue.record(LifecycleEvent::DryRun);
        let _ = queue.replay(&target).unwrap();

        queue.record(LifecycleEvent::ExamplesEnd);
        assert!(!queue.is_invoked());
        assert_eq!(queue.replay(&target).unwrap(), 1);

        assert_eq!(
            target.lock().unwrap().kinds(),
            [EventKind::DryRun, EventKind::ExamplesEnd],
        );
    }

    #[test]
    fn failed_call_is_retried() {
        let target = Shared::new(FailOnce {
            fail_at: Some(2),
            ..FailOnce::default()
        });
        let mut queue = DeferredQueue::new();
        for ev in story() {
            queue.record(ev);
        }

        let err = queue.replay(&target).unwrap_err();
        assert_eq!(err.index, 2);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.calls()[0].kind(), EventKind::StepSuccess);
        assert!(!queue.is_invoked());

        assert_eq!(queue.replay(&target).unwrap(), 3);
        assert_eq!(
            target.lock().unwrap().seen,
            story().iter().map(LifecycleEvent::kind).collect::<Vec<_>>(),
        );
    }
}
