// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`EventSink`] emitting [`tracing`] events.

use crate::{error::SinkError, event::LifecycleEvent as Ev};

use super::EventSink;

/// Target of the [`tracing`] events emitted by the [`Log`] sink.
pub const TARGET: &str = "story_report::events";

/// [`EventSink`] turning every received event into a [`tracing`] event with
/// the [`TARGET`].
///
/// Story and scenario boundaries are emitted on the `INFO` level, failures on
/// the `WARN` level, and everything else on the `DEBUG` level.
#[derive(Clone, Copy, Debug, Default)]
pub struct Log;

impl EventSink for Log {
    fn handle_event(&mut self, event: &Ev) -> Result<(), SinkError> {
        let kind = event.kind();
        match event {
            Ev::StoryStart { story, given_story } => tracing::info!(
                target: TARGET,
                %kind,
                story = %story.name,
                path = %story.path,
                given_story
            ),
            Ev::StoryEnd { given_story } => {
                tracing::info!(target: TARGET, %kind, given_story);
            }
            Ev::ScenarioStart { title } => {
                tracing::info!(target: TARGET, %kind, scenario = %title);
            }
            Ev::StepFailed { step, cause } => tracing::warn!(
                target: TARGET,
                %kind,
                step = %step,
                %cause
            ),
            Ev::StoryCancelled { story, duration } => tracing::warn!(
                target: TARGET,
                %kind,
                story = %story.name,
                elapsed = ?duration.elapsed,
                timeout = ?duration.timeout
            ),
            Ev::RestartedStory { story, cause } => tracing::warn!(
                target: TARGET,
                %kind,
                story = %story.name,
                %cause
            ),
            Ev::Restarted { step, cause } => tracing::warn!(
                target: TARGET,
                %kind,
                step = %step,
                %cause
            ),
            Ev::FailedOutcomes { step, table } => tracing::warn!(
                target: TARGET,
                %kind,
                step = %step,
                failures = table.failures().count()
            ),
            ev => match ev.step() {
                Some(step) => {
                    tracing::debug!(target: TARGET, %kind, step = %step);
                }
                None => tracing::debug!(target: TARGET, %kind),
            },
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use super::*;
    use crate::event::Cause;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn lines(events: &[Ev]) -> Vec<String> {
        let buf = Buffer::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .without_time()
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            for ev in events {
                Log.handle_event(ev).unwrap();
            }
        });

        let out = buf.0.lock().unwrap();
        let lines =
            String::from_utf8_lossy(&out).lines().map(str::to_owned).collect();
        lines
    }

    #[test]
    fn levels_follow_event_kinds() {
        let out = lines(&[
            Ev::story_started("Checkout"),
            Ev::step_passed("Given a cart"),
            Ev::step_failed("Then paid", Cause::new("Error", "declined")),
            Ev::DryRun,
        ]);

        assert_eq!(out.len(), 4);
        assert!(out[0].contains("INFO story_report::events: kind=StoryStart"));
        assert!(out[0].contains("story=Checkout"));
        assert!(out[1].contains("DEBUG story_report::events: kind=StepSuccess"));
        assert!(out[1].contains("step=Given a cart"));
        assert!(out[2].contains("WARN story_report::events: kind=StepFailed"));
        assert!(out[2].contains("cause=Error: declined"));
        assert!(out[3].ends_with("kind=DryRun"));
    }

    #[test]
    fn finished_story_is_info() {
        let out = lines(&[Ev::StoryEnd { given_story: true }]);

        assert_eq!(out.len(), 1);
        assert!(out[0].contains("INFO"));
        assert!(out[0].ends_with("kind=StoryEnd given_story=true"));
    }
}
