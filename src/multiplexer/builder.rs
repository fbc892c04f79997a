// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Multiplexer`] builder.

use crate::{
    classify::Classifier,
    cli::Opts,
    hierarchy::Tracker,
    queue::DeferredQueue,
    report::Memory,
    screenshot::ScreenshotCapture,
    sink::{Discard, Shared},
};

use super::{ConcurrencyMode, Multiplexer, State};

/// Builder of a [`Multiplexer`].
///
/// Defaults to a [`Discard`] secondary sink, an in-[`Memory`] report, no
/// screenshots, [`ConcurrencyMode::Sequential`] and replaying at the end of a
/// story.
#[derive(Debug)]
pub struct Builder<P, S = Discard, R = Memory> {
    /// Primary sink shared between stories.
    primary: Shared<P>,

    /// Secondary sink.
    secondary: S,

    /// Report to track the hierarchy into.
    report: R,

    /// Classifier of the step results.
    classifier: Classifier,

    /// Way the primary sink is fed.
    mode: ConcurrencyMode,

    /// Whether the end of a story triggers a replay.
    replay_on_story_end: bool,
}

impl<P> Builder<P> {
    /// Creates a new [`Builder`] feeding the given `primary` sink.
    #[must_use]
    pub fn new(primary: Shared<P>) -> Self {
        Self {
            primary,
            secondary: Discard,
            report: Memory::new(),
            classifier: Classifier::new(),
            mode: ConcurrencyMode::default(),
            replay_on_story_end: true,
        }
    }
}

impl<P, S, R> Builder<P, S, R> {
    /// Sets the secondary sink, called synchronously on every event.
    #[must_use]
    pub fn secondary<Sec>(self, secondary: Sec) -> Builder<P, Sec, R> {
        Builder {
            primary: self.primary,
            secondary,
            report: self.report,
            classifier: self.classifier,
            mode: self.mode,
            replay_on_story_end: self.replay_on_story_end,
        }
    }

    /// Sets the report to track the story hierarchy into.
    #[must_use]
    pub fn report<Rep>(self, report: Rep) -> Builder<P, S, Rep> {
        Builder {
            primary: self.primary,
            secondary: self.secondary,
            report,
            classifier: self.classifier,
            mode: self.mode,
            replay_on_story_end: self.replay_on_story_end,
        }
    }

    /// Sets the [`ConcurrencyMode`].
    #[must_use]
    pub fn mode(mut self, mode: ConcurrencyMode) -> Self {
        self.mode = mode;
        self
    }

    /// Shortcut for [`Builder::mode()`] with [`ConcurrencyMode::Concurrent`].
    #[must_use]
    pub fn concurrent(self) -> Self {
        self.mode(ConcurrencyMode::Concurrent)
    }

    /// Sets whether the end of a non-given story triggers
    /// [`Multiplexer::replay()`].
    #[must_use]
    pub fn replay_on_story_end(mut self, enabled: bool) -> Self {
        self.replay_on_story_end = enabled;
        self
    }

    /// Sets the [`ScreenshotCapture`] used on step failures.
    #[must_use]
    pub fn screenshots<C>(mut self, capture: C) -> Self
    where
        C: ScreenshotCapture + Send + 'static,
    {
        self.classifier = Classifier::with_screenshots(capture);
        self
    }

    /// Applies the given CLI [`Opts`].
    #[must_use]
    pub fn opts(self, opts: &Opts) -> Self {
        self.mode(opts.mode())
            .replay_on_story_end(opts.replay_on_story_end())
    }

    /// Builds the [`Multiplexer`].
    #[must_use]
    pub fn build(self) -> Multiplexer<P, S, R> {
        Multiplexer {
            primary: self.primary,
            secondary: self.secondary,
            tracker: Tracker::new(self.report),
            classifier: self.classifier,
            mode: self.mode,
            replay_on_story_end: self.replay_on_story_end,
            queue: DeferredQueue::new(),
            state: State::Idle,
        }
    }
}
