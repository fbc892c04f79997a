// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Passing events to multiple [`EventSink`]s one after another.

use crate::{error::SinkError, event::LifecycleEvent};

use super::EventSink;

/// Wrapper for passing events to multiple [`EventSink`]s.
///
/// The `left` [`EventSink`] always receives an event before the `right` one,
/// and an error of the `left` one stops the delivery.
#[derive(Clone, Debug, Default)]
pub struct Tee<L, R> {
    /// Left [`EventSink`].
    left: L,

    /// Right [`EventSink`].
    right: R,
}

impl<L, R> Tee<L, R> {
    /// Creates a new [`Tee`] [`EventSink`], which passes events both to the
    /// `left` and `right` [`EventSink`]s.
    #[must_use]
    pub const fn new(left: L, right: R) -> Self {
        Self { left, right }
    }

    /// Returns the left [`EventSink`].
    #[must_use]
    pub const fn left(&self) -> &L {
        &self.left
    }

    /// Returns the right [`EventSink`].
    #[must_use]
    pub const fn right(&self) -> &R {
        &self.right
    }

    /// Splits this [`Tee`] back into its `left` and `right` [`EventSink`]s.
    #[must_use]
    pub fn into_inner(self) -> (L, R) {
        (self.left, self.right)
    }
}

impl<L, R> EventSink for Tee<L, R>
where
    L: EventSink,
    R: EventSink,
{
    fn handle_event(&mut self, event: &LifecycleEvent) -> Result<(), SinkError> {
        self.left.handle_event(event)?;
        self.right.handle_event(event)
    }
}
