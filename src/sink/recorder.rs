// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`EventSink`] keeping everything it receives.

use crate::{
    error::SinkError,
    event::{EventKind, LifecycleEvent},
};

use super::EventSink;

/// [`EventSink`] storing received events in their arrival order.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    /// Received events.
    events: Vec<LifecycleEvent>,
}

impl Recorder {
    /// Creates a new empty [`Recorder`].
    #[must_use]
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Returns the received events.
    #[must_use]
    pub fn events(&self) -> &[LifecycleEvent] {
        &self.events
    }

    /// Returns the [`EventKind`]s of the received events.
    #[must_use]
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.iter().map(LifecycleEvent::kind).collect()
    }

    /// Returns the number of the received events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Indicates whether nothing has been received yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for Recorder {
    fn handle_event(&mut self, event: &LifecycleEvent) -> Result<(), SinkError> {
        self.events.push(event.clone());
        Ok(())
    }
}
