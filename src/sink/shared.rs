// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`EventSink`] fed by several stories at once.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::{error::SinkError, event::LifecycleEvent};

use super::EventSink;

/// Cloneable handle to a single [`EventSink`] fed by several stories.
///
/// [`Shared::lock()`] serializes the access, so a holder of the guard may
/// deliver a whole batch of events without interleaving with other holders.
#[derive(Debug, Default)]
pub struct Shared<S>(Arc<Mutex<S>>);

// Implemented manually to omit redundant `S: Clone` trait bound, imposed by
// `#[derive(Clone)]`.
impl<S> Clone for Shared<S> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<S> Shared<S> {
    /// Wraps the given [`EventSink`] into a [`Shared`] one.
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self(Arc::new(Mutex::new(sink)))
    }

    /// Locks the inner [`EventSink`] exclusively.
    ///
    /// # Errors
    ///
    /// If the lock is poisoned.
    pub fn lock(&self) -> Result<MutexGuard<'_, S>, SinkError> {
        self.0.lock().map_err(|_| SinkError::Poisoned)
    }

    /// Indicates whether both handles point to the same [`EventSink`].
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<S: EventSink> EventSink for Shared<S> {
    fn handle_event(&mut self, event: &LifecycleEvent) -> Result<(), SinkError> {
        self.lock()?.handle_event(event)
    }
}
