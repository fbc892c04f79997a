// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Destinations of [`LifecycleEvent`]s.

#[cfg(feature = "output-json")]
pub mod cross_reference;
pub mod discard;
pub mod ext;
pub mod log;
pub mod recorder;
pub mod shared;
pub mod tee;
pub mod text;

use crate::{error::SinkError, event::LifecycleEvent};

#[cfg(feature = "output-json")]
#[doc(inline)]
pub use self::cross_reference::CrossReference;
#[doc(inline)]
pub use self::{
    discard::Discard,
    ext::SinkExt,
    log::Log,
    recorder::Recorder,
    shared::Shared,
    tee::Tee,
    text::{Coloring, Styles, Text},
};

/// Destination of [`LifecycleEvent`]s emitted by a story runner.
///
/// Events arrive in emission order of a single story. Sinks living behind a
/// [`Shared`] handle may additionally receive whole batches of several
/// stories, one story after another.
pub trait EventSink {
    /// Handles the given [`LifecycleEvent`].
    ///
    /// # Errors
    ///
    /// If the event cannot be delivered to the underlying output.
    fn handle_event(&mut self, event: &LifecycleEvent) -> Result<(), SinkError>;
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn handle_event(&mut self, event: &LifecycleEvent) -> Result<(), SinkError> {
        (**self).handle_event(event)
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn handle_event(&mut self, event: &LifecycleEvent) -> Result<(), SinkError> {
        (**self).handle_event(event)
    }
}
