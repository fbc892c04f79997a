// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Helper type-level glue for [`EventSink`]s.

use sealed::sealed;

use super::{EventSink, Shared, Tee};

/// Extension of [`EventSink`] allowing its composition through a fluent
/// interface.
#[sealed]
pub trait SinkExt: EventSink + Sized {
    /// Wraps this [`EventSink`] into a [`Tee`], passing events to the `other`
    /// [`EventSink`] right after this one.
    #[must_use]
    fn tee<R: EventSink>(self, other: R) -> Tee<Self, R>;

    /// Wraps this [`EventSink`] into a [`Shared`] one, to be fed by several
    /// stories at once.
    #[must_use]
    fn shared(self) -> Shared<Self>;
}

#[sealed]
impl<S: EventSink> SinkExt for S {
    fn tee<R: EventSink>(self, other: R) -> Tee<Self, R> {
        Tee::new(self, other)
    }

    fn shared(self) -> Shared<Self> {
        Shared::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        event::LifecycleEvent,
        sink::{Discard, Recorder},
    };

    #[test]
    fn composes_fluently() {
        let shared = Discard.tee(Recorder::new()).shared();

        let mut sink = shared.clone();
        sink.handle_event(&LifecycleEvent::DryRun).unwrap();

        assert_eq!(shared.lock().unwrap().right().len(), 1);
    }
}
