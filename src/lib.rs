// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reporting layer sitting between a BDD story runner and its report sinks.
//!
//! A story runner emits [`LifecycleEvent`]s (story → scenario → step). Each
//! story is observed by its own [`Multiplexer`], which:
//! - tracks the story/scenario [`report`] nodes via a [`hierarchy::Tracker`];
//! - turns step results into report log levels via the [`classify`] rules;
//! - forwards every event to a secondary [`EventSink`] synchronously;
//! - forwards every event to a [`sink::Shared`] primary sink either inline
//!   ([`ConcurrencyMode::Sequential`]) or through a [`DeferredQueue`], which
//!   is replayed in emission order under the primary sink's lock
//!   ([`ConcurrencyMode::Concurrent`]).
//!
//! ```rust
//! use story_report::{
//!     event::Story, sink, ConcurrencyMode, LifecycleEvent, Multiplexer,
//!     SinkExt as _,
//! };
//!
//! # fn main() -> story_report::Result<()> {
//! let primary = sink::Recorder::default().shared();
//! let mut mux = Multiplexer::builder(primary.clone())
//!     .mode(ConcurrencyMode::Concurrent)
//!     .build();
//!
//! mux.handle(LifecycleEvent::StoryStart {
//!     story: Story::new("Login", "stories/login.story"),
//!     given_story: false,
//! })?;
//! mux.handle(LifecycleEvent::StoryEnd { given_story: false })?;
//!
//! assert_eq!(primary.lock()?.len(), 2);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(non_ascii_idents, unsafe_code)]
#![warn(
    clippy::pedantic,
    clippy::unwrap_used,
    missing_debug_implementations,
    missing_docs,
    unused_results
)]
#![allow(clippy::module_name_repetitions)]

pub mod classify;
pub mod cli;
pub mod error;
pub mod event;
pub mod hierarchy;
pub mod logging;
pub mod multiplexer;
pub mod queue;
pub mod report;
pub mod screenshot;
pub mod sink;

#[doc(inline)]
pub use self::{
    classify::{Classifier, Outcome, StepOutcome, StepResult},
    error::{Error, ReplayError, ReportError, Result, SinkError},
    event::{EventKind, LifecycleEvent},
    multiplexer::{Builder, ConcurrencyMode, Multiplexer, State},
    queue::{DeferredCall, DeferredQueue},
    report::{Level, ReportWriter},
    screenshot::ScreenshotCapture,
    sink::{EventSink, SinkExt},
};
