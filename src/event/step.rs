// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Step-level payloads.

use std::{error::Error as StdError, fmt};

/// Failure cause of a step, as reported by the runner.
///
/// Runners usually wrap the actual failure into their own one, so the
/// interesting failure is often [`Cause::inner()`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Cause {
    /// Runtime type name of the failure.
    pub type_name: String,

    /// Failure message.
    pub message: String,

    /// Stack frames, innermost first, one line each.
    pub frames: Vec<String>,

    /// Failure this one was caused by.
    pub cause: Option<Box<Cause>>,
}

impl Cause {
    /// Creates a new [`Cause`] without stack frames.
    #[must_use]
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            frames: Vec::new(),
            cause: None,
        }
    }

    /// Sets stack frames of this [`Cause`].
    #[must_use]
    pub fn with_frames<I>(mut self, frames: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.frames = frames.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the [`Cause`] this one was caused by.
    #[must_use]
    pub fn caused_by(mut self, inner: Self) -> Self {
        self.cause = Some(Box::new(inner));
        self
    }

    /// Returns the immediate [`Cause`] of this one.
    #[must_use]
    pub fn inner(&self) -> Option<&Self> {
        self.cause.as_deref()
    }

    /// Iterates over this [`Cause`] and all the nested ones, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &Self> {
        std::iter::successors(Some(self), |c| c.inner())
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.type_name)
        } else {
            write!(f, "{}: {}", self.type_name, self.message)
        }
    }
}

impl StdError for Cause {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_deref().map(|c| c as &(dyn StdError + 'static))
    }
}

/// Results of verifying a step's expected outcomes.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OutcomesTable {
    /// Verified outcomes.
    pub outcomes: Vec<VerifiedOutcome>,
}

impl OutcomesTable {
    /// Returns the outcomes, which weren't verified.
    pub fn failures(&self) -> impl Iterator<Item = &VerifiedOutcome> {
        self.outcomes.iter().filter(|o| !o.verified)
    }
}

/// Single verified outcome.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VerifiedOutcome {
    /// Description of the outcome.
    pub description: String,

    /// Whether the outcome was verified successfully.
    pub verified: bool,
}
