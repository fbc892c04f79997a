// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors of delivering an event into an [`EventSink`].
//!
//! [`EventSink`]: crate::EventSink

use std::{fmt, io};

use derive_more::with_trait::{Display, Error};

/// Error raised by an [`EventSink`].
///
/// [`EventSink`]: crate::EventSink
#[derive(Debug, Display, Error)]
pub enum SinkError {
    /// I/O error while writing the output.
    #[display("I/O error: {_0}")]
    Io(io::Error),

    /// Output formatting error.
    #[display("Format error: {_0}")]
    Format(fmt::Error),

    /// Failed to serialize output.
    #[cfg(feature = "output-json")]
    #[display("Serialization failed: {_0}")]
    Serialization(serde_json::Error),

    /// Sink cannot accept events anymore.
    #[display("Output unavailable: {reason}")]
    Unavailable {
        /// Reason why the output is unavailable.
        #[error(not(source))]
        reason: String,
    },

    /// Lock of a [`Shared`] sink was poisoned by a panicking holder.
    ///
    /// [`Shared`]: crate::sink::Shared
    #[display("Shared sink lock is poisoned")]
    Poisoned,

    /// Sink-specific failure.
    #[display("{_0}")]
    Custom(#[error(not(source))] String),
}

impl SinkError {
    /// Creates a new [`SinkError::Unavailable`].
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Creates a new [`SinkError::Custom`].
    #[must_use]
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Returns `true` if this is an I/O error.
    #[must_use]
    pub const fn is_io_error(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

impl From<io::Error> for SinkError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<fmt::Error> for SinkError {
    fn from(err: fmt::Error) -> Self {
        Self::Format(err)
    }
}

#[cfg(feature = "output-json")]
impl From<serde_json::Error> for SinkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err)
    }
}
