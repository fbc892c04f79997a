// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error types of the reporting layer.
//!
//! - [`sink`] - errors raised by an [`EventSink`] while accepting an event.
//! - [`report`] - errors raised by a [`ReportWriter`].
//! - [`replay`] - failure of a single call inside a deferred replay batch.
//!
//! [`EventSink`]: crate::EventSink
//! [`ReportWriter`]: crate::ReportWriter

pub mod replay;
pub mod report;
pub mod sink;

use derive_more::with_trait::{Display, Error as StdError};

pub use self::{replay::ReplayError, report::ReportError, sink::SinkError};

/// Top-level error of handling a [`LifecycleEvent`].
///
/// [`LifecycleEvent`]: crate::LifecycleEvent
#[derive(Debug, Display, StdError)]
pub enum Error {
    /// Secondary or inline primary sink rejected an event.
    #[display("Sink delivery failed: {_0}")]
    Sink(SinkError),

    /// Report artifact writer failed.
    #[display("Report writer failed: {_0}")]
    Report(ReportError),

    /// Deferred replay into the primary sink failed part-way.
    #[display("Deferred replay failed: {_0}")]
    Replay(ReplayError),
}

/// Result type alias with the top-level [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<SinkError> for Error {
    fn from(err: SinkError) -> Self {
        Self::Sink(err)
    }
}

impl From<ReportError> for Error {
    fn from(err: ReportError) -> Self {
        Self::Report(err)
    }
}

impl From<ReplayError> for Error {
    fn from(err: ReplayError) -> Self {
        Self::Replay(err)
    }
}

impl Error {
    /// Returns `true` if this is a [`Error::Replay`].
    #[must_use]
    pub const fn is_replay(&self) -> bool {
        matches!(self, Self::Replay(_))
    }
}

#[cfg(test)]
mod tests {
    use std::{error::Error as _, io};

    use super::*;
    use crate::report::NodeId;

    #[test]
    fn conversions_keep_source_chain() {
        let err: Error =
            SinkError::Io(io::Error::new(io::ErrorKind::Other, "disk full"))
                .into();
        assert!(matches!(err, Error::Sink(_)));

        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("I/O error: disk full"));
    }

    #[test]
    fn replay_error_mentions_index() {
        let err: Error = ReplayError {
            index: 3,
            source: SinkError::unavailable("closed"),
        }
        .into();

        assert!(err.is_replay());
        assert!(err.to_string().contains("#3"));
        assert!(err.to_string().contains("Output unavailable: closed"));
    }

    #[test]
    fn report_error_display() {
        let err: Error = ReportError::Sealed(NodeId::new(2)).into();
        assert_eq!(
            err.to_string(),
            "Report writer failed: Report node #2 is already ended",
        );
    }
}
