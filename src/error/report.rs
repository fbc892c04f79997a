// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors of a [`ReportWriter`].
//!
//! [`ReportWriter`]: crate::ReportWriter

use std::io;

use derive_more::with_trait::{Display, Error};

use crate::report::NodeId;

/// Error raised by a [`ReportWriter`].
///
/// [`ReportWriter`]: crate::ReportWriter
#[derive(Debug, Display, Error)]
pub enum ReportError {
    /// I/O error while persisting the report artifact.
    #[display("I/O error: {_0}")]
    Io(io::Error),

    /// Failed to serialize the report artifact.
    #[cfg(feature = "output-json")]
    #[display("Serialization failed: {_0}")]
    Serialization(serde_json::Error),

    /// Node isn't known to this writer.
    #[display("Unknown report node #{_0}")]
    UnknownNode(#[error(not(source))] NodeId),

    /// Node has been ended and cannot be mutated anymore.
    #[display("Report node #{_0} is already ended")]
    Sealed(#[error(not(source))] NodeId),

    /// Node is already attached to another parent.
    #[display("Report node #{_0} already has a parent")]
    Attached(#[error(not(source))] NodeId),

    /// Writer has been closed and accepts no more nodes or entries.
    #[display("Report is already closed")]
    Closed,

    /// Lock of a shared report writer was poisoned by a panicking holder.
    #[display("Shared report lock is poisoned")]
    Poisoned,
}

impl From<io::Error> for ReportError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(feature = "output-json")]
impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err)
    }
}
