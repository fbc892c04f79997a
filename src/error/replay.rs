// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Failure of a deferred replay batch.

use derive_more::with_trait::{Display, Error};

use super::SinkError;

/// One [`DeferredCall`] failed while replaying a batch.
///
/// Calls before [`ReplayError::index`] already took effect on the target sink
/// and are not rolled back. The failed call and all the later ones stay in the
/// [`DeferredQueue`].
///
/// [`DeferredCall`]: crate::DeferredCall
/// [`DeferredQueue`]: crate::DeferredQueue
#[derive(Debug, Display, Error)]
#[display("deferred call #{index} failed: {source}")]
pub struct ReplayError {
    /// Position of the failed call within the replayed batch.
    pub index: usize,

    /// Error raised by the target sink.
    pub source: SinkError,
}
