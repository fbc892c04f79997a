// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Diagnostics of the reporting layer.
//!
//! Everything is emitted through [`tracing`]; this module only installs a
//! subscriber for runners not having their own.

use tracing_subscriber::EnvFilter;

/// Installs a global [`tracing_subscriber::fmt`] subscriber filtered by the
/// `RUST_LOG` environment variable, or by the given `directive` if it's not
/// set or invalid.
///
/// Returns `false` if a global subscriber was already installed, leaving it
/// intact.
pub fn init(directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
