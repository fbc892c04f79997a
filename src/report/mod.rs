// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Human-readable report artifact, made of nested [`ReportNode`]s.
//!
//! A story maps to one top-level node, and each of its scenarios maps to one
//! child node. Nodes are appended to while steps run, and sealed by
//! [`ReportWriter::end_node()`].

mod layout;
mod memory;
mod node;
mod shared;

#[cfg(feature = "output-json")]
mod json;

use std::path::Path;

use crate::error::ReportError;

#[cfg(feature = "output-json")]
#[cfg_attr(docsrs, doc(cfg(feature = "output-json")))]
pub use self::json::JsonReport;
pub use self::{
    layout::Layout,
    memory::Memory,
    node::{Level, LogEntry, NodeId, ReportNode},
    shared::Shared,
};

/// Writer of a report artifact.
///
/// Implementations own the nodes: callers only hold [`NodeId`] handles.
pub trait ReportWriter {
    /// Starts a new detached node with the given `label`.
    ///
    /// # Errors
    ///
    /// If the underlying storage cannot accept a new node.
    fn start_node(&mut self, label: &str) -> Result<NodeId, ReportError>;

    /// Attaches the `child` node to the `parent` one, after its existing
    /// children.
    ///
    /// # Errors
    ///
    /// If any of the nodes is unknown, the `parent` is sealed, or the `child`
    /// is attached already.
    fn append_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
    ) -> Result<(), ReportError>;

    /// Appends an entry to the `node`'s log.
    ///
    /// # Errors
    ///
    /// If the `node` is unknown or sealed.
    fn log(
        &mut self,
        node: NodeId,
        level: Level,
        message: &str,
    ) -> Result<(), ReportError>;

    /// Registers a screenshot of the `node`, returning the markup referencing
    /// it, to be embedded into a log message.
    ///
    /// # Errors
    ///
    /// If the `node` is unknown or sealed.
    fn add_screen_capture(
        &mut self,
        node: NodeId,
        path: &Path,
    ) -> Result<String, ReportError>;

    /// Seals the `node` and all its descendants.
    ///
    /// # Errors
    ///
    /// If the `node` is unknown.
    fn end_node(&mut self, node: NodeId) -> Result<(), ReportError>;

    /// Persists everything written so far.
    ///
    /// # Errors
    ///
    /// If the artifact cannot be persisted.
    fn flush(&mut self) -> Result<(), ReportError>;

    /// Flushes and releases the underlying resources.
    ///
    /// # Errors
    ///
    /// If the artifact cannot be persisted.
    fn close(&mut self) -> Result<(), ReportError>;
}

impl<R: ReportWriter + ?Sized> ReportWriter for &mut R {
    fn start_node(&mut self, label: &str) -> Result<NodeId, ReportError> {
        (**self).start_node(label)
    }

    fn append_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
    ) -> Result<(), ReportError> {
        (**self).append_child(parent, child)
    }

    fn log(
        &mut self,
        node: NodeId,
        level: Level,
        message: &str,
    ) -> Result<(), ReportError> {
        (**self).log(node, level, message)
    }

    fn add_screen_capture(
        &mut self,
        node: NodeId,
        path: &Path,
    ) -> Result<String, ReportError> {
        (**self).add_screen_capture(node, path)
    }

    fn end_node(&mut self, node: NodeId) -> Result<(), ReportError> {
        (**self).end_node(node)
    }

    fn flush(&mut self) -> Result<(), ReportError> {
        (**self).flush()
    }

    fn close(&mut self) -> Result<(), ReportError> {
        (**self).close()
    }
}

/// Renders the markup referencing a screenshot at the given `path`.
#[must_use]
pub fn screen_capture_markup(path: &Path) -> String {
    let path = path.display();
    format!("<img class='report-img' data-featherlight='{path}' src='{path}'>")
}
