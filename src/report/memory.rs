// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! In-memory [`ReportWriter`].

use std::path::Path;

use crate::error::ReportError;

use super::{
    screen_capture_markup, Level, LogEntry, NodeId, ReportNode, ReportWriter,
};

/// [`ReportWriter`] keeping all the [`ReportNode`]s in memory.
///
/// Nodes live in an arena indexed by [`NodeId`]; a parent refers to its
/// children by their ids.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// Arena of all the started nodes.
    nodes: Vec<ReportNode>,

    /// Number of [`ReportWriter::flush()`] calls.
    flushes: usize,

    /// Whether [`ReportWriter::close()`] has been called.
    closed: bool,
}

impl Memory {
    /// Creates an empty [`Memory`] report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the [`ReportNode`] with the given `id`.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&ReportNode> {
        self.nodes.get(id.index())
    }

    /// Iterates over the top-level (never attached) nodes in their starting
    /// order.
    pub fn roots(&self) -> impl Iterator<Item = &ReportNode> {
        self.nodes.iter().filter(|n| n.parent.is_none())
    }

    /// Iterates over the children of the given node in their attaching order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &ReportNode> {
        self.node(id)
            .into_iter()
            .flat_map(|n| n.children.iter())
            .filter_map(|c| self.node(*c))
    }

    /// Returns the total number of started nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Indicates whether no node has been started yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of [`ReportWriter::flush()`] calls so far.
    #[must_use]
    pub const fn flushes(&self) -> usize {
        self.flushes
    }

    /// Indicates whether [`ReportWriter::close()`] has been called.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    fn check_open(&self) -> Result<(), ReportError> {
        if self.closed {
            return Err(ReportError::Closed);
        }
        Ok(())
    }

    fn open_node(&mut self, id: NodeId) -> Result<&mut ReportNode, ReportError> {
        self.check_open()?;
        let node = self
            .nodes
            .get_mut(id.index())
            .ok_or(ReportError::UnknownNode(id))?;
        if node.sealed {
            return Err(ReportError::Sealed(id));
        }
        Ok(node)
    }
}

impl ReportWriter for Memory {
    fn start_node(&mut self, label: &str) -> Result<NodeId, ReportError> {
        self.check_open()?;
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(ReportNode::new(id, label));
        Ok(id)
    }

    fn append_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
    ) -> Result<(), ReportError> {
        self.check_open()?;
        let attached = self
            .node(child)
            .ok_or(ReportError::UnknownNode(child))?
            .parent
            .is_some();
        if attached || parent == child {
            return Err(ReportError::Attached(child));
        }

        self.open_node(parent)?.children.push(child);
        if let Some(node) = self.nodes.get_mut(child.index()) {
            node.parent = Some(parent);
        }
        Ok(())
    }

    fn log(
        &mut self,
        node: NodeId,
        level: Level,
        message: &str,
    ) -> Result<(), ReportError> {
        self.open_node(node)?.log.push(LogEntry {
            level,
            message: message.to_owned(),
        });
        Ok(())
    }

    fn add_screen_capture(
        &mut self,
        node: NodeId,
        path: &Path,
    ) -> Result<String, ReportError> {
        self.open_node(node)?.screenshots.push(path.to_path_buf());
        Ok(screen_capture_markup(path))
    }

    fn end_node(&mut self, node: NodeId) -> Result<(), ReportError> {
        self.check_open()?;
        if self.node(node).is_none() {
            return Err(ReportError::UnknownNode(node));
        }

        let mut pending = vec![node];
        while let Some(id) = pending.pop() {
            if let Some(n) = self.nodes.get_mut(id.index()) {
                n.sealed = true;
                pending.extend(n.children.iter().copied());
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ReportError> {
        self.flushes += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), ReportError> {
        self.flush()?;
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn children_keep_attaching_order() {
        let mut report = Memory::new();
        let story = report.start_node("Story").unwrap();
        let first = report.start_node("first").unwrap();
        let second = report.start_node("second").unwrap();
        report.append_child(story, first).unwrap();
        report.append_child(story, second).unwrap();

        let labels = report
            .children(story)
            .map(|n| n.label.as_str())
            .collect::<Vec<_>>();
        assert_eq!(labels, ["first", "second"]);
        assert_eq!(report.roots().count(), 1);
        assert_eq!(report.node(first).unwrap().parent, Some(story));
    }

    #[test]
    fn ending_seals_descendants() {
        let mut report = Memory::new();
        let story = report.start_node("Story").unwrap();
        let scenario = report.start_node("Scenario").unwrap();
        report.append_child(story, scenario).unwrap();
        report.end_node(story).unwrap();

        assert!(matches!(
            report.log(scenario, Level::Pass, "late"),
            Err(ReportError::Sealed(id)) if id == scenario,
        ));
        assert!(matches!(
            report.append_child(story, NodeId::new(99)),
            Err(ReportError::UnknownNode(_)),
        ));
    }

    #[test]
    fn child_cannot_be_attached_twice() {
        let mut report = Memory::new();
        let a = report.start_node("a").unwrap();
        let b = report.start_node("b").unwrap();
        let c = report.start_node("c").unwrap();
        report.append_child(a, c).unwrap();

        assert!(matches!(
            report.append_child(b, c),
            Err(ReportError::Attached(_)),
        ));
        assert!(matches!(
            report.append_child(a, a),
            Err(ReportError::Attached(_)),
        ));
    }

    #[test]
    fn log_and_screenshots() {
        let mut report = Memory::new();
        let node = report.start_node("Scenario").unwrap();
        report.log(node, Level::Pass, "one").unwrap();
        report.log(node, Level::Fail, "two").unwrap();
        let markup = report
            .add_screen_capture(node, &PathBuf::from("img/shot.png"))
            .unwrap();

        let node = report.node(node).unwrap();
        assert_eq!(node.log.len(), 2);
        assert_eq!(node.status(), Some(Level::Fail));
        assert_eq!(node.screenshots, [PathBuf::from("img/shot.png")]);
        assert!(markup.contains("src='img/shot.png'"));
    }

    #[test]
    fn close_flushes() {
        let mut report = Memory::new();
        report.flush().unwrap();
        report.close().unwrap();

        assert_eq!(report.flushes(), 2);
        assert!(report.is_closed());
    }

    #[test]
    fn closed_report_rejects_changes() {
        let mut report = Memory::new();
        let node = report.start_node("Story").unwrap();
        report.close().unwrap();

        assert!(matches!(
            report.start_node("late"),
            Err(ReportError::Closed),
        ));
        assert!(matches!(
            report.log(node, Level::Pass, "late"),
            Err(ReportError::Closed),
        ));
        assert!(matches!(report.end_node(node), Err(ReportError::Closed)));
        assert_eq!(report.len(), 1);
    }
}
