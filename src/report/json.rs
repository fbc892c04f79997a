// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! File-backed [`ReportWriter`] persisting the node tree as JSON.

use std::{fs, path::Path};

use derive_more::with_trait::Deref;
use serde::Serialize;

use crate::error::ReportError;

use super::{
    screen_capture_markup, Layout, Level, LogEntry, Memory, NodeId,
    ReportWriter,
};

/// [`ReportWriter`] persisting its [`Memory`] node tree as a pretty-printed
/// JSON file at [`Layout::artifact_path()`].
#[derive(Debug, Deref)]
pub struct JsonReport {
    /// Nodes written so far.
    #[deref]
    memory: Memory,

    /// Where to persist the artifact.
    layout: Layout,

    /// Environment information recorded into the artifact.
    system_info: Vec<(String, String)>,

    /// Whether [`ReportWriter::close()`] has been called.
    closed: bool,
}

impl JsonReport {
    /// Creates a new empty [`JsonReport`] persisted according to the given
    /// [`Layout`].
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        Self {
            memory: Memory::new(),
            layout,
            system_info: Vec::new(),
            closed: false,
        }
    }

    /// Records an environment information entry into the artifact.
    #[must_use]
    pub fn with_system_info(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.system_info.push((key.into(), value.into()));
        self
    }

    /// Returns the [`Layout`] of this [`JsonReport`].
    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Renders the artifact without persisting it.
    ///
    /// # Errors
    ///
    /// If serialization fails.
    pub fn to_json(&self) -> Result<String, ReportError> {
        let artifact = Artifact {
            run_instance: &self.layout.run_instance,
            system_info: self
                .system_info
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect(),
            nodes: self.memory.roots().map(|n| self.view(n.id)).collect(),
        };
        Ok(serde_json::to_string_pretty(&artifact)?)
    }

    fn view(&self, id: NodeId) -> NodeView<'_> {
        let node = self.memory.node(id);
        NodeView {
            id,
            label: node.map_or("", |n| n.label.as_str()),
            status: node.and_then(super::ReportNode::status),
            log: node.map(|n| n.log.as_slice()).unwrap_or_default(),
            screenshots: node
                .map(|n| n.screenshots.iter().map(|p| p.as_path()).collect())
                .unwrap_or_default(),
            children: self.memory.children(id).map(|c| self.view(c.id)).collect(),
        }
    }
}

impl ReportWriter for JsonReport {
    fn start_node(&mut self, label: &str) -> Result<NodeId, ReportError> {
        self.memory.start_node(label)
    }

    fn append_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
    ) -> Result<(), ReportError> {
        self.memory.append_child(parent, child)
    }

    fn log(
        &mut self,
        node: NodeId,
        level: Level,
        message: &str,
    ) -> Result<(), ReportError> {
        self.memory.log(node, level, message)
    }

    /// Registers the screenshot in the [`Memory`] node tree, referencing it
    /// in the markup by its [`Layout::relative_image_path()`].
    fn add_screen_capture(
        &mut self,
        node: NodeId,
        path: &Path,
    ) -> Result<String, ReportError> {
        let markup = self.memory.add_screen_capture(node, path)?;
        Ok(path.file_name().map_or(markup, |file| {
            screen_capture_markup(Path::new(
                &self.layout.relative_image_path(file),
            ))
        }))
    }

    fn end_node(&mut self, node: NodeId) -> Result<(), ReportError> {
        self.memory.end_node(node)
    }

    fn flush(&mut self) -> Result<(), ReportError> {
        if self.closed {
            return Ok(());
        }
        let json = self.to_json()?;
        fs::create_dir_all(self.layout.run_dir())?;
        fs::write(self.layout.artifact_path("json"), json)?;
        self.memory.flush()
    }

    fn close(&mut self) -> Result<(), ReportError> {
        self.flush()?;
        self.closed = true;
        self.memory.close()
    }
}

/// Serialized form of the whole artifact.
#[derive(Serialize)]
struct Artifact<'a> {
    run_instance: &'a str,
    system_info: Vec<(&'a str, &'a str)>,
    nodes: Vec<NodeView<'a>>,
}

/// Serialized form of a single node along with its children.
#[derive(Serialize)]
struct NodeView<'a> {
    id: NodeId,
    label: &'a str,
    status: Option<Level>,
    log: &'a [LogEntry],
    screenshots: Vec<&'a Path>,
    children: Vec<NodeView<'a>>,
}
