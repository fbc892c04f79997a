// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Report nodes and their log entries.

use std::path::PathBuf;

use derive_more::with_trait::Display;

/// Handle of a [`ReportNode`] owned by a [`ReportWriter`].
///
/// [`ReportWriter`]: super::ReportWriter
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "output-json", derive(serde::Serialize))]
#[display("{_0}")]
pub struct NodeId(usize);

impl NodeId {
    /// Creates a [`NodeId`] out of its raw index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw index of this [`NodeId`].
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Level of a [`LogEntry`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "output-json", derive(serde::Serialize))]
#[cfg_attr(feature = "output-json", serde(rename_all = "UPPERCASE"))]
pub enum Level {
    /// Step passed.
    #[display("PASS")]
    Pass,

    /// Step was skipped, for whatever reason.
    #[display("SKIP")]
    Skip,

    /// Step failed.
    #[display("FAIL")]
    Fail,
}

/// Single entry of a [`ReportNode`] log.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "output-json", derive(serde::Serialize))]
pub struct LogEntry {
    /// [`Level`] of this entry.
    pub level: Level,

    /// Rendered message.
    pub message: String,
}

/// Single entry of a rendered report.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportNode {
    /// Identity of this [`ReportNode`].
    pub id: NodeId,

    /// Display label.
    pub label: String,

    /// Parent of this [`ReportNode`], if attached.
    pub parent: Option<NodeId>,

    /// Children in their attaching order.
    pub children: Vec<NodeId>,

    /// Append-only log.
    pub log: Vec<LogEntry>,

    /// Screenshots registered for this [`ReportNode`].
    pub screenshots: Vec<PathBuf>,

    /// Whether this [`ReportNode`] was ended already.
    pub sealed: bool,
}

impl ReportNode {
    pub(super) fn new(id: NodeId, label: &str) -> Self {
        Self {
            id,
            label: label.to_owned(),
            parent: None,
            children: Vec::new(),
            log: Vec::new(),
            screenshots: Vec::new(),
            sealed: false,
        }
    }

    /// Returns the worst [`Level`] logged into this [`ReportNode`] itself.
    #[must_use]
    pub fn status(&self) -> Option<Level> {
        self.log.iter().map(|e| e.level).max_by_key(|l| match l {
            Level::Pass => 0,
            Level::Skip => 1,
            Level::Fail => 2,
        })
    }
}
