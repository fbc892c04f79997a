// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`ReportWriter`] shared between several stories.

use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::error::ReportError;

use super::{Level, NodeId, ReportWriter};

/// Cloneable handle to a single [`ReportWriter`] fed by several trackers.
///
/// Every call locks the inner writer for its own duration only, so the nodes
/// of concurrently running stories may be started in any relative order, but
/// each call is applied atomically.
#[derive(Debug, Default)]
pub struct Shared<R>(Arc<Mutex<R>>);

// Implemented manually to omit redundant `R: Clone` trait bound, imposed by
// `#[derive(Clone)]`.
impl<R> Clone for Shared<R> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<R> Shared<R> {
    /// Wraps the given [`ReportWriter`] into a [`Shared`] one.
    #[must_use]
    pub fn new(report: R) -> Self {
        Self(Arc::new(Mutex::new(report)))
    }

    /// Locks the inner [`ReportWriter`] for inspection.
    ///
    /// # Errors
    ///
    /// If the lock is poisoned.
    pub fn lock(&self) -> Result<MutexGuard<'_, R>, ReportError> {
        self.0.lock().map_err(|_| ReportError::Poisoned)
    }
}

impl<R: ReportWriter> ReportWriter for Shared<R> {
    fn start_node(&mut self, label: &str) -> Result<NodeId, ReportError> {
        self.lock()?.start_node(label)
    }

    fn append_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
    ) -> Result<(), ReportError> {
        self.lock()?.append_child(parent, child)
    }

    fn log(
        &mut self,
        node: NodeId,
        level: Level,
        message: &str,
    ) -> Result<(), ReportError> {
        self.lock()?.log(node, level, message)
    }

    fn add_screen_capture(
        &mut self,
        node: NodeId,
        path: &Path,
    ) -> Result<String, ReportError> {
        self.lock()?.add_screen_capture(node, path)
    }

    fn end_node(&mut self, node: NodeId) -> Result<(), ReportError> {
        self.lock()?.end_node(node)
    }

    fn flush(&mut self) -> Result<(), ReportError> {
        self.lock()?.flush()
    }

    /// Only flushes the inner [`ReportWriter`], as other handles may still
    /// write into it.
    fn close(&mut self) -> Result<(), ReportError> {
        self.lock()?.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::report::Memory;

    #[test]
    fn handles_write_into_one_report() {
        let report = Shared::new(Memory::new());

        let workers = (0..4)
            .map(|i| {
                let mut handle = report.clone();
                thread::spawn(move || {
                    let story = handle.start_node(&format!("Story {i}"))?;
                    let scenario = handle.start_node("Scenario")?;
                    handle.append_child(story, scenario)?;
                    handle.log(scenario, Level::Pass, "step")?;
                    handle.end_node(story)?;
                    handle.close()
                })
            })
            .collect::<Vec<_>>();
        for w in workers {
            w.join().unwrap().unwrap();
        }

        let report = report.lock().unwrap();
        assert_eq!(report.roots().count(), 4);
        assert_eq!(report.len(), 8);
        assert_eq!(report.flushes(), 4);
        assert!(!report.is_closed());
    }
}
