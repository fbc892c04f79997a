// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tracking of the report nodes of the currently running story and scenario.

use itertools::Itertools as _;

use crate::{
    classify::{self, Outcome, StepOutcome, SKIP_PREFIX, SKIP_TITLE},
    error::ReportError,
    report::{Level, NodeId, ReportWriter},
};

/// Name of the story a runner uses for the global setup.
pub const BEFORE_STORIES: &str = "BeforeStories";

/// Name of the story a runner uses for the global teardown.
pub const AFTER_STORIES: &str = "AfterStories";

/// Indicates whether the given story name is one of the reserved global
/// setup/teardown ones, which are not rendered.
#[must_use]
pub fn is_reserved_story(name: &str) -> bool {
    name.eq_ignore_ascii_case(BEFORE_STORIES)
        || name.eq_ignore_ascii_case(AFTER_STORIES)
}

/// Renders the label of a scenario node.
///
/// Titles of example-driven repetitions are separated by `|` and rendered as a
/// bulleted `Scenarios:` list.
#[must_use]
pub fn scenario_label(title: &str) -> String {
    let variants = title.split('|').collect::<Vec<_>>();
    let header = if variants.len() > 1 {
        "Scenarios:"
    } else {
        "Scenario:"
    };
    let items = variants
        .iter()
        .format_with("", |v, f| f(&format_args!("</br>&nbsp;&nbsp;- {v}")));
    format!("{header}{items}")
}

/// Nodes of a single story being run.
#[derive(Clone, Debug, Default)]
struct Frame {
    /// Story node, [`None`] for a reserved story.
    parent: Option<NodeId>,

    /// Node of the running scenario.
    child: Option<NodeId>,

    /// Reason of the last soft skip in the running scenario.
    skipped_reason: Option<String>,
}

/// Reporting Hierarchy Tracker.
///
/// Keeps the node of the current story (parent) and the node of its current
/// scenario (child). Given stories started inside a story get their own frame,
/// restoring the outer one once finished.
#[derive(Debug)]
pub struct Tracker<R> {
    /// Report the nodes are written into.
    report: R,

    /// Frames of the started stories, innermost last.
    frames: Vec<Frame>,
}

impl<R> Tracker<R> {
    /// Creates a new [`Tracker`] writing into the given `report`.
    #[must_use]
    pub const fn new(report: R) -> Self {
        Self {
            report,
            frames: Vec::new(),
        }
    }

    /// Returns the node of the current story, if rendered.
    #[must_use]
    pub fn current_parent(&self) -> Option<NodeId> {
        self.frames.last().and_then(|f| f.parent)
    }

    /// Returns the node of the current scenario, if any.
    #[must_use]
    pub fn current_child(&self) -> Option<NodeId> {
        self.frames.last().and_then(|f| f.child)
    }

    /// Returns the report written into.
    #[must_use]
    pub const fn report(&self) -> &R {
        &self.report
    }
}

impl<R: ReportWriter> Tracker<R> {
    /// Starts a node for the story with the given `name`, unless it's a
    /// reserved one.
    ///
    /// # Errors
    ///
    /// If the report writer fails.
    pub fn story_started(
        &mut self,
        name: &str,
    ) -> Result<Option<NodeId>, ReportError> {
        let parent = if is_reserved_story(name) {
            None
        } else {
            Some(self.report.start_node(name)?)
        };
        self.frames.push(Frame {
            parent,
            ..Frame::default()
        });
        Ok(parent)
    }

    /// Starts a node for the scenario with the given `title` and attaches it
    /// to the current story node.
    ///
    /// Scenarios outside a rendered story have no node.
    ///
    /// # Errors
    ///
    /// If the report writer fails.
    pub fn scenario_started(
        &mut self,
        title: &str,
    ) -> Result<Option<NodeId>, ReportError> {
        let Some(parent) = self.current_parent() else {
            tracing::warn!(scenario = %title, "scenario outside a rendered story");
            return Ok(None);
        };

        let child = self.report.start_node(&scenario_label(title))?;
        self.report.append_child(parent, child)?;
        if let Some(frame) = self.frames.last_mut() {
            frame.child = Some(child);
            frame.skipped_reason = None;
        }
        Ok(Some(child))
    }

    /// Logs the given [`StepOutcome`] into the current scenario node.
    ///
    /// # Errors
    ///
    /// If the report writer fails.
    pub fn step_finished(
        &mut self,
        outcome: &StepOutcome,
    ) -> Result<(), ReportError> {
        if let Outcome::SoftSkipped { reason } = &outcome.outcome {
            if let Some(frame) = self.frames.last_mut() {
                frame.skipped_reason = Some(reason.clone());
            }
        }
        match self.current_child() {
            Some(child) => classify::log_outcome(&mut self.report, child, outcome),
            None => {
                tracing::debug!(step = %outcome.message, "step outside a scenario");
                Ok(())
            }
        }
    }

    /// Ends the current scenario node, logging the skip banner first if a
    /// step of the scenario was soft-skipped.
    ///
    /// # Errors
    ///
    /// If the report writer fails.
    pub fn scenario_finished(&mut self) -> Result<(), ReportError> {
        let Some(frame) = self.frames.last_mut() else {
            return Ok(());
        };
        let reason = frame.skipped_reason.take();
        let Some(child) = frame.child.take() else {
            return Ok(());
        };

        if let Some(reason) = reason {
            self.report.log(
                child,
                Level::Skip,
                &format!("{SKIP_TITLE}{SKIP_PREFIX}{reason}"),
            )?;
        }
        self.report.end_node(child)
    }

    /// Ends the current story node and persists the report, releasing it
    /// once the outermost rendered story is finished.
    ///
    /// Reserved stories leave the report untouched, so the run may go on
    /// after a [`BEFORE_STORIES`] one.
    ///
    /// # Errors
    ///
    /// If the report writer fails.
    pub fn story_finished(&mut self) -> Result<(), ReportError> {
        let Some(parent) = self.frames.pop().and_then(|f| f.parent) else {
            return Ok(());
        };
        self.report.end_node(parent)?;
        self.report.flush()?;
        if self.frames.is_empty() {
            self.report.close()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        classify::{Classifier, StepResult},
        event::Cause,
        report::Memory,
    };

    #[test]
    fn reserved_stories_are_not_rendered() {
        let mut tracker = Tracker::new(Memory::new());

        assert_eq!(tracker.story_started("BeforeStories").unwrap(), None);
        assert_eq!(tracker.scenario_started("setup").unwrap(), None);
        tracker.story_finished().unwrap();
        assert_eq!(tracker.story_started("afterstories").unwrap(), None);
        tracker.story_finished().unwrap();

        assert!(tracker.report().is_empty());
        assert_eq!(tracker.report().flushes(), 0);
        assert!(!tracker.report().is_closed());
    }

    #[test]
    fn run_goes_on_after_before_stories() {
        let mut tracker = Tracker::new(Memory::new());

        let _ = tracker.story_started(BEFORE_STORIES).unwrap();
        tracker.story_finished().unwrap();
        let story = tracker.story_started("Login").unwrap().unwrap();
        tracker.story_finished().unwrap();

        let report = tracker.report();
        assert_eq!(report.roots().map(|n| n.id).collect::<Vec<_>>(), [story]);
        assert!(report.is_closed());
    }

    #[test]
    fn given_story_keeps_outer_skip_banner() {
        let mut tracker = Tracker::new(Memory::new());
        let mut classifier = Classifier::new();
        let cause = Cause::new("Wrapper", "")
            .caused_by(Cause::new("TBDError", "not ready"));

        let _ = tracker.story_started("Outer").unwrap();
        let scenario = tracker.scenario_started("S").unwrap().unwrap();
        tracker
            .step_finished(&classifier.classify("Then pay", StepResult::Failed(&cause)))
            .unwrap();
        let _ = tracker.story_started("Given").unwrap();
        let _ = tracker.scenario_started("inner").unwrap();
        tracker.scenario_finished().unwrap();
        tracker.story_finished().unwrap();
        tracker.scenario_finished().unwrap();

        let log = &tracker.report().node(scenario).unwrap().log;
        assert_eq!(
            log.last().unwrap().message,
            format!("{SKIP_TITLE}{SKIP_PREFIX}not ready"),
        );
    }

    #[test]
    fn scenarios_become_children_in_order() {
        let mut tracker = Tracker::new(Memory::new());

        let story = tracker.story_started("Checkout").unwrap().unwrap();
        for title in ["first", "second"] {
            let _ = tracker.scenario_started(title).unwrap();
            tracker.scenario_finished().unwrap();
        }
        tracker.story_finished().unwrap();

        let report = tracker.report();
        assert_eq!(report.roots().count(), 1);
        let labels = report
            .children(story)
            .map(|n| n.label.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            labels,
            [
                "Scenario:</br>&nbsp;&nbsp;- first",
                "Scenario:</br>&nbsp;&nbsp;- second",
            ],
        );
        assert!(report.node(story).unwrap().sealed);
        assert!(report.is_closed());
    }

    #[test]
    fn multi_example_title_is_a_list() {
        assert_eq!(
            scenario_label("A|B|C"),
            "Scenarios:</br>&nbsp;&nbsp;- A</br>&nbsp;&nbsp;- B\
             </br>&nbsp;&nbsp;- C",
        );
        assert_eq!(scenario_label("A"), "Scenario:</br>&nbsp;&nbsp;- A");
    }

    #[test]
    fn steps_are_logged_into_current_scenario() {
        let mut tracker = Tracker::new(Memory::new());
        let mut classifier = Classifier::new();

        let _ = tracker.story_started("Story").unwrap();
        let scenario = tracker.scenario_started("S").unwrap().unwrap();
        tracker
            .step_finished(&classifier.classify("Given x", StepResult::Success))
            .unwrap();
        tracker
            .step_finished(&classifier.classify("When y", StepResult::Pending))
            .unwrap();

        let log = &tracker.report().node(scenario).unwrap().log;
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].level, Level::Pass);
        assert_eq!(log[0].message, "<big>Given x</big>");
        assert_eq!(log[1].level, Level::Skip);
    }

    #[test]
    fn soft_skip_banner_on_scenario_end() {
        let mut tracker = Tracker::new(Memory::new());
        let mut classifier = Classifier::new();
        let cause = Cause::new("Wrapper", "")
            .caused_by(Cause::new("TBDError", "waiting for API"));

        let _ = tracker.story_started("Story").unwrap();
        let scenario = tracker.scenario_started("S").unwrap().unwrap();
        tracker
            .step_finished(&classifier.classify("Then pay", StepResult::Failed(&cause)))
            .unwrap();
        tracker.scenario_finished().unwrap();

        let node = tracker.report().node(scenario).unwrap();
        assert_eq!(node.log.len(), 2);
        assert_eq!(
            node.log[1].message,
            format!("{SKIP_TITLE}{SKIP_PREFIX}waiting for API"),
        );
        assert!(node.sealed);
    }

    #[test]
    fn given_story_restores_outer_story() {
        let mut tracker = Tracker::new(Memory::new());

        let outer = tracker.story_started("Outer").unwrap().unwrap();
        let given = tracker.story_started("Given").unwrap().unwrap();
        assert_eq!(tracker.current_parent(), Some(given));
        tracker.story_finished().unwrap();
        assert!(!tracker.report().is_closed());

        assert_eq!(tracker.current_parent(), Some(outer));
        let scenario = tracker.scenario_started("S").unwrap().unwrap();
        assert_eq!(
            tracker.report().node(scenario).unwrap().parent,
            Some(outer),
        );
        tracker.scenario_finished().unwrap();
        tracker.story_finished().unwrap();
        assert!(tracker.report().is_closed());
    }
}
