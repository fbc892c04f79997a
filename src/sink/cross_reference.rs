// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Cross-reference of the run stories, serializable into JSON.

use std::{
    collections::HashMap,
    io,
    thread::{self, ThreadId},
};

use serde::Serialize;

use crate::{
    error::SinkError,
    event::{LifecycleEvent as Ev, Meta},
};

use super::EventSink;

/// Numbers of finished steps per their outcome.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct StepCounts {
    /// Number of passed steps.
    pub passed: usize,

    /// Number of ignorable steps.
    pub ignored: usize,

    /// Number of pending steps.
    pub pending: usize,

    /// Number of not performed steps.
    pub not_performed: usize,

    /// Number of failed steps.
    pub failed: usize,
}

impl StepCounts {
    /// Returns the total number of finished steps.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.passed + self.ignored + self.pending + self.not_performed + self.failed
    }

    fn add(&mut self, other: Self) {
        self.passed += other.passed;
        self.ignored += other.ignored;
        self.pending += other.pending;
        self.not_performed += other.not_performed;
        self.failed += other.failed;
    }
}

/// Cross-referenced scenario.
#[derive(Clone, Debug, Default, Serialize)]
pub struct XrefScenario {
    /// Title of the scenario.
    pub title: String,

    /// Meta properties of the scenario.
    pub meta: Vec<(String, String)>,

    /// Steps of the scenario.
    pub steps: StepCounts,

    /// Texts of the failed steps.
    pub failures: Vec<String>,

    /// Filter the scenario was excluded by, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_allowed: Option<String>,
}

/// Cross-referenced story.
#[derive(Clone, Debug, Default, Serialize)]
pub struct XrefStory {
    /// Name of the story.
    pub name: String,

    /// Path of the story.
    pub path: String,

    /// Meta properties of the story.
    pub meta: Vec<(String, String)>,

    /// Indicates whether the story ran as a given story of another one.
    pub given: bool,

    /// Indicates whether the story was cancelled by timeout.
    pub cancelled: bool,

    /// Filter the story was excluded by, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_allowed: Option<String>,

    /// Scenarios of the story.
    pub scenarios: Vec<XrefScenario>,
}

impl XrefStory {
    /// Returns the step numbers summed over all the scenarios.
    #[must_use]
    pub fn steps(&self) -> StepCounts {
        let mut counts = StepCounts::default();
        for s in &self.scenarios {
            counts.add(s.steps);
        }
        counts
    }
}

/// [`EventSink`] aggregating a cross-reference of the run stories.
///
/// Scenarios and steps are attributed to the story most recently started on
/// the same thread, so a single [`Shared`] instance may be fed by stories
/// running concurrently, each on its own thread.
///
/// [`Shared`]: super::Shared
#[derive(Clone, Debug, Default, Serialize)]
pub struct CrossReference {
    /// Stories in the order they started.
    stories: Vec<XrefStory>,

    /// Indices of the running stories per feeding thread, innermost last.
    #[serde(skip)]
    running: HashMap<ThreadId, Vec<usize>>,
}

fn meta_pairs(meta: &Meta) -> Vec<(String, String)> {
    meta.iter().map(|(k, v)| (k.to_owned(), v.to_owned())).collect()
}

impl CrossReference {
    /// Creates a new empty [`CrossReference`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cross-referenced stories.
    #[must_use]
    pub fn stories(&self) -> &[XrefStory] {
        &self.stories
    }

    /// Returns the step numbers summed over all the stories.
    #[must_use]
    pub fn totals(&self) -> StepCounts {
        let mut counts = StepCounts::default();
        for s in &self.stories {
            counts.add(s.steps());
        }
        counts
    }

    /// Renders this [`CrossReference`] as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// If serialization fails.
    pub fn to_json(&self) -> Result<String, SinkError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes this [`CrossReference`] as pretty-printed JSON into the given
    /// `output`.
    ///
    /// # Errors
    ///
    /// If serialization or writing fails.
    pub fn write_to(&self, mut output: impl io::Write) -> Result<(), SinkError> {
        serde_json::to_writer_pretty(&mut output, self)?;
        output.flush()?;
        Ok(())
    }

    fn story(&mut self) -> Option<&mut XrefStory> {
        let i = *self.running.get(&thread::current().id())?.last()?;
        self.stories.get_mut(i)
    }

    fn scenario(&mut self) -> Option<&mut XrefScenario> {
        self.story().and_then(|s| s.scenarios.last_mut())
    }

    fn count(&mut self, f: impl FnOnce(&mut StepCounts)) {
        if let Some(s) = self.scenario() {
            f(&mut s.steps);
        }
    }
}

impl EventSink for CrossReference {
    fn handle_event(&mut self, event: &Ev) -> Result<(), SinkError> {
        match event {
            Ev::StoryStart { story, given_story } => {
                self.running
                    .entry(thread::current().id())
                    .or_default()
                    .push(self.stories.len());
                self.stories.push(XrefStory {
                    name: story.name.clone(),
                    path: story.path.clone(),
                    meta: meta_pairs(&story.meta),
                    given: *given_story,
                    ..XrefStory::default()
                });
            }
            Ev::StoryEnd { .. } => {
                let id = thread::current().id();
                if let Some(running) = self.running.get_mut(&id) {
                    let _ = running.pop();
                    if running.is_empty() {
                        drop(self.running.remove(&id));
                    }
                }
            }
            Ev::StoryNotAllowed { story, filter } => {
                self.stories.push(XrefStory {
                    name: story.name.clone(),
                    path: story.path.clone(),
                    meta: meta_pairs(&story.meta),
                    not_allowed: Some(filter.clone()),
                    ..XrefStory::default()
                });
            }
            Ev::StoryCancelled { .. } => {
                if let Some(s) = self.story() {
                    s.cancelled = true;
                }
            }
            Ev::ScenarioStart { title } => {
                if let Some(s) = self.story() {
                    s.scenarios.push(XrefScenario {
                        title: title.clone(),
                        ..XrefScenario::default()
                    });
                }
            }
            Ev::ScenarioNotAllowed { scenario, filter } => {
                if let Some(s) = self.story() {
                    s.scenarios.push(XrefScenario {
                        title: scenario.title.clone(),
                        meta: meta_pairs(&scenario.meta),
                        not_allowed: Some(filter.clone()),
                        ..XrefScenario::default()
                    });
                }
            }
            Ev::Meta(meta) => {
                if let Some(s) = self.scenario() {
                    s.meta = meta_pairs(meta);
                }
            }
            Ev::StepSuccess { .. } => self.count(|c| c.passed += 1),
            Ev::StepSkippedIgnorable { .. } => self.count(|c| c.ignored += 1),
            Ev::StepPending { .. } => self.count(|c| c.pending += 1),
            Ev::StepNotPerformed { .. } => self.count(|c| c.not_performed += 1),
            Ev::StepFailed { step, .. } => {
                if let Some(s) = self.scenario() {
                    s.steps.failed += 1;
                    s.failures.push(step.clone());
                }
            }
            _ => {}
        }
        Ok(())
    }
}
