// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Human-readable console [`EventSink`].

use std::{borrow::Cow, io, str::FromStr};

use console::Style;
use itertools::Itertools as _;

use crate::{
    classify::{render_cause, unescape_step},
    error::SinkError,
    event::{LifecycleEvent as Ev, StoryDuration},
};

use super::EventSink;

/// Possible policies of a [`console`] output coloring.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Coloring {
    /// Letting [`console::colors_enabled()`] to decide, whether output should
    /// be colored.
    #[default]
    Auto,

    /// Forcing of a colored output.
    Always,

    /// Forcing of a non-colored output.
    Never,
}

impl FromStr for Coloring {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            _ => Err("possible options: auto, always, never"),
        }
    }
}

/// [`Style`]s for terminal output.
#[derive(Clone, Debug)]
pub struct Styles {
    /// [`Style`] for rendering successful events.
    pub ok: Style,

    /// [`Style`] for rendering skipped events.
    pub skipped: Style,

    /// [`Style`] for rendering errors and failed events.
    pub err: Style,

    /// [`Style`] for rendering header.
    pub header: Style,

    /// [`Style`] for rendering __bold__.
    pub bold: Style,

    /// Indicates whether the output is colored.
    pub is_present: bool,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            ok: Style::new().green(),
            skipped: Style::new().cyan(),
            err: Style::new().red(),
            header: Style::new().blue(),
            bold: Style::new().bold(),
            is_present: console::colors_enabled(),
        }
    }
}

impl Styles {
    /// Creates new [`Styles`] according to the given [`Coloring`].
    #[must_use]
    pub fn new(coloring: Coloring) -> Self {
        let mut styles = Self::default();
        styles.apply_coloring(coloring);
        styles
    }

    /// Applies the given [`Coloring`] to these [`Styles`].
    pub fn apply_coloring(&mut self, coloring: Coloring) {
        match coloring {
            Coloring::Auto => {}
            Coloring::Always => {
                self.is_present = true;
                for style in [
                    &mut self.ok,
                    &mut self.skipped,
                    &mut self.err,
                    &mut self.header,
                    &mut self.bold,
                ] {
                    *style = style.clone().force_styling(true);
                }
            }
            Coloring::Never => self.is_present = false,
        }
    }

    fn paint<'a>(&self, style: &Style, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        if self.is_present {
            style.apply_to(input.into()).to_string().into()
        } else {
            input.into()
        }
    }

    /// Colors `input` with [`Styles::ok`] color, if the output is colored.
    #[must_use]
    pub fn ok<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.paint(&self.ok, input)
    }

    /// Colors `input` with [`Styles::skipped`] color, if the output is
    /// colored.
    #[must_use]
    pub fn skipped<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.paint(&self.skipped, input)
    }

    /// Colors `input` with [`Styles::err`] color, if the output is colored.
    #[must_use]
    pub fn err<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.paint(&self.err, input)
    }

    /// Colors `input` with [`Styles::header`] color, if the output is colored.
    #[must_use]
    pub fn header<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.paint(&self.header, input)
    }

    /// Makes `input` __bold__, if the output is colored.
    #[must_use]
    pub fn bold<'a>(&self, input: impl Into<Cow<'a, str>>) -> Cow<'a, str> {
        self.paint(&self.bold, input)
    }
}

/// [`EventSink`] printing a human-readable outline of a story run.
///
/// Meant to be a primary sink in a concurrent run: each story's outline is
/// printed in one piece once its events are replayed.
#[derive(Debug)]
pub struct Text<Out: io::Write = io::Stdout> {
    /// Output the outline is written into.
    output: Out,

    /// [`Styles`] of the output.
    styles: Styles,
}

impl Text {
    /// Creates a new [`Text`] sink printing to [`io::Stdout`].
    #[must_use]
    pub fn stdout(coloring: Coloring) -> Self {
        Self::new(io::stdout(), coloring)
    }
}

impl<Out: io::Write> Text<Out> {
    /// Creates a new [`Text`] sink printing into the given `output`.
    #[must_use]
    pub fn new(output: Out, coloring: Coloring) -> Self {
        Self {
            output,
            styles: Styles::new(coloring),
        }
    }

    /// Returns the output being written into.
    #[must_use]
    pub const fn output(&self) -> &Out {
        &self.output
    }

    /// Unwraps the output being written into.
    #[must_use]
    pub fn into_inner(self) -> Out {
        self.output
    }

    fn line(&mut self, indent: usize, text: impl AsRef<str>) -> io::Result<()> {
        let pad = " ".repeat(indent);
        for l in text.as_ref().lines() {
            writeln!(self.output, "{pad}{l}")?;
        }
        Ok(())
    }

    fn cancelled(duration: &StoryDuration) -> String {
        format!(
            "after {} (timeout {})",
            humantime::format_duration(duration.elapsed),
            humantime::format_duration(duration.timeout),
        )
    }
}

impl<Out: io::Write> EventSink for Text<Out> {
    #[allow(clippy::too_many_lines)] // one arm per event
    fn handle_event(&mut self, event: &Ev) -> Result<(), SinkError> {
        match event {
            Ev::StoryStart { story, given_story } => {
                let keyword = if *given_story { "Given story" } else { "Story" };
                let header = self.styles.header(format!(
                    "{}: {}",
                    self.styles.bold(keyword),
                    story.name,
                ));
                self.line(0, header)?;
                if !story.path.is_empty() {
                    self.line(2, format!("({})", story.path))?;
                }
            }
            Ev::StoryEnd { given_story } => {
                if !*given_story {
                    writeln!(self.output)?;
                }
            }
            Ev::StoryNotAllowed { story, filter } => {
                let text = self.styles.skipped(format!(
                    "Story not allowed: {} (filter: {filter})",
                    story.name,
                ));
                self.line(0, text)?;
            }
            Ev::StoryCancelled { story, duration } => {
                let text = self.styles.err(format!(
                    "Story cancelled: {} {}",
                    story.name,
                    Self::cancelled(duration),
                ));
                self.line(0, text)?;
            }
            Ev::RestartedStory { story, cause } => {
                let text = self
                    .styles
                    .skipped(format!("Story restarted: {} ({cause})", story.name));
                self.line(0, text)?;
            }
            Ev::Narrative(n) => {
                self.line(2, format!("In order to {}", n.in_order_to))?;
                self.line(2, format!("As a {}", n.as_a))?;
                self.line(2, format!("I want to {}", n.i_want_to))?;
            }
            Ev::Lifecycle(l) => {
                for (title, steps) in
                    [("Before", &l.before_steps), ("After", &l.after_steps)]
                {
                    if !steps.is_empty() {
                        self.line(2, format!("{title}:"))?;
                        for step in steps {
                            self.line(4, unescape_step(step))?;
                        }
                    }
                }
            }
            Ev::GivenStories(given) => {
                let paths = given.paths().into_iter().join(", ");
                self.line(2, format!("GivenStories: {paths}"))?;
            }
            Ev::ScenarioNotAllowed { scenario, filter } => {
                let text = self.styles.skipped(format!(
                    "Scenario not allowed: {} (filter: {filter})",
                    scenario.title,
                ));
                self.line(2, text)?;
            }
            Ev::ScenarioStart { title } => {
                let text = format!("{}: {title}", self.styles.bold("Scenario"));
                self.line(2, text)?;
            }
            Ev::Meta(meta) => {
                if !meta.is_empty() {
                    let props = meta
                        .iter()
                        .format_with(" ", |(k, v), f| f(&format_args!("@{k} {v}")));
                    self.line(4, format!("Meta: {props}"))?;
                }
            }
            Ev::ExamplesStart { table, .. } => {
                self.line(4, "Examples:")?;
                let header = table.headers.iter().join(" | ");
                self.line(6, format!("| {header} |"))?;
            }
            Ev::ExampleRow(row) => {
                let values = row
                    .iter()
                    .format_with(", ", |(k, v), f| f(&format_args!("{k}={v}")));
                self.line(4, format!("Example: {{{values}}}"))?;
            }
            Ev::StepSuccess { step } => {
                let text = self.styles.ok(format!("\u{2714} {}", unescape_step(step)));
                self.line(4, text)?;
            }
            Ev::StepSkippedIgnorable { step } => {
                let text = self
                    .styles
                    .skipped(format!("- {} (IGNORED)", unescape_step(step)));
                self.line(4, text)?;
            }
            Ev::StepPending { step } => {
                let text = self
                    .styles
                    .skipped(format!("? {} (PENDING)", unescape_step(step)));
                self.line(4, text)?;
            }
            Ev::StepNotPerformed { step } => {
                let text = self
                    .styles
                    .skipped(format!("- {} (NOT PERFORMED)", unescape_step(step)));
                self.line(4, text)?;
            }
            Ev::StepFailed { step, cause } => {
                let text = self
                    .styles
                    .err(format!("\u{2718} {} (FAILED)", unescape_step(step)));
                self.line(4, text)?;
                let chain = self.styles.err(render_cause(cause));
                self.line(6, chain)?;
            }
            Ev::FailedOutcomes { step, table } => {
                self.line(4, self.styles.err(format!("Outcomes of {step}:")).into_owned())?;
                for outcome in table.failures() {
                    let text = self.styles.err(format!("- {}", outcome.description));
                    self.line(6, text)?;
                }
            }
            Ev::Restarted { step, cause } => {
                let text = self.styles.skipped(format!(
                    "\u{21bb} {} (RESTARTED: {cause})",
                    unescape_step(step),
                ));
                self.line(4, text)?;
            }
            Ev::DryRun => self.line(0, self.styles.skipped("DRY RUN").into_owned())?,
            Ev::PendingMethods(methods) => {
                if !methods.is_empty() {
                    self.line(0, "Pending methods:")?;
                    for m in methods {
                        self.line(2, m)?;
                    }
                }
            }
            Ev::StepStart { .. } | Ev::ScenarioEnd | Ev::ExamplesEnd => {}
        }
        Ok(())
    }
}
