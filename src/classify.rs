// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Classification of step results into report [`Level`]s.
//!
//! Rules, in order:
//! 1. [`StepResult::Success`] is [`Level::Pass`].
//! 2. [`StepResult::Ignorable`], [`StepResult::Pending`] and
//!    [`StepResult::NotPerformed`] are [`Level::Skip`].
//! 3. [`StepResult::Failed`] is a soft skip ([`Level::Skip`]) if the type
//!    name of the cause's immediate cause contains [`SKIP_MARKER`], and
//!    [`Level::Fail`] (with a screenshot taken) otherwise.

use std::path::{Path, PathBuf};

use itertools::Itertools as _;

use crate::{
    error::ReportError,
    event::{Cause, LifecycleEvent},
    report::{Level, NodeId, ReportWriter},
    screenshot::ScreenshotCapture,
};

/// Marker in a failure type name identifying steps skipped on purpose, as
/// being "to be defined".
pub const SKIP_MARKER: &str = "TBD";

/// Banner logged for a scenario containing a soft-skipped step.
pub const SKIP_TITLE: &str = "<b>===== SKIPPED TEST =====</b></br>";

/// Prefix of a soft-skipped step message, followed by the skip reason.
pub const SKIP_PREFIX: &str = "<b>The test was skipped because of the \
                               following reason:</b></br>&nbsp;&nbsp;- ";

/// Glyph a runner substitutes for a literal `[` in step text.
pub const OPEN_BRACKET_GLYPH: char = '\u{FF5F}';

/// Glyph a runner substitutes for a literal `]` in step text.
pub const CLOSE_BRACKET_GLYPH: char = '\u{FF60}';

/// Raw result of a finished step.
#[derive(Clone, Copy, Debug)]
pub enum StepResult<'a> {
    /// Step passed.
    Success,

    /// Step is ignorable.
    Ignorable,

    /// Step isn't implemented yet.
    Pending,

    /// Step wasn't performed.
    NotPerformed,

    /// Step failed with the given [`Cause`].
    Failed(&'a Cause),
}

impl<'a> StepResult<'a> {
    /// Extracts the step text and its [`StepResult`] out of a terminal step
    /// event.
    #[must_use]
    pub fn of(event: &'a LifecycleEvent) -> Option<(&'a str, Self)> {
        Some(match event {
            LifecycleEvent::StepSuccess { step } => (step.as_str(), Self::Success),
            LifecycleEvent::StepSkippedIgnorable { step } => {
                (step.as_str(), Self::Ignorable)
            }
            LifecycleEvent::StepPending { step } => (step.as_str(), Self::Pending),
            LifecycleEvent::StepNotPerformed { step } => {
                (step.as_str(), Self::NotPerformed)
            }
            LifecycleEvent::StepFailed { step, cause } => {
                (step.as_str(), Self::Failed(cause))
            }
            _ => return None,
        })
    }
}

/// Classified outcome of a step.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// Step passed.
    Passed,

    /// Step is ignorable.
    Ignored,

    /// Step isn't implemented yet.
    Pending,

    /// Step wasn't performed.
    NotPerformed,

    /// Step failed in a way marking it as skipped on purpose.
    SoftSkipped {
        /// Message of the marking failure.
        reason: String,
    },

    /// Step failed.
    Failed,
}

impl Outcome {
    /// Returns the report [`Level`] of this [`Outcome`].
    #[must_use]
    pub const fn level(&self) -> Level {
        match self {
            Self::Passed => Level::Pass,
            Self::Ignored
            | Self::Pending
            | Self::NotPerformed
            | Self::SoftSkipped { .. } => Level::Skip,
            Self::Failed => Level::Fail,
        }
    }
}

/// Presentation of a classified step, ready to be logged.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StepOutcome {
    /// Classified [`Outcome`].
    pub outcome: Outcome,

    /// Formatted text: the unescaped step label, or the skip prefix with the
    /// reason for a soft skip.
    pub message: String,

    /// Screenshot taken on failure, if any.
    pub screenshot: Option<PathBuf>,

    /// Rendered failure cause with its stack frames, one per line.
    pub cause_chain: Option<String>,
}

impl StepOutcome {
    /// Returns the report [`Level`] of this [`StepOutcome`].
    #[must_use]
    pub const fn level(&self) -> Level {
        self.outcome.level()
    }

    /// Renders the log message, embedding the given screenshot markup.
    #[must_use]
    pub fn render(&self, screenshot_markup: Option<&str>) -> String {
        let mut out = format!("<big>{}</big>", self.message);
        if let Some(markup) = screenshot_markup {
            out.push_str(markup);
        }
        if let Some(chain) = &self.cause_chain {
            out.push_str("<br><pre>");
            out.push_str(chain);
            out.push_str("</pre>");
        }
        out
    }
}

/// Step Outcome Classifier, owning the optional [`ScreenshotCapture`] used on
/// failures.
#[derive(Default)]
pub struct Classifier {
    /// Capturer of screenshots on failures, if a driver is present.
    screenshots: Option<Box<dyn ScreenshotCapture + Send>>,
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("screenshots", &self.screenshots.is_some())
            .finish()
    }
}

impl Classifier {
    /// Creates a new [`Classifier`] taking no screenshots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new [`Classifier`] taking screenshots on failures with the
    /// given [`ScreenshotCapture`].
    #[must_use]
    pub fn with_screenshots<S>(screenshots: S) -> Self
    where
        S: ScreenshotCapture + Send + 'static,
    {
        Self {
            screenshots: Some(Box::new(screenshots)),
        }
    }

    /// Classifies the given `step` with its [`StepResult`].
    ///
    /// A failed screenshot capture is logged and doesn't prevent the step from
    /// being classified as [`Outcome::Failed`].
    pub fn classify(&mut self, step: &str, result: StepResult<'_>) -> StepOutcome {
        let label = unescape_step(step);
        let outcome = match result {
            StepResult::Success => Outcome::Passed,
            StepResult::Ignorable => Outcome::Ignored,
            StepResult::Pending => Outcome::Pending,
            StepResult::NotPerformed => Outcome::NotPerformed,
            StepResult::Failed(cause) => return self.classify_failure(label, cause),
        };
        StepOutcome {
            outcome,
            message: label,
            screenshot: None,
            cause_chain: None,
        }
    }

    fn classify_failure(&mut self, label: String, cause: &Cause) -> StepOutcome {
        if let Some(reason) = soft_skip_reason(cause) {
            return StepOutcome {
                outcome: Outcome::SoftSkipped {
                    reason: reason.to_owned(),
                },
                message: format!("{SKIP_PREFIX}{reason}"),
                screenshot: None,
                cause_chain: None,
            };
        }

        let screenshot = match self.screenshots.as_mut().map(|s| s.capture()) {
            Some(Ok(path)) => path,
            Some(Err(e)) => {
                tracing::warn!(step = %label, error = %e, "screenshot capture failed");
                None
            }
            None => None,
        };

        StepOutcome {
            outcome: Outcome::Failed,
            message: label,
            screenshot,
            cause_chain: Some(render_cause(cause.inner().unwrap_or(cause))),
        }
    }
}

/// Returns the soft-skip reason, if the immediate cause of the given `cause`
/// is marked with [`SKIP_MARKER`].
#[must_use]
pub fn soft_skip_reason(cause: &Cause) -> Option<&str> {
    cause
        .inner()
        .filter(|inner| inner.type_name.contains(SKIP_MARKER))
        .map(|inner| inner.message.as_str())
}

/// Reverses the bracket substitution applied by the runner to step text.
#[must_use]
pub fn unescape_step(step: &str) -> String {
    step.chars()
        .map(|c| match c {
            OPEN_BRACKET_GLYPH => '[',
            CLOSE_BRACKET_GLYPH => ']',
            c => c,
        })
        .collect()
}

/// Renders the given `cause` followed by its stack frames, one per line.
#[must_use]
pub fn render_cause(cause: &Cause) -> String {
    std::iter::once(cause.to_string())
        .chain(cause.frames.iter().cloned())
        .map(|line| line + "\n")
        .join("")
}

/// Appends the given [`StepOutcome`] to the `node`'s log, registering its
/// screenshot first.
///
/// # Errors
///
/// If the report writer rejects the entry.
pub fn log_outcome<R>(
    report: &mut R,
    node: NodeId,
    outcome: &StepOutcome,
) -> Result<(), ReportError>
where
    R: ReportWriter + ?Sized,
{
    let markup = outcome
        .screenshot
        .as_deref()
        .map(|path: &Path| report.add_screen_capture(node, path))
        .transpose()?;
    report.log(node, outcome.level(), &outcome.render(markup.as_deref()))
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
    };

    use super::*;
    use crate::report::Memory;

    fn wrapped(inner: Cause) -> Cause {
        Cause::new("StepFailure", "wrapped").caused_by(inner)
    }

    #[test]
    fn success_passes() {
        let out = Classifier::new().classify("Given a user", StepResult::Success);

        assert_eq!(out.outcome, Outcome::Passed);
        assert_eq!(out.level(), Level::Pass);
        assert_eq!(out.message, "Given a user");
        assert!(out.cause_chain.is_none());
    }

    #[test]
    fn not_run_steps_skip() {
        let mut classifier = Classifier::new();
        for result in [
            StepResult::Ignorable,
            StepResult::Pending,
            StepResult::NotPerformed,
        ] {
            let out = classifier.classify("When it runs", result);
            assert_eq!(out.level(), Level::Skip);
            assert_eq!(out.message, "When it runs");
            assert!(out.screenshot.is_none());
        }
    }

    #[test]
    fn unescapes_brackets() {
        let out = Classifier::new()
            .classify("Then list is \u{FF5F}a, b\u{FF60}", StepResult::Success);

        assert_eq!(out.message, "Then list is [a, b]");
    }

    #[test]
    fn marked_cause_soft_skips() {
        let cause = wrapped(Cause::new("acme::TBDError", "not ready yet"));
        let out = Classifier::new().classify("Then pay", StepResult::Failed(&cause));

        assert_eq!(
            out.outcome,
            Outcome::SoftSkipped { reason: "not ready yet".into() },
        );
        assert_eq!(out.level(), Level::Skip);
        assert!(out.message.starts_with(SKIP_PREFIX));
        assert!(out.message.ends_with("not ready yet"));
        assert!(out.cause_chain.is_none());
    }

    #[test]
    fn marker_only_checked_on_immediate_cause() {
        let cause = Cause::new("TBDError", "outer only");
        let out = Classifier::new().classify("Then pay", StepResult::Failed(&cause));
        assert_eq!(out.outcome, Outcome::Failed);

        let deep = wrapped(
            Cause::new("StateError", "x").caused_by(Cause::new("TBDError", "")),
        );
        let out = Classifier::new().classify("Then pay", StepResult::Failed(&deep));
        assert_eq!(out.outcome, Outcome::Failed);
    }

    #[test]
    fn failure_renders_inner_cause_and_frames() {
        let cause = wrapped(
            Cause::new("AssertionError", "expected 2 got 3")
                .with_frames(["at steps::pay (steps.rs:10)", "at runner::run (runner.rs:3)"]),
        );
        let out = Classifier::new().classify("Then pay", StepResult::Failed(&cause));

        assert_eq!(out.level(), Level::Fail);
        assert_eq!(out.message, "Then pay");
        assert_eq!(
            out.cause_chain.as_deref(),
            Some(
                "AssertionError: expected 2 got 3\n\
                 at steps::pay (steps.rs:10)\n\
                 at runner::run (runner.rs:3)\n",
            ),
        );
        assert!(out.screenshot.is_none());

        let rendered = out.render(None);
        assert!(rendered.starts_with("<big>Then pay</big><br><pre>AssertionError"));
        assert!(rendered.ends_with("</pre>"));
    }

    #[test]
    fn failure_takes_screenshot() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut classifier = Classifier::with_screenshots(move || -> io::Result<Option<PathBuf>> {
            let _ = counter.fetch_add(1, Ordering::SeqCst);
            Ok(Some(PathBuf::from("img/fail.png")))
        });

        let cause = wrapped(Cause::new("Boom", ""));
        let out = classifier.classify("Then pay", StepResult::Failed(&cause));
        assert_eq!(out.screenshot, Some(PathBuf::from("img/fail.png")));

        drop(classifier.classify("Given a user", StepResult::Success));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_capture_still_fails_step() {
        let mut classifier = Classifier::with_screenshots(|| -> io::Result<Option<PathBuf>> {
            Err(io::Error::new(io::ErrorKind::Other, "driver gone"))
        });

        let cause = Cause::new("Boom", "");
        let out = classifier.classify("Then pay", StepResult::Failed(&cause));
        assert_eq!(out.level(), Level::Fail);
        assert!(out.screenshot.is_none());
        assert_eq!(out.cause_chain.as_deref(), Some("Boom\n"));
    }

    #[test]
    fn logs_outcome_with_screenshot_markup() {
        let mut report = Memory::new();
        let node = report.start_node("Scenario").unwrap();
        let outcome = StepOutcome {
            outcome: Outcome::Failed,
            message: "Then pay".into(),
            screenshot: Some(PathBuf::from("img/fail.png")),
            cause_chain: Some("Boom\n".into()),
        };

        log_outcome(&mut report, node, &outcome).unwrap();

        let node = report.node(node).unwrap();
        assert_eq!(node.screenshots, [PathBuf::from("img/fail.png")]);
        assert_eq!(node.log[0].level, Level::Fail);
        assert!(node.log[0].message.contains("src='img/fail.png'"));
        assert!(node.log[0].message.ends_with("<br><pre>Boom\n</pre>"));
    }

    #[test]
    fn step_result_of_event() {
        let event = LifecycleEvent::StepPending { step: "x".into() };
        assert!(matches!(
            StepResult::of(&event),
            Some(("x", StepResult::Pending)),
        ));
        assert!(StepResult::of(&LifecycleEvent::ScenarioEnd).is_none());
    }
}
