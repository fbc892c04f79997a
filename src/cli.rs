// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Command line options of the reporting layer.
//!
//! [`Opts`] is meant to be flattened into the story runner's own CLI:
//! ```rust
//! # use clap::Parser as _;
//! #[derive(clap::Parser)]
//! struct Runner {
//!     #[command(flatten)]
//!     report: story_report::cli::Opts,
//! }
//!
//! let cli = Runner::parse_from(["runner", "--concurrent", "--run-instance", "ci-7"]);
//! assert!(cli.report.mode().is_concurrent());
//! assert_eq!(cli.report.layout().run_dir(), std::path::Path::new("reports/ci-7"));
//! ```

use std::path::PathBuf;

use smart_default::SmartDefault;

#[cfg(feature = "output-json")]
use crate::report::JsonReport;
use crate::{multiplexer::ConcurrencyMode, report::Layout, sink::Coloring};

/// CLI options of the reporting layer.
#[derive(Clone, Debug, SmartDefault, clap::Args)]
#[group(skip)]
pub struct Opts {
    /// Folder to store the report artifacts of all the runs in.
    #[arg(long, value_name = "PATH", default_value = "reports")]
    #[default(PathBuf::from("reports"))]
    pub reports_dir: PathBuf,

    /// Identifier of the current run, naming its artifacts folder.
    #[arg(long, value_name = "ID", default_value = "local")]
    #[default("local".to_owned())]
    pub run_instance: String,

    /// File stem of the report artifact.
    #[arg(long, value_name = "NAME", default_value = "StoryReport")]
    #[default("StoryReport".to_owned())]
    pub report_name: String,

    /// Run stories concurrently, replaying each story's events into the
    /// shared report at once.
    #[arg(long)]
    pub concurrent: bool,

    /// Don't replay deferred events automatically at the end of a story.
    #[arg(long)]
    pub no_replay_on_story_end: bool,

    /// Coloring policy for a console output.
    #[arg(long, value_name = "auto|always|never", default_value = "auto")]
    #[default(Coloring::Auto)]
    pub color: Coloring,

    /// Filter directive of the diagnostics, overridden by `RUST_LOG`.
    #[arg(long, value_name = "DIRECTIVE", default_value = "info")]
    #[default("info".to_owned())]
    pub log_level: String,

    /// Environment information to record into the report artifact.
    #[arg(long, value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub system_info: Vec<(String, String)>,
}

impl Opts {
    /// Returns the selected [`ConcurrencyMode`].
    #[must_use]
    pub const fn mode(&self) -> ConcurrencyMode {
        if self.concurrent {
            ConcurrencyMode::Concurrent
        } else {
            ConcurrencyMode::Sequential
        }
    }

    /// Indicates whether deferred events should be replayed at the end of a
    /// story.
    #[must_use]
    pub const fn replay_on_story_end(&self) -> bool {
        !self.no_replay_on_story_end
    }

    /// Returns the [`Layout`] of the report artifacts.
    #[must_use]
    pub fn layout(&self) -> Layout {
        Layout::new(
            self.reports_dir.clone(),
            self.run_instance.clone(),
            self.report_name.clone(),
        )
    }

    /// Creates a [`JsonReport`] according to these [`Opts`].
    #[cfg(feature = "output-json")]
    #[must_use]
    pub fn json_report(&self) -> JsonReport {
        self.system_info
            .iter()
            .fold(JsonReport::new(self.layout()), |report, (k, v)| {
                report.with_system_info(k.clone(), v.clone())
            })
    }

    /// Installs the diagnostics subscriber filtered by
    /// [`Opts::log_level`].
    ///
    /// Returns `false` if a global subscriber was already installed.
    pub fn init_logging(&self) -> bool {
        crate::logging::init(&self.log_level)
    }
}

/// Parses a `KEY=VALUE` pair.
///
/// # Errors
///
/// If there is no `=` or the key is empty.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => {
            Ok((k.trim().to_owned(), v.trim().to_owned()))
        }
        _ => Err(format!("expected `KEY=VALUE`, got `{s}`")),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::Parser as _;

    use super::*;

    #[derive(clap::Parser)]
    struct Cli {
        #[command(flatten)]
        opts: Opts,
    }

    fn parse(args: &[&str]) -> Opts {
        Cli::try_parse_from(std::iter::once("test").chain(args.iter().copied()))
            .unwrap()
            .opts
    }

    #[test]
    fn defaults_match_default_impl() {
        let parsed = parse(&[]);
        let default = Opts::default();

        assert_eq!(parsed.layout(), default.layout());
        assert_eq!(parsed.layout(), Layout::default());
        assert_eq!(parsed.mode(), ConcurrencyMode::Sequential);
        assert!(parsed.replay_on_story_end());
        assert_eq!(parsed.color, Coloring::Auto);
        assert_eq!(parsed.log_level, "info");
        assert_eq!(default.log_level, "info");
        assert!(parsed.system_info.is_empty());
    }

    #[test]
    fn parses_all_options() {
        let opts = parse(&[
            "--reports-dir",
            "out",
            "--run-instance",
            "nightly",
            "--report-name",
            "Smoke",
            "--concurrent",
            "--no-replay-on-story-end",
            "--color",
            "never",
            "--system-info",
            "User Name=qa",
            "--system-info",
            "Environment = staging",
        ]);

        assert_eq!(opts.mode(), ConcurrencyMode::Concurrent);
        assert!(!opts.replay_on_story_end());
        assert_eq!(opts.color, Coloring::Never);
        assert_eq!(
            opts.layout().artifact_path("json"),
            Path::new("out/nightly/Smoke.json"),
        );
        assert_eq!(
            opts.system_info,
            [
                ("User Name".to_owned(), "qa".to_owned()),
                ("Environment".to_owned(), "staging".to_owned()),
            ],
        );
    }

    #[test]
    fn rejects_malformed_system_info() {
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
        assert_eq!(parse_key_value("k="), Ok(("k".to_owned(), String::new())));

        let res = Cli::try_parse_from(["test", "--system-info", "oops"]);
        assert!(res.is_err());
    }
}
