// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! On-disk layout of report artifacts.

use std::path::{Path, PathBuf};

use smart_default::SmartDefault;

/// Folder layout of the report artifacts of a single run:
/// ```text
/// <reports_dir>/<run_instance>/<report_name>.<ext>
/// <reports_dir>/<run_instance>/img/<screenshot>
/// ```
#[derive(Clone, Debug, Eq, PartialEq, SmartDefault)]
pub struct Layout {
    /// Container folder of all the runs.
    #[default(PathBuf::from("reports"))]
    pub reports_dir: PathBuf,

    /// Identifier of the current run.
    #[default("local".to_owned())]
    pub run_instance: String,

    /// File stem of the report artifact.
    #[default("StoryReport".to_owned())]
    pub report_name: String,
}

impl Layout {
    /// Creates a new [`Layout`].
    #[must_use]
    pub fn new(
        reports_dir: impl Into<PathBuf>,
        run_instance: impl Into<String>,
        report_name: impl Into<String>,
    ) -> Self {
        Self {
            reports_dir: reports_dir.into(),
            run_instance: run_instance.into(),
            report_name: report_name.into(),
        }
    }

    /// Returns the folder of the current run.
    #[must_use]
    pub fn run_dir(&self) -> PathBuf {
        self.reports_dir.join(&self.run_instance)
    }

    /// Returns the path of the report artifact with the given extension.
    #[must_use]
    pub fn artifact_path(&self, ext: &str) -> PathBuf {
        self.run_dir().join(format!("{}.{ext}", self.report_name))
    }

    /// Returns the folder screenshots of the current run are stored in.
    #[must_use]
    pub fn image_dir(&self) -> PathBuf {
        self.run_dir().join("img")
    }

    /// Returns the path of an image, relative to a sibling folder of the
    /// run folder, as referenced from rendered pages.
    #[must_use]
    pub fn relative_image_path(&self, file: impl AsRef<Path>) -> String {
        format!(
            "../{}/img/{}",
            self.run_instance,
            file.as_ref().display(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout() {
        let layout = Layout::default();

        assert_eq!(layout.run_dir(), Path::new("reports/local"));
        assert_eq!(
            layout.artifact_path("json"),
            Path::new("reports/local/StoryReport.json"),
        );
        assert_eq!(layout.image_dir(), Path::new("reports/local/img"));
    }

    #[test]
    fn relative_image_path() {
        let layout = Layout::new("out", "run-42", "Report");

        assert_eq!(
            layout.relative_image_path("shot.png"),
            "../run-42/img/shot.png",
        );
    }
}
