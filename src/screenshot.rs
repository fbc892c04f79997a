// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Screenshots taken when a step fails.
//!
//! Acquiring and driving a browser or a device is up to the story runner: this
//! module only defines what the reporting layer needs from it.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    process,
    sync::atomic::{AtomicUsize, Ordering},
};

use crate::report::Layout;

/// Capturer of a screenshot at the moment a step fails.
///
/// Called synchronously on the failing thread, before the failure is logged,
/// so the artifact exists before anything references it.
pub trait ScreenshotCapture {
    /// Captures a screenshot, returning the path of the stored artifact.
    ///
    /// Returns [`None`] if there is no live driver to take it from.
    ///
    /// # Errors
    ///
    /// If the screenshot cannot be taken or stored.
    fn capture(&mut self) -> io::Result<Option<PathBuf>>;
}

impl<F> ScreenshotCapture for F
where
    F: FnMut() -> io::Result<Option<PathBuf>>,
{
    fn capture(&mut self) -> io::Result<Option<PathBuf>> {
        self()
    }
}

/// Live driver handle able to render its current screen.
pub trait Driver {
    /// Returns the current screen as PNG bytes.
    ///
    /// # Errors
    ///
    /// If the driver session is gone.
    fn screenshot_png(&self) -> io::Result<Vec<u8>>;
}

/// Process-wide counter keeping names of concurrently taken screenshots
/// unique.
static NEXT_CAPTURE: AtomicUsize = AtomicUsize::new(0);

/// [`ScreenshotCapture`] storing PNG screenshots of an optional [`Driver`]
/// into a folder.
pub struct DriverScreenshots<D> {
    /// Driver to take screenshots from, if any.
    driver: Option<D>,

    /// Folder to store screenshots in.
    dir: PathBuf,
}

// Implemented manually to omit redundant `D: Debug` trait bound, imposed by
// `#[derive(Debug)]`.
impl<D> fmt::Debug for DriverScreenshots<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverScreenshots")
            .field("driver", &self.driver.as_ref().map(|_| ".."))
            .field("dir", &self.dir)
            .finish()
    }
}

impl<D> DriverScreenshots<D> {
    /// Creates a new [`DriverScreenshots`] storing into the given `dir`.
    ///
    /// With no `driver`, no screenshot is ever taken.
    #[must_use]
    pub fn new(driver: Option<D>, dir: impl Into<PathBuf>) -> Self {
        Self {
            driver,
            dir: dir.into(),
        }
    }

    /// Creates a new [`DriverScreenshots`] storing into the
    /// [`Layout::image_dir()`] of the current run.
    #[must_use]
    pub fn for_layout(driver: Option<D>, layout: &Layout) -> Self {
        Self::new(driver, layout.image_dir())
    }

    /// Returns the folder screenshots are stored in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl<D: Driver> ScreenshotCapture for DriverScreenshots<D> {
    fn capture(&mut self) -> io::Result<Option<PathBuf>> {
        let Some(driver) = &self.driver else {
            return Ok(None);
        };

        let png = driver.screenshot_png()?;
        fs::create_dir_all(&self.dir)?;
        let n = NEXT_CAPTURE.fetch_add(1, Ordering::Relaxed);
        let path = self.dir.join(format!("capture-{}-{n}.png", process::id()));
        fs::write(&path, png)?;
        Ok(Some(path))
    }
}
