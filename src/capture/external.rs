//! External full-screen capture programs
//!
//! Every supported grabber is driven the same way:
//!
//! ```text
//! <program> <fixed args...> [cursor args...] <temp output path>
//! ```
//!
//! A run succeeds when the program exits with status 0 and leaves a readable
//! image at the temp path. The file is read into memory and deleted right
//! away; any other outcome is a [`CaptureError::BackendExecFailure`].

use std::{
    process::{Command, Stdio},
    thread,
    time::Duration,
};

use super::{BackendCapabilities, ImageBuffer, ScreenCapture};
use crate::{
    error::{CaptureError, CaptureResult},
    model::{BackendKind, ExternalProgram},
    util::temp_files::TempOutput,
};

/// Blocks for the countdown before a capture
///
/// A zero delay returns immediately.
pub fn wait_for_delay(delay: Duration) {
    if !delay.is_zero() {
        tracing::debug!("Waiting {:?} before capture", delay);
        thread::sleep(delay);
    }
}

/// Fixed argument template of a capture program
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgTemplate {
    /// Always passed
    pub base:           Vec<String>,
    /// Appended when the pointer should be drawn
    pub with_cursor:    Vec<String>,
    /// Appended when the pointer should be hidden
    pub without_cursor: Vec<String>,
}

impl ArgTemplate {
    /// Template with only fixed arguments
    pub fn fixed<I, S>(base: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            base: base.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Arguments for one run, without the output path
    pub fn args(&self, capture_cursor: bool) -> Vec<String> {
        let extra = if capture_cursor {
            &self.with_cursor
        } else {
            &self.without_cursor
        };
        self.base.iter().chain(extra.iter()).cloned().collect()
    }

    /// Template for a known backend
    pub fn for_kind(kind: BackendKind) -> Self {
        let strings = |args: &[&str]| args.iter().map(|a| a.to_string()).collect::<Vec<_>>();
        match kind {
            BackendKind::Scrot => Self {
                base:           strings(&["-z"]),
                with_cursor:    strings(&["-p"]),
                without_cursor: Vec::new(),
            },
            BackendKind::Maim => Self {
                base:           Vec::new(),
                with_cursor:    Vec::new(),
                without_cursor: strings(&["--hidecursor"]),
            },
            BackendKind::Imlib2 => Self::default(),
            BackendKind::ImageMagick => Self::fixed(["-window", "root"]),
            BackendKind::Grim => Self {
                base:           Vec::new(),
                with_cursor:    strings(&["-c"]),
                without_cursor: Vec::new(),
            },
        }
    }
}

/// Whether a known backend draws the pointer itself
pub fn kind_supports_cursor(kind: BackendKind) -> bool {
    match kind {
        BackendKind::Scrot | BackendKind::Maim | BackendKind::Grim => true,
        BackendKind::Imlib2 | BackendKind::ImageMagick => false,
    }
}

/// Backend adapter wrapping one external capture program
#[derive(Debug)]
pub struct ExternalBackend {
    name:            String,
    program:         String,
    template:        ArgTemplate,
    supports_cursor: bool,
    output:          TempOutput,
}

impl ExternalBackend {
    /// Creates the adapter for a known backend
    ///
    /// # Examples
    ///
    /// ```
    /// use gscreenshot::{
    ///     capture::{BackendCapabilities, ExternalBackend, ScreenCapture},
    ///     model::BackendKind,
    /// };
    ///
    /// let backend = ExternalBackend::new(BackendKind::Imlib2).unwrap();
    /// assert_eq!(backend.name(), "imlib2");
    /// assert!(!backend.supports_cursor());
    /// ```
    pub fn new(kind: BackendKind) -> CaptureResult<Self> {
        Ok(Self {
            name:            kind.as_str().to_string(),
            program:         kind.program().to_string(),
            template:        ArgTemplate::for_kind(kind),
            supports_cursor: kind_supports_cursor(kind),
            output:          TempOutput::new()?,
        })
    }

    /// Creates an adapter for an arbitrary program
    ///
    /// The output path is appended after the template's arguments.
    pub fn custom(
        name: impl Into<String>,
        program: impl Into<String>,
        template: ArgTemplate,
        supports_cursor: bool,
        output: TempOutput,
    ) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            template,
            supports_cursor,
            output,
        }
    }

    /// The program this adapter runs
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The temp hand-off path
    pub fn output(&self) -> &TempOutput {
        &self.output
    }

    fn failure(&self, reason: impl Into<String>) -> CaptureError {
        CaptureError::BackendExecFailure {
            backend: self.name.clone(),
            reason:  reason.into(),
        }
    }

    /// Runs the program once and loads its output
    fn run(&self, capture_cursor: bool) -> CaptureResult<ImageBuffer> {
        let path = self.output.path();
        // Never pick up a stale file from an earlier failed run.
        self.output.clear();

        let args = self.template.args(capture_cursor);
        tracing::debug!(program = %self.program, ?args, output = ?path, "Running capture program");

        let output = Command::new(&self.program)
            .args(&args)
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.failure(format!("failed to start {}: {}", self.program, e)))?;

        if !output.status.success() {
            self.output.clear();
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.failure(format!("{} ({})", output.status, stderr.trim())));
        }

        if !path.exists() {
            return Err(self.failure(format!("no output written to {}", path.display())));
        }

        let loaded = ImageBuffer::load(path);
        self.output.clear();
        loaded.map_err(|e| self.failure(e.to_string()))
    }
}

impl BackendCapabilities for ExternalBackend {
    fn supports_cursor(&self) -> bool {
        self.supports_cursor
    }
}

impl ScreenCapture for ExternalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn capture_fullscreen(
        &self,
        delay: Duration,
        capture_cursor: bool,
    ) -> CaptureResult<ImageBuffer> {
        wait_for_delay(delay);
        let image = self.run(capture_cursor)?;
        tracing::info!(
            backend = %self.name,
            width = image.width(),
            height = image.height(),
            "Captured full screen"
        );
        Ok(image)
    }
}
