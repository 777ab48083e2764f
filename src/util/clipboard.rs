//! Copying screenshots to the clipboard
//!
//! An in-process clipboard (through `arboard`) is tried first where its
//! contents outlive this process. Otherwise the image is encoded as PNG and
//! piped into `wl-copy` on Wayland or `xclip` on X11. Both tools fork into
//! the background to keep serving the selection, so the copy survives this
//! process exiting.

use std::{
    borrow::Cow,
    io::{Read, Seek, SeekFrom, Write},
    process::{Command, Stdio},
};

use crate::{
    capture::{ImageBuffer, probe::probe_clipboard},
    error::{CaptureError, CaptureResult},
    model::{ExternalProgram, SessionType},
    util::encode::{ImageFormat, encode_image},
};

/// Whether clipboard contents set in-process survive this process exiting
///
/// X11 and Wayland selections are served by the process that owns them, so
/// a short-lived copy vanishes on exit unless a clipboard manager happens
/// to take it over. There the external tools are used instead.
pub const IN_PROCESS_PERSISTS: bool = !cfg!(target_os = "linux");

/// How a screenshot reached the clipboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardMethod {
    InProcess,
    External,
}

/// External clipboard programs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardTool {
    WlCopy,
    Xclip,
}

impl ClipboardTool {
    /// Probe order for a session
    pub fn priority_for(session: SessionType) -> Vec<ClipboardTool> {
        match session {
            SessionType::Wayland => vec![ClipboardTool::WlCopy, ClipboardTool::Xclip],
            _ => vec![ClipboardTool::Xclip, ClipboardTool::WlCopy],
        }
    }

    /// Arguments that make the tool read `mime` data from stdin
    pub fn args(&self, mime: &str) -> Vec<String> {
        match self {
            ClipboardTool::WlCopy => vec!["--type".to_string(), mime.to_string()],
            ClipboardTool::Xclip => vec![
                "-selection".to_string(),
                "clipboard".to_string(),
                "-t".to_string(),
                mime.to_string(),
                "-i".to_string(),
            ],
        }
    }
}

impl ExternalProgram for ClipboardTool {
    fn program(&self) -> &'static str {
        match self {
            ClipboardTool::WlCopy => "wl-copy",
            ClipboardTool::Xclip => "xclip",
        }
    }
}

/// Pipes `data` into `program`
///
/// Only the direct child is waited for. Its stderr goes to an anonymous
/// temp file rather than a pipe: clipboard tools leave a background process
/// holding stderr open, and reading a pipe to EOF would block until that
/// process quits.
pub fn pipe_to_program(program: &str, args: &[String], data: &[u8]) -> CaptureResult<()> {
    let failed = |reason: String| CaptureError::ClipboardFailed { reason };

    let mut stderr_log = tempfile::tempfile()
        .map_err(|e| failed(format!("failed to create stderr log for {}: {}", program, e)))?;
    let child_stderr = stderr_log
        .try_clone()
        .map_err(|e| failed(format!("failed to create stderr log for {}: {}", program, e)))?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::from(child_stderr))
        .spawn()
        .map_err(|e| failed(format!("failed to start {}: {}", program, e)))?;

    // Dropping stdin after the write lets the tool see EOF
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(data),
        None => Ok(()),
    };

    let status = child
        .wait()
        .map_err(|e| failed(format!("failed to wait for {}: {}", program, e)))?;

    if !status.success() {
        let mut stderr = String::new();
        if let Err(e) = stderr_log
            .seek(SeekFrom::Start(0))
            .and_then(|_| stderr_log.read_to_string(&mut stderr))
        {
            tracing::debug!("Could not read stderr of {}: {}", program, e);
        }
        return Err(failed(format!("{} {} ({})", program, status, stderr.trim())));
    }

    written.map_err(|e| failed(format!("failed to write to {}: {}", program, e)))
}

/// Sets the clipboard image through the platform clipboard API
pub fn copy_in_process(image: &ImageBuffer) -> CaptureResult<()> {
    let failed = |reason: String| CaptureError::ClipboardFailed { reason };

    if !IN_PROCESS_PERSISTS {
        return Err(failed(
            "the in-process clipboard is cleared when this process exits".to_string(),
        ));
    }

    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| failed(format!("clipboard unavailable: {}", e)))?;
    clipboard
        .set_image(arboard::ImageData {
            width:  width as usize,
            height: height as usize,
            bytes:  Cow::Owned(rgba.into_raw()),
        })
        .map_err(|e| failed(format!("clipboard rejected the image: {}", e)))
}

/// Pipes PNG bytes into the first installed clipboard tool
pub fn copy_via_program(png: &[u8], session: SessionType) -> CaptureResult<()> {
    let tool = probe_clipboard(&ClipboardTool::priority_for(session)).ok_or_else(|| {
        CaptureError::ClipboardFailed {
            reason: "neither wl-copy nor xclip is installed".to_string(),
        }
    })?;

    tracing::debug!(tool = tool.program(), bytes = png.len(), "Copying screenshot to clipboard");
    pipe_to_program(tool.program(), &tool.args(ImageFormat::Png.mime_type()), png)?;
    tracing::info!("Copied screenshot to clipboard via {}", tool.program());
    Ok(())
}

/// Copies a screenshot to the clipboard
pub fn copy_image(image: &ImageBuffer, session: SessionType) -> CaptureResult<ClipboardMethod> {
    copy_with_fallback(image, copy_in_process, |png| copy_via_program(png, session))
}

/// Tries `in_process` first, then hands PNG bytes to `external`
pub fn copy_with_fallback<I, E>(
    image: &ImageBuffer,
    in_process: I,
    external: E,
) -> CaptureResult<ClipboardMethod>
where
    I: FnOnce(&ImageBuffer) -> CaptureResult<()>,
    E: FnOnce(&[u8]) -> CaptureResult<()>,
{
    let in_process_error = match in_process(image) {
        Ok(()) => {
            tracing::info!("Copied screenshot to the in-process clipboard");
            return Ok(ClipboardMethod::InProcess);
        }
        Err(e) => e,
    };
    tracing::debug!("In-process clipboard skipped: {}", in_process_error);

    let png = encode_image(image, ImageFormat::Png)?;
    external(&png).map_err(|e| CaptureError::ClipboardFailed {
        reason: format!("{}; {}", failure_reason(in_process_error), failure_reason(e)),
    })?;
    Ok(ClipboardMethod::External)
}

fn failure_reason(error: CaptureError) -> String {
    match error {
        CaptureError::ClipboardFailed { reason } => reason,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wayland_prefers_wl_copy() {
        assert_eq!(
            ClipboardTool::priority_for(SessionType::Wayland)[0],
            ClipboardTool::WlCopy
        );
        assert_eq!(ClipboardTool::priority_for(SessionType::X11)[0], ClipboardTool::Xclip);
    }

    #[test]
    fn test_xclip_arguments() {
        assert_eq!(
            ClipboardTool::Xclip.args("image/png"),
            vec!["-selection", "clipboard", "-t", "image/png", "-i"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_pipe_delivers_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let sink = dir.path().join("clip.bin");
        let args = vec![
            "-c".to_string(),
            "cat > \"$0\"".to_string(),
            sink.to_string_lossy().into_owned(),
        ];

        pipe_to_program("sh", &args, b"png bytes").unwrap();
        assert_eq!(std::fs::read(&sink).unwrap(), b"png bytes");
    }

    #[cfg(unix)]
    #[test]
    fn test_pipe_reports_failure() {
        let args = vec!["-c".to_string(), "cat > /dev/null; echo nope >&2; exit 1".to_string()];
        let err = pipe_to_program("sh", &args, b"data").unwrap_err();
        assert!(matches!(err, CaptureError::ClipboardFailed { ref reason } if reason.contains("nope")));
    }

    #[cfg(unix)]
    #[test]
    fn test_background_child_does_not_block_copy() {
        use std::time::{Duration, Instant};

        // Mimics xclip: consume stdin, leave a process behind, exit 0
        let args = vec![
            "-c".to_string(),
            "cat > /dev/null; (sleep 5 &); exit 0".to_string(),
        ];

        let start = Instant::now();
        pipe_to_program("sh", &args, b"png").unwrap();
        assert!(
            start.elapsed() < Duration::from_secs(2),
            "copy waited for the background child: {:?}",
            start.elapsed()
        );
    }

    #[test]
    fn test_missing_program() {
        let err = pipe_to_program("gscreenshot-no-such-clipboard", &[], b"").unwrap_err();
        assert!(err.to_string().contains("failed to start"));
    }

    #[cfg(unix)]
    #[test]
    fn test_falls_back_to_program_when_in_process_fails() {
        let dir = tempfile::tempdir().unwrap();
        let sink = dir.path().join("clip.png");
        let args = vec![
            "-c".to_string(),
            "cat > \"$0\"".to_string(),
            sink.to_string_lossy().into_owned(),
        ];
        let image = ImageBuffer::from_test_pattern(16, 8);

        let method = copy_with_fallback(
            &image,
            |_| {
                Err(CaptureError::ClipboardFailed {
                    reason: "no display".to_string(),
                })
            },
            |png| pipe_to_program("sh", &args, png),
        )
        .unwrap();

        assert_eq!(method, ClipboardMethod::External);
        assert_eq!(ImageBuffer::load(&sink).unwrap().dimensions(), (16, 8));
    }

    #[test]
    fn test_in_process_success_skips_program() {
        let image = ImageBuffer::from_test_pattern(4, 4);
        let method = copy_with_fallback(
            &image,
            |_| Ok(()),
            |_| panic!("external clipboard tool should not run"),
        )
        .unwrap();
        assert_eq!(method, ClipboardMethod::InProcess);
    }

    #[test]
    fn test_both_failures_are_reported() {
        let image = ImageBuffer::from_test_pattern(4, 4);
        let err = copy_with_fallback(
            &image,
            |_| {
                Err(CaptureError::ClipboardFailed {
                    reason: "no display".to_string(),
                })
            },
            |_| {
                Err(CaptureError::ClipboardFailed {
                    reason: "xclip exit status: 1".to_string(),
                })
            },
        )
        .unwrap_err();

        match err {
            CaptureError::ClipboardFailed { reason } => {
                assert!(reason.contains("no display"));
                assert!(reason.contains("xclip exit status: 1"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_in_process_declines_where_selection_dies_with_process() {
        let image = ImageBuffer::from_test_pattern(4, 4);
        assert!(matches!(
            copy_in_process(&image),
            Err(CaptureError::ClipboardFailed { .. })
        ));
    }
}
