//! Interactive region selection through slop or slurp
//!
//! The selector is asked to print the picked geometry as four integers,
//! `x y width height`. Window picking and area dragging are the same
//! interaction: clicking a window selects its frame.

use std::process::{Command, Stdio};

use super::{RegionSelector, SelectionOutcome};
use crate::model::{Region, SelectorKind};

/// Output format handed to the selector
pub const GEOMETRY_FORMAT: &str = "%x %y %w %h";

/// Parses selector output into a region
///
/// Accepts exactly four integers separated by whitespace and/or commas,
/// read as origin and size.
///
/// # Examples
///
/// ```
/// use gscreenshot::{capture::selector::parse_geometry, model::Region};
///
/// assert_eq!(parse_geometry("10 10 100 50\n"), Some(Region::new(10, 10, 110, 60)));
/// assert_eq!(parse_geometry("10,10,100,50"), Some(Region::new(10, 10, 110, 60)));
/// assert_eq!(parse_geometry("X=10 Y=10"), None);
/// ```
pub fn parse_geometry(output: &str) -> Option<Region> {
    let numbers = output
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| token.parse::<i32>().ok())
        .collect::<Option<Vec<_>>>()?;

    match numbers.as_slice() {
        [x, y, width, height] if *width >= 0 && *height >= 0 => {
            Some(Region::from_geometry(*x, *y, *width, *height))
        }
        _ => None,
    }
}

/// Whether a failed selector run was the user backing out
///
/// Exit codes cannot tell a cancel apart from a crash: both selectors use
/// status 1 for either. Cancelling prints
///
/// - slop: "Selection was cancelled by keystroke or right-click." (escape,
///   any key or right-click)
/// - slurp: "selection cancelled" (escape or right-click)
///
/// If a selector update rewords these, cancels show up as `ExecFailure`
/// with that text in the reason and fall back to a full capture.
fn is_cancellation(stderr: &str) -> bool {
    stderr.to_lowercase().contains("cancel")
}

/// Selector adapter wrapping one external program
#[derive(Debug, Clone)]
pub struct ExternalSelector {
    name:    String,
    program: String,
    args:    Vec<String>,
}

impl ExternalSelector {
    /// Creates the adapter for a known selector
    pub fn new(kind: SelectorKind) -> Self {
        Self {
            name:    kind.as_str().to_string(),
            program: kind.as_str().to_string(),
            args:    vec!["-f".to_string(), GEOMETRY_FORMAT.to_string()],
        }
    }

    /// Creates an adapter for an arbitrary program
    pub fn custom<I, S>(name: impl Into<String>, program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name:    name.into(),
            program: program.into(),
            args:    args.into_iter().map(Into::into).collect(),
        }
    }
}

impl RegionSelector for ExternalSelector {
    fn name(&self) -> &str {
        &self.name
    }

    fn select_region(&self) -> SelectionOutcome {
        tracing::debug!(program = %self.program, args = ?self.args, "Running region selector");

        let output = match Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                return SelectionOutcome::ExecFailure {
                    reason: format!("failed to start {}: {}", self.program, e),
                };
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            if is_cancellation(&stderr) {
                return SelectionOutcome::Cancelled;
            }
            return SelectionOutcome::ExecFailure {
                reason: format!("{} ({})", output.status, stderr.trim()),
            };
        }

        match parse_geometry(&stdout) {
            Some(region) => SelectionOutcome::Selected(region),
            None => SelectionOutcome::ParseFailure {
                output: stdout.trim().to_string(),
            },
        }
    }
}
