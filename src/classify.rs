//! Turns a daemon answer into an [`Action`].
//!
//! Rules, first match wins:
//! 1. transport, I/O or daemon-reported failure: `Error`
//! 2. nothing changed: `Unchanged`
//! 3. diff requested but the diff headers are malformed: `Error`
//! 4. check or diff mode: `WouldBeReformatted`
//! 5. otherwise rewrite the file: `Reformatted`, or `Error` if that fails
//!
//! A protocol violation is never classified; it is handed back as a
//! [`RunError`] so the caller can stop the run.

use std::path::Path;

use crate::client::{DaemonFailure, DaemonResult};
use crate::error::{MalformedDiff, QueryError, RunError};
use crate::rewrite;
use crate::{Action, Mode};

/// Classification of one path plus what to show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Terminal outcome for the path.
    pub action: Action,
    /// Line for stderr describing the outcome.
    pub message: String,
    /// Diff to print on stdout, headers already pointing at the real path.
    pub diff: Option<Vec<u8>>,
}

impl Verdict {
    fn new(action: Action, message: String) -> Self {
        Self {
            action,
            message,
            diff: None,
        }
    }

    fn error(path: &Path, reason: impl std::fmt::Display) -> Self {
        Self::new(
            Action::Error,
            format!("error: cannot format {}: {}", path.display(), reason),
        )
    }
}

/// Classifies the daemon's answer for `path`, rewriting the file when the
/// mode allows it.
pub async fn classify(
    path: &Path,
    result: Result<DaemonResult, QueryError>,
    mode: Mode,
) -> Result<Verdict, RunError> {
    let content = match result {
        Err(QueryError::Protocol { path, status }) => {
            return Err(RunError::Protocol { path, status });
        }
        Err(err) => return Ok(Verdict::error(path, err)),
        Ok(DaemonResult::Failed(DaemonFailure { message, .. })) => {
            return Ok(Verdict::error(path, message));
        }
        Ok(DaemonResult::Unchanged) => {
            return Ok(Verdict::new(
                Action::Unchanged,
                format!("{} already well formatted, good job.", path.display()),
            ));
        }
        Ok(DaemonResult::Changed(content)) => content,
    };

    let diff = if mode.diff {
        match render_diff(path, &content) {
            Ok(rendered) => Some(rendered),
            Err(err) => return Ok(Verdict::error(path, err)),
        }
    } else {
        None
    };

    if mode.is_dry_run() {
        return Ok(Verdict {
            action: Action::WouldBeReformatted,
            message: format!("would reformat {}", path.display()),
            diff,
        });
    }

    match rewrite::overwrite(path, &content).await {
        Ok(()) => Ok(Verdict::new(
            Action::Reformatted,
            format!("reformatted {}", path.display()),
        )),
        Err(err) => Ok(Verdict::error(path, err)),
    }
}

/// Points the two header lines of a daemon diff at `path`.
///
/// The daemon names the sides of its diff after placeholders (`In`/`Out`,
/// or `STDIN`/`STDOUT` in newer releases). The first line must start with
/// `--- ` and the second with `+++ `; the placeholder is everything up to
/// the first tab. The rest of the diff is copied byte for byte.
pub fn render_diff(path: &Path, diff: &[u8]) -> Result<Vec<u8>, MalformedDiff> {
    let (old_header, rest) = split_line(diff).ok_or(MalformedDiff)?;
    let (new_header, body) = split_line(rest).ok_or(MalformedDiff)?;

    let shown = path.to_string_lossy();
    let mut out = Vec::with_capacity(diff.len() + 2 * shown.len());
    retarget_header(old_header, b"--- ", shown.as_bytes(), &mut out)?;
    retarget_header(new_header, b"+++ ", shown.as_bytes(), &mut out)?;
    out.extend_from_slice(body);
    Ok(out)
}

fn split_line(buf: &[u8]) -> Option<(&[u8], &[u8])> {
    let end = buf.iter().position(|&b| b == b'\n')?;
    Some(buf.split_at(end + 1))
}

fn retarget_header(
    line: &[u8],
    marker: &[u8],
    path: &[u8],
    out: &mut Vec<u8>,
) -> Result<(), MalformedDiff> {
    let named = line.strip_prefix(marker).ok_or(MalformedDiff)?;
    let name_len = named
        .iter()
        .position(|&b| matches!(b, b'\t' | b'\r' | b'\n'))
        .unwrap_or(named.len());
    if name_len == 0 {
        return Err(MalformedDiff);
    }
    out.extend_from_slice(marker);
    out.extend_from_slice(path);
    out.extend_from_slice(&named[name_len..]);
    Ok(())
}
