//! Sending one file to the daemon and decoding the answer.

use std::path::Path;

use crate::client::connection::{Endpoint, FormatRequest, RawResponse, Transport};
use crate::error::QueryError;
use crate::FormatOptions;

/// Protocol version announced on every request.
pub const PROTOCOL_VERSION: &str = "1";

/// What the daemon said about one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaemonResult {
    /// Status 204: nothing to change.
    Unchanged,
    /// Status 200: new content, or a diff when one was requested.
    Changed(Vec<u8>),
    /// Status 400 or 500: the daemon refused the file.
    Failed(DaemonFailure),
}

/// Error reported by the daemon itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonFailure {
    /// True for a parse error in the submitted source (status 400).
    pub syntax: bool,
    /// Message from the response body.
    pub message: String,
}

/// Builds the `X-*` headers for a request.
pub fn request_headers(diff: bool, options: &FormatOptions) -> Vec<(&'static str, String)> {
    let mut headers = vec![("X-Protocol-Version", PROTOCOL_VERSION.to_string())];
    if diff {
        headers.push(("X-Diff", "1".to_string()));
    }
    if let Some(line_length) = options.line_length {
        headers.push(("X-Line-Length", line_length.to_string()));
    }
    if !options.target_versions.is_empty() {
        headers.push(("X-Python-Variant", options.target_versions.join(",")));
    }
    if options.skip_string_normalization {
        headers.push(("X-Skip-String-Normalization", "1".to_string()));
    }
    if options.skip_magic_trailing_comma {
        headers.push(("X-Skip-Magic-Trailing-Comma", "1".to_string()));
    }
    if options.preview {
        headers.push(("X-Preview", "1".to_string()));
    }
    if options.fast {
        headers.push(("X-Fast-Or-Safe", "fast".to_string()));
    }
    headers
}

/// Sends the file at `path` to `endpoint` and decodes the answer.
///
/// The whole file is buffered in memory and sent with a `Content-Length`
/// body; Python sources are small enough that streaming buys nothing.
///
/// Failing to read the file is reported as [`QueryError::Io`], a network
/// failure as [`QueryError::Transport`]; both only concern this path.
/// A status outside the contract is [`QueryError::Protocol`], which the
/// caller must treat as fatal.
pub async fn query(
    transport: &dyn Transport,
    endpoint: &Endpoint,
    path: &Path,
    diff: bool,
    options: &FormatOptions,
) -> Result<DaemonResult, QueryError> {
    let body = tokio::fs::read(path).await.map_err(|source| QueryError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!("sending {} ({} bytes) to {}", path.display(), body.len(), endpoint);
    let request = FormatRequest {
        body,
        headers: request_headers(diff, options),
    };
    let response = transport
        .send(endpoint, request)
        .await
        .map_err(|e| QueryError::Transport {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    decode(path, response)
}

/// Maps a status code and body onto a [`DaemonResult`].
pub fn decode(path: &Path, response: RawResponse) -> Result<DaemonResult, QueryError> {
    match response.status {
        204 => Ok(DaemonResult::Unchanged),
        200 => Ok(DaemonResult::Changed(response.body)),
        400 => Ok(DaemonResult::Failed(DaemonFailure {
            syntax: true,
            message: body_text(&response.body),
        })),
        500 => Ok(DaemonResult::Failed(DaemonFailure {
            syntax: false,
            message: body_text(&response.body),
        })),
        status => Err(QueryError::Protocol {
            path: path.to_path_buf(),
            status,
        }),
    }
}

fn body_text(body: &[u8]) -> String {
    String::from_utf8_lossy(body).trim_end().to_string()
}
