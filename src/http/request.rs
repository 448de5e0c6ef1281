use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};
use tracing::debug;

use crate::http::{
    body::Body,
    headers::Headers,
    request_line::{RequestLine, parse_request_line},
    router::PathParams,
    status::StatusCode,
};

/// Upper bound for the buffer reserved up front for a body, whatever `Content-Length` claims.
const MAX_BODY_PREALLOCATION: usize = 64 * 1024;

/// Longest request or header line accepted, terminator included.
const MAX_LINE_LENGTH: u64 = 8 * 1024;

/// Most header lines read before the header block is rejected.
const MAX_HEADER_LINES: usize = 100;

/// Representation of a HTTP request with request line, headers and body
#[derive(Debug)]
pub struct Request {
    /// A custom struct representing the request line.
    pub request_line: RequestLine,
    /// A custom struct representing a list of headers.
    pub headers: Headers,
    /// The request body (can be empty).
    pub body: Body,
    /// Parameters captured by the router from the request path.
    path_params: PathParams,
}

/// Represents the kind of error that can occur while parsing a request or writing a response
#[derive(Error, Debug)]
pub enum HttpError {
    /// The stream ended before any byte of a request line arrived.
    #[error("connection closed before a request line was received")]
    ConnectionClosed,

    /// The request line is not exactly three space separated tokens, or is too long.
    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),

    /// The stream ended before the blank line terminating the header block, or the block
    /// exceeded the line length or line count limits.
    #[error("failed to read header line")]
    HeaderRead,

    /// The `Content-Length` header is not a non-negative integer.
    #[error("invalid Content-Length value: {0:?}")]
    InvalidContentLength(String),

    /// The stream ended before `Content-Length` body bytes were read.
    #[error("failed to read full request body: expected {expected} bytes, received {received}")]
    TruncatedBody {
        /// Bytes announced by `Content-Length`.
        expected: usize,
        /// Bytes actually available.
        received: usize,
    },

    /// Reading the request from the stream failed.
    #[error("failed to read request: {0}")]
    StreamFault(#[source] std::io::Error),

    /// There was a generic IO error, e.g. while writing a response.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON response body could not be encoded.
    #[error("failed to encode JSON body: {0}")]
    Json(#[from] serde_json::Error),
}

impl HttpError {
    /// The status code suggested for answering the client.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Io(_) | Self::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// One line read from the stream.
enum Line {
    /// A line with its terminator stripped.
    Complete(String),
    /// The stream ended after these bytes, before a line terminator.
    Incomplete(String),
    /// No terminator within `MAX_LINE_LENGTH` bytes.
    TooLong,
    /// The stream ended before any byte.
    Closed,
}

/// Parses the contents of a buffered reader to a Request
///
/// Reads the request line, the header block and exactly `Content-Length` body bytes. No
/// byte past the body is consumed, so whatever follows stays in the reader.
///
/// # Errors
///
/// Throws a `HttpError` if the request was not valid or the stream failed.
pub async fn request_from_reader<R: AsyncBufRead + Unpin>(
    reader: &mut R,
) -> Result<Request, HttpError> {
    let request_line = match read_line(reader).await? {
        Line::Complete(line) => parse_request_line(&line)?,
        Line::Incomplete(partial) => return Err(HttpError::MalformedRequestLine(partial)),
        Line::TooLong => {
            return Err(HttpError::MalformedRequestLine(
                "request line too long".to_string(),
            ));
        }
        Line::Closed => return Err(HttpError::ConnectionClosed),
    };

    let mut headers = Headers::new();
    let mut header_lines = 0;
    loop {
        match read_line(reader).await? {
            Line::Complete(line) if line.is_empty() => break,
            Line::Complete(_) if header_lines == MAX_HEADER_LINES => {
                debug!(limit = MAX_HEADER_LINES, "too many header lines");
                return Err(HttpError::HeaderRead);
            }
            Line::Complete(line) => {
                header_lines += 1;
                if !headers.parse_header_line(&line) {
                    debug!(line = %line, "ignoring malformed header");
                }
            }
            Line::TooLong => {
                debug!(limit = MAX_LINE_LENGTH, "header line too long");
                return Err(HttpError::HeaderRead);
            }
            Line::Incomplete(_) | Line::Closed => return Err(HttpError::HeaderRead),
        }
    }

    let body = match headers.get("Content-Length") {
        None => Body::empty(),
        Some(value) => {
            let content_length = parse_content_length(value)?;
            read_body(reader, content_length).await?
        }
    };

    Ok(Request::new(request_line, headers, body))
}

/// Reads up to and including the next `\n`, stripping a trailing CRLF or bare LF.
///
/// Never buffers more than `MAX_LINE_LENGTH` bytes for one line.
async fn read_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Line, HttpError> {
    let mut raw = Vec::new();
    let read = (&mut *reader)
        .take(MAX_LINE_LENGTH)
        .read_until(b'\n', &mut raw)
        .await
        .map_err(HttpError::StreamFault)?;
    if read == 0 {
        return Ok(Line::Closed);
    }

    let Some(stripped) = raw.strip_suffix(b"\n") else {
        if u64::try_from(raw.len()).is_ok_and(|length| length >= MAX_LINE_LENGTH) {
            return Ok(Line::TooLong);
        }
        return Ok(Line::Incomplete(String::from_utf8_lossy(&raw).into_owned()));
    };
    let stripped = stripped.strip_suffix(b"\r").unwrap_or(stripped);

    Ok(Line::Complete(String::from_utf8_lossy(stripped).into_owned()))
}

/// Accepts only a non-empty run of ASCII digits that fits into `usize`.
fn parse_content_length(value: &str) -> Result<usize, HttpError> {
    let invalid = || HttpError::InvalidContentLength(value.to_string());

    if value.is_empty() || !value.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(invalid());
    }

    value.parse().map_err(|_| invalid())
}

async fn read_body<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    content_length: usize,
) -> Result<Body, HttpError> {
    let mut buffer = Vec::with_capacity(content_length.min(MAX_BODY_PREALLOCATION));
    let limit = u64::try_from(content_length).unwrap_or(u64::MAX);
    let received = (&mut *reader)
        .take(limit)
        .read_to_end(&mut buffer)
        .await
        .map_err(HttpError::StreamFault)?;

    if received < content_length {
        return Err(HttpError::TruncatedBody {
            expected: content_length,
            received,
        });
    }

    Ok(Body::from_bytes(buffer))
}

impl Request {
    /// Assembles a request with no path parameters.
    #[must_use]
    pub fn new(request_line: RequestLine, headers: Headers, body: Body) -> Self {
        Self {
            request_line,
            headers,
            body,
            path_params: PathParams::new(),
        }
    }

    /// The request method, e.g. `GET`.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.request_line.method
    }

    /// The raw request target, query component included.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.request_line.request_target
    }

    /// The target up to, not including, the first `?`.
    #[must_use]
    pub fn path(&self) -> &str {
        let target = self.target();
        target.split_once('?').map_or(target, |(path, _)| path)
    }

    /// The raw query component after the first `?`, if any.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.target().split_once('?').map(|(_, query)| query)
    }

    /// Looks up a parameter captured from the path by the router.
    #[must_use]
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    /// All parameters captured from the path.
    #[must_use]
    pub const fn path_params(&self) -> &PathParams {
        &self.path_params
    }

    /// Replaces the path parameters. Called once, after routing and before the handler runs.
    pub fn set_path_params(&mut self, path_params: PathParams) {
        self.path_params = path_params;
    }
}
