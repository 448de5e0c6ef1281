use std::{error::Error, fmt, io, pin::Pin};

use bytes::Bytes;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufWriter};

use crate::http::{
    error::StatusError, headers::Headers, request::HttpError, status::StatusCode,
};

const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
const INTERNAL_SERVER_ERROR_MESSAGE: &str = "Internal Server Error";

/// Representation of a HTTP response with status code, headers and body
#[derive(Debug)]
pub struct Response {
    /// The status code of the response.
    pub status: StatusCode,
    /// The headers, written in insertion order.
    pub headers: Headers,
    /// The source of the body bytes.
    pub body: ResponseBody,
}

/// Where the bytes of a response body come from.
pub enum ResponseBody {
    /// No body at all.
    Empty,
    /// A body held in memory.
    Full(Bytes),
    /// A finite stream copied to the connection until it ends.
    Stream(Pin<Box<dyn AsyncRead + Send>>),
}

impl ResponseBody {
    /// Wraps any finite async reader.
    pub fn stream(reader: impl AsyncRead + Send + 'static) -> Self {
        Self::Stream(Box::pin(reader))
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Full(bytes) => f.debug_tuple("Full").field(bytes).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<Bytes> for ResponseBody {
    fn from(bytes: Bytes) -> Self {
        Self::Full(bytes)
    }
}

impl From<Vec<u8>> for ResponseBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Full(bytes.into())
    }
}

impl From<String> for ResponseBody {
    fn from(text: String) -> Self {
        Self::Full(text.into())
    }
}

impl From<&'static str> for ResponseBody {
    fn from(text: &'static str) -> Self {
        Self::Full(Bytes::from_static(text.as_bytes()))
    }
}

impl Response {
    /// Creates a response without any headers.
    pub fn new(status: StatusCode, body: impl Into<ResponseBody>) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: body.into(),
        }
    }

    /// Adds a header, replacing an existing one of the same name.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// The reason phrase written in the status line.
    #[must_use]
    pub const fn status_text(&self) -> &'static str {
        self.status.reason_phrase()
    }

    /// Serializes the response to the passed writer and flushes it.
    ///
    /// Writes the status line, every header in insertion order, the blank line and then
    /// the body verbatim. The response is consumed: it is written exactly once.
    ///
    /// # Errors
    ///
    /// Throws an `HttpError` if any write fails, including one in the middle of the body.
    pub async fn write_to<W: AsyncWrite + Unpin>(self, writer: &mut W) -> Result<(), HttpError> {
        let mut writer = BufWriter::new(writer);

        write_status_line(&mut writer, self.status).await?;
        write_headers(&mut writer, &self.headers).await?;
        match self.body {
            ResponseBody::Empty => {}
            ResponseBody::Full(bytes) => writer.write_all(&bytes).await?,
            ResponseBody::Stream(mut reader) => {
                tokio::io::copy(&mut reader, &mut writer).await?;
            }
        }
        writer.flush().await?;
        Ok(())
    }
}

/// Write the status line to the passed writer.
///
/// Responses are always written as HTTP/1.1, whatever version the request named.
///
/// # Errors
///
/// Returns the underlying IO error if writing fails.
pub(crate) async fn write_status_line<W: AsyncWrite + Unpin>(
    writer: &mut W,
    status: StatusCode,
) -> io::Result<()> {
    let line = format!("HTTP/1.1 {} {}\r\n", status, status.reason_phrase());
    writer.write_all(line.as_bytes()).await
}

/// Writes the headers to the passed writer.
///
/// Also writes the final linebreak separating headers from the HTTP body.
///
/// # Errors
///
/// Returns the underlying IO error if writing fails.
pub(crate) async fn write_headers<W: AsyncWrite + Unpin>(
    writer: &mut W,
    headers: &Headers,
) -> io::Result<()> {
    for (key, value) in headers.iter() {
        writer
            .write_all(format!("{key}: {value}\r\n").as_bytes())
            .await?;
    }
    writer.write_all(b"\r\n").await
}

/// Helper function to remove boilerplate for creating plain-text responses.
///
/// `Content-Length` is the UTF-8 byte length of the text.
pub fn text_response(status: StatusCode, text: impl Into<String>) -> Response {
    let text = text.into();
    let length = text.len();
    Response::new(status, text)
        .with_header("Content-Type", TEXT_CONTENT_TYPE)
        .with_header("Content-Length", length.to_string())
}

/// Helper function to create a JSON response from any serializable value.
///
/// # Errors
///
/// Throws `HttpError::Json` if the value cannot be serialized.
pub fn json_response<T: Serialize + ?Sized>(
    status: StatusCode,
    value: &T,
) -> Result<Response, HttpError> {
    let data = serde_json::to_vec(value)?;
    let length = data.len();
    Ok(Response::new(status, data)
        .with_header("Content-Type", JSON_CONTENT_TYPE)
        .with_header("Content-Length", length.to_string()))
}

/// The fixed response used when nothing more specific can be said.
#[must_use]
pub fn internal_server_error() -> Response {
    text_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        INTERNAL_SERVER_ERROR_MESSAGE,
    )
}

/// Converts any error into a plain-text response.
///
/// Walks the error and its sources; the first `StatusError` or client-attributable
/// `HttpError` found decides status and message. Everything else becomes the generic 500.
#[must_use]
pub fn error_response(error: &(dyn Error + 'static)) -> Response {
    for cause in std::iter::successors(Some(error), |&cause| cause.source()) {
        if let Some(status_error) = cause.downcast_ref::<StatusError>() {
            return text_response(status_error.status, status_error.message.clone());
        }
        if let Some(http_error) = cause.downcast_ref::<HttpError>()
            && http_error.status_code() != StatusCode::INTERNAL_SERVER_ERROR
        {
            return text_response(http_error.status_code(), http_error.to_string());
        }
    }
    internal_server_error()
}
