use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
};

use bytes::Bytes;
use tokio::io::{AsyncRead, ReadBuf};

/// The body of a parsed request.
///
/// A finite, single-pass byte source bounded by the request's `Content-Length`. Reading
/// from it (or taking it) advances it for good; there is no rewinding. It owns its bytes,
/// so dropping it never affects the connection the request was read from.
#[derive(Debug, Default)]
pub struct Body {
    content_length: Option<usize>,
    remaining: Bytes,
}

impl Body {
    /// A body for a request that carried no `Content-Length` header.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            content_length: None,
            remaining: Bytes::new(),
        }
    }

    /// A body of exactly the given bytes, as announced by a `Content-Length` header.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let remaining = bytes.into();
        Self {
            content_length: Some(remaining.len()),
            remaining,
        }
    }

    /// The declared length, or `None` when the request had no `Content-Length` header.
    ///
    /// `Some(0)` marks an explicitly empty body.
    #[must_use]
    pub const fn content_length(&self) -> Option<usize> {
        self.content_length
    }

    /// Number of bytes not yet read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    /// Returns whether every byte has been read (or there were none).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Takes all unread bytes, leaving the body exhausted.
    pub fn take_bytes(&mut self) -> Bytes {
        std::mem::take(&mut self.remaining)
    }
}

impl AsyncRead for Body {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let amount = self.remaining.len().min(buf.remaining());
        let chunk = self.remaining.split_to(amount);
        buf.put_slice(&chunk);
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use crate::http::body::Body;

    #[test]
    fn empty_body_has_no_content_length() {
        let body = Body::empty();
        assert_eq!(body.content_length(), None);
        assert!(body.is_empty());
    }

    #[test]
    fn zero_length_body_is_present() {
        let body = Body::from_bytes(Vec::new());
        assert_eq!(body.content_length(), Some(0));
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn body_is_single_pass() {
        let mut body = Body::from_bytes("hello world!");
        let mut first = [0u8; 5];
        body.read_exact(&mut first).await.unwrap();
        assert_eq!(&first, b"hello");
        assert_eq!(body.remaining(), 7);

        let mut rest = String::new();
        body.read_to_string(&mut rest).await.unwrap();
        assert_eq!(rest, " world!");

        let mut again = Vec::new();
        let read = body.read_to_end(&mut again).await.unwrap();
        assert_eq!(read, 0);
        assert_eq!(body.content_length(), Some(12));
    }

    #[test]
    fn take_exhausts_body() {
        let mut body = Body::from_bytes("abc");
        assert_eq!(body.take_bytes().as_ref(), b"abc");
        assert!(body.take_bytes().is_empty());
    }
}
