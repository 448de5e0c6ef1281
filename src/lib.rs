//! # radix-http
//!
//! A from-scratch HTTP/1.1 message layer.
//!
//! The [`http`] module holds the core: a request parser working directly on a buffered
//! byte stream, a response serializer and a radix-tree router with parameter capture.
//! The [`runtime`] module drives them over TCP, one request and one response per
//! connection.
//!
//! Refer to the included binary for a complete server.
/// Module containing the parser, serializer and router
pub mod http;
/// Module containing the connection driver and its configuration
pub mod runtime;
