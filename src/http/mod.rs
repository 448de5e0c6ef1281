/// Module containing the single-pass request body
pub mod body;
/// Module containing errors that carry a client-facing status code
pub mod error;
/// Module containing the ordered header map
pub mod headers;
/// Module containing logic to parse requests
pub mod request;
/// Module containing logic to parse HTTP request lines
pub mod request_line;
/// Module formatting the response.
pub mod response;
/// Module containing the radix-tree router
pub mod router;
/// Module containing status codes and their reason phrases
pub mod status;
