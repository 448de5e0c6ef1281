use crate::http::request::HttpError;

/// A Http Request Line representation with method, target and http version
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestLine {
    /// The method of the parsed request
    pub method: String,
    /// The raw target of the request, including any query component
    pub request_target: String,
    /// The protocol version token exactly as sent, e.g. `HTTP/1.1`
    pub http_version: String,
}

/// Parses one request line, without its line terminator, into a Request Line Struct.
///
/// The line must consist of exactly three non-empty tokens separated by single spaces.
/// Validation is purely syntactic: any method or version token is accepted.
///
/// # Errors
///
/// Throws `HttpError::MalformedRequestLine` if the line does not split into exactly three tokens.
pub fn parse_request_line(line: &str) -> Result<RequestLine, HttpError> {
    let malformed = || HttpError::MalformedRequestLine(line.to_string());

    let mut parts = line.split(' ');
    let method = parts.next().ok_or_else(malformed)?;
    let request_target = parts.next().ok_or_else(malformed)?;
    let http_version = parts.next().ok_or_else(malformed)?;

    if parts.next().is_some()
        || method.is_empty()
        || request_target.is_empty()
        || http_version.is_empty()
    {
        return Err(malformed());
    }

    Ok(RequestLine {
        method: method.to_string(),
        request_target: request_target.to_string(),
        http_version: http_version.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use crate::{http::request::HttpError, http::request_line::parse_request_line};

    #[test]
    fn get_request_line_valid() {
        let request_line = parse_request_line("GET / HTTP/1.1").unwrap();

        assert_eq!(request_line.method, "GET");
        assert_eq!(request_line.request_target, "/");
        assert_eq!(request_line.http_version, "HTTP/1.1");
    }

    #[test]
    fn get_request_line_with_path_and_query_valid() {
        let request_line = parse_request_line("GET /coffee?roast=dark HTTP/1.1").unwrap();

        assert_eq!(request_line.method, "GET");
        assert_eq!(request_line.request_target, "/coffee?roast=dark");
        assert_eq!(request_line.http_version, "HTTP/1.1");
    }

    #[test]
    fn unknown_method_and_version_are_accepted() {
        let request_line = parse_request_line("BREW /pot HTCPCP/1.0").unwrap();

        assert_eq!(request_line.method, "BREW");
        assert_eq!(request_line.http_version, "HTCPCP/1.0");
    }

    #[test]
    fn request_line_without_spaces_should_throw_malformed() {
        let result = parse_request_line("GET/coffeeHTTP/1.1");
        assert!(
            matches!(result, Err(HttpError::MalformedRequestLine(_))),
            "Expected Err(HttpError::MalformedRequestLine), got {result:?}"
        );
    }

    #[test]
    fn request_line_with_two_tokens_should_throw_malformed() {
        let result = parse_request_line("GET /");
        assert!(matches!(result, Err(HttpError::MalformedRequestLine(_))));
    }

    #[test]
    fn request_line_with_four_tokens_should_throw_malformed() {
        let result = parse_request_line("GET / HTTP/1.1 extra");
        assert!(matches!(result, Err(HttpError::MalformedRequestLine(_))));
    }

    #[test]
    fn request_line_with_double_spaces_should_throw_malformed() {
        let result = parse_request_line("GET  /  HTTP/1.1");
        assert!(matches!(result, Err(HttpError::MalformedRequestLine(_))));
    }

    #[test]
    fn request_line_with_trailing_space_should_throw_malformed() {
        let result = parse_request_line("GET / ");
        assert!(matches!(result, Err(HttpError::MalformedRequestLine(_))));
    }

    #[test]
    fn empty_request_line_should_throw_malformed() {
        let result = parse_request_line("");
        assert!(matches!(result, Err(HttpError::MalformedRequestLine(_))));
    }
}
