use std::{error::Error, future::Future, sync::Arc};

use futures::future::BoxFuture;

use crate::http::{request::Request, response::Response, router::Router};

/// Any error a handler wants to bubble up with `?`.
///
/// A [`crate::http::error::StatusError`] anywhere in its source chain decides the status
/// code; everything else is answered with a 500.
pub type HandlerError = Box<dyn Error + Send + Sync>;

/// What a handler produces.
pub type HandlerResult = Result<Response, HandlerError>;

/// Handlers as they are stored in the router.
pub type SharedHandler = Arc<dyn Handler>;

/// The router used by the server.
pub type HttpRouter = Router<SharedHandler>;

/// A trait that determines the handling of a routed request.
///
/// Implemented for every `Fn(Request) -> impl Future<Output = HandlerResult>`, so plain
/// `async fn`s can be registered directly.
pub trait Handler: Send + Sync + 'static {
    /// Turns the request into a response.
    fn call(&self, request: Request) -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, request: Request) -> BoxFuture<'static, HandlerResult> {
        Box::pin(self(request))
    }
}

impl HttpRouter {
    /// Registers a handler, see [`Router::register`].
    pub fn route(&self, method: &str, path: &str, handler: impl Handler) {
        self.register(method, path, Arc::new(handler));
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        http::{
            body::Body,
            headers::Headers,
            request::Request,
            request_line::RequestLine,
            response::{ResponseBody, text_response},
            status::StatusCode,
        },
        runtime::handler::{HandlerResult, HttpRouter},
    };

    async fn greet(request: Request) -> HandlerResult {
        let name = request.path_param("name").unwrap_or("stranger");
        Ok(text_response(StatusCode::OK, format!("hello {name}")))
    }

    #[tokio::test]
    async fn async_fn_is_a_handler() {
        let router = HttpRouter::new();
        router.route("GET", "/greet/:name", greet);

        let found = router.resolve("GET", "/greet/ferris").unwrap();
        let mut request = Request::new(
            RequestLine {
                method: "GET".to_string(),
                request_target: "/greet/ferris".to_string(),
                http_version: "HTTP/1.1".to_string(),
            },
            Headers::new(),
            Body::empty(),
        );
        request.set_path_params(found.params);

        let response = found.handler.call(request).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert!(
            matches!(&response.body, ResponseBody::Full(body) if body.as_ref() == b"hello ferris")
        );
    }
}
