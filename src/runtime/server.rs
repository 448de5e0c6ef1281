use std::{
    any::Any,
    io::Error,
    net::SocketAddr,
    panic::AssertUnwindSafe,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use futures::FutureExt;
use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    sync::Notify,
    time::{sleep, timeout},
};
use tracing::{debug, error, info, warn};

use crate::http::{
    error::StatusError,
    request::{HttpError, Request, request_from_reader},
    response::{Response, error_response, internal_server_error, text_response},
    status::StatusCode,
};
use crate::runtime::{config::ServerConfig, handler::HttpRouter};

/// A struct representing a running server. Dropping it leaves the server running.
#[derive(Debug)]
pub struct Server {
    server_state: Arc<ServerState>,
    local_addr: SocketAddr,
}

/// The state shared between the server handle and its accept loop.
#[derive(Debug)]
struct ServerState {
    listener: TcpListener,
    closed: AtomicBool,
    shutdown: Notify,
    router: Arc<HttpRouter>,
    request_timeout: Duration,
}

impl Server {
    /// Stops accepting new connections. Connections already accepted run to completion.
    pub fn close(&self) {
        self.server_state.closed.store(true, Ordering::SeqCst);
        self.server_state.shutdown.notify_waiters();
    }

    /// The address the listener is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl ServerState {
    /// Accepts connections and spawns one task per connection until closed.
    async fn listen(self: Arc<Self>) {
        loop {
            let shutdown = self.shutdown.notified();
            if self.closed.load(Ordering::SeqCst) {
                info!("server closed, no longer accepting connections");
                return;
            }

            tokio::select! {
                () = shutdown => {
                    info!("server closed, no longer accepting connections");
                    return;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!(%peer, "accepted connection");
                        let router = Arc::clone(&self.router);
                        let request_timeout = self.request_timeout;
                        tokio::spawn(async move {
                            if let Err(error) = handle(stream, &router, request_timeout).await {
                                warn!(%peer, %error, "failed to answer connection");
                            }
                        });
                    }
                    Err(error) => {
                        if self.closed.load(Ordering::SeqCst) {
                            break;
                        }
                        error!(%error, "failed to accept connection");
                        sleep(Duration::from_millis(50)).await;
                    }
                }
            }
        }
    }
}

/// Binds a listener as configured and serves the router on it in a background task.
///
/// # Errors
///
/// Throws an Error if binding the tcp listener fails.
pub async fn serve(config: &ServerConfig, router: Arc<HttpRouter>) -> Result<Server, Error> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let local_addr = listener.local_addr()?;
    let state = Arc::new(ServerState {
        listener,
        closed: AtomicBool::new(false),
        shutdown: Notify::new(),
        router,
        request_timeout: config.request_timeout(),
    });

    let state_for_task = Arc::clone(&state);
    tokio::spawn(async move {
        state_for_task.listen().await;
    });

    info!(address = %local_addr, "listening for connections");
    Ok(Server {
        server_state: state,
        local_addr,
    })
}

/// Answers one TCP connection and closes it.
async fn handle(
    mut stream: TcpStream,
    router: &HttpRouter,
    request_timeout: Duration,
) -> Result<(), HttpError> {
    serve_connection(&mut stream, router, request_timeout).await?;
    stream.shutdown().await?;
    Ok(())
}

/// Reads exactly one request from the stream, answers it, and returns.
///
/// Parse failures are answered with their status code, unknown routes with a 404, a
/// client that stays silent for `request_timeout` with a 408, and a panicking handler
/// with a 500. A stream that closes before sending anything gets no response.
///
/// # Errors
///
/// Throws an `HttpError` only if writing the response fails.
pub async fn serve_connection<S>(
    stream: &mut S,
    router: &HttpRouter,
    request_timeout: Duration,
) -> Result<(), HttpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let parsed = {
        let mut reader = BufReader::new(&mut *stream);
        timeout(request_timeout, request_from_reader(&mut reader)).await
    };

    let response = match parsed {
        Ok(Ok(request)) => dispatch(request, router).await,
        Ok(Err(HttpError::ConnectionClosed)) => {
            debug!("connection closed before a request arrived");
            return Ok(());
        }
        Ok(Err(error)) => {
            warn!(%error, "failed to parse request");
            error_response(&error)
        }
        Err(_elapsed) => {
            warn!(timeout = ?request_timeout, "timed out waiting for request");
            text_response(StatusCode::REQUEST_TIMEOUT, "Request Timeout")
        }
    };

    let status = response.status;
    response.write_to(stream).await?;
    debug!(%status, "response written");
    Ok(())
}

/// Routes the request and runs its handler, turning every failure into a response.
async fn dispatch(mut request: Request, router: &HttpRouter) -> Response {
    let method = request.method().to_string();
    let target = request.target().to_string();

    let Some(route) = router.resolve(&method, request.path()) else {
        debug!(%method, %target, "no route matched");
        return error_response(&StatusError::not_found(&target));
    };
    request.set_path_params(route.params);

    let handler = route.handler;
    let outcome = AssertUnwindSafe(async move { handler.call(request).await })
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(response)) => {
            info!(%method, %target, status = %response.status, "request handled");
            response
        }
        Ok(Err(error)) => {
            warn!(%method, %target, %error, "handler returned an error");
            error_response(&*error)
        }
        Err(panic) => {
            error!(%method, %target, panic = panic_message(&*panic), "handler panicked");
            internal_server_error()
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic payload")
}
