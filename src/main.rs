//! # radix-http server
//!
//! This binary serves a handful of demo routes on top of the library in this crate.
//!
//! Configuration comes from an optional `radix-http.toml` and `RADIX_HTTP_*` environment
//! variables; log verbosity from `RUST_LOG`.
use std::sync::Arc;

use radix_http::{
    http::{
        error::StatusError,
        request::Request,
        response::{json_response, text_response},
        status::StatusCode,
    },
    runtime::{
        config::ServerConfig,
        handler::{HandlerResult, HttpRouter},
        server::serve,
    },
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Serialize)]
struct User<'a> {
    id: &'a str,
    name: String,
}

async fn index(_request: Request) -> HandlerResult {
    Ok(text_response(StatusCode::OK, "All good!"))
}

async fn me(_request: Request) -> HandlerResult {
    let user = User {
        id: "me",
        name: "the current user".to_string(),
    };
    Ok(json_response(StatusCode::OK, &user)?)
}

async fn show_user(request: Request) -> HandlerResult {
    let id = request
        .path_param("id")
        .ok_or_else(|| StatusError::bad_request("missing user id"))?;
    if !id.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(StatusError::bad_request(format!("user id must be numeric, got '{id}'")).into());
    }

    let user = User {
        id,
        name: format!("user {id}"),
    };
    Ok(json_response(StatusCode::OK, &user)?)
}

async fn echo(mut request: Request) -> HandlerResult {
    let body = request.body.take_bytes();
    let text = String::from_utf8(body.to_vec())
        .map_err(|_| StatusError::bad_request("body must be UTF-8"))?;
    Ok(text_response(StatusCode::OK, text))
}

async fn always_panics(_request: Request) -> HandlerResult {
    panic!("this handler always panics");
}

fn router() -> HttpRouter {
    let router = HttpRouter::new();
    router.route("GET", "/", index);
    router.route("GET", "/users/me", me);
    router.route("GET", "/users/:id", show_user);
    router.route("POST", "/echo", echo);
    router.route("GET", "/panic", always_panics);
    router
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "radix_http=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::load()?;
    info!(
        host = %config.host,
        port = config.port,
        request_timeout_secs = config.request_timeout_secs,
        "configuration loaded"
    );

    let router = router();
    for (method, path) in router.routes() {
        info!(%method, %path, "route registered");
    }

    let server = serve(&config, Arc::new(router)).await?;
    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    server.close();
    Ok(())
}
