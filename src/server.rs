//! HTTP server: the `/events` live result stream plus static file serving.
//!
//! Each connected observer gets its own broker subscription and its own
//! Server-Sent Events stream; one pushed unit per probe result. Dropping the
//! connection drops the subscription, which unsubscribes from the broker.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;

use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{Router, extract::State, routing::get};
use futures::{Stream, StreamExt};
use tracing::{debug, info};

use crate::actors::broker::BrokerHandle;

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (e.g. "0.0.0.0:8080").
    pub bind_addr: SocketAddr,

    /// Directory served at `/` (dashboard assets). Skipped when absent.
    pub static_dir: Option<PathBuf>,
}

/// Bind the listener and serve in a background task.
///
/// Returns the bound address (useful when binding port 0 in tests).
pub async fn spawn_server(config: ServerConfig, broker: BrokerHandle) -> anyhow::Result<SocketAddr> {
    use tower_http::services::ServeDir;
    use tower_http::trace::TraceLayer;

    let mut app = Router::new()
        .route("/events", get(events_handler))
        .with_state(broker);

    if let Some(static_dir) = config.static_dir {
        if static_dir.is_dir() {
            info!("serving static files from {}", static_dir.display());
            app = app.fallback_service(ServeDir::new(static_dir));
        } else {
            info!(
                "static directory {} not found, serving events only",
                static_dir.display()
            );
        }
    }

    let app = app.layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    let addr = listener.local_addr()?;

    info!("listening on {addr}");

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("server error: {e}");
        }
    });

    Ok(addr)
}

/// GET /events
///
/// Long-lived SSE stream of JSON probe results. A result that fails to
/// serialize degrades to an empty-object event instead of ending the stream.
async fn events_handler(
    State(broker): State<BrokerHandle>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("event stream client connected");

    let stream = broker.subscribe().map(|result| {
        let payload = serde_json::to_string(&result).unwrap_or_else(|_| String::from("{}"));
        Ok(Event::default().data(payload))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
