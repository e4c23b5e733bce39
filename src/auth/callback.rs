//! Short-lived local listener that captures the OAuth redirect.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::error::AuthError;
use super::token::AuthorizationCode;

const SUCCESS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>twitchtui</title></head>
<body style="font-family: system-ui; text-align: center; padding-top: 80px;">
<h2>Success! Please return to your terminal.</h2>
</body>
</html>"#;

const DENIED_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>twitchtui</title></head>
<body style="font-family: system-ui; text-align: center; padding-top: 80px;">
<h2>Authorization was not granted.</h2>
<p>You can close this tab and return to the terminal.</p>
</body>
</html>"#;

/// What the provider's redirect carried.
#[derive(Debug)]
pub enum CallbackPayload {
    Code(AuthorizationCode),
    Denied {
        error: String,
        description: Option<String>,
    },
}

type Handoff = Arc<Mutex<Option<oneshot::Sender<CallbackPayload>>>>;

/// Local HTTP listener delivering at most one [`CallbackPayload`].
///
/// Further redirects are answered but ignored until [`CallbackServer::stop`].
/// Dropping a server that was never stopped aborts its task.
pub struct CallbackServer {
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<std::io::Result<()>>>,
    shutdown_timeout: Duration,
}

impl CallbackServer {
    /// Bind `addr` and start serving. Fails with [`AuthError::Listener`] if the
    /// port is taken, which includes a second server started before the first
    /// one stopped.
    pub async fn start(
        addr: SocketAddr,
        shutdown_timeout: Duration,
    ) -> Result<(Self, oneshot::Receiver<CallbackPayload>), AuthError> {
        let listener = TcpListener::bind(addr).await.map_err(|error| {
            AuthError::Listener(format!(
                "failed to bind callback listener on {addr}: {error}. \
                 Make sure no other process is using this port."
            ))
        })?;
        let local_addr = listener
            .local_addr()
            .map_err(|error| AuthError::Listener(error.to_string()))?;

        let (payload_tx, payload_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = callback_router(Arc::new(Mutex::new(Some(payload_tx))));

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });
        info!(%local_addr, "callback listener started");

        Ok((
            Self {
                local_addr,
                shutdown_tx: Some(shutdown_tx),
                task: Some(task),
                shutdown_timeout,
            },
            payload_rx,
        ))
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Graceful shutdown bounded by the configured timeout.
    ///
    /// On timeout the serving task is aborted and an error is returned; the
    /// listener is gone either way.
    pub async fn stop(mut self) -> Result<(), AuthError> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let Some(mut task) = self.task.take() else {
            return Ok(());
        };
        match tokio::time::timeout(self.shutdown_timeout, &mut task).await {
            Ok(Ok(Ok(()))) => {
                info!(local_addr = %self.local_addr, "callback listener stopped");
                Ok(())
            }
            Ok(Ok(Err(error))) => {
                warn!(%error, "callback listener failed");
                Err(AuthError::Listener(format!("callback listener failed: {error}")))
            }
            Ok(Err(error)) => {
                warn!(%error, "callback listener task failed");
                Err(AuthError::Listener(format!(
                    "callback listener task failed: {error}"
                )))
            }
            Err(_) => {
                task.abort();
                warn!(
                    timeout_secs = self.shutdown_timeout.as_secs_f64(),
                    "callback listener did not drain in time; aborted"
                );
                Err(AuthError::Listener(format!(
                    "callback listener did not shut down within {:?}",
                    self.shutdown_timeout
                )))
            }
        }
    }
}

impl Drop for CallbackServer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn callback_router(handoff: Handoff) -> Router {
    Router::new()
        .route("/", get(handle_redirect))
        .with_state(handoff)
}

async fn handle_redirect(
    State(handoff): State<Handoff>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let payload = if let Some(code) = params.get("code").filter(|code| !code.is_empty()) {
        CallbackPayload::Code(AuthorizationCode::new(code.clone()))
    } else if let Some(error) = params.get("error") {
        CallbackPayload::Denied {
            error: error.clone(),
            description: params.get("error_description").cloned(),
        }
    } else {
        return (StatusCode::BAD_REQUEST, "Missing authorization code").into_response();
    };

    let page = match payload {
        CallbackPayload::Code(_) => SUCCESS_PAGE,
        CallbackPayload::Denied { .. } => DENIED_PAGE,
    };

    let sender = match handoff.lock() {
        Ok(mut slot) => slot.take(),
        Err(poisoned) => poisoned.into_inner().take(),
    };
    match sender {
        Some(tx) => {
            if tx.send(payload).is_err() {
                debug!("callback receiver already dropped");
            }
        }
        None => debug!("ignoring repeated redirect"),
    }

    Html(page).into_response()
}
