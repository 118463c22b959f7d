//! Stop serving on Ctrl+C or SIGTERM
//!
//! In-flight saves are allowed to finish, new connections are refused.

use tokio::signal;

/// Resolves once the process is asked to stop
pub async fn handler() {
    let signal = tokio::select! {
        () = interrupt() => "interrupt",
        () = terminate() => "terminate",
    };

    tracing::info!("Received {signal} signal, finishing open requests");
}

async fn interrupt() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::warn!("Unable to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    use signal::unix::SignalKind;

    match signal::unix::signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(e) => {
            tracing::warn!("Unable to listen for SIGTERM: {e}");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
