use tokio::signal;

/// Resolves on Ctrl+C, letting axum drain in-flight requests before exiting.
pub async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        // without a handler the server only stops with the process
        crate::error::log_error(&e);
        std::future::pending::<()>().await;
    }

    #[cfg(not(windows))]
    println!();
    tracing::info!("Ctrl+C received. Please wait, this could take a while.");
}
