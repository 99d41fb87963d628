/// Resolve on the first Ctrl+C.
///
/// A second Ctrl+C while the server drains exits the process immediately.
pub(crate) async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        // Never resolve: without a handler the server runs until killed.
        std::future::pending::<()>().await;
    }

    tracing::warn!("Shutdown requested, finishing in-flight requests");

    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Force quit");
            std::process::exit(130);
        }
    });
}
