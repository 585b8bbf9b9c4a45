//! Application bootstrap: store, routes, middleware, server lifecycle.

use crate::config::Settings;
use crate::error::Result;
use crate::urls;
use std::sync::Arc;
use tiktak_db::Store;
use tiktak_http::middleware::{CorsMiddleware, LoggingMiddleware};
use tiktak_server::{HttpServer, ShutdownCoordinator, shutdown_signal};
use tokio::net::TcpListener;
use tracing::info;

/// Wire the routing table behind CORS and request logging.
///
/// CORS wraps everything else so error responses carry its headers too.
pub fn build_server(store: &Store) -> Result<HttpServer> {
	let router = urls::url_patterns(store)?;

	Ok(HttpServer::new(Arc::new(router))
		.with_middleware(Arc::new(CorsMiddleware::permissive()))
		.with_middleware(Arc::new(LoggingMiddleware::new())))
}

/// Open and migrate the store described by `settings`.
pub async fn open_store(settings: &Settings) -> Result<Store> {
	let store = Store::connect(&settings.database_config()).await?;
	let result = store.migrate().await?;
	if !result.applied.is_empty() {
		info!(count = result.applied.len(), "applied pending migrations");
	}
	Ok(store)
}

/// Serve on `listener` until `coordinator` requests shutdown, then close
/// the store.
pub async fn serve(settings: &Settings, listener: TcpListener, coordinator: ShutdownCoordinator) -> Result<()> {
	let store = open_store(settings).await?;
	let served: Result<()> = match build_server(&store) {
		Ok(server) => server
			.serve_with_shutdown(listener, coordinator)
			.await
			.map_err(Into::into),
		Err(e) => Err(e),
	};
	store.close().await;
	served
}

/// Bind the configured address and serve until Ctrl-C or SIGTERM.
pub async fn run(settings: &Settings) -> Result<()> {
	let listener = TcpListener::bind(settings.bind_addr())
		.await
		.map_err(|source| tiktak_server::ServerError::Bind {
			addr: settings.bind_addr(),
			source,
		})?;

	let coordinator = ShutdownCoordinator::new(settings.shutdown_timeout);
	let trigger = coordinator.clone();
	tokio::spawn(async move {
		shutdown_signal().await;
		trigger.shutdown();
	});

	serve(settings, listener, coordinator).await?;
	info!("server stopped");
	Ok(())
}
