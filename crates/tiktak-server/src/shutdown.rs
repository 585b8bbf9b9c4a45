//! Graceful shutdown coordination.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

/// Fans a single shutdown request out to the accept loop and every open
/// connection, and lets the initiator wait until the server has stopped.
///
/// Clones share state.
#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
	timeout: Duration,
	requested: Arc<AtomicBool>,
	signal: broadcast::Sender<()>,
	complete: Arc<watch::Sender<bool>>,
}

impl ShutdownCoordinator {
	/// `timeout` bounds how long [`wait_for_shutdown`](Self::wait_for_shutdown)
	/// waits for the server to report completion.
	pub fn new(timeout: Duration) -> Self {
		let (signal, _) = broadcast::channel(1);
		let (complete, _) = watch::channel(false);
		Self {
			timeout,
			requested: Arc::new(AtomicBool::new(false)),
			signal,
			complete: Arc::new(complete),
		}
	}

	/// Receiver that yields once shutdown is requested.
	pub fn subscribe(&self) -> broadcast::Receiver<()> {
		self.signal.subscribe()
	}

	pub fn is_shutting_down(&self) -> bool {
		self.requested.load(Ordering::SeqCst)
	}

	/// Request shutdown. Repeated calls are no-ops.
	pub fn shutdown(&self) {
		if self.requested.swap(true, Ordering::SeqCst) {
			return;
		}
		info!("shutdown requested");
		// No receivers simply means nothing is running yet.
		let _ = self.signal.send(());
	}

	/// Called by the server once it has stopped accepting connections.
	pub fn notify_shutdown_complete(&self) {
		self.complete.send_replace(true);
	}

	/// Wait until the server reports completion or the timeout elapses.
	///
	/// Returns `false` on timeout.
	pub async fn wait_for_shutdown(&self) -> bool {
		let mut rx = self.complete.subscribe();
		match tokio::time::timeout(self.timeout, rx.wait_for(|done| *done)).await {
			Ok(Ok(_)) => true,
			Ok(Err(_)) => false,
			Err(_) => {
				warn!(timeout_ms = self.timeout.as_millis() as u64, "timed out waiting for shutdown");
				false
			}
		}
	}
}

impl Default for ShutdownCoordinator {
	fn default() -> Self {
		Self::new(Duration::from_secs(30))
	}
}

/// Resolve on Ctrl-C, or on SIGTERM where signals exist.
pub async fn shutdown_signal() {
	let ctrl_c = async {
		match tokio::signal::ctrl_c().await {
			Ok(()) => info!("received Ctrl+C, shutting down"),
			Err(e) => {
				warn!(error = %e, "failed to install Ctrl+C handler");
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(unix)]
	let terminate = async {
		use tokio::signal::unix::{SignalKind, signal};
		match signal(SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
				info!("received terminate signal, shutting down");
			}
			Err(e) => {
				warn!(error = %e, "failed to install SIGTERM handler");
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}
}
