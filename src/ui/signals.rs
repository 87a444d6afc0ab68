use crate::error::{CfdiError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Ctrl+C flag checked between documents.
pub struct GracefulShutdown {
    running: Arc<AtomicBool>,
}

impl GracefulShutdown {
    /// Installs the process-wide Ctrl+C handler. A second Ctrl+C exits at once.
    pub fn new() -> Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let interrupted = Arc::new(AtomicBool::new(false));

        let running_clone = running.clone();
        ctrlc::set_handler(move || {
            running_clone.store(false, Ordering::SeqCst);

            if !interrupted.swap(true, Ordering::SeqCst) {
                eprintln!("\nStopping after the current document... (press Ctrl+C again to force exit)");
            } else {
                std::process::exit(130);
            }
        })
        .map_err(|e| CfdiError::Config {
            message: format!("Failed to set signal handler: {}", e),
        })?;

        Ok(Self { running })
    }

    /// A flag with no signal handler behind it, for library callers that
    /// manage signals themselves.
    pub fn detached() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn check_shutdown(&self) -> Result<()> {
        if !self.is_running() {
            return Err(CfdiError::Cancelled);
        }
        Ok(())
    }

    pub fn request_shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}
