//! Process-wide Ctrl-C latch
//!
//! The signal listener is installed once at startup and latches into a watch
//! channel, so an interrupt delivered while the chat is busy (model call,
//! memory recall, save drain) is still observed by the next check.

use std::future::Future;

use tokio::sync::watch;

pub struct Interrupt {
    fired: watch::Receiver<bool>,
}

impl Interrupt {
    /// Listen for Ctrl-C for the rest of the process lifetime
    pub fn install() -> Self {
        let (tx, rx) = watch::channel(false);

        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    let _ = tx.send(true);
                }
                Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
            }
        });

        Self::from_receiver(rx)
    }

    pub fn from_receiver(fired: watch::Receiver<bool>) -> Self {
        Self { fired }
    }

    /// Resolve once an interrupt has been delivered; never if listening failed
    pub async fn fired(&mut self) {
        if self.fired.wait_for(|fired| *fired).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Run `fut` unless an interrupt arrives first (or already arrived)
    pub async fn guard<F: Future>(&mut self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.fired() => None,
            output = fut => Some(output),
        }
    }
}
