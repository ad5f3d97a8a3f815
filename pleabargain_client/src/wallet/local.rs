use super::{WalletError, WalletProvider};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use log::warn;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

/// Wallet backed by a fixed account list, for the CLI and tests.
pub struct LocalWallet {
    accounts: RwLock<Vec<String>>,
    changes: broadcast::Sender<Vec<String>>,
    reject_requests: AtomicBool,
}

impl LocalWallet {
    pub fn new(accounts: Vec<String>) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            accounts: RwLock::new(accounts),
            changes,
            reject_requests: AtomicBool::new(false),
        }
    }

    pub fn accounts(&self) -> Vec<String> {
        self.accounts.read().clone()
    }

    /// Replace the account list and notify subscribers.
    pub fn set_accounts(&self, accounts: Vec<String>) {
        *self.accounts.write() = accounts.clone();
        // No subscribers is fine.
        let _ = self.changes.send(accounts);
    }

    pub fn reject_requests(&self, reject: bool) {
        self.reject_requests.store(reject, Ordering::SeqCst);
    }
}

#[async_trait]
impl WalletProvider for LocalWallet {
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        if self.reject_requests.load(Ordering::SeqCst) {
            return Err(WalletError::Rejected);
        }
        Ok(self.accounts())
    }

    fn account_changes(&self) -> BoxStream<'static, Vec<String>> {
        let receiver = self.changes.subscribe();
        stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(accounts) => return Some((accounts, receiver)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Account change subscriber lagged by {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .boxed()
    }
}
