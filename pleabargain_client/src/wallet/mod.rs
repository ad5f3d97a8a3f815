//! Wallet Provider integration
//!
//! A wallet supplies the current account on request and pushes account
//! changes afterwards. [`WalletSession`] subscribes once per connection and
//! forwards every change to a callback; there is no replay of missed events.

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use log::{debug, info};
use std::sync::Arc;
use tokio::task::JoinHandle;

pub mod local;

pub use local::LocalWallet;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("User rejected the request")]
    Rejected,

    #[error("{0}")]
    Provider(String),
}

#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet for its accounts (`eth_requestAccounts`).
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError>;

    /// Stream of account lists, one item per `accountsChanged` notification.
    fn account_changes(&self) -> BoxStream<'static, Vec<String>>;
}

/// The first account of a wallet response, or empty when there is none.
pub fn primary_account(accounts: &[String]) -> String {
    accounts.first().cloned().unwrap_or_default()
}

/// One live wallet connection and its account-change subscription.
#[derive(Default)]
pub struct WalletSession {
    provider: Option<Arc<dyn WalletProvider>>,
    changes: Option<BoxStream<'static, Vec<String>>>,
    listener: Option<JoinHandle<()>>,
}

impl WalletSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.provider.is_some()
    }

    /// Request accounts from `provider` and subscribe to its changes.
    ///
    /// Returns the primary account. Changes are buffered from this point on
    /// and delivered once [`WalletSession::listen`] is called.
    pub async fn connect(&mut self, provider: Arc<dyn WalletProvider>) -> Result<String, WalletError> {
        let accounts = provider.request_accounts().await?;
        let account = primary_account(&accounts);
        info!("Wallet connected, account {:?}", account);

        self.stop_listener();
        self.changes = Some(provider.account_changes());
        self.provider = Some(provider);
        Ok(account)
    }

    /// Forward the new primary account to `on_change` for every notification
    /// until [`WalletSession::disconnect`]. Does nothing when not connected.
    pub fn listen<F>(&mut self, on_change: F)
    where
        F: Fn(String) + Send + 'static,
    {
        let Some(mut changes) = self.changes.take() else {
            return;
        };
        self.listener = Some(tokio::spawn(async move {
            while let Some(accounts) = changes.next().await {
                let account = primary_account(&accounts);
                debug!("Wallet account changed to {:?}", account);
                on_change(account);
            }
        }));
    }

    pub fn disconnect(&mut self) {
        self.stop_listener();
        self.provider = None;
        info!("Wallet disconnected");
    }

    fn stop_listener(&mut self) {
        self.changes = None;
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

impl Drop for WalletSession {
    fn drop(&mut self) {
        self.stop_listener();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_primary_account() {
        assert_eq!(primary_account(&[]), "");
        assert_eq!(
            primary_account(&["0xabc".to_string(), "0xdef".to_string()]),
            "0xabc"
        );
    }

    #[tokio::test]
    async fn test_session_forwards_account_changes() {
        let wallet = Arc::new(LocalWallet::new(vec!["0xaaa".to_string()]));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut session = WalletSession::new();

        let account = session.connect(wallet.clone()).await.unwrap();
        assert_eq!(account, "0xaaa");
        assert!(session.is_connected());
        session.listen(move |account| {
            let _ = tx.send(account);
        });

        wallet.set_accounts(vec!["0xbbb".to_string()]);
        assert_eq!(rx.recv().await.unwrap(), "0xbbb");
        wallet.set_accounts(vec![]);
        assert_eq!(rx.recv().await.unwrap(), "");

        session.disconnect();
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn test_changes_before_listen_are_delivered() {
        let wallet = Arc::new(LocalWallet::new(vec!["0xaaa".to_string()]));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut session = WalletSession::new();

        session.connect(wallet.clone()).await.unwrap();
        wallet.set_accounts(vec!["0xccc".to_string()]);
        session.listen(move |account| {
            let _ = tx.send(account);
        });

        assert_eq!(rx.recv().await.unwrap(), "0xccc");
    }

    #[tokio::test]
    async fn test_rejected_connection_leaves_session_empty() {
        let wallet = Arc::new(LocalWallet::new(vec!["0xaaa".to_string()]));
        wallet.reject_requests(true);
        let mut session = WalletSession::new();
        let result = session.connect(wallet).await;
        assert_eq!(result, Err(WalletError::Rejected));
        assert!(!session.is_connected());
    }
}
