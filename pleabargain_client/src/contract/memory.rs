use super::{ContractError, ContractInterface, Result, TxReceipt};
use async_trait::async_trait;
use log::debug;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, Notify};

/// In-memory contract for tests and demos.
///
/// Besides plain key/value storage it can inject the failures a real chain
/// produces (signature rejection, reverted writes, an unreachable contract)
/// and park writes on a key so tests can pin down interleavings.
pub struct MemoryContract {
    data: Mutex<HashMap<String, Vec<u8>>>,
    available: AtomicBool,
    reject_next_write: AtomicBool,
    failing_keys: Mutex<HashSet<String>>,
    gates: Mutex<HashMap<String, Arc<GateState>>>,
    write_log: Mutex<Vec<String>>,
    reads: AtomicU64,
    sequence: AtomicU64,
}

impl Default for MemoryContract {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryContract {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
            reject_next_write: AtomicBool::new(false),
            failing_keys: Mutex::new(HashSet::new()),
            gates: Mutex::new(HashMap::new()),
            write_log: Mutex::new(Vec::new()),
            reads: AtomicU64::new(0),
            sequence: AtomicU64::new(0),
        }
    }

    /// Seed a value directly, bypassing failure injection and the write log.
    pub fn insert_raw(&self, key: &str, value: impl Into<Vec<u8>>) {
        self.data.lock().insert(key.to_string(), value.into());
    }

    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.data.lock().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.lock().contains_key(key)
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// The next write fails as if the user declined to sign it.
    pub fn reject_next_write(&self) {
        self.reject_next_write.store(true, Ordering::SeqCst);
    }

    /// Every write to `key` fails with a reverted transaction until cleared.
    pub fn fail_writes_to(&self, key: &str) {
        self.failing_keys.lock().insert(key.to_string());
    }

    pub fn clear_failures(&self) {
        self.failing_keys.lock().clear();
        self.reject_next_write.store(false, Ordering::SeqCst);
    }

    /// Keys of committed writes, in commit order.
    pub fn write_log(&self) -> Vec<String> {
        self.write_log.lock().clone()
    }

    pub fn write_count(&self) -> usize {
        self.write_log.lock().len()
    }

    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    /// Park every subsequent write to `key` until the returned gate releases it.
    pub fn gate_writes(&self, key: &str) -> WriteGate {
        let state = Arc::new(GateState::default());
        self.gates.lock().insert(key.to_string(), state.clone());
        WriteGate { state }
    }
}

#[async_trait]
impl ContractInterface for MemoryContract {
    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn get_data(&self, key: &str) -> Result<Vec<u8>> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(ContractError::Unavailable);
        }
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.data.lock().get(key).cloned().unwrap_or_default())
    }

    async fn set_data(&self, key: &str, value: &[u8]) -> Result<TxReceipt> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(ContractError::Unavailable);
        }

        let gate = self.gates.lock().get(key).cloned();
        if let Some(gate) = gate {
            let released = gate.park();
            debug!("write to {} parked", key);
            // A dropped gate counts as a release.
            let _ = released.await;
        }

        if self.reject_next_write.swap(false, Ordering::SeqCst) {
            return Err(ContractError::from_message(
                "user rejected transaction (action=\"sendTransaction\")",
            ));
        }
        if self.failing_keys.lock().contains(key) {
            return Err(ContractError::Remote(format!(
                "transaction reverted while writing {}",
                key
            )));
        }

        self.data.lock().insert(key.to_string(), value.to_vec());
        self.write_log.lock().push(key.to_string());
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(TxReceipt {
            key: key.to_string(),
            bytes_written: value.len(),
            sequence,
        })
    }
}

#[derive(Default)]
struct GateState {
    parked: Mutex<VecDeque<oneshot::Sender<()>>>,
    total_parked: AtomicUsize,
    notify: Notify,
}

impl GateState {
    fn park(&self) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        self.parked.lock().push_back(tx);
        self.total_parked.fetch_add(1, Ordering::SeqCst);
        self.notify.notify_waiters();
        rx
    }
}

/// Handle controlling writes parked on one key of a [`MemoryContract`].
pub struct WriteGate {
    state: Arc<GateState>,
}

impl WriteGate {
    /// Wait until at least `count` writes have reached the gate in total.
    pub async fn wait_parked(&self, count: usize) {
        loop {
            let notified = self.state.notify.notified();
            if self.state.total_parked.load(Ordering::SeqCst) >= count {
                return;
            }
            notified.await;
        }
    }

    /// Number of writes currently waiting.
    pub fn parked(&self) -> usize {
        self.state.parked.lock().len()
    }

    /// Let the oldest parked write commit. Returns false when none is waiting.
    pub fn release_next(&self) -> bool {
        let next = self.state.parked.lock().pop_front();
        match next {
            Some(tx) => {
                let _ = tx.send(());
                true
            }
            None => false,
        }
    }

    pub fn release_all(&self) {
        while self.release_next() {}
    }
}
