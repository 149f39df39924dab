//! Advertisement registry — devices seen during discovery, first seen wins.
//!
//! The registry is the only place addresses are resolved to transport
//! handles. It is constructed once at startup and shared by reference with
//! the discovery loop, the acquisition coordinator and the pollers.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::{broadcast, oneshot};

use florahub_domain::address::Address;
use florahub_domain::advertisement::Advertisement;

/// Capacity of the "any advertisement" broadcast channel.
const NOTIFY_CAPACITY: usize = 64;

struct State<H> {
    advertisements: HashMap<Address, Advertisement<H>>,
    allowed: BTreeSet<String>,
    waiters: HashMap<Address, Vec<oneshot::Sender<Advertisement<H>>>>,
}

/// Set of currently known broadcasting devices, keyed by address.
///
/// Entries are never mutated nor evicted once recorded.
pub struct AdvertisementRegistry<H> {
    state: Mutex<State<H>>,
    notifier: broadcast::Sender<Advertisement<H>>,
}

impl<H: Clone> Default for AdvertisementRegistry<H> {
    fn default() -> Self {
        let (notifier, _) = broadcast::channel(NOTIFY_CAPACITY);
        Self {
            state: Mutex::new(State {
                advertisements: HashMap::new(),
                allowed: BTreeSet::new(),
                waiters: HashMap::new(),
            }),
            notifier,
        }
    }
}

impl<H: Clone> AdvertisementRegistry<H> {
    /// Create an empty registry with an empty allow-list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an advertisement unless its address is already known.
    ///
    /// Returns `true` when the advertisement was inserted. On insert, every
    /// [`wait_for`](Self::wait_for) pending on the address is resolved and
    /// the advertisement is broadcast to [`subscribe`](Self::subscribe)rs.
    pub fn record(&self, advertisement: Advertisement<H>) -> bool {
        let waiters = {
            let mut state = self.lock();
            match state.advertisements.entry(advertisement.address.clone()) {
                Entry::Occupied(_) => return false,
                Entry::Vacant(slot) => {
                    slot.insert(advertisement.clone());
                }
            }
            state
                .waiters
                .remove(&advertisement.address)
                .unwrap_or_default()
        };

        for waiter in waiters {
            // the waiting future may have been dropped
            let _ = waiter.send(advertisement.clone());
        }
        // fails only when nobody is subscribed
        let _ = self.notifier.send(advertisement);
        true
    }

    /// Look up an advertisement by address.
    #[must_use]
    pub fn get(&self, address: &Address) -> Option<Advertisement<H>> {
        self.lock().advertisements.get(address).cloned()
    }

    /// Snapshot of every known advertisement, ordered by address.
    #[must_use]
    pub fn list(&self) -> Vec<Advertisement<H>> {
        let mut list: Vec<_> = self.lock().advertisements.values().cloned().collect();
        list.sort_by(|a, b| a.address.cmp(&b.address));
        list
    }

    /// Number of known advertisements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().advertisements.len()
    }

    /// Whether no advertisement has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().advertisements.is_empty()
    }

    /// Add a local name to the allow-list consulted by discovery.
    pub fn allow(&self, name: impl Into<String>) {
        self.lock().allowed.insert(name.into());
    }

    /// Whether devices broadcasting `name` should be recorded.
    #[must_use]
    pub fn is_allowed(&self, name: &str) -> bool {
        self.lock().allowed.contains(name)
    }

    /// Subscribe to newly recorded advertisements.
    ///
    /// The receiver gets every advertisement recorded *after* the call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Advertisement<H>> {
        self.notifier.subscribe()
    }

    /// Wait until `address` is known.
    ///
    /// Resolves immediately when it already is. Returns `None` only if the
    /// pending waiter was discarded without being resolved.
    pub async fn wait_for(&self, address: &Address) -> Option<Advertisement<H>> {
        let receiver = {
            let mut state = self.lock();
            if let Some(advertisement) = state.advertisements.get(address) {
                return Some(advertisement.clone());
            }
            let (sender, receiver) = oneshot::channel();
            let waiters = state.waiters.entry(address.clone()).or_default();
            // drop senders whose waiter was cancelled
            waiters.retain(|waiter| !waiter.is_closed());
            waiters.push(sender);
            receiver
        };
        receiver.await.ok()
    }

    fn lock(&self) -> MutexGuard<'_, State<H>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
