use crate::config::SocialConfig;
use crate::social::record::PeerRecord;
use crate::storage::SharedStore;

/// Cached view of every other live instance, rebuilt from the shared store
/// at most once per read interval.
pub struct PeerDirectory<S> {
    store: S,
    config: SocialConfig,
    self_id: String,
    peers: Vec<PeerRecord>,
    last_scan: Option<f64>,
}

impl<S: SharedStore> PeerDirectory<S> {
    pub fn new(store: S, config: SocialConfig, self_id: impl Into<String>) -> Self {
        Self {
            store,
            config,
            self_id: self_id.into(),
            peers: Vec::new(),
            last_scan: None,
        }
    }

    pub fn self_id(&self) -> &str {
        &self.self_id
    }

    /// Peers from the latest scan.
    pub fn peers(&self) -> &[PeerRecord] {
        &self.peers
    }

    pub fn find(&self, id: &str) -> Option<&PeerRecord> {
        self.peers.iter().find(|p| p.id == id)
    }

    /// Rescan if the read interval has passed, then return the peer list.
    pub fn refresh(&mut self, now: f64) -> &[PeerRecord] {
        self.poll(now);
        &self.peers
    }

    /// Rescan if due. Returns the seconds covered by this scan (time since
    /// the previous one, capped at the staleness threshold), or `None` when
    /// the cached list was kept.
    pub fn poll(&mut self, now: f64) -> Option<f64> {
        let covered = match self.last_scan {
            // Clock stepped backwards: rescan rather than wait it out.
            Some(last) if now >= last && now - last < self.config.read_interval => return None,
            Some(last) if now >= last => (now - last).min(self.config.stale_threshold),
            _ => self.config.read_interval,
        };
        self.last_scan = Some(now);
        self.scan(now);
        Some(covered)
    }

    fn scan(&mut self, now: f64) {
        let keys = match self.store.list(&self.config.key_prefix) {
            Ok(keys) => keys,
            Err(e) => {
                log::debug!("Peer scan failed, keeping {} cached peers: {e}", self.peers.len());
                let stale = self.config.stale_threshold;
                self.peers.retain(|p| now - p.timestamp <= stale);
                return;
            }
        };

        self.peers.clear();
        for key in &keys {
            let Some(id) = self.config.id_from_key(key) else {
                continue;
            };
            if id == self.self_id {
                continue;
            }

            let body = match self.store.read(key) {
                Ok(body) => body,
                Err(e) => {
                    log::trace!("Skipping peer {id}: {e}");
                    continue;
                }
            };
            match PeerRecord::parse(id, &body) {
                Ok(peer) if now - peer.timestamp <= self.config.stale_threshold => {
                    self.peers.push(peer)
                }
                Ok(peer) => log::trace!("Skipping stale peer {id} ({:.1}s old)", now - peer.timestamp),
                Err(e) => log::trace!("Skipping peer {id}: {e}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::storage::MemoryStore;
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Memory store with one unreadable key and a switch that breaks listing.
    #[derive(Clone, Default)]
    struct Flaky {
        inner: MemoryStore,
        unreadable: &'static str,
        list_down: Arc<AtomicBool>,
    }

    impl SharedStore for Flaky {
        fn write_atomic(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
            self.inner.write_atomic(key, bytes)
        }

        fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
            if self.list_down.load(Ordering::SeqCst) {
                return Err(io::Error::new(io::ErrorKind::Other, "listing failed").into());
            }
            self.inner.list(prefix)
        }

        fn read(&self, key: &str) -> Result<Vec<u8>, StoreError> {
            if key == self.unreadable {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied").into());
            }
            self.inner.read(key)
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    fn line(x: f64, ts: f64) -> String {
        format!("{x},900,128,128,1,idle,walk,0,,{ts:.3}\n")
    }

    fn setup() -> (MemoryStore, PeerDirectory<MemoryStore>) {
        let store = MemoryStore::new();
        let dir = PeerDirectory::new(store.clone(), SocialConfig::default(), "me");
        (store, dir)
    }

    #[test]
    fn excludes_self_stale_and_malformed() {
        let (store, mut dir) = setup();
        let now = 1000.0;
        store.write_atomic("petwander-me-pos", line(1.0, now).as_bytes()).unwrap();
        store.write_atomic("petwander-fresh-pos", line(2.0, now - 1.0).as_bytes()).unwrap();
        store.write_atomic("petwander-edge-pos", line(3.0, now - 3.0).as_bytes()).unwrap();
        store.write_atomic("petwander-old-pos", line(4.0, now - 3.01).as_bytes()).unwrap();
        store.write_atomic("petwander-short-pos", b"1,2,3,4,1,idle,walk,0,").unwrap();
        store.write_atomic("petwander-junk-pos", b"\xff\xfe").unwrap();
        store.write_atomic("other-x-pos", line(5.0, now).as_bytes()).unwrap();

        let mut ids: Vec<_> = dir.refresh(now).iter().map(|p| p.id.clone()).collect();
        ids.sort();
        assert_eq!(ids, vec!["edge".to_string(), "fresh".to_string()]);
    }

    #[test]
    fn rescans_at_most_once_per_interval() {
        let (store, mut dir) = setup();
        assert_eq!(dir.poll(100.0), Some(0.3));
        store.write_atomic("petwander-late-pos", line(1.0, 100.1).as_bytes()).unwrap();

        assert_eq!(dir.poll(100.1), None);
        assert!(dir.refresh(100.2).is_empty());

        let covered = dir.poll(100.5).unwrap();
        assert!((covered - 0.5).abs() < 1e-9);
        assert_eq!(dir.peers().len(), 1);
        assert!(dir.find("late").is_some());
    }

    #[test]
    fn long_gaps_are_capped_and_backwards_clocks_rescan() {
        let (_store, mut dir) = setup();
        dir.poll(100.0);
        assert_eq!(dir.poll(200.0), Some(3.0));
        assert_eq!(dir.poll(50.0), Some(0.3));
    }

    #[test]
    fn peers_age_out_without_any_message() {
        let (store, mut dir) = setup();
        store.write_atomic("petwander-gone-pos", line(1.0, 10.0).as_bytes()).unwrap();
        assert_eq!(dir.refresh(11.0).len(), 1);
        assert_eq!(dir.refresh(13.5).len(), 0);
    }

    #[test]
    fn unreadable_record_does_not_abort_the_scan() {
        let store = Flaky {
            unreadable: "petwander-bad-pos",
            ..Flaky::default()
        };
        let mut dir = PeerDirectory::new(store.clone(), SocialConfig::default(), "me");
        store.write_atomic("petwander-bad-pos", line(1.0, 50.0).as_bytes()).unwrap();
        store.write_atomic("petwander-good-pos", line(2.0, 50.0).as_bytes()).unwrap();
        store.write_atomic("petwander-zed-pos", line(3.0, 50.0).as_bytes()).unwrap();

        let mut ids: Vec<_> = dir.refresh(50.0).iter().map(|p| p.id.clone()).collect();
        ids.sort();
        assert_eq!(ids, vec!["good".to_string(), "zed".to_string()]);
    }

    #[test]
    fn failed_listing_keeps_cache_but_prunes_stale() {
        let store = Flaky::default();
        let mut dir = PeerDirectory::new(store.clone(), SocialConfig::default(), "me");
        store.write_atomic("petwander-a-pos", line(1.0, 10.0).as_bytes()).unwrap();
        store.write_atomic("petwander-b-pos", line(2.0, 12.0).as_bytes()).unwrap();
        assert_eq!(dir.refresh(12.0).len(), 2);

        store.list_down.store(true, Ordering::SeqCst);
        assert_eq!(dir.poll(12.5), Some(0.5));
        assert_eq!(dir.peers().len(), 2);

        let ids: Vec<_> = dir.refresh(13.5).iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec!["b".to_string()]);
    }
}
