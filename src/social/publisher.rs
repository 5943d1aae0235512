use crate::config::SocialConfig;
use crate::social::record::PeerRecord;
use crate::social::LocalView;
use crate::storage::SharedStore;

/// Writes the local instance's position record for peers to read.
///
/// Called every tick but only writes every `publish_stride` calls, so the
/// cadence follows the simulation rate. Failures are logged and dropped.
pub struct PositionPublisher<S> {
    store: S,
    config: SocialConfig,
    id: String,
    key: String,
    calls: u64,
}

impl<S: SharedStore> PositionPublisher<S> {
    pub fn new(store: S, config: SocialConfig, id: impl Into<String>) -> Self {
        let id = id.into();
        let key = config.record_key(&id);
        Self {
            store,
            config,
            id,
            key,
            calls: 0,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns true when this call actually wrote.
    pub fn publish(&mut self, now: f64, local: &LocalView, fight_target: Option<&str>) -> bool {
        self.calls += 1;
        if self.calls % u64::from(self.config.publish_stride.max(1)) != 0 {
            return false;
        }

        let record = PeerRecord {
            id: self.id.clone(),
            x: local.x,
            y: local.y,
            width: self.config.pet_width,
            height: self.config.pet_height,
            facing: local.facing,
            state: local.state.name().to_string(),
            locomotion: local.locomotion.posture().to_string(),
            region: local.region,
            fight_target: fight_target.map(str::to_string),
            timestamp: now,
        };
        match self.store.write_atomic(&self.key, record.encode().as_bytes()) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("Position publish failed: {e}");
                false
            }
        }
    }

    /// Remove our record. A missing record is fine.
    pub fn shutdown(&self) {
        if let Err(e) = self.store.remove(&self.key) {
            log::debug!("Position record cleanup: {e}");
        }
    }
}
