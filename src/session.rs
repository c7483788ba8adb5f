//! Per-user scan state.
//!
//! Each visitor gets their own session holding the submitted profile and
//! the most recently resolved record. Nothing older is kept. The store is
//! bounded and evicts the least recently used session when full.

use crate::food::record::NutritionRecord;
use crate::profile::UserProfile;
use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use uuid::Uuid;

/// Largest image a session keeps for `/image`. Bigger scans still resolve,
/// they just are not retained.
pub const MAX_STORED_IMAGE_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub profile: UserProfile,
    pub record: Option<NutritionRecord>,
    /// Bytes of the image behind `record`.
    pub image: Option<Vec<u8>>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(profile: UserProfile) -> Self {
        Self {
            id: Uuid::new_v4(),
            profile,
            record: None,
            image: None,
            updated_at: Utc::now(),
        }
    }

    /// Replace the current scan with a newly resolved one.
    pub fn record_scan(&mut self, record: NutritionRecord, image: Vec<u8>) {
        self.record = Some(record);
        self.image = if image.len() <= MAX_STORED_IMAGE_BYTES {
            Some(image)
        } else {
            log::warn!(
                "Not keeping {} byte image for session {}",
                image.len(),
                self.id
            );
            None
        };
        self.updated_at = Utc::now();
    }

    pub fn set_profile(&mut self, profile: UserProfile) {
        self.profile = profile;
        self.updated_at = Utc::now();
    }
}

pub struct SessionStore {
    sessions: Mutex<LruCache<Uuid, Session>>,
}

impl SessionStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Store a profile, creating a session unless `id` names a live one.
    pub fn submit_profile(&self, id: Option<Uuid>, profile: UserProfile) -> Uuid {
        let mut sessions = self.sessions.lock();
        if let Some(session) = id.and_then(|id| sessions.get_mut(&id)) {
            session.set_profile(profile);
            return session.id;
        }

        let session = Session::new(profile);
        let id = session.id;
        if let Some((evicted, _)) = sessions.push(id, session) {
            if evicted != id {
                log::info!("Session store full, evicted session {}", evicted);
            }
        }
        id
    }

    /// Snapshot of a session.
    pub fn get(&self, id: &Uuid) -> Option<Session> {
        self.sessions.lock().get(id).cloned()
    }

    /// Run `f` against a live session. `None` if it does not exist.
    pub fn update<T>(&self, id: &Uuid, f: impl FnOnce(&mut Session) -> T) -> Option<T> {
        self.sessions.lock().get_mut(id).map(f)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
