//! Time-windowed duplicate suppression keyed by a content fingerprint.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::channels::{Notification, Recipient};

type HmacSha256 = Hmac<Sha256>;

/// Fixed key for the body digest. Fingerprints are only compared within one
/// process, so the key just has to stay stable for the process lifetime.
const FINGERPRINT_KEY: &[u8] = b"notify-relay-body-v1";

/// At-most-once guard: remembers content fingerprints for a TTL window.
///
/// The window runs from first occurrence; a repeat does not renew it.
/// Eviction is lazy and amortized across `seen` calls; there is no background
/// sweeper, and no call ever observes an expired entry as present.
pub struct Deduper {
    ttl: Duration,
    store: Mutex<HashMap<String, Instant>>,
}

impl Deduper {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            store: Mutex::new(HashMap::new()),
        }
    }

    /// Atomic check-and-insert: purges expired entries, then reports whether
    /// this exact (recipient, subject, body) was already recorded inside the
    /// TTL window, recording it if not. Of any number of concurrent callers
    /// with identical content, exactly one observes `false`.
    pub fn seen(&self, recipient: &Recipient, notification: &Notification) -> bool {
        self.seen_at(recipient, notification, Instant::now())
    }

    pub(crate) fn seen_at(
        &self,
        recipient: &Recipient,
        notification: &Notification,
        now: Instant,
    ) -> bool {
        let key = fingerprint(&recipient.id, &notification.subject, &notification.body);
        let mut store = self.store.lock().unwrap();
        store.retain(|_, first_seen| now.duration_since(*first_seen) <= self.ttl);
        if store.contains_key(&key) {
            return true;
        }
        store.insert(key, now);
        false
    }
}

/// SHA-256 over recipient id, subject, and a keyed digest of the body.
fn fingerprint(recipient_id: &str, subject: &str, body: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(FINGERPRINT_KEY).expect("HMAC can take key of any size");
    mac.update(body.as_bytes());
    let body_digest = hex::encode(mac.finalize().into_bytes());

    let mut hasher = Sha256::new();
    hasher.update(recipient_id.as_bytes());
    hasher.update(subject.as_bytes());
    hasher.update(body_digest.as_bytes());
    hex::encode(hasher.finalize())
}

// ── Tests ───────────────────────────────────────────────────────────
