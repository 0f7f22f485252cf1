//! Notification list persistence over an injected store.
//!
//! Blobs are JSON string arrays under `savedNotifications_<identity key>`.
//! A missing or unreadable blob loads as `None`; the card then starts empty.

use crate::model::identity::Identity;
use crate::model::notification::NotificationList;
use crate::persist::{KeyValueStore, PersistError, PersistResult};
use log::{info, warn};

pub struct PersistenceBridge {
    store: Box<dyn KeyValueStore>,
}

impl PersistenceBridge {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Reads the last saved list for `identity`.
    pub fn load(&self, identity: &Identity) -> Option<NotificationList> {
        let key = identity.storage_key();
        let blob = match self.store.read(&key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return None,
            Err(err) => {
                warn!(
                    "event=persist_load module=persist status=error key={} error={}",
                    key, err
                );
                return None;
            }
        };

        match serde_json::from_str::<NotificationList>(&blob) {
            Ok(list) => {
                info!(
                    "event=persist_load module=persist status=ok key={} count={}",
                    key,
                    list.len()
                );
                Some(list)
            }
            Err(err) => {
                warn!(
                    "event=persist_load module=persist status=error key={} error_code=corrupt_blob error={}",
                    key, err
                );
                None
            }
        }
    }

    /// Writes `list` for `identity`, replacing any previous blob.
    pub fn save(&self, identity: &Identity, list: &NotificationList) -> PersistResult<()> {
        let key = identity.storage_key();
        let blob =
            serde_json::to_string(list).map_err(|err| PersistError::Encode(err.to_string()))?;
        self.store.write(&key, &blob)?;
        info!(
            "event=persist_save module=persist status=ok key={} count={}",
            key,
            list.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::PersistenceBridge;
    use crate::model::identity::Identity;
    use crate::model::notification::NotificationList;
    use crate::persist::store::MemoryStore;
    use crate::persist::KeyValueStore;

    fn alice() -> Identity {
        Identity::Person("alice".to_string())
    }

    #[test]
    fn save_then_load_under_identity_key() {
        let store = MemoryStore::new();
        let bridge = PersistenceBridge::new(Box::new(store.clone()));
        let list = NotificationList::from(&["one", "two"][..]);

        bridge.save(&alice(), &list).unwrap();
        assert_eq!(
            store.read("savedNotifications_alice").unwrap().as_deref(),
            Some(r#"["one","two"]"#)
        );
        assert_eq!(bridge.load(&alice()), Some(list));
    }

    #[test]
    fn missing_blob_loads_as_none() {
        let bridge = PersistenceBridge::new(Box::new(MemoryStore::new()));
        assert_eq!(bridge.load(&alice()), None);
    }

    #[test]
    fn corrupt_blob_loads_as_none() {
        let store = MemoryStore::new();
        store.write("savedNotifications_alice", "{not json").unwrap();
        let bridge = PersistenceBridge::new(Box::new(store));
        assert_eq!(bridge.load(&alice()), None);
    }
}
