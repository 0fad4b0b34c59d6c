//! Rehydration from, and write-through to, the key-value store.
//!
//! Each persisted piece is read and written independently. Any storage or
//! decode failure is logged and replaced by that piece's default; it never
//! affects the other pieces and never propagates.

use raffle_core::error::StorageError;
use raffle_core::feedback::SoundSettings;
use raffle_core::store::KeyValueStore;
use tracing::{debug, warn};

use crate::domain::aggregates::RaffleSession;

/// Key of the pending list (JSON array of strings).
pub const PENDING_KEY: &str = "pending";
/// Key of the drawn list (JSON array of strings).
pub const DRAWN_KEY: &str = "drawn";
/// Key of the current reveal (raw string, empty when absent).
pub const CURRENT_REVEAL_KEY: &str = "current_reveal";
/// Key of the sound toggle (`"true"` / `"false"`).
pub const SOUND_ENABLED_KEY: &str = "sound_enabled";
/// Key of the sound volume (decimal string).
pub const SOUND_VOLUME_KEY: &str = "sound_volume";

fn decode_error(key: &str, message: impl ToString) -> StorageError {
    StorageError::Decode {
        key: key.to_owned(),
        message: message.to_string(),
    }
}

/// Reads `key` and decodes it, falling back to `T::default()`.
async fn load_or_default<T, F>(store: &dyn KeyValueStore, key: &str, decode: F) -> T
where
    T: Default,
    F: FnOnce(&str) -> Result<T, StorageError>,
{
    let loaded = match store.get(key).await {
        Ok(Some(raw)) => decode(&raw),
        Ok(None) => return T::default(),
        Err(err) => Err(err),
    };
    loaded.unwrap_or_else(|err| {
        warn!(key, error = %err, "discarding unreadable stored value");
        T::default()
    })
}

fn decode_names(key: &str, raw: &str) -> Result<Vec<String>, StorageError> {
    serde_json::from_str(raw).map_err(|e| decode_error(key, e))
}

/// Loads a session from `store`.
pub async fn rehydrate(store: &dyn KeyValueStore) -> RaffleSession {
    let pending = load_or_default(store, PENDING_KEY, |raw| decode_names(PENDING_KEY, raw)).await;
    let drawn = load_or_default(store, DRAWN_KEY, |raw| decode_names(DRAWN_KEY, raw)).await;
    let current_reveal: String =
        load_or_default(store, CURRENT_REVEAL_KEY, |raw| Ok(raw.to_owned())).await;
    let sound = load_sound(store).await;

    debug!(
        pending = pending.len(),
        drawn = drawn.len(),
        has_reveal = !current_reveal.is_empty(),
        "rehydrated session"
    );
    RaffleSession::restore(pending, drawn, Some(current_reveal), sound)
}

async fn load_sound(store: &dyn KeyValueStore) -> SoundSettings {
    let defaults = SoundSettings::default();
    let enabled = load_or_default(store, SOUND_ENABLED_KEY, |raw| match raw {
        "true" => Ok(Some(true)),
        "false" => Ok(Some(false)),
        other => Err(decode_error(SOUND_ENABLED_KEY, format!("not a boolean: {other:?}"))),
    })
    .await
    .unwrap_or(defaults.enabled);
    let volume = load_or_default(store, SOUND_VOLUME_KEY, |raw| {
        raw.trim()
            .parse::<f32>()
            .map(Some)
            .map_err(|e| decode_error(SOUND_VOLUME_KEY, e))
    })
    .await
    .unwrap_or(defaults.volume);
    SoundSettings::new(enabled, volume)
}

async fn write(store: &dyn KeyValueStore, key: &str, value: &str) {
    if let Err(err) = store.set(key, value).await {
        warn!(key, error = %err, "failed to persist value");
    }
}

fn encode_names(names: &[String]) -> String {
    // Serializing a list of strings cannot fail.
    serde_json::to_string(names).unwrap_or_else(|_| "[]".to_owned())
}

/// Writes pending, drawn and current reveal, each independently.
pub async fn persist_session(store: &dyn KeyValueStore, session: &RaffleSession) {
    write(store, PENDING_KEY, &encode_names(session.pending())).await;
    write(store, DRAWN_KEY, &encode_names(session.drawn())).await;
    write(
        store,
        CURRENT_REVEAL_KEY,
        session.current_reveal().unwrap_or_default(),
    )
    .await;
}

/// Writes the sound preferences, each independently.
pub async fn persist_sound(store: &dyn KeyValueStore, sound: SoundSettings) {
    write(store, SOUND_ENABLED_KEY, if sound.enabled { "true" } else { "false" }).await;
    write(store, SOUND_VOLUME_KEY, &sound.volume.to_string()).await;
}

/// Removes every stored key.
pub async fn clear_store(store: &dyn KeyValueStore) {
    if let Err(err) = store.clear().await {
        warn!(error = %err, "failed to clear stored session");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raffle_test_support::{FailingStore, RecordingStore};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[tokio::test]
    async fn test_rehydrate_empty_store_yields_empty_session() {
        let store = RecordingStore::new();

        let session = rehydrate(&store).await;

        assert!(session.pending().is_empty());
        assert!(session.drawn().is_empty());
        assert_eq!(session.current_reveal(), None);
        assert_eq!(session.sound(), SoundSettings::default());
        assert!(!session.is_locked());
    }

    #[tokio::test]
    async fn test_rehydrate_reads_all_pieces() {
        let store = RecordingStore::with_entries([
            (PENDING_KEY, r#"["Ana","Cid"]"#),
            (DRAWN_KEY, r#"["Bea"]"#),
            (CURRENT_REVEAL_KEY, "Bea"),
            (SOUND_ENABLED_KEY, "false"),
            (SOUND_VOLUME_KEY, "0.75"),
        ]);

        let session = rehydrate(&store).await;

        assert_eq!(session.pending(), ["Ana", "Cid"]);
        assert_eq!(session.drawn(), ["Bea"]);
        assert_eq!(session.current_reveal(), Some("Bea"));
        assert!(!session.sound().enabled);
        assert!((session.sound().volume - 0.75).abs() < f32::EPSILON);
        assert!(session.is_locked());
    }

    #[tokio::test]
    async fn test_corrupt_pending_does_not_affect_other_pieces() {
        let store = RecordingStore::with_entries([
            (PENDING_KEY, "{not json"),
            (DRAWN_KEY, r#"["Bea"]"#),
            (CURRENT_REVEAL_KEY, "Bea"),
        ]);

        let session = rehydrate(&store).await;

        assert!(session.pending().is_empty());
        assert_eq!(session.drawn(), ["Bea"]);
        assert_eq!(session.current_reveal(), Some("Bea"));
    }

    #[tokio::test]
    async fn test_wrongly_typed_drawn_defaults_to_empty() {
        let store = RecordingStore::with_entries([
            (PENDING_KEY, r#"["Ana"]"#),
            (DRAWN_KEY, r#"[1, 2, 3]"#),
        ]);

        let session = rehydrate(&store).await;

        assert_eq!(session.pending(), ["Ana"]);
        assert!(session.drawn().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_key_defaults_only_that_piece() {
        let store = RecordingStore::with_entries([
            (PENDING_KEY, r#"["Ana"]"#),
            (DRAWN_KEY, r#"["Bea"]"#),
            (CURRENT_REVEAL_KEY, "Bea"),
        ])
        .failing_on(DRAWN_KEY);

        let session = rehydrate(&store).await;

        assert_eq!(session.pending(), ["Ana"]);
        assert!(session.drawn().is_empty());
        assert_eq!(session.current_reveal(), Some("Bea"));
    }

    #[tokio::test]
    async fn test_bad_sound_values_fall_back_independently() {
        let store = RecordingStore::with_entries([
            (SOUND_ENABLED_KEY, "false"),
            (SOUND_VOLUME_KEY, "loud"),
        ]);

        let session = rehydrate(&store).await;

        assert!(!session.sound().enabled);
        assert!((session.sound().volume - SoundSettings::default().volume).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_rehydrate_from_failing_store_yields_defaults() {
        let session = rehydrate(&FailingStore).await;

        assert!(session.pending().is_empty());
        assert!(!session.is_locked());
    }

    #[tokio::test]
    async fn test_persist_session_writes_three_pieces() {
        let store = RecordingStore::new();
        let session = RaffleSession::restore(
            names(&["Ana"]),
            names(&["Bea"]),
            Some("Bea".to_owned()),
            SoundSettings::default(),
        );

        persist_session(&store, &session).await;

        assert_eq!(store.value(PENDING_KEY).as_deref(), Some(r#"["Ana"]"#));
        assert_eq!(store.value(DRAWN_KEY).as_deref(), Some(r#"["Bea"]"#));
        assert_eq!(store.value(CURRENT_REVEAL_KEY).as_deref(), Some("Bea"));
    }

    #[tokio::test]
    async fn test_persist_session_writes_empty_reveal_as_empty_string() {
        let store = RecordingStore::new();

        persist_session(&store, &RaffleSession::new()).await;

        assert_eq!(store.value(CURRENT_REVEAL_KEY).as_deref(), Some(""));
        assert_eq!(store.value(PENDING_KEY).as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_persist_continues_past_failing_key() {
        let store = RecordingStore::new().failing_on(PENDING_KEY);
        let session = RaffleSession::restore(
            names(&["Ana"]),
            names(&["Bea"]),
            Some("Bea".to_owned()),
            SoundSettings::default(),
        );

        persist_session(&store, &session).await;

        assert_eq!(store.value(PENDING_KEY), None);
        assert_eq!(store.value(DRAWN_KEY).as_deref(), Some(r#"["Bea"]"#));
        assert_eq!(store.value(CURRENT_REVEAL_KEY).as_deref(), Some("Bea"));
    }

    #[tokio::test]
    async fn test_persist_sound_round_trips_through_rehydrate() {
        let store = RecordingStore::new();

        persist_sound(&store, SoundSettings::new(false, 0.55)).await;
        let session = rehydrate(&store).await;

        assert!(!session.sound().enabled);
        assert!((session.sound().volume - 0.55).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_failing_store_writes_do_not_panic() {
        persist_session(&FailingStore, &RaffleSession::new()).await;
        persist_sound(&FailingStore, SoundSettings::default()).await;
        clear_store(&FailingStore).await;
    }
}
