//! Durable storage for the tracker.
//!
//! The data file is a small string key-value store (a JSON object of string
//! values). The tracker record is itself a JSON document kept under
//! [`STORAGE_KEY`]. Older records stored each slot as a bare colour string;
//! those are upgraded while decoding and never seen past this module.

use crate::errors::AppError;
use crate::models::TrackerState;
use crate::slot::{Board, Category, Slot};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info, warn};

pub const STORAGE_KEY: &str = "midwife-tracker";

/// A JSON file holding string values by key.
#[derive(Debug, Clone)]
pub struct KvStore {
    path: PathBuf,
}

impl KvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when the file or the key does not exist.
    pub async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        match self.read_entries().await? {
            Some(mut entries) => Ok(entries.remove(key)),
            None => Ok(None),
        }
    }

    /// Writes `value` under `key`, keeping any other keys already stored.
    pub async fn set(&self, key: &str, value: String) -> Result<(), AppError> {
        let mut entries = match self.read_entries().await {
            Ok(entries) => entries.unwrap_or_default(),
            Err(err) => {
                warn!(path = %self.path.display(), "replacing unreadable store file: {}", err.message);
                BTreeMap::new()
            }
        };
        entries.insert(key.to_string(), value);

        let payload = serde_json::to_vec_pretty(&entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn read_entries(&self) -> Result<Option<BTreeMap<String, String>>, AppError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// A slot as it may appear on disk.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StoredSlot {
    Legacy(Category),
    Current(Slot),
}

pub fn migrate_slot(entry: StoredSlot) -> Slot {
    match entry {
        StoredSlot::Legacy(color) => Slot::new(color, ""),
        StoredSlot::Current(slot) => slot,
    }
}

/// The persisted record with every field optional so that partial or older
/// payloads merge over the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredState {
    name: Option<String>,
    subtitle: Option<String>,
    start_year: Option<String>,
    end_year: Option<String>,
    date_range: Option<String>,
    slots: Option<Vec<StoredSlot>>,
}

/// Decodes a stored record over [`TrackerState::default`].
///
/// A `slots` array of any length other than 40 is dropped as a whole and the
/// default board is kept.
pub fn decode_state(raw: &str) -> Result<TrackerState, serde_json::Error> {
    let stored: StoredState = serde_json::from_str(raw)?;
    let mut state = TrackerState::default();

    if let Some(name) = stored.name {
        state.name = name;
    }
    if let Some(subtitle) = stored.subtitle {
        state.subtitle = subtitle;
    }
    if let Some(start_year) = stored.start_year {
        state.start_year = start_year;
    }
    if let Some(end_year) = stored.end_year {
        state.end_year = end_year;
    }
    if let Some(date_range) = stored.date_range {
        state.date_range = date_range;
    }
    if let Some(slots) = stored.slots {
        let slots = slots.into_iter().map(migrate_slot).collect();
        match Board::from_slots(slots) {
            Ok(board) => state.slots = board,
            Err(rejected) => warn!(len = rejected.len(), "ignoring stored slots of unexpected length"),
        }
    }

    Ok(state)
}

/// Reads and writes the tracker record. Saving is refused until [`load`]
/// has run once, so startup defaults never overwrite a saved board.
///
/// [`load`]: Persistence::load
#[derive(Debug)]
pub struct Persistence {
    store: KvStore,
    loaded: bool,
}

impl Persistence {
    pub fn new(store: KvStore) -> Self {
        Self {
            store,
            loaded: false,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Returns the stored state, or `None` on first run. Read and decode
    /// failures are logged and also yield `None`.
    pub async fn load(&mut self) -> Option<TrackerState> {
        let result = match self.store.get(STORAGE_KEY).await {
            Ok(Some(raw)) => match decode_state(&raw) {
                Ok(state) => {
                    info!(slots = state.slots.len(), "loaded saved tracker");
                    Some(state)
                }
                Err(err) => {
                    error!("failed to parse saved tracker: {err}");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                error!(path = %self.store.path().display(), "failed to read store: {}", err.message);
                None
            }
        };
        self.loaded = true;
        result
    }

    pub async fn save(&self, state: &TrackerState) -> Result<(), AppError> {
        if !self.loaded {
            debug!("skipping save before initial load");
            return Ok(());
        }
        let payload = serde_json::to_string(state)?;
        self.store.set(STORAGE_KEY, payload).await?;
        debug!("saved tracker");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::DEFAULT_NAME;
    use crate::slot::SLOT_COUNT;
    use proptest::prelude::*;

    pub(crate) fn unique_data_path(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("footprint_board_{tag}_{}_{}.json", std::process::id(), nanos));
        path
    }

    async fn store_raw(path: &Path, raw: &str) {
        KvStore::new(path).set(STORAGE_KEY, raw.to_string()).await.unwrap();
    }

    fn legacy_payload(slots: &[&str]) -> String {
        serde_json::json!({
            "name": "Ada",
            "startYear": "2023",
            "endYear": "2026",
            "slots": slots,
        })
        .to_string()
    }

    #[test]
    fn migrate_slot_upgrades_bare_tag() {
        assert_eq!(
            migrate_slot(StoredSlot::Legacy(Category::Blue)),
            Slot::new(Category::Blue, "")
        );
        let current = Slot::new(Category::Pink, "2024-01-02");
        assert_eq!(migrate_slot(StoredSlot::Current(current.clone())), current);
    }

    #[test]
    fn decode_upgrades_legacy_slots() {
        let mut tags = vec!["empty"; SLOT_COUNT];
        tags[0] = "pink";
        tags[5] = "blue";
        let state = decode_state(&legacy_payload(&tags)).unwrap();

        assert_eq!(state.name, "Ada");
        assert_eq!(state.start_year, "2023");
        assert_eq!(state.slots.get(0), Some(&Slot::new(Category::Pink, "")));
        assert_eq!(state.slots.get(1), Some(&Slot::new(Category::Empty, "")));
        assert_eq!(state.slots.get(5), Some(&Slot::new(Category::Blue, "")));
    }

    #[test]
    fn decode_accepts_mixed_slot_shapes() {
        let mut slots = vec![serde_json::json!("empty"); SLOT_COUNT];
        slots[2] = serde_json::json!({ "color": "blue", "date": "2024-03-04" });
        slots[3] = serde_json::json!({ "color": "pink" });
        let raw = serde_json::json!({ "slots": slots }).to_string();

        let state = decode_state(&raw).unwrap();
        assert_eq!(state.slots.get(2), Some(&Slot::new(Category::Blue, "2024-03-04")));
        assert_eq!(state.slots.get(3), Some(&Slot::new(Category::Pink, "")));
    }

    #[test]
    fn decode_keeps_default_board_for_wrong_length() {
        let state = decode_state(&legacy_payload(&["pink"; 12])).unwrap();
        assert_eq!(state.slots, Board::default());
        assert_eq!(state.name, "Ada");
    }

    #[test]
    fn decode_merges_partial_payload_over_defaults() {
        let state = decode_state(r#"{"name":"Bea"}"#).unwrap();
        assert_eq!(
            state,
            TrackerState {
                name: "Bea".to_string(),
                ..TrackerState::default()
            }
        );
    }

    #[test]
    fn decode_skips_null_fields_but_adopts_empty_strings() {
        let state = decode_state(r#"{"name":null,"slots":null,"subtitle":""}"#).unwrap();
        assert_eq!(state.name, DEFAULT_NAME);
        assert_eq!(state.slots, Board::default());
        assert_eq!(state.subtitle, "");
    }

    #[test]
    fn decode_accepts_null_slot_date() {
        let mut slots = vec![serde_json::json!("empty"); SLOT_COUNT];
        slots[4] = serde_json::json!({ "color": "pink", "date": null });
        let raw = serde_json::json!({ "name": "Fay", "slots": slots }).to_string();

        let state = decode_state(&raw).unwrap();
        assert_eq!(state.name, "Fay");
        assert_eq!(state.slots.get(4), Some(&Slot::new(Category::Pink, "")));
    }

    #[test]
    fn decode_rejects_unknown_colour() {
        let mut tags = vec!["empty"; SLOT_COUNT];
        tags[0] = "green";
        assert!(decode_state(&legacy_payload(&tags)).is_err());
    }

    #[tokio::test]
    async fn load_missing_file_is_first_run() {
        let mut persistence = Persistence::new(KvStore::new(unique_data_path("missing")));
        assert!(persistence.load().await.is_none());
        assert!(persistence.is_loaded());
    }

    #[tokio::test]
    async fn load_malformed_record_falls_back() {
        let path = unique_data_path("malformed");
        store_raw(&path, "{not json").await;

        let mut persistence = Persistence::new(KvStore::new(&path));
        let state = persistence.load().await.unwrap_or_default();
        assert_eq!(state, TrackerState::default());
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn load_malformed_store_file_falls_back() {
        let path = unique_data_path("garbage");
        std::fs::write(&path, b"[1, 2").unwrap();

        let mut persistence = Persistence::new(KvStore::new(&path));
        assert!(persistence.load().await.is_none());
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn save_before_load_does_not_write() {
        let path = unique_data_path("early");
        store_raw(&path, &legacy_payload(&["blue"; SLOT_COUNT])).await;

        let persistence = Persistence::new(KvStore::new(&path));
        persistence.save(&TrackerState::default()).await.unwrap();

        let mut persistence = persistence;
        let state = persistence.load().await.unwrap();
        assert_eq!(state.slots.get(0), Some(&Slot::new(Category::Blue, "")));
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let path = unique_data_path("roundtrip");
        let mut state = TrackerState {
            name: "Cleo".to_string(),
            subtitle: String::new(),
            ..TrackerState::default()
        };
        state.slots.update(0, |slot| slot.set_category(Category::Pink).set_date("2024-05-01"));
        state.slots.update(39, |slot| slot.set_category(Category::Blue));

        let mut persistence = Persistence::new(KvStore::new(&path));
        persistence.load().await;
        persistence.save(&state).await.unwrap();

        let mut reopened = Persistence::new(KvStore::new(&path));
        assert_eq!(reopened.load().await, Some(state));
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn save_keeps_other_keys() {
        let path = unique_data_path("otherkeys");
        KvStore::new(&path).set("theme", "dark".to_string()).await.unwrap();

        let mut persistence = Persistence::new(KvStore::new(&path));
        persistence.load().await;
        persistence.save(&TrackerState::default()).await.unwrap();

        assert_eq!(
            KvStore::new(&path).get("theme").await.unwrap().as_deref(),
            Some("dark")
        );
        let _ = std::fs::remove_file(path);
    }

    fn arb_state() -> impl Strategy<Value = TrackerState> {
        let slot = (0usize..3, "[0-9-]{0,10}")
            .prop_map(|(pick, date)| Slot::new(Category::ALL[pick], date));
        (
            ".{0,20}",
            ".{0,20}",
            "[0-9]{4}",
            "[0-9]{4}",
            proptest::collection::vec(slot, SLOT_COUNT),
        )
            .prop_map(|(name, subtitle, start_year, end_year, slots)| TrackerState {
                name,
                subtitle,
                start_year,
                end_year,
                date_range: String::new(),
                slots: Board::from_slots(slots).unwrap(),
            })
    }

    proptest! {
        #[test]
        fn encoded_state_decodes_to_itself(state in arb_state()) {
            let raw = serde_json::to_string(&state).unwrap();
            prop_assert_eq!(decode_state(&raw).unwrap(), state);
        }
    }
}
