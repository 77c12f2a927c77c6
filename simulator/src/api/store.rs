use parkcore::detection::DetectionResult;
use std::sync::{Arc, RwLock};

/// In-memory detection history, newest first.
///
/// Durable persistence is out of scope here; the store mirrors what the
/// external service would keep in its database.
#[derive(Clone)]
pub struct HistoryStore {
    inner: Arc<RwLock<StoreState>>,
}

struct StoreState {
    detections: Vec<DetectionResult>,
    next_id: i64,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreState {
                detections: Vec::new(),
                next_id: 1,
            })),
        }
    }

    /// Assigns an id and files the record at the head of the history.
    pub fn insert(&self, mut detection: DetectionResult) -> DetectionResult {
        let mut state = self.inner.write().unwrap();
        detection.id = state.next_id;
        state.next_id += 1;
        state.detections.insert(0, detection.clone());
        detection
    }

    pub fn list(&self) -> Vec<DetectionResult> {
        self.inner.read().unwrap().detections.clone()
    }

    pub fn get(&self, id: i64) -> Option<DetectionResult> {
        self.inner
            .read()
            .unwrap()
            .detections
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    pub fn remove(&self, id: i64) -> Option<DetectionResult> {
        let mut state = self.inner.write().unwrap();
        let index = state.detections.iter().position(|d| d.id == id)?;
        Some(state.detections.remove(index))
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap().detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> DetectionResult {
        DetectionResult {
            id: 0,
            original_filename: name.to_string(),
            car_count: 1,
            detected_at: "2025-11-02T10:15:00Z".into(),
            upload_path: format!("/static/uploads/{name}"),
            result_path: format!("/static/results/{name}"),
            details: None,
        }
    }

    #[test]
    fn insert_assigns_increasing_ids_newest_first() {
        let store = HistoryStore::new();
        let first = store.insert(record("a.png"));
        let second = store.insert(record("b.png"));
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let list = store.list();
        assert_eq!(list[0].original_filename, "b.png");
        assert_eq!(list[1].original_filename, "a.png");
    }

    #[test]
    fn get_finds_records_by_id() {
        let store = HistoryStore::new();
        let stored = store.insert(record("a.png"));
        assert_eq!(store.get(stored.id).unwrap().original_filename, "a.png");
        assert!(store.get(stored.id + 1).is_none());
    }

    #[test]
    fn remove_returns_the_record_once() {
        let store = HistoryStore::new();
        let stored = store.insert(record("a.png"));
        assert!(store.remove(stored.id).is_some());
        assert!(store.remove(stored.id).is_none());
        assert!(store.is_empty());
    }
}
