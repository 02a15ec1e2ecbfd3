use crate::controller::Tracker;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<Mutex<Tracker>>,
}

impl AppState {
    pub fn new(tracker: Tracker) -> Self {
        Self {
            tracker: Arc::new(Mutex::new(tracker)),
        }
    }
}
