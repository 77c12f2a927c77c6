use log::info;

pub struct ActivityLog;

impl ActivityLog {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, message: &str) {
        info!(target: "parkcore", "{}", message);
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}
