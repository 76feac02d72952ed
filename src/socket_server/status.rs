//! Ingress counters reported back to the extension in `server-status` frames

use std::collections::HashSet;
use std::time::Instant;

use parking_lot::Mutex;

use crate::schema::ServerStatus;

#[derive(Debug, Default)]
struct StatsInner {
    leader_since: Option<Instant>,
    connections: HashSet<String>,
    elements_inspected: u64,
}

/// Live statistics of one ingress listener
#[derive(Debug)]
pub struct IngressStats {
    port: u16,
    inner: Mutex<StatsInner>,
}

impl IngressStats {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            inner: Mutex::new(StatsInner::default()),
        }
    }

    pub fn mark_leader(&self) {
        self.inner.lock().leader_since = Some(Instant::now());
    }

    pub fn mark_stepped_down(&self) {
        let mut inner = self.inner.lock();
        inner.leader_since = None;
        inner.connections.clear();
    }

    pub fn connection_opened(&self, client_id: &str) {
        self.inner.lock().connections.insert(client_id.to_string());
    }

    pub fn connection_closed(&self, client_id: &str) {
        self.inner.lock().connections.remove(client_id);
    }

    pub fn record_elements(&self, count: usize) {
        self.inner.lock().elements_inspected += count as u64;
    }

    pub fn connection_count(&self) -> usize {
        self.inner.lock().connections.len()
    }

    pub fn snapshot(&self) -> ServerStatus {
        let inner = self.inner.lock();
        ServerStatus {
            running: inner.leader_since.is_some(),
            port: self.port,
            connected: !inner.connections.is_empty(),
            elements_inspected: inner.elements_inspected,
            uptime: inner
                .leader_since
                .map(|since| since.elapsed().as_millis() as u64)
                .unwrap_or(0),
        }
    }
}
