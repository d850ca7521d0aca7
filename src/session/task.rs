//! Background tasks bound to an owner's lifetime

use std::future::Future;

use tokio::task::JoinHandle;

/// A spawned task that is aborted when the handle is dropped.
pub struct ScheduledTask {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    pub fn spawn<F>(name: &'static str, future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        log::debug!("Starting {} task", name);
        Self {
            name,
            handle: tokio::spawn(future),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        if !self.handle.is_finished() {
            log::debug!("Stopping {} task", self.name);
            self.handle.abort();
        }
    }
}
