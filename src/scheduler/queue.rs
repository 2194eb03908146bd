//! Ready Queue Seam
//!
//! The scheduler only ever pushes into the ready queue; consumers live elsewhere
//! (the executor slots). Anything that can accept items implements `ReadyQueue`.

use tokio::sync::mpsc::UnboundedSender;

/// Destination for promoted items.
pub trait ReadyQueue<T>: Send + Sync {
    fn put(&self, item: T);
}

impl<T: Send> ReadyQueue<T> for UnboundedSender<T> {
    fn put(&self, item: T) {
        if self.send(item).is_err() {
            tracing::warn!("Ready queue receiver is gone, dropping promoted item");
        }
    }
}
