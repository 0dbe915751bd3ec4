use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::DeliveryStatus;

/// Lifecycle events emitted by the services. Delivery is best-effort: a
/// failed send is logged and never fails the originating request.
#[derive(Debug, Clone)]
pub enum Event {
    ParcelCreated(Uuid),
    ParcelStatusChanged {
        parcel_id: Uuid,
        old_status: DeliveryStatus,
        new_status: DeliveryStatus,
    },
    ParcelsDeleted(Vec<Uuid>),
    BatchCreated {
        batch_id: Uuid,
        requested: usize,
        updated: u64,
    },
    BatchDeleted {
        batch_id: Uuid,
        reverted: u64,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) {
        if let Err(e) = self.sender.send(event).await {
            warn!("Failed to send event: {}", e);
        }
    }
}

/// Drains the event channel, logging each event. Spawned from the binary;
/// a real deployment would fan these out to downstream consumers.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        info!(?event, "Processing event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_on_closed_channel_does_not_panic() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        sender.send(Event::ParcelCreated(Uuid::new_v4())).await;
    }
}
