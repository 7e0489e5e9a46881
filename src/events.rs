use tokio::sync::mpsc;
use tracing::{error, info};

/// Domain events emitted by the services after state changes commit.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    CustomerRegistered(i64),
    AddressCreated(i64),
    AddressRewritten { customer_id: i64, address_id: i64 },
    CatalogItemCreated(i64),
    CartUpdated(i64),
    OrderPlaced(i64),
}

/// Cloneable handle for emitting events from services
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), mpsc::error::SendError<Event>> {
        self.sender.send(event).await
    }

    /// Emits an event, logging instead of failing when the receiver is gone.
    /// Event delivery is never allowed to fail a committed operation.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.sender.send(event).await {
            error!("Failed to send event: {}", e);
        }
    }
}

/// Drains the event channel, logging each event. Runs for the lifetime of
/// the server as a background task.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("Event processor started");
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::CustomerRegistered(id) => info!(customer_id = id, "customer registered"),
            Event::AddressCreated(id) => info!(address_id = id, "address created"),
            Event::AddressRewritten {
                customer_id,
                address_id,
            } => info!(customer_id, address_id, "customer address rewritten"),
            Event::CatalogItemCreated(id) => info!(item_id = id, "catalog item created"),
            Event::CartUpdated(id) => info!(customer_id = id, "cart updated"),
            Event::OrderPlaced(id) => info!(order_id = id, "order placed"),
        }
    }
    info!("Event processor stopped");
}
