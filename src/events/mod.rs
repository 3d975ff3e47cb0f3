use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;

use crate::entities::MovementKind;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Domain events published after the corresponding change is durable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    MovementRecorded {
        movement_id: String,
        product_id: String,
        warehouse_id: i32,
        kind: MovementKind,
        quantity: i32,
    },
    MovementDeleted {
        movement_id: String,
    },
}

/// Drains the event channel until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::MovementRecorded {
                movement_id,
                product_id,
                warehouse_id,
                kind,
                quantity,
            } => info!(
                movement_id = %movement_id,
                product_id = %product_id,
                warehouse_id,
                kind = %kind,
                quantity,
                "movement recorded"
            ),
            Event::MovementDeleted { movement_id } => {
                info!(movement_id = %movement_id, "movement deleted")
            }
        }
    }

    info!("Event channel closed; event processing loop stopped");
}
