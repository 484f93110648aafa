use std::sync::Arc;
use tokio::sync::broadcast;
use trellis_types::Event;

/// 事件总线
///
/// 业务变更钩子可以直接调用规则引擎，也可以把事件
/// 发布到总线走异步消费路径。
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: Event) -> Result<usize, broadcast::error::SendError<Event>> {
        self.sender.send(event)
    }
}

pub type SharedEventBus = Arc<EventBus>;

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn test_bus_publish_subscribe() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        let event = Event::new("work_order.created").with_field("priority", "HIGH");
        let delivered = bus.publish(event).unwrap();
        assert_eq!(delivered, 1);

        let received = timeout(Duration::from_millis(100), rx.recv())
            .await
            .expect("Timeout waiting for event")
            .expect("Failed to receive event");
        assert_eq!(received.trigger_id, "work_order.created");
    }
}
