//! Dispatch sinks: the boundary to telephony and messaging adapters.

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{info, warn};
use voyager_types::{AlertPayload, AlertRequest};

/// Receives alert requests for delivery.
///
/// Fire-and-forget: implementations must not block, since the emergency
/// controller hands requests over while holding its session lock.
pub trait DispatchSink: Send + Sync {
    fn dispatch(&self, request: AlertRequest);
}

/// Forwards requests to an adapter task over an unbounded channel.
pub struct ChannelDispatchSink {
    tx: mpsc::UnboundedSender<AlertRequest>,
}

impl ChannelDispatchSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AlertRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl DispatchSink for ChannelDispatchSink {
    fn dispatch(&self, request: AlertRequest) {
        let request_id = request.id;
        if self.tx.send(request).is_err() {
            warn!(request_id = %request_id, "Dispatch adapter gone; alert request dropped");
        }
    }
}

/// Records every request; used by tests and dry runs.
#[derive(Default)]
pub struct MemoryDispatchSink {
    requests: Mutex<Vec<AlertRequest>>,
}

impl MemoryDispatchSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<AlertRequest> {
        self.requests.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.lock().is_empty()
    }

    pub fn clear(&self) {
        self.requests.lock().clear();
    }
}

impl DispatchSink for MemoryDispatchSink {
    fn dispatch(&self, request: AlertRequest) {
        self.requests.lock().push(request);
    }
}

/// Logs each request instead of delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDispatchSink;

impl DispatchSink for TracingDispatchSink {
    fn dispatch(&self, request: AlertRequest) {
        match &request.payload {
            AlertPayload::Call { number } => info!(
                request_id = %request.id,
                alert_target = ?request.target,
                number = %number,
                "CALL requested"
            ),
            AlertPayload::Message { recipient, body } => info!(
                request_id = %request.id,
                alert_target = ?request.target,
                recipient = %recipient,
                body = %body,
                "MESSAGE requested"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AlertDispatcher;

    #[tokio::test]
    async fn channel_sink_forwards_requests() {
        let (sink, mut rx) = ChannelDispatchSink::new();
        let request = AlertDispatcher::default().authorities_call(None);
        let id = request.id;

        sink.dispatch(request);
        assert_eq!(rx.recv().await.map(|r| r.id), Some(id));
    }

    #[test]
    fn channel_sink_tolerates_closed_adapter() {
        let (sink, rx) = ChannelDispatchSink::new();
        drop(rx);
        sink.dispatch(AlertDispatcher::default().authorities_call(None));
    }

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemoryDispatchSink::new();
        let dispatcher = AlertDispatcher::default();
        let first = dispatcher.authorities_call(None);
        let second = dispatcher.authorities_call(None);
        let ids = [first.id, second.id];

        sink.dispatch(first);
        sink.dispatch(second);

        let recorded: Vec<_> = sink.requests().iter().map(|r| r.id).collect();
        assert_eq!(recorded, ids);
        sink.clear();
        assert!(sink.is_empty());
    }
}
