//! Bounded hand-off between the network receive task and the disk write task.
//!
//! The relay lets arrival and persistence proceed at different rates while
//! capping the backlog: `append` waits whenever the queue holds `capacity`
//! segments, so a stalled writer pushes back on the receive path instead of
//! growing memory. Peak buffered payload is `capacity` times the chunk
//! ceiling.

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::error::StreamError;

/// One frame in the relay queue.
///
/// End-of-stream and failure are explicit markers, never confusable with a
/// zero-length payload.
#[derive(Debug)]
pub enum Segment {
    /// Chunk payload, in arrival order.
    Data(Bytes),
    /// Clean end of stream; nothing follows.
    End,
    /// The stream failed; everything already relayed stays valid.
    Failed(StreamError),
}

/// Create a relay with capacity counted in segments.
pub fn relay(capacity: usize) -> (RelaySender, RelayReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (RelaySender { tx }, RelayReceiver { rx })
}

/// Append side of the relay, owned by the receive task.
pub struct RelaySender {
    tx: mpsc::Sender<Segment>,
}

impl RelaySender {
    /// Append a chunk payload; waits while the relay is full.
    ///
    /// Fails with [`StreamError::Cancelled`] when the drain side is gone,
    /// which is how a writer abort reaches the receive loop.
    pub async fn append(&self, data: Bytes) -> Result<(), StreamError> {
        self.tx
            .send(Segment::Data(data))
            .await
            .map_err(|_| StreamError::Cancelled)
    }

    /// Mark a clean end of stream.
    pub async fn finish(self) {
        let _ = self.tx.send(Segment::End).await;
    }

    /// Propagate a terminal failure to the drain side.
    pub async fn fail(self, err: StreamError) {
        let _ = self.tx.send(Segment::Failed(err)).await;
    }
}

/// Drain side of the relay, owned by the write task.
pub struct RelayReceiver {
    rx: mpsc::Receiver<Segment>,
}

impl RelayReceiver {
    /// Next segment in order; waits while the relay is empty.
    ///
    /// `None` means the sender vanished without a terminal marker, which the
    /// writer treats as cancellation.
    pub async fn drain(&mut self) -> Option<Segment> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_segments_drain_in_order() {
        let (tx, mut rx) = relay(8);

        tx.append(Bytes::from_static(b"one")).await.unwrap();
        tx.append(Bytes::from_static(b"two")).await.unwrap();
        tx.finish().await;

        assert_matches::assert_matches!(rx.drain().await, Some(Segment::Data(d)) if d == "one");
        assert_matches::assert_matches!(rx.drain().await, Some(Segment::Data(d)) if d == "two");
        assert_matches::assert_matches!(rx.drain().await, Some(Segment::End));
        assert!(rx.drain().await.is_none());
    }

    #[tokio::test]
    async fn test_append_blocks_at_capacity() {
        let (tx, mut rx) = relay(2);

        tx.append(Bytes::from_static(b"a")).await.unwrap();
        tx.append(Bytes::from_static(b"b")).await.unwrap();

        // Queue is full: the third append must wait for the drain side.
        let blocked = timeout(Duration::from_millis(50), tx.append(Bytes::from_static(b"c"))).await;
        assert!(blocked.is_err());

        // Draining one segment releases exactly one slot.
        assert_matches::assert_matches!(rx.drain().await, Some(Segment::Data(_)));
        timeout(Duration::from_millis(50), tx.append(Bytes::from_static(b"c")))
            .await
            .expect("append should proceed after a drain")
            .unwrap();
    }

    #[tokio::test]
    async fn test_failure_marker_follows_relayed_data() {
        let (tx, mut rx) = relay(8);

        tx.append(Bytes::from_static(b"prefix")).await.unwrap();
        tx.fail(StreamError::transport("connection reset")).await;

        assert_matches::assert_matches!(rx.drain().await, Some(Segment::Data(_)));
        assert_matches::assert_matches!(rx.drain().await, Some(Segment::Failed(StreamError::Transport(_))));
    }

    #[tokio::test]
    async fn test_dropped_sender_reads_as_cancellation() {
        let (tx, mut rx) = relay(8);
        tx.append(Bytes::from_static(b"x")).await.unwrap();
        drop(tx);

        assert_matches::assert_matches!(rx.drain().await, Some(Segment::Data(_)));
        assert!(rx.drain().await.is_none());
    }

    #[tokio::test]
    async fn test_append_fails_when_drain_side_gone() {
        let (tx, rx) = relay(1);
        drop(rx);

        let err = tx.append(Bytes::from_static(b"x")).await.unwrap_err();
        assert_matches::assert_matches!(err, StreamError::Cancelled);
    }

    #[tokio::test]
    async fn test_zero_length_data_is_not_a_marker() {
        let (tx, mut rx) = relay(4);
        tx.append(Bytes::new()).await.unwrap();
        tx.finish().await;

        assert_matches::assert_matches!(rx.drain().await, Some(Segment::Data(d)) if d.is_empty());
        assert_matches::assert_matches!(rx.drain().await, Some(Segment::End));
    }
}
