use super::*;

#[tokio::test]
async fn test_send_queues_message() {
    let (tx, mut rx) = mpsc::channel(4);
    let channel = WsChannel::new(tx);

    assert!(channel.is_open());
    channel.send(&OutboundMessage::pong()).await.unwrap();

    let received = rx.recv().await.unwrap();
    assert_eq!(received.kind, "pong");
}

#[tokio::test]
async fn test_close_rejects_writes() {
    let (tx, mut rx) = mpsc::channel(4);
    let channel = WsChannel::new(tx);
    let clone = channel.clone();

    channel.close();
    assert!(!clone.is_open());

    let result = clone.send(&OutboundMessage::error("late")).await;
    assert!(matches!(result, Err(ChannelError::Closed)));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_dropped_receiver_closes_channel() {
    let (tx, rx) = mpsc::channel(4);
    let channel = WsChannel::new(tx);
    drop(rx);

    assert!(!channel.is_open());
    let result = channel.send(&OutboundMessage::pong()).await;
    assert!(matches!(result, Err(ChannelError::Closed)));
}
