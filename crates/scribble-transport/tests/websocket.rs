//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener on an OS-assigned port and talk to it
//! with a `tokio-tungstenite` client.

#[cfg(feature = "websocket")]
mod websocket {
    use std::sync::Arc;
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use scribble_transport::{Connection, Incoming, Transport, TransportError, WebSocketTransport};
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    /// Binds a transport on a free port and connects one client to it.
    async fn connected_pair() -> (scribble_transport::WebSocketConnection, ClientWs) {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("local addr");

        let server = tokio::spawn(async move {
            let incoming = transport.accept().await.expect("should accept");
            incoming.upgrade().await.expect("should upgrade")
        });
        let (client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("client should connect");
        let conn = server.await.expect("accept task");
        (conn, client)
    }

    #[tokio::test]
    async fn test_text_frames_flow_both_ways() {
        let (conn, mut client) = connected_pair().await;
        assert!(conn.id().into_inner() > 0);
        assert!(conn.peer_addr().ip().is_loopback());

        conn.send(br#"{"event":"hello"}"#).await.expect("send");
        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_text(), "utf-8 payloads go out as text frames");
        assert_eq!(msg.into_text().unwrap().as_str(), r#"{"event":"hello"}"#);

        client
            .send(Message::text("from client".to_owned()))
            .await
            .unwrap();
        let received = conn.recv().await.expect("recv").expect("data");
        assert_eq!(received, b"from client");

        conn.close().await.expect("close");
    }

    #[tokio::test]
    async fn test_send_is_not_blocked_by_pending_recv() {
        let (conn, mut client) = connected_pair().await;
        let conn = Arc::new(conn);

        // Park a reader on the connection; nothing is coming yet.
        let reader = {
            let conn = Arc::clone(&conn);
            tokio::spawn(async move { conn.recv().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        tokio::time::timeout(Duration::from_secs(2), conn.send(b"tick"))
            .await
            .expect("send must not wait for the reader")
            .expect("send");
        let msg = client.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"tick");

        client.send(Message::Close(None)).await.unwrap();
        let result = reader.await.unwrap().expect("recv should not error");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_recv_returns_none_on_client_close() {
        let (conn, mut client) = connected_pair().await;
        client.send(Message::Close(None)).await.unwrap();

        let result = conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_connection_ids_are_unique() {
        let (a, _ca) = connected_pair().await;
        let (b, _cb) = connected_pair().await;
        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn test_bind_on_taken_port_reports_address() {
        let first = WebSocketTransport::bind("127.0.0.1:0").await.expect("should bind");
        let addr = first.local_addr().unwrap().to_string();

        match WebSocketTransport::bind(&addr).await {
            Err(TransportError::Bind { addr: reported, .. }) => assert_eq!(reported, addr),
            Err(other) => panic!("expected a bind error, got {other}"),
            Ok(_) => panic!("second bind on {addr} should fail"),
        }
    }

    #[tokio::test]
    async fn test_accept_does_not_wait_for_the_upgrade() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0").await.unwrap();
        let addr = transport.local_addr().unwrap();

        // Connects but never sends the upgrade request.
        let _silent = tokio::net::TcpStream::connect(addr).await.unwrap();
        let silent = tokio::time::timeout(Duration::from_secs(2), transport.accept())
            .await
            .expect("accept must return before the upgrade")
            .unwrap();
        assert!(silent.peer_addr().ip().is_loopback());

        let client = tokio::spawn(tokio_tungstenite::connect_async(format!("ws://{addr}")));
        let incoming = tokio::time::timeout(Duration::from_secs(2), transport.accept())
            .await
            .expect("second peer must not queue behind the silent one")
            .unwrap();
        let conn = incoming.upgrade().await.expect("should upgrade");
        client.await.unwrap().expect("client should connect");
        assert!(conn.id().into_inner() > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_upgrade_gives_up_on_a_silent_peer() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0").await.unwrap();
        let addr = transport.local_addr().unwrap();

        let _silent = tokio::net::TcpStream::connect(addr).await.unwrap();
        let incoming = transport.accept().await.unwrap();

        match incoming.upgrade().await {
            Err(TransportError::HandshakeTimeout { peer }) => assert!(peer.ip().is_loopback()),
            Err(other) => panic!("expected a handshake timeout, got {other}"),
            Ok(_) => panic!("a silent peer must not upgrade"),
        }
    }
}
