//! Integration tests for the TCP transport.
//!
//! These spin up a real listener on an OS-assigned port and drive it with
//! a plain `TcpStream` client, so the bytes on the wire are checked
//! exactly as a game client would send them.

use splat_protocol::{Frame, FrameCodec, MessageType};
use splat_transport::{Connection, TcpConnection, TcpTransport, Transport, TransportError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

async fn bound_transport() -> (TcpTransport, String) {
    let transport = TcpTransport::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = transport.local_addr().expect("should have addr").to_string();
    (transport, addr)
}

#[tokio::test]
async fn test_tcp_accept_and_recv_frame() {
    let (mut transport, addr) = bound_transport().await;
    let server = tokio::spawn(async move { transport.accept().await.expect("should accept") });

    let mut client = TcpStream::connect(&addr).await.expect("should connect");
    let conn = server.await.expect("task should complete");
    assert!(conn.peer_addr().is_some());

    client
        .write_all(&[0x01, 0x00, 0x05, 0x00, 0x00, 0x00, b'A', b'l', b'i', b'c', b'e'])
        .await
        .unwrap();

    let frame = conn.recv().await.unwrap().expect("should get a frame");
    assert_eq!(frame.message_type(), Some(MessageType::Login));
    assert_eq!(frame.payload, b"Alice");
}

#[tokio::test]
async fn test_tcp_send_writes_exact_bytes() {
    let (mut transport, addr) = bound_transport().await;
    let server = tokio::spawn(async move { transport.accept().await.expect("should accept") });

    let mut client = TcpStream::connect(&addr).await.unwrap();
    let conn = server.await.unwrap();

    conn.send(&Frame::empty(MessageType::Ping)).await.unwrap();

    let mut buf = [0u8; 6];
    client.read_exact(&mut buf).await.unwrap();
    assert_eq!(buf, [0x05, 0x00, 0x00, 0x00, 0x00, 0x00]);
}

#[tokio::test]
async fn test_tcp_recv_returns_none_on_clean_close() {
    let (mut transport, addr) = bound_transport().await;
    let server = tokio::spawn(async move { transport.accept().await.unwrap() });

    let client = TcpStream::connect(&addr).await.unwrap();
    let conn = server.await.unwrap();
    drop(client);

    assert!(conn.recv().await.unwrap().is_none());
}

#[tokio::test]
async fn test_tcp_recv_truncated_frame_is_protocol_error() {
    let (mut transport, addr) = bound_transport().await;
    let server = tokio::spawn(async move { transport.accept().await.unwrap() });

    let mut client = TcpStream::connect(&addr).await.unwrap();
    let conn = server.await.unwrap();

    // Header promises 5 bytes, only 2 arrive before close.
    client
        .write_all(&[0x03, 0x00, 0x05, 0x00, 0x00, 0x00, b'h', b'i'])
        .await
        .unwrap();
    drop(client);

    let result = conn.recv().await;
    assert!(matches!(result, Err(TransportError::Protocol(_))));
}

#[tokio::test]
async fn test_tcp_connections_get_unique_ids() {
    let (mut transport, addr) = bound_transport().await;
    let server = tokio::spawn(async move {
        let a = transport.accept().await.unwrap();
        let b = transport.accept().await.unwrap();
        (a, b)
    });

    let _c1 = TcpStream::connect(&addr).await.unwrap();
    let _c2 = TcpStream::connect(&addr).await.unwrap();
    let (a, b) = server.await.unwrap();

    assert_ne!(a.id(), b.id());
}

#[tokio::test]
async fn test_tcp_close_signals_eof_to_peer() {
    let (mut transport, addr) = bound_transport().await;
    let server = tokio::spawn(async move { transport.accept().await.unwrap() });

    let client = TcpStream::connect(&addr).await.unwrap();
    let conn = server.await.unwrap();
    conn.close().await.unwrap();

    // Wrap the client side too and observe a clean end-of-stream.
    let client_conn = TcpConnection::new(client, FrameCodec::default());
    assert!(client_conn.recv().await.unwrap().is_none());
}

#[tokio::test]
async fn test_tcp_send_after_close_is_connection_closed() {
    let (mut transport, addr) = bound_transport().await;
    let server = tokio::spawn(async move { transport.accept().await.unwrap() });

    let _client = TcpStream::connect(&addr).await.unwrap();
    let conn = server.await.unwrap();
    conn.close().await.unwrap();
    // A second close is a no-op.
    conn.close().await.unwrap();

    let err = conn.send(&Frame::empty(MessageType::Ping)).await.unwrap_err();
    assert!(matches!(err, TransportError::ConnectionClosed(_)));
    assert!(err.is_disconnect());
}
