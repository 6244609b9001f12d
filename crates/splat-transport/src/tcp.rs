//! Raw TCP transport.
//!
//! Each accepted stream is split into read and write halves behind their
//! own mutexes, so a handler can be waiting in `recv` while the same
//! connection is written to from elsewhere.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use splat_protocol::{Frame, FrameCodec, ProtocolError};
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::{Connection, ConnectionId, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// A TCP [`Transport`] that listens for incoming connections.
pub struct TcpTransport {
    listener: TcpListener,
    codec: FrameCodec,
}

impl TcpTransport {
    /// Binds a new TCP transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "TCP transport listening");
        Ok(Self {
            listener,
            codec: FrameCodec::default(),
        })
    }

    /// Sets the codec used for every connection accepted from now on.
    pub fn with_codec(mut self, codec: FrameCodec) -> Self {
        self.codec = codec;
        self
    }
}

impl Transport for TcpTransport {
    type Connection = TcpConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let conn = TcpConnection::new(stream, self.codec);
        tracing::debug!(id = %conn.id, %addr, "accepted TCP connection");
        Ok(conn)
    }

    fn local_addr(&self) -> Result<SocketAddr, Self::Error> {
        self.listener
            .local_addr()
            .map_err(TransportError::AcceptFailed)
    }
}

/// A single TCP connection speaking length-prefixed frames.
pub struct TcpConnection {
    id: ConnectionId,
    peer_addr: Option<SocketAddr>,
    codec: FrameCodec,
    reader: Mutex<BufReader<OwnedReadHalf>>,
    writer: Mutex<OwnedWriteHalf>,
    /// Set by `close`. Later sends fail with `ConnectionClosed`.
    closed: AtomicBool,
}

impl TcpConnection {
    /// Wraps an already-connected stream. Used by the listener, and by
    /// tests that build a connection from a client-side `connect`.
    pub fn new(stream: TcpStream, codec: FrameCodec) -> Self {
        let id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        let peer_addr = stream.peer_addr().ok();
        let (read, write) = stream.into_split();
        Self {
            id,
            peer_addr,
            codec,
            reader: Mutex::new(BufReader::new(read)),
            writer: Mutex::new(write),
            closed: AtomicBool::new(false),
        }
    }

    /// The remote address, if the OS reported one at accept time.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }
}

impl Connection for TcpConnection {
    type Error = TransportError;

    async fn send(&self, frame: &Frame) -> Result<(), Self::Error> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::ConnectionClosed(format!("{} already closed", self.id)));
        }
        let mut writer = self.writer.lock().await;
        match self.codec.write_frame(&mut *writer, frame).await {
            Ok(()) => Ok(()),
            Err(ProtocolError::Io(e)) => Err(TransportError::SendFailed(e)),
            Err(e) => Err(TransportError::Protocol(e)),
        }
    }

    async fn recv(&self) -> Result<Option<Frame>, Self::Error> {
        let mut reader = self.reader.lock().await;
        match self.codec.read_frame(&mut *reader).await {
            Ok(frame) => Ok(frame),
            Err(ProtocolError::Io(e)) => Err(TransportError::ReceiveFailed(e)),
            Err(e) => Err(TransportError::Protocol(e)),
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.writer
            .lock()
            .await
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
