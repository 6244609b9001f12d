//! Capture of packets the server doesn't understand.
//!
//! When enabled, every frame with an unknown tag is copied into a bounded
//! ring buffer along with who sent it. Handy when a client update starts
//! sending a message type the server hasn't learned yet.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};

use splat_protocol::PlayerId;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::DebugConfig;

/// Bytes of payload shown in the capture log line.
const PREVIEW_LEN: usize = 32;

/// One captured packet.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedPacket {
    pub tag: u16,
    pub payload: Vec<u8>,
    pub player_id: PlayerId,
    pub player_name: String,
    pub captured_at: Instant,
}

/// Bounded buffer of captured packets.
#[derive(Debug)]
pub struct DebugCapture {
    enabled: AtomicBool,
    max_packets: usize,
    packets: Mutex<VecDeque<CapturedPacket>>,
}

impl Default for DebugCapture {
    fn default() -> Self {
        Self::new(DebugConfig::default())
    }
}

impl DebugCapture {
    pub fn new(config: DebugConfig) -> Self {
        Self {
            enabled: AtomicBool::new(config.enabled),
            max_packets: config.max_packets,
            packets: Mutex::new(VecDeque::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Turns capture on or off. Already-captured packets are kept.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Records a packet. Does nothing while disabled. Returns whether the
    /// packet was stored.
    pub async fn capture(
        &self,
        tag: u16,
        payload: &[u8],
        player_id: PlayerId,
        player_name: &str,
    ) -> bool {
        if !self.is_enabled() || self.max_packets == 0 {
            return false;
        }

        tracing::debug!(
            tag,
            %player_id,
            len = payload.len(),
            preview = %hex_preview(payload),
            "captured unknown packet"
        );

        let mut packets = self.packets.lock().await;
        while packets.len() >= self.max_packets {
            packets.pop_front();
        }
        packets.push_back(CapturedPacket {
            tag,
            payload: payload.to_vec(),
            player_id,
            player_name: player_name.to_string(),
            captured_at: Instant::now(),
        });
        true
    }

    /// All buffered captures, oldest first.
    pub async fn captured(&self) -> Vec<CapturedPacket> {
        self.packets.lock().await.iter().cloned().collect()
    }

    /// Buffered captures with the given tag, oldest first.
    pub async fn captured_by_type(&self, tag: u16) -> Vec<CapturedPacket> {
        self.packets
            .lock()
            .await
            .iter()
            .filter(|p| p.tag == tag)
            .cloned()
            .collect()
    }

    /// Number of buffered captures per tag.
    pub async fn stats(&self) -> BTreeMap<u16, usize> {
        let mut stats = BTreeMap::new();
        for packet in self.packets.lock().await.iter() {
            *stats.entry(packet.tag).or_insert(0) += 1;
        }
        stats
    }

    pub async fn clear(&self) {
        self.packets.lock().await.clear();
    }
}

fn hex_preview(bytes: &[u8]) -> String {
    let mut out = bytes
        .iter()
        .take(PREVIEW_LEN)
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ");
    if bytes.len() > PREVIEW_LEN {
        out.push_str(" ..");
    }
    out
}
