//! The Ethernet transport: sessions over live packet capture.

use std::time::Duration;

use tracing::debug;

use dtblink_capture::{enumerate_interfaces, PacketSocket, DEFAULT_POLL_TIMEOUT};
use dtblink_wire::MacAddr;

use crate::error::Result;
use crate::session::Session;
use crate::transport::{ErrorCode, Transport};

/// Configuration for [`EthTransport`].
#[derive(Debug, Clone)]
pub struct EthConfig {
    /// Capture interface to bind when no explicit device is given.
    pub interface: String,
    /// Local hardware address override. `None` uses the interface's own
    /// address.
    pub local: Option<MacAddr>,
    /// Peer address outgoing frames are sent to. Broadcast reaches any DTB
    /// on the segment; pin a concrete address to single one out.
    pub peer: MacAddr,
    /// Capture window for each receive poll.
    pub poll_timeout: Duration,
}

impl Default for EthConfig {
    fn default() -> Self {
        Self {
            interface: "eth0".to_string(),
            local: None,
            peer: MacAddr::BROADCAST,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

impl EthConfig {
    /// Set the capture interface.
    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = interface.into();
        self
    }

    /// Override the local hardware address.
    pub fn with_local(mut self, local: MacAddr) -> Self {
        self.local = Some(local);
        self
    }

    /// Set the peer hardware address.
    pub fn with_peer(mut self, peer: MacAddr) -> Self {
        self.peer = peer;
        self
    }

    /// Set the per-poll capture window.
    pub fn with_poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.poll_timeout = poll_timeout;
        self
    }
}

/// [`Transport`] over raw Ethernet packet capture.
///
/// Holds a lazily opened [`Session`] over a [`PacketSocket`]: the first
/// write, read, or clear against a closed transport opens the configured
/// interface, so RPC callers never manage the connection for normal
/// traffic. Explicit [`open`](Transport::open) selects a different
/// interface; [`close`](Transport::close) releases the capture handle and
/// drops any unsent or undelivered bytes with it.
pub struct EthTransport {
    config: EthConfig,
    session: Option<Session<PacketSocket>>,
    devices: Vec<String>,
    cursor: usize,
    last_error: ErrorCode,
}

impl EthTransport {
    /// Create a closed transport for the default interface.
    pub fn new() -> Self {
        Self::with_config(EthConfig::default())
    }

    /// Create a closed transport with explicit configuration.
    pub fn with_config(config: EthConfig) -> Self {
        Self {
            config,
            session: None,
            devices: Vec::new(),
            cursor: 0,
            last_error: ErrorCode::Ok,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &EthConfig {
        &self.config
    }

    /// Pin the peer address for subsequent frames, current session
    /// included.
    pub fn set_peer(&mut self, peer: MacAddr) {
        self.config.peer = peer;
        if let Some(session) = self.session.as_mut() {
            session.set_peer(peer);
        }
    }

    /// The local hardware address of the open session, if any.
    pub fn local_addr(&self) -> Option<MacAddr> {
        self.session.as_ref().map(Session::local_addr)
    }

    fn open_session(config: &EthConfig) -> Result<Session<PacketSocket>> {
        let link = PacketSocket::open(&config.interface, config.poll_timeout)?;
        let local = config.local.unwrap_or_else(|| link.hw_addr());
        Ok(Session::new(link, local, config.peer))
    }

    fn ensure_open(&mut self) -> Result<&mut Session<PacketSocket>> {
        let session = match self.session.take() {
            Some(session) => session,
            None => Self::open_session(&self.config)?,
        };
        Ok(self.session.insert(session))
    }

    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.last_error = err.code();
        }
        result
    }
}

impl Default for EthTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for EthTransport {
    fn open(&mut self, device: &str) -> Result<()> {
        self.close();
        self.config.interface = device.to_string();
        let result = Self::open_session(&self.config).map(|session| {
            self.session = Some(session);
        });
        self.record(result)
    }

    fn connected(&self) -> bool {
        self.session.is_some()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let result = self
            .ensure_open()
            .and_then(|session| session.write(bytes));
        self.record(result)
    }

    fn flush(&mut self) -> Result<()> {
        let result = self.ensure_open().and_then(Session::flush);
        self.record(result)
    }

    fn clear(&mut self) -> Result<()> {
        let result = self.ensure_open().map(Session::clear);
        self.record(result)
    }

    fn read(&mut self, out: &mut [u8], budget: u32) -> Result<()> {
        let result = self
            .ensure_open()
            .and_then(|session| session.read(out, budget));
        self.record(result)
    }

    fn close(&mut self) {
        if self.session.take().is_some() {
            debug!(interface = %self.config.interface, "closed transport");
        }
    }

    fn last_error(&self) -> ErrorCode {
        self.last_error
    }

    fn enum_first(&mut self) -> Result<usize> {
        let result = enumerate_interfaces()
            .map_err(Into::into)
            .map(|devices| {
                self.cursor = 0;
                self.devices = devices;
                self.devices.len()
            });
        self.record(result)
    }

    fn enum_next(&mut self) -> Option<String> {
        let name = self.devices.get(self.cursor).cloned();
        if name.is_some() {
            self.cursor += 1;
        }
        name
    }

    fn enum_at(&mut self, pos: usize) -> Option<String> {
        if self.devices.is_empty() {
            self.enum_first().ok()?;
        }
        self.devices.get(pos).cloned()
    }
}
