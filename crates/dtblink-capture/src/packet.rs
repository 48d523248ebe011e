//! Live packet capture over `AF_PACKET` sockets.

use std::ffi::CString;
use std::io;
use std::mem;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::time::Duration;

use tracing::{debug, info};

use dtblink_wire::MacAddr;

use crate::error::{LinkError, Result};
use crate::traits::RawLink;

/// Default per-poll capture window.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// A live capture and transmit handle on one Ethernet interface.
///
/// Wraps a raw `AF_PACKET` socket bound to the interface, which delivers
/// every frame on the segment regardless of protocol or destination, the
/// host's own outgoing traffic included. Each receive attempt blocks for at
/// most the poll window given at open. The socket closes when the handle is
/// dropped.
///
/// Opening requires `CAP_NET_RAW` (or root).
pub struct PacketSocket {
    fd: OwnedFd,
    interface: String,
    hw_addr: MacAddr,
}

impl PacketSocket {
    /// Open a live capture on the named interface.
    pub fn open(interface: &str, poll_timeout: Duration) -> Result<Self> {
        let ifindex = interface_index(interface)?;

        // SAFETY: plain socket(2) call with no pointer arguments; the
        // returned descriptor is checked before use.
        let fd = unsafe {
            libc::socket(
                libc::AF_PACKET,
                libc::SOCK_RAW,
                (libc::ETH_P_ALL as u16).to_be() as libc::c_int,
            )
        };
        if fd < 0 {
            return Err(LinkError::Open {
                interface: interface.to_string(),
                source: io::Error::last_os_error(),
            });
        }
        // SAFETY: `fd` is a freshly created, open socket descriptor that
        // nothing else owns.
        let fd = unsafe { OwnedFd::from_raw_fd(fd) };

        bind_to_interface(&fd, ifindex).map_err(|source| LinkError::Open {
            interface: interface.to_string(),
            source,
        })?;
        set_poll_timeout(&fd, poll_timeout).map_err(|source| LinkError::Open {
            interface: interface.to_string(),
            source,
        })?;
        let hw_addr = query_hw_addr(&fd, interface)?;

        info!(interface, addr = %hw_addr, "opened packet capture link");

        Ok(Self {
            fd,
            interface: interface.to_string(),
            hw_addr,
        })
    }

    /// The interface this handle is bound to.
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// The interface's hardware address, queried at open.
    pub fn hw_addr(&self) -> MacAddr {
        self.hw_addr
    }
}

impl RawLink for PacketSocket {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        // SAFETY: `frame` is a valid readable buffer of the given length for
        // the duration of the call, and the fd is an open socket owned by
        // this handle.
        let sent = unsafe {
            libc::send(
                self.fd.as_raw_fd(),
                frame.as_ptr().cast::<libc::c_void>(),
                frame.len(),
                0,
            )
        };
        if sent < 0 {
            return Err(LinkError::Send(io::Error::last_os_error()));
        }
        let sent = sent as usize;
        if sent != frame.len() {
            return Err(LinkError::TruncatedSend {
                sent,
                len: frame.len(),
            });
        }
        Ok(())
    }

    fn recv_next(&mut self, buf: &mut [u8]) -> Result<Option<usize>> {
        loop {
            // SAFETY: `buf` is a valid writable buffer of the given length
            // for the duration of the call, and the fd is an open socket
            // owned by this handle.
            let got = unsafe {
                libc::recv(
                    self.fd.as_raw_fd(),
                    buf.as_mut_ptr().cast::<libc::c_void>(),
                    buf.len(),
                    0,
                )
            };
            if got >= 0 {
                return Ok(Some(got as usize));
            }
            let err = io::Error::last_os_error();
            match err.kind() {
                // SO_RCVTIMEO expiry surfaces as EAGAIN or EWOULDBLOCK.
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => return Ok(None),
                io::ErrorKind::Interrupted => continue,
                _ => return Err(LinkError::Recv(err)),
            }
        }
    }
}

impl Drop for PacketSocket {
    fn drop(&mut self) {
        debug!(interface = %self.interface, "closing packet capture link");
    }
}

impl std::fmt::Debug for PacketSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketSocket")
            .field("interface", &self.interface)
            .field("hw_addr", &self.hw_addr)
            .finish()
    }
}

fn interface_index(interface: &str) -> Result<libc::c_uint> {
    let name = CString::new(interface).map_err(|_| LinkError::NoSuchInterface {
        interface: interface.to_string(),
    })?;
    // SAFETY: `name` is a valid NUL-terminated string for the duration of
    // the call.
    let index = unsafe { libc::if_nametoindex(name.as_ptr()) };
    if index == 0 {
        return Err(LinkError::NoSuchInterface {
            interface: interface.to_string(),
        });
    }
    Ok(index)
}

fn bind_to_interface(fd: &OwnedFd, ifindex: libc::c_uint) -> io::Result<()> {
    // SAFETY: sockaddr_ll is plain old data; all-zeroes is a valid value.
    let mut addr: libc::sockaddr_ll = unsafe { mem::zeroed() };
    addr.sll_family = libc::AF_PACKET as libc::c_ushort;
    addr.sll_protocol = (libc::ETH_P_ALL as u16).to_be();
    addr.sll_ifindex = ifindex as libc::c_int;

    // SAFETY: `addr` is a properly initialized sockaddr_ll and the length
    // argument matches its size.
    let rc = unsafe {
        libc::bind(
            fd.as_raw_fd(),
            (&addr as *const libc::sockaddr_ll).cast::<libc::sockaddr>(),
            mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
        )
    };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn set_poll_timeout(fd: &OwnedFd, timeout: Duration) -> io::Result<()> {
    // A zero timeout would disable SO_RCVTIMEO and block receives forever.
    let timeout = if timeout.is_zero() {
        Duration::from_millis(1)
    } else {
        timeout
    };
    let tv = libc::timeval {
        tv_sec: timeout.as_secs() as libc::time_t,
        tv_usec: timeout.subsec_micros() as libc::suseconds_t,
    };

    // SAFETY: `tv` is a valid timeval and the length argument matches its
    // size.
    let rc = unsafe {
        libc::setsockopt(
            fd.as_raw_fd(),
            libc::SOL_SOCKET,
            libc::SO_RCVTIMEO,
            (&tv as *const libc::timeval).cast::<libc::c_void>(),
            mem::size_of::<libc::timeval>() as libc::socklen_t,
        )
    };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn query_hw_addr(fd: &OwnedFd, interface: &str) -> Result<MacAddr> {
    // SAFETY: sockaddr_ll is plain old data; all-zeroes is a valid value.
    let mut addr: libc::sockaddr_ll = unsafe { mem::zeroed() };
    let mut len = mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t;

    // SAFETY: `addr` and `len` are valid writable pointers for the provided
    // sizes, and the fd is an open socket owned by this handle. Binding has
    // already succeeded, so the local address is the interface's.
    let rc = unsafe {
        libc::getsockname(
            fd.as_raw_fd(),
            (&mut addr as *mut libc::sockaddr_ll).cast::<libc::sockaddr>(),
            &mut len,
        )
    };
    if rc != 0 {
        return Err(LinkError::HwAddr {
            interface: interface.to_string(),
            source: io::Error::last_os_error(),
        });
    }
    if addr.sll_halen as usize != 6 {
        return Err(LinkError::HwAddr {
            interface: interface.to_string(),
            source: io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unexpected hardware address length {}", addr.sll_halen),
            ),
        });
    }

    let mut octets = [0u8; 6];
    octets.copy_from_slice(&addr.sll_addr[..6]);
    Ok(MacAddr::new(octets))
}
