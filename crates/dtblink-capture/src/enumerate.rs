//! Enumeration of capture-capable interfaces.

use std::ffi::CStr;
use std::io;

use tracing::debug;

use crate::error::{LinkError, Result};

/// List the capture-capable interfaces on this host, in kernel order.
///
/// An interface qualifies when it carries a packet-level address, which is
/// exactly the set `PacketSocket::open` can bind. Each interface appears
/// once. The order is stable while the host's interface set is unchanged,
/// so enumeration cursors built on successive snapshots line up.
pub fn enumerate_interfaces() -> Result<Vec<String>> {
    let mut ifaddrs: *mut libc::ifaddrs = std::ptr::null_mut();
    // SAFETY: out-pointer call; on success the returned list stays valid
    // until the freeifaddrs below.
    let rc = unsafe { libc::getifaddrs(&mut ifaddrs) };
    if rc != 0 {
        return Err(LinkError::Enumerate(io::Error::last_os_error()));
    }

    let mut names: Vec<String> = Vec::new();
    let mut cursor = ifaddrs;
    while !cursor.is_null() {
        // SAFETY: `cursor` is a non-null node of the list getifaddrs
        // returned, which has not been freed yet.
        let entry = unsafe { &*cursor };
        cursor = entry.ifa_next;

        if entry.ifa_addr.is_null() {
            continue;
        }
        // SAFETY: `ifa_addr` was checked non-null; it points at a sockaddr
        // owned by the list.
        let family = unsafe { (*entry.ifa_addr).sa_family };
        if family != libc::AF_PACKET as libc::sa_family_t {
            continue;
        }
        if entry.ifa_name.is_null() {
            continue;
        }
        // SAFETY: `ifa_name` was checked non-null; it points at a
        // NUL-terminated string owned by the list.
        let name = unsafe { CStr::from_ptr(entry.ifa_name) }
            .to_string_lossy()
            .into_owned();
        if !names.contains(&name) {
            names.push(name);
        }
    }

    // SAFETY: `ifaddrs` came from a successful getifaddrs and is freed
    // exactly once.
    unsafe { libc::freeifaddrs(ifaddrs) };

    debug!(count = names.len(), "enumerated capture interfaces");
    Ok(names)
}
