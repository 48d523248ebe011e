//! Send one probe to whatever DTB answers on an interface.
//!
//! Needs CAP_NET_RAW (or root) for the capture socket.
//!
//! Run with:
//!   cargo run --example probe -- <interface> [peer-mac]
//!
//! Without a peer address the probe goes to broadcast; any instrument on
//! the segment may answer.

#[cfg(target_os = "linux")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use dtblink::{EthConfig, EthTransport, Transport, DEFAULT_READ_BUDGET};

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let mut args = std::env::args().skip(1);
    let interface = args.next().unwrap_or_else(|| "eth0".to_string());
    let mut config = EthConfig::default().with_interface(&interface);
    if let Some(mac) = args.next() {
        config = config.with_peer(mac.parse()?);
    }

    let mut dtb: Box<dyn Transport> = Box::new(EthTransport::with_config(config));
    dtb.open(&interface)?;

    dtb.write(b"GetVersion")?;
    dtb.flush()?;
    eprintln!("probe sent on {interface}, waiting for an answer");

    let mut answer = [0u8; 2];
    match dtb.read(&mut answer, DEFAULT_READ_BUDGET) {
        Ok(()) => {
            println!("answer: {:02x}:{:02x}", answer[0], answer[1]);
        }
        Err(e) => {
            let code = dtb.last_error();
            eprintln!("no answer: {e} ({})", dtb.error_message(code));
        }
    }

    dtb.close();
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn main() {
    eprintln!("packet capture links require Linux");
}
