//! List the capture interfaces a DTB transport can bind.
//!
//! Run with:
//!   cargo run --example list-links

#[cfg(target_os = "linux")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use dtblink::{EthTransport, Transport};

    let mut transport = EthTransport::new();
    let count = transport.enum_first()?;
    eprintln!("{count} capture interface(s)");

    while let Some(name) = transport.enum_next() {
        println!("{name}");
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn main() {
    eprintln!("packet capture links require Linux");
}
