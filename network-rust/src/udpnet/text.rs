use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::str;

use crossbeam_channel as cbc;
use log::warn;

use super::{sock, RXError};

const MAX_DATAGRAM: usize = 1024;

/// One text datagram and the address it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    pub from: SocketAddr,
    pub text: String,
}

pub fn bind(port: u16, localhost: bool) -> io::Result<UdpSocket> {
    sock::new_bound(port, localhost)
}

/// Forwards every UTF-8 datagram arriving on `socket` to `ch`, trimmed of a
/// trailing line break. Datagrams longer than `MAX_DATAGRAM` are dropped.
/// Never returns unless the socket fails or `ch` closes.
pub fn rx(socket: &UdpSocket, ch: cbc::Sender<Datagram>) -> Result<(), RXError<Datagram>> {
    // One spare byte tells a full-size datagram from a truncated one.
    let mut buf = [0; MAX_DATAGRAM + 1];
    loop {
        let (n, from) = socket.recv_from(&mut buf)?;
        if n > MAX_DATAGRAM {
            warn!("Dropped oversized datagram from {}", from);
            continue;
        }
        match str::from_utf8(&buf[..n]) {
            Ok(text) => {
                let text = text.trim_end_matches(&['\r', '\n'][..]).to_string();
                ch.send(Datagram { from, text })?;
            }
            Err(e) => warn!("Received non-text datagram from {}: {}", from, e),
        }
    }
}

pub fn send(socket: &UdpSocket, to: SocketAddr, text: &str) -> io::Result<()> {
    socket.send_to(text.as_bytes(), to)?;
    Ok(())
}
