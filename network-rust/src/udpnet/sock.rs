use std::io;
use std::net;

use socket2::{Domain, Protocol, SockAddr, Socket, Type};

fn udp_socket() -> io::Result<Socket> {
    let sock = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    sock.set_reuse_address(true)?;
    Ok(sock)
}

/// Sending socket plus the address datagrams go to: loopback when
/// `localhost` is set, the broadcast address otherwise.
pub fn new_tx(port: u16, localhost: bool) -> io::Result<(Socket, SockAddr)> {
    let sock = udp_socket()?;
    sock.set_broadcast(true)?;
    let ip = if localhost { [127, 0, 0, 1] } else { [255, 255, 255, 255] };
    let remote_addr = net::SocketAddr::from((ip, port));
    Ok((sock, remote_addr.into()))
}

/// Socket bound to `port` on loopback or on every interface.
pub fn new_bound(port: u16, localhost: bool) -> io::Result<net::UdpSocket> {
    let sock = udp_socket()?;
    let ip = if localhost { [127, 0, 0, 1] } else { [0, 0, 0, 0] };
    let local_addr = net::SocketAddr::from((ip, port));
    sock.bind(&local_addr.into())?;
    Ok(sock.into())
}
