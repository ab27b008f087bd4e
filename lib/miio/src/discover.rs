use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use log::{debug, trace};
use tokio::{
    net::UdpSocket,
    time::{self, Duration},
};

use crate::message::{Header, HEADER_SIZE};
use crate::{Error, Result, PORT};

const fn hello_bytes() -> [u8; HEADER_SIZE * 2] {
    let mut bytes = [0xff; HEADER_SIZE * 2];

    bytes[0] = 0x21;
    bytes[1] = 0x31;
    bytes[2] = 0x00;
    bytes[3] = 0x20;

    bytes
}

const HELLO_BYTES: [u8; HEADER_SIZE * 2] = hello_bytes();
const HELLO_TIMEOUT: Duration = Duration::from_secs(5);

/// Sends the miIO hello packet and waits for the first 32-byte answer. The
/// answer carries the device id and its current timestamp, both required to
/// address commands to it.
pub async fn discover(ip: Ipv4Addr) -> Result<Header> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.set_broadcast(ip.is_broadcast())?;

    let addr = SocketAddr::new(ip.into(), PORT);

    socket.send_to(&HELLO_BYTES, &addr).await?;
    trace!("sent hello {}", addr);

    loop {
        let mut buffer = [0; HEADER_SIZE * 2];

        match time::timeout(HELLO_TIMEOUT, socket.recv_from(&mut buffer)).await {
            Ok(result) => {
                let (size, from) = result?;

                if is_reply(addr, from, size) {
                    let header = Header::read_from(&buffer)?;

                    debug!("ip: {}", from.ip());
                    debug!("device id: {:x}", header.id);
                    debug!("timestamp: {}", header.ts);

                    return Ok(header);
                }

                trace!("skipping packet of size {} from {}", size, from);
            }
            Err(_) => return Err(Error::DevicesNotFound(ip)),
        };
    }
}

/// A broadcast hello may be answered by any device, a unicast one only by the
/// addressed host.
fn is_reply(sent_to: SocketAddr, from: SocketAddr, size: usize) -> bool {
    if size != HELLO_BYTES.len() {
        return false;
    }

    match sent_to.ip() {
        IpAddr::V4(ip) if ip.is_broadcast() => true,
        ip => ip == from.ip(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_hello_bytes() {
        assert_eq!(
            HELLO_BYTES,
            hex!(
                "2131 0020 ffff ffff ffff ffff ffff ffff
                 ffff ffff ffff ffff ffff ffff ffff ffff"
            )
        );
    }

    #[test]
    fn test_reply_from_addressed_device() {
        let device: SocketAddr = "192.168.1.7:54321".parse().unwrap();
        assert!(is_reply(device, device, 32));
        assert!(!is_reply(device, device, 16));
    }

    #[test]
    fn test_reply_from_other_host() {
        let device: SocketAddr = "192.168.1.7:54321".parse().unwrap();
        let other: SocketAddr = "192.168.1.9:54321".parse().unwrap();
        assert!(!is_reply(device, other, 32));
    }

    #[test]
    fn test_reply_to_broadcast() {
        let broadcast: SocketAddr = "255.255.255.255:54321".parse().unwrap();
        let device: SocketAddr = "192.168.1.9:54321".parse().unwrap();
        assert!(is_reply(broadcast, device, 32));
    }
}
