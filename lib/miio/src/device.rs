mod response;
pub use response::DeviceError;
use response::Response;

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use log::{error, trace};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{
    net::UdpSocket,
    time::{timeout, Duration, Instant},
};

use crate::{
    discover::discover,
    message::{Header, Message},
    Error, Result, Token, PORT,
};

const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_ATTEMPTS: u32 = 3;
const ID_BUMP_ON_TIMEOUT: u32 = 100;

/// Result of `miIO.info`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct DeviceInfo {
    pub model: String,
    #[serde(default)]
    pub fw_ver: String,
    #[serde(default)]
    pub hw_ver: String,
    #[serde(default)]
    pub mac: String,
}

pub struct Device {
    command_id: u32,
    addr: SocketAddrV4,
    token: Token<16>,
}

impl Device {
    pub fn new(ip: Ipv4Addr, token: Token<16>) -> Device {
        Device {
            command_id: 1,
            addr: SocketAddrV4::new(ip, PORT),
            token,
        }
    }

    pub fn ip(&self) -> Ipv4Addr {
        *self.addr.ip()
    }

    pub async fn handshake(&mut self) -> Result<Header> {
        discover(*self.addr.ip()).await
    }

    pub async fn info(&mut self) -> Result<DeviceInfo> {
        let result = self.send("miIO.info", Value::Array(vec![])).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Sends a JSON-RPC command. A fresh handshake is made for every command
    /// since the device drops the session after a few seconds of silence.
    pub async fn send(&mut self, command: &str, params: impl Serialize) -> Result<Value> {
        let addr = SocketAddr::V4(self.addr);
        let params = serde_json::to_value(params)?;

        let header = self.handshake().await?;
        let handshake_ts = Instant::now();

        let mut attempt = 1;

        loop {
            let seconds_since_handshake = handshake_ts.elapsed().as_secs() as u32;
            let send_ts = header.ts.wrapping_add(seconds_since_handshake);

            trace!("sending command {} with id {}", command, self.command_id);

            let json = serde_json::json!({
                "id": self.command_id,
                "method": command,
                "params": params
            });

            let data = serde_json::to_vec(&json)?;
            let message = Message::encode(data, self.token, header.id, send_ts)?;

            match send_message(message, addr).await {
                Ok(message) => {
                    let data = message.decode(self.token)?;
                    let response: Response = serde_json::from_slice(&data)?;

                    self.command_id = response.id() + 1;
                    trace!("next command id {}", self.command_id);

                    return match response {
                        Response::Ok { id: _, result } => Ok(result),
                        Response::Err { id: _, error } => {
                            error!("{} failed: {:?}", command, error);
                            Err(error.into())
                        }
                    };
                }
                Err(Error::Timeout(err)) if attempt < MAX_ATTEMPTS => {
                    attempt += 1;
                    self.command_id += ID_BUMP_ON_TIMEOUT;
                    error!("{}, retrying with command_id {}", err, self.command_id)
                }
                Err(err) => return Err(err),
            };
        }
    }
}

async fn send_message(message: Message, addr: SocketAddr) -> Result<Message> {
    let bytes = message.to_bytes();

    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.connect(addr).await?;

    socket.send(&bytes).await?;

    trace!("{} send command", addr);

    loop {
        trace!("{} waiting for response", addr);

        let mut buffer = vec![0; 4096];

        let result = timeout(RESPONSE_TIMEOUT, socket.recv_from(&mut buffer)).await?;
        let (size, _) = result?;

        if size > 0 {
            trace!("{} received response of size {}", addr, size);

            let message = Message::read_from(&buffer[..size])?;
            trace!("{} parsed message {:?}", addr, message);

            return Ok(message);
        }
    }
}
