mod encryption;

use encryption::{decrypt, encrypt};
use md5::{Digest, Md5};

use crate::{Error, Result, Token};

pub const HEADER_SIZE: usize = 16;
const CHECKSUM_SIZE: usize = 16;
const PREFIX_SIZE: usize = HEADER_SIZE + CHECKSUM_SIZE;

#[derive(Debug)]
pub struct Message {
    header: Header,
    checksum: [u8; CHECKSUM_SIZE],
    data: Vec<u8>,
}

impl Message {
    pub fn encode(data: Vec<u8>, token: Token<16>, id: u32, send_ts: u32) -> Result<Message> {
        let mut data = data;
        let data = encrypt(&mut data, token)?.to_vec();

        let header = Header {
            id,
            ts: send_ts,
            length: data.len() + PREFIX_SIZE,
        };

        let checksum = Self::checksum(&header, &token, &data);

        Ok(Message {
            header,
            checksum,
            data,
        })
    }

    pub fn decode(self, token: Token<16>) -> Result<Vec<u8>> {
        let checksum = Self::checksum(&self.header, &token, &self.data);

        if checksum != self.checksum {
            return Err(Error::InvalidChecksum);
        }

        let mut data = self.data;
        let mut data = decrypt(&mut data, token)?.to_vec();
        while data.ends_with(&[0x0]) {
            data.pop();
        }

        Ok(data)
    }

    fn checksum(header: &Header, token: &[u8], data: &[u8]) -> [u8; CHECKSUM_SIZE] {
        let mut hasher = Md5::new();

        hasher.update(header.to_bytes());
        hasher.update(token);
        hasher.update(data);

        let mut checksum = [0; CHECKSUM_SIZE];
        checksum.copy_from_slice(&hasher.finalize());

        checksum
    }

    pub fn read_from(bytes: &[u8]) -> Result<Message> {
        let header = Header::read_from(bytes)?;

        if header.length < PREFIX_SIZE || bytes.len() < header.length {
            return Err(Error::InvalidPacket(bytes.len()));
        }

        let mut checksum = [0; CHECKSUM_SIZE];
        checksum.copy_from_slice(&bytes[HEADER_SIZE..PREFIX_SIZE]);

        let data = bytes[PREFIX_SIZE..header.length].to_vec();

        Ok(Message {
            header,
            checksum,
            data,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len());

        bytes.extend_from_slice(&self.header.to_bytes());
        bytes.extend_from_slice(&self.checksum);
        bytes.extend_from_slice(&self.data);

        bytes
    }

    pub fn len(&self) -> usize {
        self.header.length
    }
}

const MAGIC: [u8; 2] = [0x21, 0x31];

/// `magic(2) length(2) unknown(4) device id(4) stamp(4)`, big endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub length: usize,
    pub id: u32,
    pub ts: u32,
}

impl Header {
    pub fn read_from(bytes: &[u8]) -> Result<Header> {
        let header: &[u8; HEADER_SIZE] = bytes
            .get(..HEADER_SIZE)
            .and_then(|header| header.try_into().ok())
            .filter(|header: &&[u8; HEADER_SIZE]| header[..2] == MAGIC)
            .ok_or(Error::InvalidPacket(bytes.len()))?;

        let [_, _, l0, l1, _, _, _, _, i0, i1, i2, i3, t0, t1, t2, t3] = *header;

        Ok(Header {
            length: u16::from_be_bytes([l0, l1]) as usize,
            id: u32::from_be_bytes([i0, i1, i2, i3]),
            ts: u32::from_be_bytes([t0, t1, t2, t3]),
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0; HEADER_SIZE];

        bytes[..2].copy_from_slice(&MAGIC);
        bytes[2..4].copy_from_slice(&(self.length as u16).to_be_bytes());
        bytes[8..12].copy_from_slice(&self.id.to_be_bytes());
        bytes[12..].copy_from_slice(&self.ts.to_be_bytes());

        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    const RESPONSE: [u8; 36] = hex!(
        "2131 0024 0000 0000 2505 2018 5b08 5e5c 0011 2233 4455 6677 8899 aabb ccdd eeff fffe fdfc"
    );

    const HEADER: Header = Header {
        id: 0x25052018,
        ts: 1527275100,
        length: 36,
    };

    const CHECKSUM: [u8; 16] = hex!("00112233445566778899aabbccddeeff");

    #[test]
    fn test_message_read() {
        let message = Message::read_from(&RESPONSE).unwrap();

        assert_eq!(message.header, HEADER);
        assert_eq!(message.checksum, CHECKSUM);
        assert_eq!(message.data, hex!("ff fe fd fc"));
    }

    #[test]
    fn test_message_read_truncated() {
        let error = Message::read_from(&RESPONSE[..34]).unwrap_err();
        assert!(matches!(error, Error::InvalidPacket(34)));

        let error = Message::read_from(&RESPONSE[..10]).unwrap_err();
        assert!(matches!(error, Error::InvalidPacket(10)));
    }

    #[test]
    fn test_message_read_wrong_magic() {
        let mut bytes = RESPONSE;
        bytes[0] = 0x00;

        let error = Message::read_from(&bytes).unwrap_err();
        assert!(matches!(error, Error::InvalidPacket(36)));
    }

    #[test]
    fn test_message_to_bytes() {
        let message = Message {
            header: HEADER,
            checksum: CHECKSUM,
            data: hex!("ff fe fd fc").to_vec(),
        };

        assert_eq!(message.to_bytes(), RESPONSE);
    }

    #[test]
    fn test_hello_header() {
        let bytes = hex!("2131 0020 ffff ffff 0000 1234 0000 0100");
        let header = Header::read_from(&bytes).unwrap();

        assert_eq!(
            header,
            Header {
                length: 32,
                id: 0x1234,
                ts: 256
            }
        );
    }

    #[test]
    fn test_message_encode() {
        let json = serde_json::json!({"test": "message"});
        let data = serde_json::to_vec(&json).unwrap();

        let message = Message::encode(data, CHECKSUM, 0x25052018, 1527275101).unwrap();

        assert_eq!(message.header.length, 64);
        assert_eq!(message.header.id, 0x25052018);
        assert_eq!(message.header.ts, 1527275101);

        assert_eq!(
            message.data,
            hex!("22a1 9fb1 3a30 0c7e 932c 52fd 24a2 d430 74ea c69f 3240 0626 5298 3f2f f3e5 53b9")
        );

        assert_eq!(message.checksum, hex!("641404928c1540dc761ee0522bac9eaa"));
    }

    #[test]
    fn test_message_decode() {
        let message = Message {
            header: Header {
                id: 0x25052018,
                ts: 1527275101,
                length: 64,
            },
            checksum: hex!("641404928c1540dc761ee0522bac9eaa"),
            data: hex!(
                "22a1 9fb1 3a30 0c7e 932c 52fd 24a2 d430 74ea c69f 3240 0626 5298 3f2f f3e5 53b9"
            )
            .to_vec(),
        };

        let bytes = message.decode(CHECKSUM).unwrap();
        let json = serde_json::from_slice::<serde_json::Value>(&bytes).unwrap();

        assert_eq!(json, serde_json::json!({"test": "message"}));
    }

    #[test]
    fn test_message_decode_invalid_checksum() {
        let message = Message {
            header: Header {
                id: 0x25052018,
                ts: 1527275101,
                length: 64,
            },
            checksum: hex!("641404928c1540dc761ee0522bac9eab"),
            data: hex!(
                "22a1 9fb1 3a30 0c7e 932c 52fd 24a2 d430 74ea c69f 3240 0626 5298 3f2f f3e5 53b9"
            )
            .to_vec(),
        };

        let error = message.decode(CHECKSUM).unwrap_err();
        assert!(matches!(error, Error::InvalidChecksum));
    }

    #[test]
    fn test_message_write_read() {
        let data = br#"{"id":1,"method":"get_status","params":[]}"#.to_vec();
        let message = Message::encode(data, CHECKSUM, 0x0102_0304, 42).unwrap();

        let bytes = message.to_bytes();
        assert_eq!(bytes.len(), message.len());

        let message = Message::read_from(&bytes).unwrap();
        assert_eq!(message.header.id, 0x0102_0304);
        assert_eq!(message.header.ts, 42);

        let decoded = message.decode(CHECKSUM).unwrap();
        assert_eq!(decoded, br#"{"id":1,"method":"get_status","params":[]}"#);
    }
}
