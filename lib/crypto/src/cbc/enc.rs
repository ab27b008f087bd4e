use aes::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};
use cipher::inout::PadError;

use crate::Token;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;

const BLOCK_SIZE: usize = 16;

/// Encrypts `data` in place. PKCS#7 always appends at least one byte, so the
/// buffer is grown to the next full block before encrypting.
pub fn encrypt(data: &mut Vec<u8>, key: Token<16>, iv: Token<16>) -> Result<&[u8], PadError> {
    let pos = data.len();
    data.resize(pos + BLOCK_SIZE - pos % BLOCK_SIZE, 0);

    Aes128CbcEnc::new(&key.into(), &iv.into()).encrypt_padded_mut::<Pkcs7>(data, pos)
}
