use md5::{Digest, Md5};

use crate::{Result, Token};

pub fn encrypt(data: &mut Vec<u8>, token: Token<16>) -> Result<&[u8]> {
    let (key, iv) = key_iv_from_token(token);
    Ok(crypto::encrypt(data, key, iv)?)
}

pub fn decrypt(data: &mut [u8], token: Token<16>) -> Result<&[u8]> {
    let (key, iv) = key_iv_from_token(token);
    Ok(crypto::decrypt(data, key, iv)?)
}

/// key = md5(token), iv = md5(key + token)
fn key_iv_from_token(token: Token<16>) -> ([u8; 16], [u8; 16]) {
    let mut hasher = Md5::new();
    hasher.update(token);

    let mut key = [0; 16];
    key.copy_from_slice(&hasher.finalize_reset());

    hasher.update(key);
    hasher.update(token);

    let mut iv = [0; 16];
    iv.copy_from_slice(&hasher.finalize());

    (key, iv)
}
