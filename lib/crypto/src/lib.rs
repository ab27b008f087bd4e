mod cbc {
    pub mod dec;
    pub mod enc;
}

pub use cbc::dec::decrypt;
pub use cbc::enc::encrypt;

mod token;
pub use token::{parse_token, InvalidToken, Token};

pub use cipher::block_padding::UnpadError;
pub use cipher::inout::PadError;
