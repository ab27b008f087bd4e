mod device;
mod discover;
mod message;
mod vacuum;

mod error;
pub use error::Error;

pub use crypto::{parse_token, Token};
pub use device::{Device, DeviceError, DeviceInfo};
pub use discover::discover;
pub use message::Header;
pub use vacuum::{Change, State, Status, Vacuum};

pub type Result<T> = std::result::Result<T, Error>;

pub const PORT: u16 = 54321;
