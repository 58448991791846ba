pub mod body;
pub mod encryption;

pub use encryption::ResponseCipher;
