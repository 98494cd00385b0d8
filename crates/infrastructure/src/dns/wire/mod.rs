//! DNS message codec (RFC 1035 §4.1)
//!
//! `encode_query` produces the bytes sent to a resolver, `decode` turns a
//! resolver's answer back into a [`Message`]. `encode` writes arbitrary
//! messages (with name compression) and is what mock servers answer with.

mod decoder;
mod encoder;
pub mod header;
mod name;
mod reader;

pub use decoder::decode;
pub use encoder::{encode, encode_query};
pub use header::HEADER_LEN;
pub use name::read_name;
