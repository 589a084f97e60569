//! Protocol layer: wire format and frame types.

mod frame;
mod wire_format;

pub use frame::{build_frame, Frame};
pub use wire_format::{ops, Header, HEADER_SIZE, PROTOCOL_VERSION};
