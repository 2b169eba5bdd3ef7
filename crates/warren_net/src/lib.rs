//! # warren_net
//!
//! The wire layer between the dungeon server and its clients.
//!
//! This crate provides:
//!
//! - [`messages`] — message types exchanged between server and client.
//! - [`codec`] — MessagePack serialisation/deserialisation helpers.
//! - [`connection`] — length-prefixed framing over a TCP byte stream.
//! - [`error`] — wire-layer error types.
//!
//! The transport is assumed reliable and ordered; there is no
//! retransmission or reconnection handling here.

pub mod codec;
pub mod connection;
pub mod error;
pub mod messages;

pub use codec::{decode, encode};
pub use connection::{MAX_FRAME, read_frame, write_frame};
pub use error::NetError;
