//! MTProto client boundary for telegate.
//!
//! Everything the rest of the workspace knows about Telegram goes through the
//! [`Connector`] and [`ClientHandle`] traits defined here. The production
//! implementation ([`LayerConnector`]) binds them to the `layer-client`
//! MTProto library; library error types never escape this crate — they are
//! translated into [`Error`] with the raw RPC name/code preserved so callers
//! can classify failures without depending on the library.

pub mod connector;
pub mod entities;
pub mod error;
pub mod layer;

pub use {
    connector::{ApiCredentials, ClientHandle, CodeToken, Connector, DialogsQuery, SessionBlob, SignIn},
    error::{Error, Result, RpcError},
    layer::LayerConnector,
};
