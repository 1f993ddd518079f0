//! Error type and byte-level helpers shared by the loader and the serializer.

pub mod error;
pub mod serde;
