// Adapters layer: concrete implementations of the domain ports (codec, storage, progress reporting).

pub mod codec;
#[cfg(feature = "heif")]
pub mod heif;
pub mod reporter;
pub mod storage;
