//! CLI command implementations.

pub mod collective;
pub mod hash;
pub mod keygen;
pub mod sign;
pub mod verify;
pub mod watermark;
