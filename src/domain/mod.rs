//! Domain layer: the wallet record and the storage port the engine consumes.

pub mod ports;
pub mod wallet;
