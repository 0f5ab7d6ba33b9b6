mod chain_config;

pub use chain_config::{ChainId, ChainIdError};
