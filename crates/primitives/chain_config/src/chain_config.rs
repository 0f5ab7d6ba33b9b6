use serde::{Deserialize, Deserializer, Serialize, Serializer};
use starknet_types_core::felt::Felt;
use std::fmt;
use std::str::FromStr;

/// Chain identifier, as hashed into every transaction.
///
/// On the wire and in transaction hashes the chain id is the short-string encoding of its name,
/// ie. `SN_MAIN` is `0x534e5f4d41494e`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChainId {
    Mainnet,
    Sepolia,
    IntegrationSepolia,
    Other(String),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChainIdError {
    #[error("Chain id must not be empty")]
    Empty,
    #[error("Chain id {0:?} is longer than 31 characters and cannot be encoded as a short string")]
    TooLong(String),
    #[error("Chain id {0:?} must be ascii")]
    NotAscii(String),
}

impl ChainId {
    pub fn as_str(&self) -> &str {
        match self {
            ChainId::Mainnet => "SN_MAIN",
            ChainId::Sepolia => "SN_SEPOLIA",
            ChainId::IntegrationSepolia => "SN_INTEGRATION_SEPOLIA",
            ChainId::Other(name) => name,
        }
    }

    pub fn to_felt(&self) -> Felt {
        Felt::from_bytes_be_slice(self.as_str().as_bytes())
    }
}

impl FromStr for ChainId {
    type Err = ChainIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err(ChainIdError::Empty),
            "SN_MAIN" => Ok(ChainId::Mainnet),
            "SN_SEPOLIA" => Ok(ChainId::Sepolia),
            "SN_INTEGRATION_SEPOLIA" => Ok(ChainId::IntegrationSepolia),
            other if !other.is_ascii() => Err(ChainIdError::NotAscii(other.into())),
            // Felts are 252 bits, a short string holds at most 31 bytes.
            other if other.len() > 31 => Err(ChainIdError::TooLong(other.into())),
            other => Ok(ChainId::Other(other.into())),
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&ChainId> for Felt {
    fn from(chain_id: &ChainId) -> Self {
        chain_id.to_felt()
    }
}

impl Serialize for ChainId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
