use serde::{Deserialize, Deserializer, Serializer};
use serde_with::{DeserializeAs, SerializeAs};

/// Integers are `0x`-prefixed lowercase hex strings on the gateway.
macro_rules! int_as_hex {
    ($name:ident, $int:ty) => {
        pub struct $name;

        impl SerializeAs<$int> for $name {
            fn serialize_as<S>(value: &$int, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(&format!("{:#x}", value))
            }
        }

        impl<'de> DeserializeAs<'de, $int> for $name {
            fn deserialize_as<D>(deserializer: D) -> Result<$int, D::Error>
            where
                D: Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                <$int>::from_str_radix(s.trim_start_matches("0x"), 16).map_err(serde::de::Error::custom)
            }
        }
    };
}

int_as_hex!(U64AsHex, u64);
int_as_hex!(U128AsHex, u128);
