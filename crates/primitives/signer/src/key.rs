use std::fmt;

use mp_transactions::Signature;
use starknet_types_core::felt::Felt;
use zeroize::Zeroizing;

use crate::SignerError;

/// Order of the Stark curve generator: valid private keys are in `[1, EC_ORDER)`.
const EC_ORDER: Felt = Felt::from_hex_unchecked("0x0800000000000010ffffffffffffffffb781126dcae7b2321e66a241adc64d2f");

/// Stark curve private key.
///
/// The key bytes are wiped from memory on drop. The key is never printed, logged or serialized:
/// the `Debug` implementation is redacted and there is no `Serialize` implementation.
#[derive(Clone)]
pub struct SigningKey {
    secret: Zeroizing<[u8; 32]>,
}

impl SigningKey {
    pub fn from_felt(secret: Felt) -> Result<Self, SignerError> {
        if secret == Felt::ZERO || secret >= EC_ORDER {
            return Err(SignerError::InvalidKey);
        }
        Ok(Self { secret: Zeroizing::new(secret.to_bytes_be()) })
    }

    /// Parses a `0x`-prefixed hex private key.
    pub fn from_hex(secret: &str) -> Result<Self, SignerError> {
        let secret = Felt::from_hex(secret.trim()).map_err(|_| SignerError::InvalidKey)?;
        Self::from_felt(secret)
    }

    pub fn public_key(&self) -> Felt {
        starknet_crypto::get_public_key(&self.scalar())
    }

    fn scalar(&self) -> Felt {
        Felt::from_bytes_be(&self.secret)
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey").field("secret", &"<redacted>").finish()
    }
}

/// Signs a transaction hash, using a deterministic (RFC 6979) nonce.
pub fn sign(tx_hash: &Felt, key: &SigningKey) -> Result<Signature, SignerError> {
    let scalar = key.scalar();
    let k = starknet_crypto::rfc6979_generate_k(tx_hash, &scalar, None);
    let signature = starknet_crypto::sign(&scalar, tx_hash, &k).map_err(|err| match err {
        starknet_crypto::SignError::InvalidMessageHash => SignerError::InvalidMessageHash(*tx_hash),
        _ => SignerError::InvalidKey,
    })?;
    Ok(Signature { r: signature.r, s: signature.s })
}

/// Same check as the one the network runs when validating the transaction.
pub fn verify(public_key: &Felt, tx_hash: &Felt, signature: &Signature) -> bool {
    starknet_crypto::verify(public_key, tx_hash, &signature.r, &signature.s).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use rstest::rstest;

    const PRIVATE_KEY: &str = "0x03c1e9550e66958296d11b60f8e8e7a7ad990d07fa65d5f7652c4a6c87d4e3cc";
    const PUBLIC_KEY: Felt =
        Felt::from_hex_unchecked("0x077a3b314db07c45076d11f62b6f9e748a39790441823307743cf00d6597ea43");
    const TX_HASH: Felt = Felt::from_hex_unchecked("0x2d6479c0758efbb5aa07d35ed5454d728637fceab7ba544d3ea95403a5630a8");

    fn flip_bit(felt: &Felt, bit: usize) -> Felt {
        let mut bytes = felt.to_bytes_be();
        bytes[31 - bit / 8] ^= 1 << (bit % 8);
        Felt::from_bytes_be(&bytes)
    }

    #[test]
    fn test_public_key() {
        let key = SigningKey::from_hex(PRIVATE_KEY).unwrap();
        assert_eq!(key.public_key(), PUBLIC_KEY);
    }

    #[rstest]
    #[case("0x0")]
    #[case("0x0800000000000010ffffffffffffffffb781126dcae7b2321e66a241adc64d2f")]
    #[case("0x0800000000000011000000000000000000000000000000000000000000000000")]
    #[case("not hex")]
    fn test_invalid_keys(#[case] key: &str) {
        assert_matches!(SigningKey::from_hex(key), Err(SignerError::InvalidKey));
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = SigningKey::from_hex(PRIVATE_KEY).unwrap();
        let debug = format!("{key:?}");
        assert!(!debug.contains("3c1e9550e66958296d11b60f8e8e7a7ad990d07fa65d5f7652c4a6c87d4e3cc"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_sign_verify() {
        let key = SigningKey::from_hex(PRIVATE_KEY).unwrap();
        let signature = sign(&TX_HASH, &key).unwrap();
        assert!(verify(&key.public_key(), &TX_HASH, &signature));
        // Deterministic nonce.
        assert_eq!(sign(&TX_HASH, &key).unwrap(), signature);
    }

    #[test]
    fn test_sign_out_of_range_hash() {
        let key = SigningKey::from_hex(PRIVATE_KEY).unwrap();
        let hash = Felt::MAX;
        assert_matches!(sign(&hash, &key), Err(SignerError::InvalidMessageHash(h)) if h == hash);
    }

    proptest! {
        #[test]
        fn verify_fails_on_perturbed_hash(bit in 0usize..251) {
            let key = SigningKey::from_hex(PRIVATE_KEY).unwrap();
            let signature = sign(&TX_HASH, &key).unwrap();
            prop_assert!(!verify(&key.public_key(), &flip_bit(&TX_HASH, bit), &signature));
        }

        #[test]
        fn verify_fails_on_perturbed_key(bit in 0usize..251) {
            let key = SigningKey::from_hex(PRIVATE_KEY).unwrap();
            let signature = sign(&TX_HASH, &key).unwrap();
            let other_key = SigningKey::from_felt(flip_bit(&key.scalar(), bit)).unwrap();
            prop_assert!(!verify(&other_key.public_key(), &TX_HASH, &signature));
        }
    }
}
