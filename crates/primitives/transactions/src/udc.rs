//! Universal Deployer Contract: the network contract through which accounts deploy instances of
//! declared classes.

use starknet_types_core::felt::Felt;
use starknet_types_core::hash::{Pedersen, StarkHash};

use crate::{calculate_contract_address, ExecutionEncoding};

/// Same address on every public network.
pub const UDC_ADDRESS: Felt =
    Felt::from_hex_unchecked("0x041a78e741e5af2fec34b695679bc6891742439f7afb8484ecd7766661ad02bf");

/// `starknet_keccak("deployContract")`
pub const DEPLOY_CONTRACT_SELECTOR: Felt =
    Felt::from_hex_unchecked("0x01987cbd17808b9a23693d4de7e246a443cfe37e6e7fbaeabd7d7e6532b07c3d");

/// Arguments of `deployContract(class_hash, salt, unique, calldata)`.
pub fn deploy_contract_calldata(class_hash: Felt, salt: Felt, unique: bool, constructor_calldata: &[Felt]) -> Vec<Felt> {
    let mut calldata = Vec::with_capacity(4 + constructor_calldata.len());
    let unique = if unique { Felt::ONE } else { Felt::ZERO };
    calldata.extend([class_hash, salt, unique, Felt::from(constructor_calldata.len())]);
    calldata.extend_from_slice(constructor_calldata);
    calldata
}

/// Wraps a single call to `to.selector(data)` in the account `__execute__` calldata.
pub fn execute_calldata(encoding: ExecutionEncoding, to: Felt, selector: Felt, data: &[Felt]) -> Vec<Felt> {
    let len = Felt::from(data.len());
    let mut calldata = Vec::with_capacity(6 + data.len());
    match encoding {
        ExecutionEncoding::New => calldata.extend([Felt::ONE, to, selector, len]),
        // Call array with a single entry starting at offset 0, then the shared calldata.
        ExecutionEncoding::Legacy => calldata.extend([Felt::ONE, to, selector, Felt::ZERO, len, len]),
    }
    calldata.extend_from_slice(data);
    calldata
}

/// Address the UDC deploys the contract at.
///
/// Unique deployments mix the deployer account into the salt, so that two accounts using the same
/// salt never collide.
pub fn deployed_contract_address(
    sender_address: Felt,
    class_hash: Felt,
    salt: Felt,
    unique: bool,
    constructor_calldata: &[Felt],
) -> Felt {
    if unique {
        let salt = Pedersen::hash(&sender_address, &salt);
        calculate_contract_address(salt, class_hash, constructor_calldata, UDC_ADDRESS)
    } else {
        calculate_contract_address(salt, class_hash, constructor_calldata, Felt::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_deploy_contract_selector() {
        assert_eq!(DEPLOY_CONTRACT_SELECTOR, starknet_core::utils::get_selector_from_name("deployContract").unwrap());
    }

    #[test]
    fn test_deploy_contract_calldata() {
        let calldata = deploy_contract_calldata(Felt::from(10), Felt::from(20), true, &[Felt::from(30), Felt::from(40)]);
        assert_eq!(
            calldata,
            [Felt::from(10), Felt::from(20), Felt::ONE, Felt::TWO, Felt::from(30), Felt::from(40)]
        );
        let calldata = deploy_contract_calldata(Felt::from(10), Felt::from(20), false, &[]);
        assert_eq!(calldata, [Felt::from(10), Felt::from(20), Felt::ZERO, Felt::ZERO]);
    }

    #[rstest]
    #[case(ExecutionEncoding::New, vec![Felt::ONE, Felt::from(5), Felt::from(6), Felt::TWO, Felt::from(7), Felt::from(8)])]
    #[case(
        ExecutionEncoding::Legacy,
        vec![Felt::ONE, Felt::from(5), Felt::from(6), Felt::ZERO, Felt::TWO, Felt::TWO, Felt::from(7), Felt::from(8)]
    )]
    fn test_execute_calldata(#[case] encoding: ExecutionEncoding, #[case] expected: Vec<Felt>) {
        assert_eq!(execute_calldata(encoding, Felt::from(5), Felt::from(6), &[Felt::from(7), Felt::from(8)]), expected);
    }

    // Deployments recorded on chain, also used by starknet-rs.
    #[rstest]
    #[case::not_unique(
        "0x06df0e9a9842d97ff3f4c6de7494d6e69d0a107a72150f9c53d59515b91ed9cb",
        false,
        "0x0288e5952d2f2f0e897ea0c5401c6e9f584a89eebfb08b5b26f090a8bbf67eb6"
    )]
    #[case::unique(
        "0x01f65976b95bf17ae1cb04afc9fc1eeee26d3e1aaa1f30aa535bf261e4322ab8",
        true,
        "0x02406943b25942021f213b047c8765e531dddce3b981722f7aeb2ca137e18dbf"
    )]
    fn test_deployed_contract_address_known_deployments(
        #[case] salt: &str,
        #[case] unique: bool,
        #[case] expected: &str,
    ) {
        let sender = Felt::from_hex_unchecked("0x00b1461de04c6a1aa3375bdf9b7723a8779c082ffe21311d683a0b15c078b5dc");
        let class_hash = Felt::from_hex_unchecked("0x0562fc1d911530d18a86ea3ef4be50018923898d3c573288c5abb9c2344459ed");
        let address =
            deployed_contract_address(sender, class_hash, Felt::from_hex_unchecked(salt), unique, &[Felt::from(0x1234)]);
        assert_eq!(address, Felt::from_hex_unchecked(expected));
    }

    #[test]
    fn test_deployed_contract_address() {
        let sender = Felt::from(0x1234);
        let class_hash = Felt::from(0x5678);
        let salt = Felt::from(42);
        let calldata = [Felt::ONE];

        assert_eq!(
            deployed_contract_address(sender, class_hash, salt, false, &calldata),
            calculate_contract_address(salt, class_hash, &calldata, Felt::ZERO)
        );
        assert_eq!(
            deployed_contract_address(sender, class_hash, salt, true, &calldata),
            calculate_contract_address(Pedersen::hash(&sender, &salt), class_hash, &calldata, UDC_ADDRESS)
        );
        // Unique deployments depend on the deployer, others don't.
        assert_ne!(
            deployed_contract_address(sender, class_hash, salt, true, &calldata),
            deployed_contract_address(Felt::from(0x4321), class_hash, salt, true, &calldata)
        );
        assert_eq!(
            deployed_contract_address(sender, class_hash, salt, false, &calldata),
            deployed_contract_address(Felt::from(0x4321), class_hash, salt, false, &calldata)
        );
    }
}
