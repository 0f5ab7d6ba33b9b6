use starknet_core::types::contract::legacy::RawLegacyAbiEntry;
use starknet_core::types::contract::AbiEntry;

/// Number of felts the constructor of a class expects as calldata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructorArity {
    Exact(usize),
    /// The constructor takes dynamically sized arguments (arrays, enums..).
    AtLeast(usize),
}

impl ConstructorArity {
    pub fn accepts(&self, calldata_len: usize) -> bool {
        match *self {
            ConstructorArity::Exact(n) => calldata_len == n,
            ConstructorArity::AtLeast(n) => calldata_len >= n,
        }
    }

    /// Smallest calldata length the constructor accepts.
    pub fn min(&self) -> usize {
        match *self {
            ConstructorArity::Exact(n) | ConstructorArity::AtLeast(n) => n,
        }
    }

    /// Classes without a constructor entry take no calldata.
    pub fn from_sierra_abi(abi: &[AbiEntry]) -> Self {
        let constructor = abi.iter().find_map(|entry| match entry {
            AbiEntry::Constructor(constructor) => Some(constructor),
            _ => None,
        });
        match constructor {
            Some(constructor) => Self::from_inputs(constructor.inputs.iter().map(|input| input.r#type.as_str()), abi),
            None => ConstructorArity::Exact(0),
        }
    }

    pub fn from_legacy_abi(abi: &[RawLegacyAbiEntry]) -> Self {
        let constructor = abi.iter().find_map(|entry| match entry {
            RawLegacyAbiEntry::Constructor(constructor) => Some(constructor),
            _ => None,
        });
        match constructor {
            Some(constructor) => Self::from_inputs(constructor.inputs.iter().map(|input| input.r#type.as_str()), abi),
            None => ConstructorArity::Exact(0),
        }
    }

    fn from_inputs<'a, T: AbiTypes + ?Sized>(inputs: impl Iterator<Item = &'a str>, abi: &T) -> Self {
        let width = inputs.map(|ty| Width::of(ty, abi, 0)).fold(Width::fixed(0), Width::concat);
        if width.exact {
            ConstructorArity::Exact(width.min)
        } else {
            ConstructorArity::AtLeast(width.min)
        }
    }
}

impl std::fmt::Display for ConstructorArity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstructorArity::Exact(n) => write!(f, "{n}"),
            ConstructorArity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// User defined types an abi declares.
enum TypeDef<'a> {
    Struct(Vec<&'a str>),
    /// Cairo 0 structs carry their size in felts.
    Sized(usize),
    Enum,
}

trait AbiTypes {
    fn lookup(&self, name: &str) -> Option<TypeDef<'_>>;
}

impl AbiTypes for [AbiEntry] {
    fn lookup(&self, name: &str) -> Option<TypeDef<'_>> {
        self.iter().find_map(|entry| match entry {
            AbiEntry::Struct(s) if s.name == name => {
                Some(TypeDef::Struct(s.members.iter().map(|member| member.r#type.as_str()).collect()))
            }
            AbiEntry::Enum(e) if e.name == name => Some(TypeDef::Enum),
            _ => None,
        })
    }
}

impl AbiTypes for [RawLegacyAbiEntry] {
    fn lookup(&self, name: &str) -> Option<TypeDef<'_>> {
        self.iter().find_map(|entry| match entry {
            RawLegacyAbiEntry::Struct(s) if s.name == name => Some(TypeDef::Sized(s.size as usize)),
            _ => None,
        })
    }
}

const MAX_TYPE_DEPTH: usize = 16;

const FELT_SIZED: &[&str] = &[
    "felt",
    "core::felt252",
    "core::bool",
    "core::integer::u8",
    "core::integer::u16",
    "core::integer::u32",
    "core::integer::u64",
    "core::integer::u128",
    "core::integer::i8",
    "core::integer::i16",
    "core::integer::i32",
    "core::integer::i64",
    "core::integer::i128",
    "core::bytes_31::bytes31",
    "core::starknet::contract_address::ContractAddress",
    "core::starknet::class_hash::ClassHash",
    "core::starknet::storage_access::StorageAddress",
    "core::starknet::eth_address::EthAddress",
];

/// Serialized size of an abi type, in felts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Width {
    min: usize,
    exact: bool,
}

impl Width {
    fn fixed(min: usize) -> Self {
        Self { min, exact: true }
    }

    fn dynamic(min: usize) -> Self {
        Self { min, exact: false }
    }

    fn concat(self, other: Self) -> Self {
        Self { min: self.min + other.min, exact: self.exact && other.exact }
    }

    fn of<T: AbiTypes + ?Sized>(ty: &str, abi: &T, depth: usize) -> Self {
        let ty = ty.trim().trim_start_matches('@');
        if depth > MAX_TYPE_DEPTH {
            tracing::debug!(ty, "Abi type nesting is too deep, assuming a dynamic size");
            return Width::dynamic(1);
        }

        if FELT_SIZED.contains(&ty) {
            return Width::fixed(1);
        }
        if ty.ends_with('*') {
            // Cairo 0 arrays, the length is its own `_len` input.
            return Width::dynamic(0);
        }
        if let Some(inner) = ty.strip_prefix('(').and_then(|ty| ty.strip_suffix(')')) {
            return split_top_level(inner)
                .map(|element| Width::of(strip_tuple_name(element), abi, depth + 1))
                .fold(Width::fixed(0), Width::concat);
        }

        let (path, generic) = match ty.split_once("::<") {
            Some((path, generic)) => (path, generic.strip_suffix('>')),
            None => (ty, None),
        };
        match path {
            "core::integer::u256" => return Width::fixed(2),
            "core::integer::u512" => return Width::fixed(4),
            "core::array::Array" | "core::array::Span" => return Width::dynamic(1),
            "core::byte_array::ByteArray" => return Width::dynamic(3),
            "core::option::Option" => return Width::dynamic(1),
            "core::zeroable::NonZero" => {
                if let Some(inner) = generic {
                    return Width::of(inner, abi, depth + 1);
                }
            }
            _ => {}
        }

        match abi.lookup(ty) {
            Some(TypeDef::Struct(members)) => {
                members.into_iter().map(|ty| Width::of(ty, abi, depth + 1)).fold(Width::fixed(0), Width::concat)
            }
            Some(TypeDef::Sized(size)) => Width::fixed(size),
            Some(TypeDef::Enum) => Width::dynamic(1),
            None => {
                tracing::debug!(ty, "Unknown abi type, assuming a dynamic size");
                Width::dynamic(1)
            }
        }
    }
}

/// Cairo 0 tuples may be named, ie. `(x: felt, y: felt)`.
fn strip_tuple_name(element: &str) -> &str {
    match element.split_once(": ") {
        Some((_, ty)) => ty,
        None => element,
    }
}

fn split_top_level(s: &str) -> impl Iterator<Item = &str> {
    let mut depth = 0i32;
    let mut start = 0;
    let mut parts = Vec::new();
    for (i, c) in s.char_indices() {
        match c {
            '<' | '(' => depth += 1,
            '>' | ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts.into_iter().map(str::trim).filter(|part| !part.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::{json, Value};

    fn sierra_abi(entries: Value) -> Vec<AbiEntry> {
        serde_json::from_value(entries).unwrap()
    }

    fn legacy_abi(entries: Value) -> Vec<RawLegacyAbiEntry> {
        serde_json::from_value(entries).unwrap()
    }

    fn constructor(inputs: &[&str]) -> Value {
        let inputs: Vec<_> =
            inputs.iter().enumerate().map(|(i, ty)| json!({ "name": format!("arg{i}"), "type": ty })).collect();
        json!({ "type": "constructor", "name": "constructor", "inputs": inputs })
    }

    #[rstest]
    #[case(&[], ConstructorArity::Exact(0))]
    #[case(&["core::felt252"], ConstructorArity::Exact(1))]
    #[case(&["core::starknet::contract_address::ContractAddress", "core::integer::u256"], ConstructorArity::Exact(3))]
    #[case(&["core::array::Array::<core::felt252>"], ConstructorArity::AtLeast(1))]
    #[case(&["core::felt252", "core::array::Span::<core::felt252>"], ConstructorArity::AtLeast(2))]
    #[case(&["core::byte_array::ByteArray"], ConstructorArity::AtLeast(3))]
    #[case(&["(core::felt252, core::integer::u256)"], ConstructorArity::Exact(3))]
    #[case(&["()"], ConstructorArity::Exact(0))]
    #[case(&["core::zeroable::NonZero::<core::integer::u64>"], ConstructorArity::Exact(1))]
    fn sierra_constructor_arity(#[case] inputs: &[&str], #[case] expected: ConstructorArity) {
        let abi = sierra_abi(json!([constructor(inputs)]));
        assert_eq!(ConstructorArity::from_sierra_abi(&abi), expected);
    }

    #[test]
    fn sierra_arity_resolves_abi_types() {
        let abi = sierra_abi(json!([
            constructor(&["pkg::Config", "pkg::Mode"]),
            {
                "type": "struct",
                "name": "pkg::Config",
                "members": [
                    { "name": "owner", "type": "core::starknet::contract_address::ContractAddress" },
                    { "name": "supply", "type": "core::integer::u256" }
                ]
            },
            {
                "type": "enum",
                "name": "pkg::Mode",
                "variants": [{ "name": "A", "type": "()" }, { "name": "B", "type": "core::felt252" }]
            }
        ]));
        assert_eq!(ConstructorArity::from_sierra_abi(&abi), ConstructorArity::AtLeast(4));
        // Without the enum definition the type is unknown, still dynamic.
        assert_eq!(ConstructorArity::from_sierra_abi(&abi[..2]), ConstructorArity::AtLeast(4));
    }

    #[test]
    fn sierra_without_constructor_takes_no_calldata() {
        let abi = sierra_abi(json!([
            { "type": "function", "name": "foo", "inputs": [], "outputs": [], "state_mutability": "view" }
        ]));
        assert_eq!(ConstructorArity::from_sierra_abi(&abi), ConstructorArity::Exact(0));
    }

    fn legacy_constructor(inputs: &[(&str, &str)]) -> Value {
        let inputs: Vec<_> = inputs.iter().map(|(name, ty)| json!({ "name": name, "type": ty })).collect();
        json!({ "type": "constructor", "name": "constructor", "inputs": inputs, "outputs": [] })
    }

    #[rstest]
    #[case(&[("erc20_address", "felt")], ConstructorArity::Exact(1))]
    #[case(&[("owner", "felt"), ("prices_len", "felt"), ("prices", "felt*")], ConstructorArity::AtLeast(2))]
    #[case(&[("point", "(x: felt, y: felt)")], ConstructorArity::Exact(2))]
    #[case(&[("supply", "Uint256"), ("recipient", "felt")], ConstructorArity::Exact(3))]
    fn legacy_constructor_arity(#[case] inputs: &[(&str, &str)], #[case] expected: ConstructorArity) {
        let abi = legacy_abi(json!([
            legacy_constructor(inputs),
            {
                "type": "struct",
                "name": "Uint256",
                "size": 2,
                "members": [
                    { "name": "low", "offset": 0, "type": "felt" },
                    { "name": "high", "offset": 1, "type": "felt" }
                ]
            }
        ]));
        assert_eq!(ConstructorArity::from_legacy_abi(&abi), expected);
    }

    #[test]
    fn arity_accepts() {
        assert!(ConstructorArity::Exact(2).accepts(2));
        assert!(!ConstructorArity::Exact(2).accepts(3));
        assert!(ConstructorArity::AtLeast(2).accepts(5));
        assert!(!ConstructorArity::AtLeast(2).accepts(1));
        assert_eq!(ConstructorArity::AtLeast(3).to_string(), "at least 3");
    }
}
