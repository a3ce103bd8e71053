//! Codec tests for vela-sdk
//!
//! Round-trip laws, canonical type strings, head sizes and the reference
//! encodings from the Solidity ABI documentation.

use proptest::prelude::*;
use vela_primitives::{Address, I256, U256};
use vela_sdk::abi::{
    decode, encode, encode_single, parse_type, solidity_sha3, AbiError, ParamType, Token,
};

// ==================== Strategies ====================

fn arb_param_type() -> impl Strategy<Value = ParamType> {
    let leaf = prop_oneof![
        (1..=32usize).prop_map(|n| ParamType::Uint(n * 8)),
        (1..=32usize).prop_map(|n| ParamType::Int(n * 8)),
        Just(ParamType::Address),
        Just(ParamType::Bool),
        Just(ParamType::Function),
        (1..=32usize).prop_map(ParamType::FixedBytes),
        Just(ParamType::Bytes),
        Just(ParamType::String),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(|t| ParamType::Array(Box::new(t))),
            (inner.clone(), 1..4usize).prop_map(|(t, n)| ParamType::FixedArray(Box::new(t), n)),
            prop::collection::vec(inner, 0..4).prop_map(ParamType::Tuple),
        ]
    })
    .prop_filter("nested dynamic arrays are unsupported", |t| t.check_nesting().is_ok())
}

fn arb_token(ty: &ParamType) -> BoxedStrategy<Token> {
    match ty {
        ParamType::Uint(bits) => {
            let bits = *bits;
            any::<[u8; 32]>()
                .prop_map(move |raw| {
                    let value = U256::from_big_endian(&raw);
                    if bits == 256 {
                        Token::Uint(value)
                    } else {
                        Token::Uint(value & ((U256::one() << bits) - U256::one()))
                    }
                })
                .boxed()
        }
        ParamType::Int(bits) => {
            let bits = *bits;
            any::<[u8; 32]>()
                .prop_map(move |raw| Token::Int(I256::from_be_bytes(&raw).truncate_to_bits(bits)))
                .boxed()
        }
        ParamType::Address => any::<[u8; 20]>()
            .prop_map(|raw| Token::Address(Address::from_bytes(raw)))
            .boxed(),
        ParamType::Bool => any::<bool>().prop_map(Token::Bool).boxed(),
        ParamType::Function => any::<[u8; 24]>().prop_map(Token::Function).boxed(),
        ParamType::FixedBytes(len) => prop::collection::vec(any::<u8>(), *len)
            .prop_map(Token::FixedBytes)
            .boxed(),
        ParamType::Bytes => prop::collection::vec(any::<u8>(), 0..80)
            .prop_map(Token::Bytes)
            .boxed(),
        ParamType::String => "\\PC{0,40}".prop_map(Token::String).boxed(),
        ParamType::Array(inner) => prop::collection::vec(arb_token(inner), 0..4)
            .prop_map(Token::Array)
            .boxed(),
        ParamType::FixedArray(inner, len) => prop::collection::vec(arb_token(inner), *len)
            .prop_map(Token::FixedArray)
            .boxed(),
        ParamType::Tuple(members) => members
            .iter()
            .map(arb_token)
            .collect::<Vec<_>>()
            .prop_map(Token::Tuple)
            .boxed(),
    }
}

fn arb_typed_value() -> impl Strategy<Value = (ParamType, Token)> {
    arb_param_type().prop_flat_map(|ty| {
        let value = arb_token(&ty);
        (Just(ty), value)
    })
}

fn word(value: u64) -> Vec<u8> {
    let mut w = [0u8; 32];
    w[24..].copy_from_slice(&value.to_be_bytes());
    w.to_vec()
}

fn right_padded(data: &[u8]) -> Vec<u8> {
    let mut w = data.to_vec();
    w.resize(data.len().div_ceil(32) * 32, 0);
    w
}

// ==================== Properties ====================

proptest! {
    /// decode(encode(v)) == v for every canonical value
    #[test]
    fn prop_single_value_round_trip((ty, value) in arb_typed_value()) {
        let encoded = encode(&[ty.clone()], &[value.clone()]).unwrap();
        let decoded = decode(&[ty], &encoded).unwrap();
        prop_assert_eq!(decoded, vec![value]);
    }

    /// Round trip over whole parameter lists
    #[test]
    fn prop_param_list_round_trip(pairs in prop::collection::vec(arb_typed_value(), 0..5)) {
        let (types, values): (Vec<ParamType>, Vec<Token>) = pairs.into_iter().unzip();
        let encoded = encode(&types, &values).unwrap();
        prop_assert_eq!(encoded.len() % 32, 0);
        prop_assert_eq!(decode(&types, &encoded).unwrap(), values);
    }

    /// Rendering a type and parsing it back is the identity
    #[test]
    fn prop_canonical_reparse(ty in arb_param_type()) {
        let rendered = ty.to_string();
        prop_assert_eq!(parse_type(&rendered).unwrap(), ty.clone());
        prop_assert_eq!(parse_type(&rendered).unwrap().to_string(), rendered);
    }

    /// Zero values of static types fill exactly their head size
    #[test]
    fn prop_word_size_invariant(ty in arb_param_type()) {
        if ty.is_static() {
            let encoded = encode(&[ty.clone()], &[ty.zero_value()]).unwrap();
            prop_assert_eq!(encoded.len(), ty.word_size());
        } else {
            prop_assert_eq!(ty.word_size(), 32);
        }
    }

    /// Containers are static exactly when every member is
    #[test]
    fn prop_staticness_monotonic(ty in arb_param_type(), n in 1..4usize) {
        let fixed = ParamType::FixedArray(Box::new(ty.clone()), n);
        prop_assert_eq!(fixed.is_static(), ty.is_static());
        prop_assert!(ParamType::Array(Box::new(ty.clone())).is_dynamic());
        let tuple = ParamType::Tuple(vec![ParamType::Bool, ty.clone()]);
        prop_assert_eq!(tuple.is_static(), ty.is_static());
    }

    /// A top-level dynamic value is one offset word followed by its payload
    #[test]
    fn prop_encode_single_is_payload((ty, value) in arb_typed_value()) {
        let full = encode(&[ty.clone()], &[value.clone()]).unwrap();
        let payload = encode_single(&ty, &value).unwrap();
        if ty.is_dynamic() {
            prop_assert_eq!(&full[..32], &word(32)[..]);
            prop_assert_eq!(&full[32..], &payload[..]);
        } else {
            prop_assert_eq!(full, payload);
        }
    }

    /// Truncating a valid encoding never panics
    #[test]
    fn prop_truncated_input_is_an_error((ty, value) in arb_typed_value(), cut in 1..64usize) {
        let encoded = encode(&[ty.clone()], &[value]).unwrap();
        if cut <= encoded.len() {
            let shortened = &encoded[..encoded.len() - cut];
            let _ = decode(&[ty], shortened);
        }
    }
}

// ==================== Scenarios ====================

/// `uint256[3][]` is a dynamic array of 3-element static arrays
#[test]
fn test_parse_nested_array() {
    assert_eq!(
        parse_type("uint256[3][]").unwrap(),
        ParamType::Array(Box::new(ParamType::FixedArray(Box::new(ParamType::Uint(256)), 3)))
    );
}

/// Invalid widths are rejected
#[test]
fn test_invalid_suffixes() {
    for s in ["uint7", "uint0", "bytes33", "bytes0"] {
        assert!(matches!(parse_type(s), Err(AbiError::InvalidType(_))), "{}", s);
    }
}

/// `uint256` 5 is 31 zero bytes then 0x05
#[test]
fn test_encode_uint_five() {
    let encoded = encode(&[ParamType::Uint(256)], &[Token::Uint(U256::from(5))]).unwrap();
    assert_eq!(encoded, word(5));
}

/// `bytes` [1,2,3]: length word plus one padded data word, behind an offset at top level
#[test]
fn test_encode_dynamic_bytes() {
    let value = Token::Bytes(vec![1, 2, 3]);
    let payload = encode_single(&ParamType::Bytes, &value).unwrap();
    assert_eq!(payload, [word(3), right_padded(&[1, 2, 3])].concat());

    let encoded = encode(&[ParamType::Bytes], &[value]).unwrap();
    assert_eq!(encoded, [word(32), payload].concat());
    assert_eq!(encoded.len(), 96);
}

/// An empty buffer cannot hold a head
#[test]
fn test_decode_empty_buffer() {
    assert_eq!(
        decode(&[ParamType::Uint(256)], &[]),
        Err(AbiError::TruncatedData { needed: 32, available: 0 })
    );
}

// ==================== Reference Encodings ====================

/// `f(uint256,uint32[],bytes10,bytes)` from the Solidity ABI documentation
#[test]
fn test_solidity_docs_dynamic_example() {
    let types: Vec<ParamType> = ["uint256", "uint32[]", "bytes10", "bytes"]
        .iter()
        .map(|s| parse_type(s).unwrap())
        .collect();
    let values = vec![
        Token::from(0x123u64),
        Token::Array(vec![Token::from(0x456u64), Token::from(0x789u64)]),
        Token::FixedBytes(b"1234567890".to_vec()),
        Token::Bytes(b"Hello, world!".to_vec()),
    ];

    let expected = [
        word(0x123),
        word(0x80),
        right_padded(b"1234567890"),
        word(0xe0),
        word(2),
        word(0x456),
        word(0x789),
        word(13),
        right_padded(b"Hello, world!"),
    ]
    .concat();

    let encoded = encode(&types, &values).unwrap();
    assert_eq!(hex::encode(&encoded), hex::encode(&expected));
    assert_eq!(decode(&types, &encoded).unwrap(), values);
    assert_eq!(
        vela_sdk::abi::function_selector("f(uint256,uint32[],bytes10,bytes)"),
        [0x8b, 0xe6, 0x52, 0x46]
    );
}

/// `sam(bytes,bool,uint256[])` from the Solidity ABI documentation
#[test]
fn test_solidity_docs_sam_example() {
    let types: Vec<ParamType> = ["bytes", "bool", "uint256[]"]
        .iter()
        .map(|s| parse_type(s).unwrap())
        .collect();
    let values = vec![
        Token::Bytes(b"dave".to_vec()),
        Token::Bool(true),
        Token::Array(vec![Token::from(1u64), Token::from(2u64), Token::from(3u64)]),
    ];

    let expected = [
        word(0x60),
        word(1),
        word(0xa0),
        word(4),
        right_padded(b"dave"),
        word(3),
        word(1),
        word(2),
        word(3),
    ]
    .concat();

    assert_eq!(encode(&types, &values).unwrap(), expected);
    assert_eq!(
        vela_sdk::abi::function_selector("sam(bytes,bool,uint256[])"),
        [0xa5, 0x64, 0x3b, 0xf2]
    );
}

/// Dynamic tuple inside a static-length array: each element gets its own offset
#[test]
fn test_array_of_dynamic_tuples() {
    let ty = parse_type("(uint8,string)[2]").unwrap();
    let value = Token::FixedArray(vec![
        Token::Tuple(vec![Token::from(1u64), Token::from("a")]),
        Token::Tuple(vec![Token::from(2u64), Token::from("bc")]),
    ]);

    let encoded = encode(&[ty.clone()], &[value.clone()]).unwrap();
    let expected = [
        word(0x20),
        // array head: two tuple offsets relative to the array start
        word(0x40),
        word(0xc0),
        // first tuple
        word(1),
        word(0x40),
        word(1),
        right_padded(b"a"),
        // second tuple
        word(2),
        word(0x40),
        word(2),
        right_padded(b"bc"),
    ]
    .concat();
    assert_eq!(encoded, expected);
    assert_eq!(decode(&[ty], &encoded).unwrap(), vec![value]);
}

/// Nested dynamic arrays fail fast in both directions
#[test]
fn test_nested_dynamic_arrays_unsupported() {
    let ty = parse_type("uint256[][]").unwrap();
    assert!(matches!(
        encode(&[ty.clone()], &[Token::Array(vec![])]),
        Err(AbiError::UnsupportedType(_))
    ));
    assert!(matches!(
        decode(&[ty], &[word(32), word(0)].concat()),
        Err(AbiError::UnsupportedType(_))
    ));
}

/// `keccak256(abi.encodePacked(..))` against the web3.js `soliditySha3` vectors
#[test]
fn test_solidity_sha3_vectors() {
    let sha3 = |types: &[ParamType], values: &[Token]| solidity_sha3(types, values).unwrap().to_hex();
    let uint256 = ParamType::Uint(256);
    let int256 = ParamType::Int(256);
    let payload = Token::Bytes(vec![0xff, 0xf2, 0x32, 0x43]);

    assert_eq!(
        sha3(&[ParamType::Bool], &[Token::Bool(true)]),
        "0x5fe7f977e71dba2ea1a68e21057beebb9be2ac30c6410aa38d4f3fbe41dcffd2"
    );
    assert_eq!(
        sha3(&[int256.clone()], &[Token::from(-10i64)]),
        "0xd6fb717f7e270a360f5093ce6a7a3752183e89c9a9afe5c0cb54b458a304d3d5"
    );
    assert_eq!(
        sha3(&[ParamType::Bytes], &[payload.clone()]),
        "0x0ee4597224d3499c72aa0c309b0d0cb80ff3c2439a548c53edb479abfd6927ba"
    );
    assert_eq!(
        sha3(&[uint256.clone()], &[Token::from(234_564_535u64)]),
        "0xb2daf574dc6ceac97e984c8a3ffce3c1ec19e81cc6b18aeea67b3ac2666f4e97"
    );
    assert_eq!(
        sha3(
            &[uint256.clone(), ParamType::Bytes, ParamType::Bool, int256],
            &[Token::from(234_564_535u64), payload, Token::Bool(true), Token::from(-10i64)]
        ),
        "0x3e27a893dc40ef8a7f0841d96639de2f58a132be5ae466d40087a2cfa83b7179"
    );
    assert_eq!(
        sha3(&[ParamType::String], &[Token::from("Hello!%")]),
        "0x661136a4267dba9ccdf6bfddb7c00e714de936674c4bdb065a531cf1cb15c7fc"
    );
    assert_eq!(
        sha3(&[uint256], &[Token::from(234u64)]),
        "0x61c831beab28d67d1bb40b5ae1a11e2757fa842f031a2d0bc94a7867bc5d26c2"
    );
    assert_eq!(
        sha3(&[ParamType::Uint(64)], &[Token::from(234u64)]),
        "0x6e48b7f8b342032bfa46a07cf85358feee0efe560d6caa87d342f24cdcd07b0c"
    );
    assert_eq!(
        sha3(&[ParamType::Int(8)], &[Token::from(-23i64)]),
        "0xdc046d75852af4aea44a770057190294068a953828daaaab83800e2d0a8f1f35"
    );

    let first = Address::from_hex("0x407D73d8a49eeb85D32Cf465507dd71d507100c1").unwrap();
    assert_eq!(
        sha3(&[ParamType::Address], &[Token::Address(first)]),
        "0x4e8ebbefa452077428f93c9520d3edd60594ff452a29ac7d2ccc11d47f3ab95b"
    );

    let second = Address::from_hex("0x85F43D8a49eeB85d32Cf465507DD71d507100C1d").unwrap();
    assert_eq!(
        sha3(&[ParamType::Address], &[Token::Address(second)]),
        "0xe88edd4848fdce08c45ecfafd2fbfdefc020a7eafb8178e94c5feaeec7ac0bb4"
    );
    assert_eq!(
        sha3(
            &[ParamType::String, ParamType::Int(8), ParamType::Address],
            &[Token::from("Hello!%"), Token::from(-23i64), Token::Address(second)]
        ),
        "0xa13b31627c1ed7aaded5aecec71baf02fe123797fffd45e662eac8e06fbe4955"
    );
}
