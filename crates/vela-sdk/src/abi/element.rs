//! Typed ABI elements built from JSON ABI records

use std::fmt;

use serde::{Deserialize, Serialize};
use vela_primitives::H256;

use super::decode::{AbiDecoder, DecodedParams};
use super::encode::encode_params;
use super::error::AbiError;
use super::json::{AbiEntry, AbiParam};
use super::param_type::ParamType;
use super::parser::parse_type;
use super::token::Token;

/// A named, typed parameter (function input/output, event field, error field)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Parameter name, possibly empty
    pub name: String,
    /// Parameter type
    pub kind: ParamType,
    /// Indexed event field
    pub indexed: bool,
}

impl Param {
    /// Create a non-indexed parameter
    pub fn new(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: name.into().trim().to_string(),
            kind,
            indexed: false,
        }
    }

    /// Create an indexed event parameter
    pub fn indexed(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            indexed: true,
            ..Self::new(name, kind)
        }
    }

    /// Build from a JSON record, attaching tuple components
    pub fn from_record(record: &AbiParam) -> Result<Self, AbiError> {
        let mut kind = parse_type(record.kind.trim())?;
        match &record.components {
            Some(components) => {
                let members = components
                    .iter()
                    .map(|c| Param::from_record(c).map(|p| p.kind))
                    .collect::<Result<Vec<_>, _>>()?;
                kind = kind.attach_components(members)?;
                kind.validate()?;
            }
            None if kind.is_tuple_based() && record.kind.trim_start().starts_with("tuple") => {
                return Err(AbiError::InvalidAbi(format!(
                    "`{}` parameter `{}` has no components",
                    record.kind, record.name
                )));
            }
            None => {}
        }
        Ok(Self {
            name: record.name.trim().to_string(),
            kind,
            indexed: record.indexed,
        })
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if self.indexed {
            f.write_str(" indexed")?;
        }
        if !self.name.is_empty() {
            write!(f, " {}", self.name)?;
        }
        Ok(())
    }
}

fn params_from_records(records: &[AbiParam]) -> Result<Vec<Param>, AbiError> {
    records.iter().map(Param::from_record).collect()
}

/// `name(type1,type2)`
fn canonical_signature(name: &str, params: &[Param]) -> String {
    let types: Vec<String> = params.iter().map(|p| p.kind.to_string()).collect();
    format!("{}({})", name, types.join(","))
}

/// Whether and how a function touches state and value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    /// Reads nothing
    Pure,
    /// Reads state
    View,
    /// Writes state, rejects value
    #[default]
    NonPayable,
    /// Writes state, accepts value
    Payable,
}

impl StateMutability {
    /// Resolve from `stateMutability`, falling back to the legacy
    /// `constant`/`payable` flags
    pub fn resolve(
        state_mutability: Option<&str>,
        constant: Option<bool>,
        payable: Option<bool>,
    ) -> Result<Self, AbiError> {
        if let Some(s) = state_mutability {
            return s.parse();
        }
        Ok(if payable == Some(true) {
            StateMutability::Payable
        } else if constant == Some(true) {
            StateMutability::View
        } else {
            StateMutability::NonPayable
        })
    }

    /// `view` or `pure`
    pub fn is_constant(&self) -> bool {
        matches!(self, StateMutability::View | StateMutability::Pure)
    }

    /// Accepts value
    pub fn is_payable(&self) -> bool {
        matches!(self, StateMutability::Payable)
    }
}

impl std::str::FromStr for StateMutability {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pure" => Ok(StateMutability::Pure),
            "view" => Ok(StateMutability::View),
            "nonpayable" => Ok(StateMutability::NonPayable),
            "payable" => Ok(StateMutability::Payable),
            other => Err(AbiError::InvalidAbi(format!("unknown stateMutability `{}`", other))),
        }
    }
}

/// Contract function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// Function name
    pub name: String,
    /// Input parameters
    pub inputs: Vec<Param>,
    /// Output parameters
    pub outputs: Vec<Param>,
    /// Mutability
    pub state_mutability: StateMutability,
}

impl Function {
    /// Create a non-payable function
    pub fn new(name: impl Into<String>, inputs: Vec<Param>, outputs: Vec<Param>) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
            state_mutability: StateMutability::NonPayable,
        }
    }

    /// Canonical signature, e.g. `transfer(address,uint256)`
    pub fn signature(&self) -> String {
        canonical_signature(&self.name, &self.inputs)
    }

    /// First 4 bytes of the signature hash
    pub fn selector(&self) -> [u8; 4] {
        vela_crypto::selector(&self.signature())
    }

    /// Selector as `0x`-prefixed hex
    pub fn method_id(&self) -> String {
        format!("0x{}", hex::encode(self.selector()))
    }

    /// `view`/`pure`, or legacy `constant: true`
    pub fn constant(&self) -> bool {
        self.state_mutability.is_constant()
    }

    /// Accepts value
    pub fn payable(&self) -> bool {
        self.state_mutability.is_payable()
    }

    /// Selector followed by the encoded arguments
    pub fn encode_call(&self, tokens: &[Token]) -> Result<Vec<u8>, AbiError> {
        let mut data = self.selector().to_vec();
        data.extend(encode_params(&self.inputs, tokens)?);
        Ok(data)
    }

    /// Decode calldata produced by [`Function::encode_call`]
    pub fn decode_input(&self, data: &[u8]) -> Result<DecodedParams, AbiError> {
        self.decode_input_with(&AbiDecoder::default(), data)
    }

    /// Decode calldata with explicit decoder settings
    pub fn decode_input_with(&self, decoder: &AbiDecoder, data: &[u8]) -> Result<DecodedParams, AbiError> {
        if data.len() < 4 {
            return Err(AbiError::truncated(4, data.len()));
        }
        let (selector, body) = data.split_at(4);
        let expected = self.selector();
        if selector != expected {
            return Err(AbiError::SelectorMismatch {
                expected: hex::encode(expected),
                got: hex::encode(selector),
            });
        }
        decoder.decode_params(&self.inputs, body)
    }
}

/// Contract constructor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Constructor {
    /// Constructor arguments
    pub inputs: Vec<Param>,
    /// Mutability
    pub state_mutability: StateMutability,
}

impl Constructor {
    /// Encode constructor arguments (no selector)
    pub fn encode_args(&self, tokens: &[Token]) -> Result<Vec<u8>, AbiError> {
        encode_params(&self.inputs, tokens)
    }

    /// Creation code followed by the encoded arguments
    pub fn encode_deploy(&self, bytecode: &[u8], tokens: &[Token]) -> Result<Vec<u8>, AbiError> {
        let mut data = bytecode.to_vec();
        data.extend(self.encode_args(tokens)?);
        Ok(data)
    }

    /// Decode constructor arguments
    pub fn decode_input(&self, data: &[u8]) -> Result<DecodedParams, AbiError> {
        AbiDecoder::default().decode_params(&self.inputs, data)
    }

    /// Accepts value
    pub fn payable(&self) -> bool {
        self.state_mutability.is_payable()
    }
}

/// Fallback function
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fallback {
    /// Mutability
    pub state_mutability: StateMutability,
}

impl Fallback {
    /// Accepts value
    pub fn payable(&self) -> bool {
        self.state_mutability.is_payable()
    }
}

/// Receive function; always payable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Receive;

/// Contract event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event name
    pub name: String,
    /// Fields, indexed ones marked
    pub inputs: Vec<Param>,
    /// Anonymous events carry no signature topic
    pub anonymous: bool,
}

impl Event {
    /// Canonical signature, e.g. `Transfer(address,address,uint256)`
    pub fn signature(&self) -> String {
        canonical_signature(&self.name, &self.inputs)
    }

    /// Signature hash, emitted as `topics[0]`
    pub fn topic(&self) -> H256 {
        vela_crypto::keccak256(self.signature().as_bytes())
    }

    /// Decode a log's topics and data into the event fields
    pub fn decode_log(&self, topics: &[H256], data: &[u8]) -> Result<DecodedParams, AbiError> {
        self.decode_log_with(&AbiDecoder::default(), topics, data)
    }

    /// Decode a log with explicit decoder settings.
    ///
    /// Indexed one-word values are decoded from their topic. Indexed strings,
    /// bytes, arrays and tuples are stored hashed, so the raw topic comes back
    /// as `FixedBytes(32)`.
    pub fn decode_log_with(
        &self,
        decoder: &AbiDecoder,
        topics: &[H256],
        data: &[u8],
    ) -> Result<DecodedParams, AbiError> {
        let indexed_topics = if self.anonymous {
            topics
        } else {
            match topics.split_first() {
                Some((first, rest)) if *first == self.topic() => rest,
                _ => return Err(AbiError::EventMismatch(self.signature())),
            }
        };

        let indexed_count = self.inputs.iter().filter(|p| p.indexed).count();
        if indexed_count != indexed_topics.len() {
            return Err(AbiError::EventMismatch(format!(
                "{}: expected {} indexed topics, got {}",
                self.signature(),
                indexed_count,
                indexed_topics.len()
            )));
        }

        let body_params: Vec<Param> = self.inputs.iter().filter(|p| !p.indexed).cloned().collect();
        let mut body = decoder.decode_params(&body_params, data)?.into_tokens().into_iter();
        let mut indexed = indexed_topics.iter();

        let mut tokens = Vec::with_capacity(self.inputs.len());
        for param in &self.inputs {
            let token = if param.indexed {
                let topic = indexed.next().ok_or_else(|| AbiError::EventMismatch(self.signature()))?;
                if is_hashed_when_indexed(&param.kind) {
                    Token::FixedBytes(topic.as_bytes().to_vec())
                } else {
                    let mut decoded = decoder.decode(std::slice::from_ref(&param.kind), topic.as_bytes())?;
                    decoded.pop().ok_or_else(|| AbiError::EventMismatch(self.signature()))?
                }
            } else {
                body.next().ok_or_else(|| AbiError::EventMismatch(self.signature()))?
            };
            tokens.push(token);
        }

        Ok(DecodedParams::from_tokens(&self.inputs, tokens))
    }
}

fn is_hashed_when_indexed(kind: &ParamType) -> bool {
    kind.is_dynamic() || kind.is_array() || kind.is_tuple()
}

/// Custom error declared with `error Name(...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomError {
    /// Error name
    pub name: String,
    /// Error fields
    pub inputs: Vec<Param>,
}

impl CustomError {
    /// Human-readable form with parameter names, e.g. `Unauthorized(address caller)`
    pub fn declaration(&self) -> String {
        let params: Vec<String> = self.inputs.iter().map(|p| p.to_string()).collect();
        format!("{}({})", self.name, params.join(","))
    }

    /// Canonical signature, e.g. `Unauthorized(address)`
    pub fn signature(&self) -> String {
        canonical_signature(&self.name, &self.inputs)
    }

    /// First 4 bytes of the signature hash
    pub fn selector(&self) -> [u8; 4] {
        vela_crypto::selector(&self.signature())
    }
}

/// One entry of a JSON ABI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// `type: "function"` (the default)
    Function(Function),
    /// `type: "constructor"`
    Constructor(Constructor),
    /// `type: "fallback"`
    Fallback(Fallback),
    /// `type: "receive"`
    Receive(Receive),
    /// `type: "event"`
    Event(Event),
    /// `type: "error"`
    Error(CustomError),
}

impl Element {
    /// Parse a single JSON ABI record
    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        let entry: AbiEntry = serde_json::from_str(json)?;
        Element::try_from(&entry)
    }

    /// Declared name, if the element kind has one
    pub fn name(&self) -> Option<&str> {
        match self {
            Element::Function(f) => Some(&f.name),
            Element::Event(e) => Some(&e.name),
            Element::Error(e) => Some(&e.name),
            Element::Constructor(_) | Element::Fallback(_) | Element::Receive(_) => None,
        }
    }
}

fn required_name(entry: &AbiEntry) -> Result<String, AbiError> {
    match entry.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(AbiError::InvalidAbi(format!("`{}` entry without a name", entry.kind))),
    }
}

impl TryFrom<&AbiEntry> for Element {
    type Error = AbiError;

    fn try_from(entry: &AbiEntry) -> Result<Self, AbiError> {
        let mutability = || {
            StateMutability::resolve(entry.state_mutability.as_deref(), entry.constant, entry.payable)
        };

        let element = match entry.kind.as_str() {
            "function" => Element::Function(Function {
                name: required_name(entry)?,
                inputs: params_from_records(&entry.inputs)?,
                outputs: params_from_records(&entry.outputs)?,
                state_mutability: mutability()?,
            }),
            "constructor" => Element::Constructor(Constructor {
                inputs: params_from_records(&entry.inputs)?,
                state_mutability: mutability()?,
            }),
            "fallback" => Element::Fallback(Fallback {
                state_mutability: mutability()?,
            }),
            "receive" => Element::Receive(Receive),
            "event" => Element::Event(Event {
                name: required_name(entry)?,
                inputs: params_from_records(&entry.inputs)?,
                anonymous: entry.anonymous,
            }),
            "error" => Element::Error(CustomError {
                name: required_name(entry)?,
                inputs: params_from_records(&entry.inputs)?,
            }),
            other => {
                return Err(AbiError::InvalidAbi(format!("unknown element type `{}`", other)));
            }
        };
        Ok(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vela_primitives::{Address, U256};

    fn transfer_event() -> Event {
        Event {
            name: "Transfer".to_string(),
            inputs: vec![
                Param::indexed("from", ParamType::Address),
                Param::indexed("to", ParamType::Address),
                Param::new("value", ParamType::Uint(256)),
            ],
            anonymous: false,
        }
    }

    // ==================== Params ====================

    #[test]
    fn test_param_name_trimmed() {
        assert_eq!(Param::new("  owner ", ParamType::Address).name, "owner");
    }

    #[test]
    fn test_param_components() {
        let record: AbiParam = serde_json::from_str(
            r#"{"name":"orders","type":"tuple[]","components":[
                {"name":"maker","type":"address"},
                {"name":"amounts","type":"uint256[2]"}
            ]}"#,
        )
        .unwrap();
        let param = Param::from_record(&record).unwrap();
        assert_eq!(param.kind.to_string(), "(address,uint256[2])[]");
    }

    #[test]
    fn test_tuple_without_components() {
        let record: AbiParam = serde_json::from_str(r#"{"name":"s","type":"tuple"}"#).unwrap();
        assert!(matches!(Param::from_record(&record), Err(AbiError::InvalidAbi(_))));
    }

    #[test]
    fn test_components_count_toward_size_limit() {
        // each part passes on its own, the patched tree does not
        let record: AbiParam = serde_json::from_str(
            r#"{"name":"grid","type":"tuple[100000]","components":[
                {"name":"row","type":"uint256[1000]"}
            ]}"#,
        )
        .unwrap();
        assert!(matches!(Param::from_record(&record), Err(AbiError::InvalidType(_))));
    }

    // ==================== Functions ====================

    #[test]
    fn test_function_from_json() {
        let element = Element::from_json(
            r#"{"name":"transfer","type":"function",
                "inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],
                "outputs":[{"name":"","type":"bool"}],
                "stateMutability":"nonpayable"}"#,
        )
        .unwrap();
        let Element::Function(function) = element else {
            panic!("Expected function");
        };
        assert_eq!(function.signature(), "transfer(address,uint256)");
        assert_eq!(function.method_id(), "0xa9059cbb");
        assert!(!function.constant());
        assert!(!function.payable());
    }

    #[test]
    fn test_type_defaults_to_function() {
        let element = Element::from_json(r#"{"name":"totalSupply","constant":true}"#).unwrap();
        match element {
            Element::Function(f) => {
                assert!(f.constant());
                assert_eq!(f.state_mutability, StateMutability::View);
            }
            other => panic!("Expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_legacy_payable_flag() {
        let element = Element::from_json(r#"{"name":"deposit","payable":true}"#).unwrap();
        let Element::Function(f) = element else {
            panic!("Expected function");
        };
        assert!(f.payable());
        assert!(!f.constant());
    }

    #[test]
    fn test_unknown_element_type() {
        assert!(matches!(
            Element::from_json(r#"{"type":"modifier","name":"onlyOwner"}"#),
            Err(AbiError::InvalidAbi(_))
        ));
        assert!(matches!(
            Element::from_json(r#"{"type":"function","name":"f","stateMutability":"mutable"}"#),
            Err(AbiError::InvalidAbi(_))
        ));
    }

    #[test]
    fn test_function_input_round_trip() {
        let function = Function::new(
            "transfer",
            vec![
                Param::new("to", ParamType::Address),
                Param::new("amount", ParamType::Uint(256)),
            ],
            vec![Param::new("", ParamType::Bool)],
        );
        let to = Address::from_bytes([0x42; 20]);
        let data = function
            .encode_call(&[Token::Address(to), Token::Uint(U256::from(1000))])
            .unwrap();
        assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(data.len(), 68);

        let decoded = function.decode_input(&data).unwrap();
        assert_eq!(decoded.by_name("to"), Some(&Token::Address(to)));
        assert_eq!(decoded.by_name("amount"), Some(&Token::Uint(U256::from(1000))));
    }

    #[test]
    fn test_decode_input_selector_mismatch() {
        let function = Function::new("f", vec![], vec![]);
        match function.decode_input(&[0, 0, 0, 0]) {
            Err(AbiError::SelectorMismatch { got, .. }) => assert_eq!(got, "00000000"),
            other => panic!("Expected SelectorMismatch, got {:?}", other),
        }
        assert!(matches!(
            function.decode_input(&[0x26]),
            Err(AbiError::TruncatedData { needed: 4, available: 1 })
        ));
    }

    // ==================== Constructor ====================

    #[test]
    fn test_constructor_deploy() {
        let constructor = Constructor {
            inputs: vec![Param::new("supply", ParamType::Uint(256))],
            state_mutability: StateMutability::NonPayable,
        };
        let data = constructor.encode_deploy(&[0x60, 0x80], &[Token::from(5u64)]).unwrap();
        assert_eq!(data.len(), 34);
        assert_eq!(&data[..2], &[0x60, 0x80]);
        assert_eq!(constructor.decode_input(&data[2..]).unwrap()[0], Token::from(5u64));
    }

    // ==================== Events ====================

    #[test]
    fn test_event_topic() {
        assert_eq!(
            transfer_event().topic().to_hex(),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn test_decode_transfer_log() {
        let event = transfer_event();
        let from = Address::from_bytes([0x11; 20]);
        let to = Address::from_bytes([0x22; 20]);
        let topics = vec![
            event.topic(),
            H256::from_bytes(from.to_word()),
            H256::from_bytes(to.to_word()),
        ];
        let mut data = [0u8; 32];
        data[31] = 0x64;

        let decoded = event.decode_log(&topics, &data).unwrap();
        assert_eq!(decoded.by_name("from"), Some(&Token::Address(from)));
        assert_eq!(decoded.by_name("to"), Some(&Token::Address(to)));
        assert_eq!(decoded.by_name("value"), Some(&Token::Uint(U256::from(100))));
    }

    #[test]
    fn test_indexed_dynamic_value_is_hash() {
        let event = Event {
            name: "Named".to_string(),
            inputs: vec![Param::indexed("label", ParamType::String)],
            anonymous: false,
        };
        let hash = vela_crypto::keccak256(b"alice");
        let decoded = event.decode_log(&[event.topic(), hash], &[]).unwrap();
        assert_eq!(decoded[0], Token::FixedBytes(hash.as_bytes().to_vec()));
    }

    #[test]
    fn test_event_mismatch() {
        let event = transfer_event();
        assert!(matches!(
            event.decode_log(&[H256::ZERO], &[0u8; 32]),
            Err(AbiError::EventMismatch(_))
        ));
        assert!(matches!(
            event.decode_log(&[event.topic()], &[0u8; 32]),
            Err(AbiError::EventMismatch(_))
        ));
    }

    #[test]
    fn test_anonymous_event_has_no_signature_topic() {
        let event = Event {
            name: "Ping".to_string(),
            inputs: vec![Param::indexed("id", ParamType::Uint(64))],
            anonymous: true,
        };
        let mut word = [0u8; 32];
        word[31] = 9;
        let decoded = event.decode_log(&[H256::from_bytes(word)], &[]).unwrap();
        assert_eq!(decoded.by_name("id"), Some(&Token::from(9u64)));
    }

    // ==================== Errors ====================

    #[test]
    fn test_custom_error_declaration() {
        let error = CustomError {
            name: "InsufficientBalance".to_string(),
            inputs: vec![
                Param::new("available", ParamType::Uint(256)),
                Param::new("", ParamType::Address),
            ],
        };
        assert_eq!(error.declaration(), "InsufficientBalance(uint256 available,address)");
        assert_eq!(error.signature(), "InsufficientBalance(uint256,address)");
        assert_eq!(
            error.selector(),
            vela_crypto::selector("InsufficientBalance(uint256,address)")
        );
    }

    #[test]
    fn test_element_names() {
        let element = Element::from_json(r#"{"type":"error","name":"Paused","inputs":[]}"#).unwrap();
        assert_eq!(element.name(), Some("Paused"));
        let element = Element::from_json(r#"{"type":"receive","stateMutability":"payable"}"#).unwrap();
        assert_eq!(element, Element::Receive(Receive));
        assert!(matches!(
            Element::from_json(r#"{"type":"event","inputs":[]}"#),
            Err(AbiError::InvalidAbi(_))
        ));
    }
}
