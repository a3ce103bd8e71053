//! Contract interaction helpers

use bytes::Bytes;
use tracing::debug;
use vela_primitives::{Address, H256};

use crate::abi::{
    Abi, AbiDecoder, AbiError, CallOutcome, CustomError, DecodedParams, Element, Event, Function,
    Token,
};
use crate::config::CodecConfig;
use crate::SdkError;

/// A deployed contract: an address bound to its ABI
#[derive(Debug, Clone)]
pub struct Contract {
    /// Contract address
    address: Address,
    /// Parsed ABI
    abi: Abi,
    /// Settings for every decode
    decoder: AbiDecoder,
}

impl Contract {
    /// Create a new contract helper
    pub fn new(address: Address, abi: Abi) -> Self {
        Self {
            address,
            abi,
            decoder: AbiDecoder::default(),
        }
    }

    /// Parse an address (checksum enforced when mixed-case) and a JSON ABI
    pub fn from_json(address: &str, abi_json: &str) -> Result<Self, SdkError> {
        let address = vela_crypto::parse_checksummed(address)?;
        let abi = Abi::from_json(abi_json)?;
        Ok(Self::new(address, abi))
    }

    /// Replace the decoder settings
    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.decoder = AbiDecoder::with_config(config);
        self
    }

    /// Get the contract address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Get the parsed ABI
    pub fn abi(&self) -> &Abi {
        &self.abi
    }

    /// Find a function by name, signature or `0x` selector.
    ///
    /// A bare name shared by overloads is ambiguous; use the signature.
    pub fn function(&self, key: &str) -> Result<&Function, SdkError> {
        let mut candidates = self.abi.function(key);
        debug!(key, matches = candidates.len(), "function lookup");
        match candidates.len() {
            0 => Err(SdkError::UnknownFunction(key.to_string())),
            1 => Ok(candidates.remove(0)),
            _ => Err(SdkError::AmbiguousFunction {
                name: key.to_string(),
                candidates: candidates.iter().map(|f| f.signature()).collect(),
            }),
        }
    }

    /// Find an event by name or signature
    pub fn event(&self, key: &str) -> Result<&Event, SdkError> {
        let mut candidates = self.abi.event(key);
        match candidates.len() {
            1 => Ok(candidates.remove(0)),
            _ => Err(SdkError::UnknownEvent(key.to_string())),
        }
    }

    /// Encode a function call
    pub fn encode_call(&self, function: &str, args: &[Token]) -> Result<Bytes, SdkError> {
        let function = self.function(function)?;
        Ok(Bytes::from(function.encode_call(args)?))
    }

    /// Creation code followed by the encoded constructor arguments
    pub fn encode_deploy(&self, bytecode: &[u8], args: &[Token]) -> Result<Bytes, SdkError> {
        Ok(Bytes::from(self.abi.constructor().encode_deploy(bytecode, args)?))
    }

    /// Decode function output, recognising reverts and the ABI's custom errors
    pub fn decode_output(&self, function: &str, data: &[u8]) -> Result<CallOutcome, SdkError> {
        let function = self.function(function)?;
        let errors: &[CustomError] = self.abi.errors();
        Ok(function.decode_output_with(&self.decoder, data, errors)?)
    }

    /// Decode function output given as hex, as returned by `eth_call`
    pub fn decode_output_hex(&self, function: &str, data: &str) -> Result<CallOutcome, SdkError> {
        let data = data.trim();
        let data = hex::decode(data.strip_prefix("0x").unwrap_or(data))?;
        self.decode_output(function, &data)
    }

    /// Decode calldata, resolving the function from its selector
    pub fn decode_input(&self, data: &[u8]) -> Result<(&Function, DecodedParams), SdkError> {
        let selector: [u8; 4] = data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or(AbiError::truncated(4, data.len()))?;
        let function = self
            .abi
            .function_by_selector(selector)
            .ok_or_else(|| SdkError::UnknownFunction(format!("0x{}", hex::encode(selector))))?;
        debug!(function = %function.signature(), "decoding calldata");
        let params = function.decode_input_with(&self.decoder, data)?;
        Ok((function, params))
    }

    /// Decode a log, resolving the event from `topics[0]`
    pub fn decode_log(&self, topics: &[H256], data: &[u8]) -> Result<(&Event, DecodedParams), SdkError> {
        let topic = topics
            .first()
            .ok_or_else(|| SdkError::UnknownEvent("log without topics".to_string()))?;
        let event = self
            .abi
            .event_by_topic(topic)
            .ok_or_else(|| SdkError::UnknownEvent(topic.to_hex()))?;
        debug!(event = %event.signature(), "decoding log");
        let params = event.decode_log_with(&self.decoder, topics, data)?;
        Ok((event, params))
    }
}

/// Builder for contracts whose ABI is assembled in code
pub struct ContractBuilder {
    address: Address,
    elements: Vec<Element>,
}

impl ContractBuilder {
    /// Create a new contract builder
    pub fn new(address: Address) -> Self {
        Self {
            address,
            elements: Vec::new(),
        }
    }

    /// Add a function
    pub fn function(mut self, function: Function) -> Self {
        self.elements.push(Element::Function(function));
        self
    }

    /// Add an event
    pub fn event(mut self, event: Event) -> Self {
        self.elements.push(Element::Event(event));
        self
    }

    /// Add a custom error
    pub fn error(mut self, error: CustomError) -> Self {
        self.elements.push(Element::Error(error));
        self
    }

    /// Build the contract; fails on duplicate function signatures
    pub fn build(self) -> Result<Contract, SdkError> {
        let abi = Abi::from_elements(self.elements)?;
        Ok(Contract::new(self.address, abi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{Param, ParamType};
    use vela_primitives::U256;

    fn token_contract() -> Contract {
        let addr = Address::from_hex("0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d").unwrap();
        ContractBuilder::new(addr)
            .function(Function::new(
                "balanceOf",
                vec![Param::new("owner", ParamType::Address)],
                vec![Param::new("", ParamType::Uint(256))],
            ))
            .function(Function::new(
                "transfer",
                vec![
                    Param::new("to", ParamType::Address),
                    Param::new("amount", ParamType::Uint(256)),
                ],
                vec![Param::new("", ParamType::Bool)],
            ))
            .function(Function::new(
                "transfer",
                vec![Param::new("to", ParamType::Address)],
                vec![],
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn test_contract_encode_call() {
        let contract = token_contract();
        let to = Address::from_hex("0x1234567890123456789012345678901234567890").unwrap();

        let data = contract
            .encode_call(
                "transfer(address,uint256)",
                &[Token::Address(to), Token::Uint(U256::from(1000))],
            )
            .unwrap();

        assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(data.len(), 68); // 4 + 32 + 32
    }

    #[test]
    fn test_contract_encode_balance_of() {
        let contract = token_contract();
        let owner = Address::from_hex("0x1234567890123456789012345678901234567890").unwrap();

        let data = contract.encode_call("balanceOf", &[Token::Address(owner)]).unwrap();
        assert_eq!(&data[..4], &[0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(data.len(), 36); // 4 + 32
    }

    #[test]
    fn test_contract_decode_output() {
        let contract = token_contract();
        let mut data = [0u8; 32];
        data[31] = 100;

        let outcome = contract.decode_output("balanceOf", &data).unwrap();
        assert_eq!(outcome.outputs()[0], Token::Uint(U256::from(100)));

        let outcome = contract
            .decode_output_hex("balanceOf", &format!("0x{}", hex::encode(data)))
            .unwrap();
        assert!(outcome.is_success());
        assert!(matches!(
            contract.decode_output_hex("balanceOf", "0xzz"),
            Err(SdkError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_contract_unknown_function() {
        let contract = token_contract();
        assert!(matches!(
            contract.encode_call("unknown", &[]),
            Err(SdkError::UnknownFunction(_))
        ));
    }

    #[test]
    fn test_contract_ambiguous_overload() {
        let contract = token_contract();
        match contract.function("transfer") {
            Err(SdkError::AmbiguousFunction { candidates, .. }) => {
                assert_eq!(candidates.len(), 2);
                assert!(candidates.contains(&"transfer(address)".to_string()));
            }
            other => panic!("Expected AmbiguousFunction, got {:?}", other),
        }
        assert!(contract.function("0xa9059cbb").is_ok());
    }

    #[test]
    fn test_contract_wrong_arg_count() {
        let contract = token_contract();
        let result = contract.encode_call("balanceOf", &[]);
        assert!(matches!(
            result,
            Err(SdkError::Abi(AbiError::ArityMismatch { expected: 1, got: 0 }))
        ));
    }

    #[test]
    fn test_contract_decode_input() {
        let contract = token_contract();
        let owner = Address::from_bytes([7; 20]);
        let data = contract.encode_call("balanceOf", &[Token::Address(owner)]).unwrap();

        let (function, params) = contract.decode_input(&data).unwrap();
        assert_eq!(function.name, "balanceOf");
        assert_eq!(params.by_name("owner"), Some(&Token::Address(owner)));

        assert!(matches!(
            contract.decode_input(&[1, 2, 3, 4]),
            Err(SdkError::UnknownFunction(_))
        ));
        assert!(matches!(
            contract.decode_input(&[1, 2]),
            Err(SdkError::Abi(AbiError::TruncatedData { .. }))
        ));
    }

    #[test]
    fn test_contract_builder_rejects_duplicates() {
        let f = Function::new("f", vec![], vec![]);
        let result = ContractBuilder::new(Address::ZERO)
            .function(f.clone())
            .function(f)
            .build();
        assert!(matches!(result, Err(SdkError::Abi(AbiError::InvalidAbi(_)))));
    }

    #[test]
    fn test_contract_from_json_checks_address() {
        let result = Contract::from_json("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD", "[]");
        assert!(matches!(result, Err(SdkError::InvalidAddress(_))));

        let contract = Contract::from_json("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed", "[]").unwrap();
        assert_eq!(contract.address().to_hex(), "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed");
    }
}
