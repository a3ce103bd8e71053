//! JSON ABI documents

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use vela_primitives::H256;

use super::element::{Constructor, CustomError, Element, Event, Fallback, Function, Receive};
use super::error::AbiError;

/// Raw JSON ABI entry as emitted by solc
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiEntry {
    /// Element kind; solc omitted it for functions in early versions
    #[serde(rename = "type", default = "default_entry_type")]
    pub kind: String,
    /// Element name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Inputs
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    /// Outputs (functions only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<AbiParam>,
    /// `pure`, `view`, `nonpayable` or `payable`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<String>,
    /// Legacy mutability flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<bool>,
    /// Legacy mutability flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payable: Option<bool>,
    /// Anonymous event
    #[serde(default)]
    pub anonymous: bool,
}

fn default_entry_type() -> String {
    "function".to_string()
}

/// Raw JSON ABI parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiParam {
    /// Parameter name
    #[serde(default)]
    pub name: String,
    /// Type string, `tuple` based for structs
    #[serde(rename = "type")]
    pub kind: String,
    /// Indexed event field
    #[serde(default)]
    pub indexed: bool,
    /// Struct members for `tuple` types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<AbiParam>>,
    /// Source-level type name, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_type: Option<String>,
}

/// A parsed contract ABI
#[derive(Debug, Clone, Default)]
pub struct Abi {
    constructor: Constructor,
    fallback: Option<Fallback>,
    receive: Option<Receive>,
    functions: Vec<Function>,
    events: Vec<Event>,
    errors: Vec<CustomError>,
    /// name, signature and `0x` selector -> positions in `functions`
    function_index: HashMap<String, Vec<usize>>,
}

impl Abi {
    /// Parse a JSON ABI array
    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        let entries: Vec<AbiEntry> = serde_json::from_str(json)?;
        let elements = entries
            .iter()
            .map(Element::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_elements(elements)
    }

    /// Assemble from already-parsed elements
    pub fn from_elements(elements: Vec<Element>) -> Result<Self, AbiError> {
        let mut abi = Abi::default();
        let mut has_constructor = false;

        for element in elements {
            match element {
                Element::Function(function) => abi.push_function(function)?,
                Element::Constructor(constructor) => {
                    if has_constructor {
                        return Err(AbiError::InvalidAbi("more than one constructor".to_string()));
                    }
                    has_constructor = true;
                    abi.constructor = constructor;
                }
                Element::Fallback(fallback) => abi.fallback = Some(fallback),
                Element::Receive(receive) => abi.receive = Some(receive),
                Element::Event(event) => abi.events.push(event),
                Element::Error(error) => abi.errors.push(error),
            }
        }
        Ok(abi)
    }

    fn push_function(&mut self, function: Function) -> Result<(), AbiError> {
        let signature = function.signature();
        if self.function_index.contains_key(&signature) {
            return Err(AbiError::InvalidAbi(format!("duplicate function {}", signature)));
        }
        let position = self.functions.len();
        for key in [function.name.clone(), signature, function.method_id()] {
            self.function_index.entry(key).or_default().push(position);
        }
        self.functions.push(function);
        Ok(())
    }

    /// Constructor, or the implicit no-argument one
    pub fn constructor(&self) -> &Constructor {
        &self.constructor
    }

    /// Fallback function, if declared
    pub fn fallback(&self) -> Option<&Fallback> {
        self.fallback.as_ref()
    }

    /// Receive function, if declared
    pub fn receive(&self) -> Option<&Receive> {
        self.receive.as_ref()
    }

    /// All functions in declaration order
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// Functions matching a name, canonical signature or `0x` selector.
    ///
    /// A name shared by overloads yields several entries.
    pub fn function(&self, key: &str) -> Vec<&Function> {
        self.function_index
            .get(key.trim())
            .map(|positions| positions.iter().map(|i| &self.functions[*i]).collect())
            .unwrap_or_default()
    }

    /// Function whose selector starts `calldata`
    pub fn function_by_selector(&self, selector: [u8; 4]) -> Option<&Function> {
        self.function(&format!("0x{}", hex::encode(selector))).into_iter().next()
    }

    /// All events in declaration order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Event by name or canonical signature
    pub fn event(&self, key: &str) -> Vec<&Event> {
        let key = key.trim();
        self.events
            .iter()
            .filter(|e| e.name == key || e.signature() == key)
            .collect()
    }

    /// Non-anonymous event whose signature hash is `topic`
    pub fn event_by_topic(&self, topic: &H256) -> Option<&Event> {
        self.events
            .iter()
            .find(|e| !e.anonymous && e.topic() == *topic)
    }

    /// All custom errors in declaration order
    pub fn errors(&self) -> &[CustomError] {
        &self.errors
    }

    /// Custom errors keyed by selector
    pub fn errors_by_selector(&self) -> HashMap<[u8; 4], &CustomError> {
        self.errors.iter().map(|e| (e.selector(), e)).collect()
    }
}
