//! Contract functions and their parameters, as the forms see them

use alloy_json_abi::{Function, JsonAbi, Param, StateMutability};

use crate::domain::form::FieldKey;

/// One function parameter from ABI metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    /// Parameter name, `None` when the ABI leaves it empty
    pub name: Option<String>,
    /// ABI type (e.g. "uint256", "tuple", "address[]")
    pub declared_type: String,
    /// Compiler type (e.g. "struct Vault.Position", "contract IERC20")
    pub internal_type: String,
}

impl ParameterSpec {
    pub fn new(name: Option<&str>, declared_type: &str, internal_type: &str) -> Self {
        Self {
            name: name.filter(|n| !n.is_empty()).map(str::to_string),
            declared_type: declared_type.to_string(),
            internal_type: internal_type.to_string(),
        }
    }
}

impl From<&Param> for ParameterSpec {
    fn from(param: &Param) -> Self {
        let internal_type = param
            .internal_type
            .as_ref()
            .map(|ty| ty.to_string())
            .unwrap_or_else(|| param.ty.clone());
        ParameterSpec::new(Some(param.name.as_str()), &param.ty, &internal_type)
    }
}

/// Which panel a function belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FunctionKind {
    /// view/pure with inputs
    Read,
    /// view/pure without inputs, shown as contract variables
    Variable,
    /// nonpayable/payable
    Write,
}

impl FunctionKind {
    pub fn of(function: &Function) -> Self {
        match function.state_mutability {
            StateMutability::View | StateMutability::Pure => {
                if function.inputs.is_empty() {
                    FunctionKind::Variable
                } else {
                    FunctionKind::Read
                }
            }
            StateMutability::NonPayable | StateMutability::Payable => FunctionKind::Write,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            FunctionKind::Read => "Read",
            FunctionKind::Variable => "Variables",
            FunctionKind::Write => "Write",
        }
    }
}

/// A function together with its derived form parameters
#[derive(Debug, Clone)]
pub struct FunctionSpec {
    pub function: Function,
    pub inputs: Vec<ParameterSpec>,
    pub kind: FunctionKind,
}

impl FunctionSpec {
    pub fn new(function: Function) -> Self {
        let inputs = function.inputs.iter().map(ParameterSpec::from).collect();
        let kind = FunctionKind::of(&function);
        Self {
            function,
            inputs,
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// Full signature, unique even across overloads
    pub fn id(&self) -> String {
        self.function.signature()
    }

    pub fn is_payable(&self) -> bool {
        self.function.state_mutability == StateMutability::Payable
    }

    /// Form keys in declaration order
    pub fn field_keys(&self) -> Vec<FieldKey> {
        self.inputs
            .iter()
            .enumerate()
            .map(|(index, param)| FieldKey::derive(self.name(), param, index))
            .collect()
    }
}

/// A contract's functions split into the three panels
#[derive(Debug, Clone, Default)]
pub struct ContractFunctions {
    pub read: Vec<FunctionSpec>,
    pub variables: Vec<FunctionSpec>,
    pub write: Vec<FunctionSpec>,
}

impl ContractFunctions {
    pub fn partition(abi: &JsonAbi) -> Self {
        let mut functions = Self::default();
        for function in abi.functions() {
            let spec = FunctionSpec::new(function.clone());
            match spec.kind {
                FunctionKind::Read => functions.read.push(spec),
                FunctionKind::Variable => functions.variables.push(spec),
                FunctionKind::Write => functions.write.push(spec),
            }
        }
        functions
    }

    /// Functions shown as forms (reads then writes)
    pub fn forms(&self) -> impl Iterator<Item = &FunctionSpec> {
        self.read.iter().chain(self.write.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.read.is_empty() && self.variables.is_empty() && self.write.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABI: &str = r#"[
        {"type":"function","name":"greeting","inputs":[],"outputs":[{"name":"","type":"string","internalType":"string"}],"stateMutability":"view"},
        {"type":"function","name":"balanceOf","inputs":[{"name":"owner","type":"address","internalType":"address"}],"outputs":[{"name":"","type":"uint256","internalType":"uint256"}],"stateMutability":"view"},
        {"type":"function","name":"setGreeting","inputs":[{"name":"_newGreeting","type":"string","internalType":"string"}],"outputs":[],"stateMutability":"payable"},
        {"type":"function","name":"withdraw","inputs":[],"outputs":[],"stateMutability":"nonpayable"},
        {"type":"function","name":"double","inputs":[{"name":"x","type":"uint8","internalType":"uint8"}],"outputs":[{"name":"","type":"uint16","internalType":"uint16"}],"stateMutability":"pure"},
        {"type":"event","name":"GreetingChange","inputs":[{"name":"setter","type":"address","indexed":true,"internalType":"address"}],"anonymous":false}
    ]"#;

    #[test]
    fn test_partition_by_mutability() {
        let abi: JsonAbi = serde_json::from_str(ABI).unwrap();
        let functions = ContractFunctions::partition(&abi);

        let names = |specs: &[FunctionSpec]| {
            let mut names: Vec<_> = specs.iter().map(|s| s.name().to_string()).collect();
            names.sort();
            names
        };
        assert_eq!(names(&functions.read), vec!["balanceOf", "double"]);
        assert_eq!(names(&functions.variables), vec!["greeting"]);
        assert_eq!(names(&functions.write), vec!["setGreeting", "withdraw"]);
        assert_eq!(functions.forms().count(), 4);
    }

    #[test]
    fn test_parameter_spec_from_abi() {
        let abi: JsonAbi = serde_json::from_str(ABI).unwrap();
        let function = abi.function("balanceOf").unwrap().first().unwrap();
        let spec = FunctionSpec::new(function.clone());
        assert_eq!(
            spec.inputs,
            vec![ParameterSpec::new(Some("owner"), "address", "address")]
        );
        assert_eq!(spec.id(), "balanceOf(address)");
        assert!(!spec.is_payable());
    }

    #[test]
    fn test_empty_name_is_none() {
        let param = ParameterSpec::new(Some(""), "uint256", "uint256");
        assert_eq!(param.name, None);
    }
}
