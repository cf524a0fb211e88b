//! Input widget selection for function parameters

use super::function::ParameterSpec;
use super::integer::IntegerVariant;

/// The input widget used for a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Address,
    Bytes32,
    Bytes,
    Integer(IntegerVariant),
    /// Plain text; also the fallback for arrays, tuples, bools and anything unknown
    Text,
}

impl WidgetKind {
    /// Whether the widget offers a conversion action on its current value
    pub fn has_conversion(&self) -> bool {
        matches!(
            self,
            WidgetKind::Bytes32 | WidgetKind::Bytes | WidgetKind::Integer(_)
        )
    }
}

/// Pick the widget for a parameter. The order of checks matters and every
/// declared type resolves to some widget.
pub fn classify(param: &ParameterSpec) -> WidgetKind {
    match param.declared_type.as_str() {
        "address" => WidgetKind::Address,
        "bytes32" => WidgetKind::Bytes32,
        "bytes" => WidgetKind::Bytes,
        "string" => WidgetKind::Text,
        ty if ty.contains("int") && !ty.contains('[') => ty
            .parse::<IntegerVariant>()
            .map(WidgetKind::Integer)
            .unwrap_or(WidgetKind::Text),
        _ => WidgetKind::Text,
    }
}

/// Placeholder shown in an empty field
pub fn placeholder(param: &ParameterSpec) -> String {
    match &param.name {
        Some(name) => format!("{} {}", param.declared_type, name),
        None => param.declared_type.clone(),
    }
}

fn is_hex(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .map_or(false, |rest| rest.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// Toggle a bytes32 field between hex and text: hex decodes to a string with
/// trailing zero padding removed, text encodes to 32 right-padded bytes
pub fn convert_bytes32(value: &str) -> Result<String, String> {
    if value.is_empty() {
        return Ok(String::new());
    }
    if is_hex(value) {
        let bytes = hex::decode(&value[2..]).map_err(|e| format!("invalid hex: {e}"))?;
        if bytes.len() > 32 {
            return Err(format!("{} bytes exceed bytes32", bytes.len()));
        }
        let end = bytes.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
        return Ok(String::from_utf8_lossy(&bytes[..end]).into_owned());
    }
    let bytes = value.as_bytes();
    if bytes.len() > 32 {
        return Err(format!("{} bytes exceed bytes32", bytes.len()));
    }
    let mut padded = [0u8; 32];
    padded[..bytes.len()].copy_from_slice(bytes);
    Ok(format!("0x{}", hex::encode(padded)))
}

/// Toggle a bytes field between hex and its UTF-8 text
pub fn convert_bytes(value: &str) -> Result<String, String> {
    if value.is_empty() {
        return Ok(String::new());
    }
    if is_hex(value) {
        let bytes = hex::decode(&value[2..]).map_err(|e| format!("invalid hex: {e}"))?;
        return Ok(String::from_utf8_lossy(&bytes).into_owned());
    }
    Ok(format!("0x{}", hex::encode(value.as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(ty: &str) -> WidgetKind {
        classify(&ParameterSpec::new(Some("p"), ty, ty))
    }

    #[test]
    fn test_exact_matches_win() {
        assert_eq!(kind("address"), WidgetKind::Address);
        assert_eq!(kind("bytes32"), WidgetKind::Bytes32);
        assert_eq!(kind("bytes"), WidgetKind::Bytes);
        assert_eq!(kind("string"), WidgetKind::Text);
    }

    #[test]
    fn test_integer_widgets() {
        assert_eq!(
            kind("uint8"),
            WidgetKind::Integer(IntegerVariant::new(false, 8).unwrap())
        );
        assert_eq!(
            kind("int256"),
            WidgetKind::Integer(IntegerVariant::new(true, 256).unwrap())
        );
    }

    #[test]
    fn test_fallback_to_text() {
        assert_eq!(kind("uint256[]"), WidgetKind::Text);
        assert_eq!(kind("int8[3]"), WidgetKind::Text);
        assert_eq!(kind("tuple"), WidgetKind::Text);
        assert_eq!(kind("bool"), WidgetKind::Text);
        assert_eq!(kind("address[]"), WidgetKind::Text);
        assert_eq!(kind("bytes4"), WidgetKind::Text);
        assert_eq!(kind("mint_price"), WidgetKind::Text);
        assert_eq!(kind(""), WidgetKind::Text);
    }

    #[test]
    fn test_placeholder() {
        assert_eq!(
            placeholder(&ParameterSpec::new(Some("amount"), "uint256", "uint256")),
            "uint256 amount"
        );
        assert_eq!(
            placeholder(&ParameterSpec::new(None, "address", "address")),
            "address"
        );
    }

    #[test]
    fn test_bytes32_conversion() {
        let hex = convert_bytes32("hello").unwrap();
        assert_eq!(hex.len(), 66);
        assert!(hex.starts_with("0x68656c6c6f00"));
        assert_eq!(convert_bytes32(&hex).unwrap(), "hello");
        assert!(convert_bytes32(&"x".repeat(33)).is_err());
    }

    #[test]
    fn test_bytes_conversion() {
        assert_eq!(convert_bytes("hi").unwrap(), "0x6869");
        assert_eq!(convert_bytes("0x6869").unwrap(), "hi");
        assert!(convert_bytes("0x686").is_err());
    }
}
