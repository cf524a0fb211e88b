//! Bytecode view: hex dump and opcode listing

use revm::bytecode::opcode::OpCode;

/// One instruction per entry, PUSH data inline (`PUSH1 0x80`). A PUSH cut
/// off by the end of the code shows the bytes that remain.
pub fn disassemble(code: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    let mut pc = 0;
    while pc < code.len() {
        let op = code[pc];
        pc += 1;
        match OpCode::new(op).map(|opcode| opcode.as_str()) {
            Some(name) if (0x60..=0x7f).contains(&op) => {
                let size = (op - 0x5f) as usize;
                let end = (pc + size).min(code.len());
                out.push(format!("{} 0x{}", name, hex::encode(&code[pc..end])));
                pc = end;
            }
            Some(name) => out.push(name.to_string()),
            None => out.push(format!("0x{:02x}", op)),
        }
    }
    out
}

/// Summary line for the code tab
pub fn describe(code: &[u8]) -> String {
    if code.is_empty() {
        "not a contract".to_string()
    } else {
        format!("{} bytes", code.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disassemble_prologue() {
        let code = hex::decode("6080604052348015600e575f80fd5b").unwrap();
        assert_eq!(
            disassemble(&code),
            vec![
                "PUSH1 0x80", "PUSH1 0x40", "MSTORE", "CALLVALUE", "DUP1", "ISZERO",
                "PUSH1 0x0e", "JUMPI", "PUSH0", "DUP1", "REVERT", "JUMPDEST",
            ]
        );
    }

    #[test]
    fn test_truncated_push_and_unknown_opcode() {
        assert_eq!(disassemble(&[0x0c, 0x61, 0xaa]), vec!["0x0c", "PUSH2 0xaa"]);
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(&[]), "not a contract");
        assert_eq!(describe(&[0x00, 0x01]), "2 bytes");
    }
}
