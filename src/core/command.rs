//! Command parser for the : command system

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // Navigation
    Debug,
    Explorer,
    Contract(String),
    Address(String),
    Search(String),

    // Local chain
    Faucet { to: String, amount: String },

    // Display
    Price(f64),
    ToggleUsd,

    // Connection
    Endpoint(usize),
    Refresh,

    Quit,

    // Unknown command
    Unknown(String),
}

/// Parse a command string (without the leading :)
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    let mut parts = input.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let args = parts
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    match cmd.to_lowercase().as_str() {
        // Navigation
        "debug" | "dbg" => Command::Debug,
        "explorer" | "exp" => Command::Explorer,
        "contract" | "c" => match args {
            Some(name) => Command::Contract(name),
            None => Command::Unknown(input.to_string()),
        },
        "address" | "addr" => match args {
            Some(addr) => Command::Address(addr),
            None => Command::Unknown(input.to_string()),
        },
        "search" | "s" | "tx" => match args {
            Some(query) => Command::Search(query),
            None => Command::Unknown(input.to_string()),
        },

        // Local chain
        "faucet" => {
            let words: Vec<&str> = args.as_deref().unwrap_or("").split_whitespace().collect();
            match words.as_slice() {
                [to, amount] => Command::Faucet {
                    to: to.to_string(),
                    amount: amount.to_string(),
                },
                _ => Command::Unknown(input.to_string()),
            }
        }

        // Display
        "price" => match args.and_then(|s| s.trim_start_matches('$').parse::<f64>().ok()) {
            Some(price) if price.is_finite() && price >= 0.0 => Command::Price(price),
            _ => Command::Unknown(input.to_string()),
        },
        "usd" => Command::ToggleUsd,

        // Connection
        "endpoint" | "ep" => match args.and_then(|s| s.parse::<usize>().ok()) {
            Some(n) if n > 0 => Command::Endpoint(n - 1),
            _ => Command::Unknown(input.to_string()),
        },
        "refresh" | "r" => Command::Refresh,

        "quit" | "q" => Command::Quit,

        _ => Command::Unknown(input.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_navigation_commands() {
        assert_eq!(parse_command("debug"), Command::Debug);
        assert_eq!(parse_command("exp"), Command::Explorer);
        assert_eq!(
            parse_command("contract YourContract"),
            Command::Contract("YourContract".to_string())
        );
        assert_eq!(
            parse_command("address 0x1234"),
            Command::Address("0x1234".to_string())
        );
        assert_eq!(parse_command("tx 0xabcd"), Command::Search("0xabcd".to_string()));
        assert_eq!(parse_command("contract"), Command::Unknown("contract".to_string()));
    }

    #[test]
    fn test_parse_faucet() {
        assert_eq!(
            parse_command("faucet 0x01 0.5"),
            Command::Faucet {
                to: "0x01".to_string(),
                amount: "0.5".to_string()
            }
        );
        assert_eq!(
            parse_command("faucet 0x01"),
            Command::Unknown("faucet 0x01".to_string())
        );
    }

    #[test]
    fn test_parse_display_commands() {
        assert_eq!(parse_command("price 2500.5"), Command::Price(2500.5));
        assert_eq!(parse_command("price $3000"), Command::Price(3000.0));
        assert_eq!(parse_command("price -1"), Command::Unknown("price -1".to_string()));
        assert_eq!(parse_command("USD"), Command::ToggleUsd);
    }

    #[test]
    fn test_parse_connection_commands() {
        assert_eq!(parse_command("endpoint 2"), Command::Endpoint(1));
        assert_eq!(parse_command("ep 0"), Command::Unknown("ep 0".to_string()));
        assert_eq!(parse_command("r"), Command::Refresh);
        assert_eq!(parse_command("q"), Command::Quit);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            parse_command("notacommand"),
            Command::Unknown("notacommand".to_string())
        );
    }
}
