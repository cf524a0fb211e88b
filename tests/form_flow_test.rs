//! Contracts file to calldata, and results back into forms, through the app

use alloy::primitives::{Address, U256};
use alloy_dyn_abi::DynSolValue;

use scaffold::app::{App, InputMode, Slot, StatusLevel};
use scaffold::core::{AppContext, LOCAL_CHAIN_ID};
use scaffold::domain::abi::{parse_contracts_file, ContractCodeStatus, DeployedContract};
use scaffold::domain::display::{CallValue, DisplayResult};
use scaffold::domain::form::{FieldValue, FormState};
use scaffold::infrastructure::{RuntimeCommand, RuntimeEvent};
use scaffold::modules::calls;

const CONTRACTS: &str = r#"{
  "31337": [{
    "name": "localhost",
    "chainId": "31337",
    "contracts": {
      "YourContract": {
        "address": "0x5FbDB2315678afecb367f032d93F642f64180aa3",
        "abi": [
          {"type":"function","name":"greeting","inputs":[],"outputs":[{"name":"","type":"string"}],"stateMutability":"view"},
          {"type":"function","name":"balanceOf","inputs":[{"name":"owner","type":"address","internalType":"address"}],"outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"},
          {"type":"function","name":"setGreeting","inputs":[{"name":"_newGreeting","type":"string","internalType":"string"}],"outputs":[],"stateMutability":"nonpayable"},
          {"type":"function","name":"deposit","inputs":[],"outputs":[],"stateMutability":"payable"}
        ]
      }
    }
  }]
}"#;

const OWNER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

fn contracts() -> Vec<DeployedContract> {
    parse_contracts_file(CONTRACTS, LOCAL_CHAIN_ID).unwrap()
}

fn connected_app() -> App {
    let mut app = App::new(AppContext::default());
    app.load_contracts(contracts());
    app.apply_event(RuntimeEvent::Connected {
        endpoint: "http://localhost:8545".into(),
        chain_id: LOCAL_CHAIN_ID,
        node_kind: "anvil".into(),
        accounts: vec![OWNER.parse().unwrap()],
    });
    app
}

fn type_text(app: &mut App, text: &str) {
    app.input_mode = InputMode::Edit;
    for c in text.chars() {
        app.insert_char(c);
    }
    app.input_mode = InputMode::Normal;
}

#[test]
fn test_contracts_file_to_calldata() {
    let contracts = contracts();
    assert_eq!(contracts.len(), 1);
    let functions = contracts[0].functions();
    assert_eq!(functions.variables.len(), 1);
    assert_eq!(functions.read.len(), 1);
    assert_eq!(functions.write.len(), 2);

    let balance_of = &functions.read[0];
    let mut form = FormState::for_function(balance_of);
    let key = balance_of.field_keys()[0].clone();
    form.update(&key, FieldValue::from(OWNER));

    let calldata = calls::build_calldata(balance_of, &form).unwrap();
    assert_eq!(&calldata[..4], &[0x70, 0xa0, 0x82, 0x31]);
    assert_eq!(calldata.len(), 36);
}

#[test]
fn test_connect_checks_deployments_and_reads_variables() {
    let mut app = connected_app();
    let commands = app.take_commands();

    assert!(commands
        .iter()
        .any(|cmd| matches!(cmd, RuntimeCommand::CheckDeployments { contracts } if contracts.len() == 1)));
    assert!(commands.iter().any(
        |cmd| matches!(cmd, RuntimeCommand::ReadCall { function_id, .. } if function_id == "greeting()")
    ));

    app.apply_event(RuntimeEvent::DeploymentChecked {
        statuses: vec![("YourContract".to_string(), ContractCodeStatus::Deployed)],
    });
    assert_eq!(app.contracts[0].status, ContractCodeStatus::Deployed);

    let values = vec![DynSolValue::String("Building Unstoppable Apps!!!".into())];
    let value = CallValue::from_outputs(&values);
    app.apply_event(RuntimeEvent::CallResult {
        function_id: "greeting()".into(),
        outcome: Ok((values, value)),
    });
    let greeting = app.contracts[0].functions.variables[0].clone();
    let shown = app.function_output(&greeting).unwrap().to_string();
    assert!(shown.contains("Building Unstoppable Apps!!!"));
}

#[test]
fn test_read_form_submit_and_populate() {
    let mut app = connected_app();
    app.take_commands();

    // balanceOf(address) is the first focus row
    assert_eq!(app.focused_row().map(|row| row.slot), Some(Slot::Field(0)));
    type_text(&mut app, OWNER);
    app.submit_focused();

    let commands = app.take_commands();
    let Some(RuntimeCommand::ReadCall {
        function_id,
        calldata,
        ..
    }) = commands.into_iter().next()
    else {
        panic!("expected a read call");
    };
    assert_eq!(function_id, "balanceOf(address)");
    assert_eq!(calldata.len(), 36);

    let values = vec![DynSolValue::Uint(U256::from(1000u64), 256)];
    let value = CallValue::from_outputs(&values);
    app.apply_event(RuntimeEvent::CallResult {
        function_id: function_id.clone(),
        outcome: Ok((values, value)),
    });
    let balance_of = app.focused_function().unwrap().clone();
    assert_eq!(app.function_output(&balance_of), Some(DisplayResult::Number(1000)));

    app.populate_focused();
    let (text, _) = app.field_text(&balance_of, Slot::Field(0));
    assert_eq!(text, "1000");
}

#[test]
fn test_write_form_sends_from_first_account() {
    let mut app = connected_app();
    app.take_commands();

    // rows: balanceOf.owner, deposit value, setGreeting._newGreeting
    app.move_focus(true);
    app.move_focus(true);
    type_text(&mut app, "hello");
    app.submit_focused();

    let commands = app.take_commands();
    let Some(RuntimeCommand::WriteCall {
        function_id,
        request,
    }) = commands.into_iter().next()
    else {
        panic!("expected a write call");
    };
    assert_eq!(function_id, "setGreeting(string)");
    assert_eq!(request.from, Some(OWNER.parse::<Address>().unwrap()));
}

#[test]
fn test_payable_value_must_be_wei() {
    let mut app = connected_app();
    app.take_commands();

    app.move_focus(true);
    assert_eq!(app.focused_row().map(|row| row.slot), Some(Slot::Value));
    type_text(&mut app, "1.5");
    app.dismiss_status();
    app.submit_focused();

    assert!(app.take_commands().is_empty());
    assert_eq!(app.status.map(|status| status.level), Some(StatusLevel::Error));
}
