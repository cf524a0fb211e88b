use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use alloy::primitives::{Address, Bytes, U256};
use alloy_dyn_abi::DynSolValue;
use chrono::{DateTime, Local};

use crate::core::{Action, AppContext, Command, NotifyLevel, LOCAL_CHAIN_ID};
use crate::domain::abi::{
    classify, convert_bytes, convert_bytes32, is_valid_integer, multiply_by_1e18,
    ContractCodeStatus, ContractFunctions, DeployedContract, FunctionKind, FunctionSpec,
    IntegerVariant, WidgetKind,
};
use crate::domain::display::{render, CallValue, DisplayResult};
use crate::domain::form::{field_status, FieldStatus, FieldValue, FormState};
use crate::infrastructure::ethereum::{LogEntry, TxSummary};
use crate::infrastructure::{RuntimeCommand, RuntimeEvent, TxOrigin};
use crate::modules::blocks::{TransactionsPage, NOT_LOCALHOST};
use crate::modules::calls;
use crate::modules::ether::{accept_amount_input, display_to_ether, ether_to_display};
use crate::modules::faucet;
use crate::modules::search::SearchOutcome;
use crate::modules::storage::StorageSlot;
use crate::modules::transactor::TxPhase;

/// Main tabs in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Debug,
    Explorer,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Debug, Tab::Explorer];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Debug => "Debug Contracts",
            Tab::Explorer => "Explorer",
        }
    }

    pub fn shortcut(&self) -> char {
        match self {
            Tab::Debug => '1',
            Tab::Explorer => '2',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Command,
    /// Typing into the focused form field
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

impl From<NotifyLevel> for StatusLevel {
    fn from(level: NotifyLevel) -> Self {
        match level {
            NotifyLevel::Info => StatusLevel::Info,
            NotifyLevel::Warn => StatusLevel::Warn,
            NotifyLevel::Error => StatusLevel::Error,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct CommandBar {
    pub input: String,
    pub last: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    pub since: Instant,
    pub at: DateTime<Local>,
}

/// A deployed contract and its forms
#[derive(Debug, Clone)]
pub struct ContractEntry {
    pub contract: DeployedContract,
    pub functions: ContractFunctions,
    pub status: ContractCodeStatus,
}

impl ContractEntry {
    pub fn new(contract: DeployedContract) -> Self {
        let functions = contract.functions();
        Self {
            contract,
            functions,
            status: ContractCodeStatus::Loading,
        }
    }

    /// Read forms followed by write forms
    pub fn form(&self, index: usize) -> Option<&FunctionSpec> {
        self.functions.forms().nth(index)
    }
}

/// Last read of a view function
#[derive(Debug, Clone)]
pub enum ReadState {
    Loading,
    Ready {
        values: Vec<DynSolValue>,
        value: CallValue,
    },
    Failed(String),
}

/// What a focus row points at inside a form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Field(usize),
    /// Wei sent with a payable function
    Value,
    /// A write with nothing to fill in
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusRow {
    pub function: usize,
    pub slot: Slot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressTab {
    Code,
    Storage,
    Logs,
}

impl AddressTab {
    pub const ALL: [AddressTab; 3] = [AddressTab::Code, AddressTab::Storage, AddressTab::Logs];

    pub fn title(&self) -> &'static str {
        match self {
            AddressTab::Code => "Code",
            AddressTab::Storage => "Storage",
            AddressTab::Logs => "Logs",
        }
    }

    fn next(self) -> Self {
        match self {
            AddressTab::Code => AddressTab::Storage,
            AddressTab::Storage => AddressTab::Logs,
            AddressTab::Logs => AddressTab::Code,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AddressView {
    pub address: Address,
    pub watch_id: u64,
    pub balance: Option<U256>,
    pub code: Option<Bytes>,
    pub storage: Option<Result<Vec<StorageSlot>, String>>,
    pub logs: Vec<LogEntry>,
    pub tab: AddressTab,
    /// Show the opcode listing instead of raw hex
    pub disassemble: bool,
}

#[derive(Debug, Clone)]
pub enum ExplorerView {
    Empty,
    Address(AddressView),
    Transaction(TxSummary),
}

/// Recent transactions on the explorer home page
#[derive(Debug, Clone, Default)]
pub struct RecentTransactions {
    /// Page requested last
    pub page: u64,
    pub loading: bool,
    pub loaded: Option<TransactionsPage>,
    pub error: Option<String>,
    pub selected: usize,
}

#[derive(Debug)]
pub struct App {
    pub ctx: AppContext,
    pub current_tab: Tab,
    pub input_mode: InputMode,
    pub command: CommandBar,

    pub contracts: Vec<ContractEntry>,
    pub selected_contract: usize,
    pub focus: usize,
    /// Form values by function id
    pub forms: BTreeMap<String, FormState>,
    /// Payable value text by function id
    pub values: BTreeMap<String, String>,
    pub reads: BTreeMap<String, ReadState>,
    pub txs: BTreeMap<String, TxPhase>,
    /// Decoded values of the most recent successful read
    pub last_result: Option<Vec<DynSolValue>>,

    pub explorer: ExplorerView,
    pub recent: RecentTransactions,
    pub search_error: Option<&'static str>,
    pub faucet_phase: Option<TxPhase>,
    pub usd_mode: bool,

    pub head: Option<u64>,
    /// Persistent connection problem, cleared on reconnect
    pub banner: Option<String>,
    pub status: Option<StatusMessage>,
    pub rpc_endpoints: Vec<String>,
    pub help_open: bool,
    pub should_quit: bool,
    next_watch_id: u64,
    outbox: Vec<RuntimeCommand>,
}

impl Default for App {
    fn default() -> Self {
        Self::new(AppContext::default())
    }
}

impl App {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            current_tab: Tab::Debug,
            input_mode: InputMode::Normal,
            command: CommandBar::default(),
            contracts: Vec::new(),
            selected_contract: 0,
            focus: 0,
            forms: BTreeMap::new(),
            values: BTreeMap::new(),
            reads: BTreeMap::new(),
            txs: BTreeMap::new(),
            last_result: None,
            explorer: ExplorerView::Empty,
            recent: RecentTransactions::default(),
            search_error: None,
            faucet_phase: None,
            usd_mode: false,
            head: None,
            banner: None,
            status: None,
            rpc_endpoints: Vec::new(),
            help_open: false,
            should_quit: false,
            next_watch_id: 0,
            outbox: Vec::new(),
        }
    }

    // ----- status -----

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
            since: Instant::now(),
            at: Local::now(),
        });
    }

    pub fn status_text(&self) -> Option<(&str, StatusLevel)> {
        self.status
            .as_ref()
            .map(|status| (status.text.as_str(), status.level))
    }

    /// Errors stay until dismissed
    pub fn dismiss_status(&mut self) {
        self.status = None;
    }

    pub fn on_tick(&mut self) {
        if let Some(status) = self.status.as_ref() {
            if status.level != StatusLevel::Error && status.since.elapsed() > Duration::from_secs(3)
            {
                self.status = None;
            }
        }
    }

    /// Commands queued for the runtime since the last call
    pub fn take_commands(&mut self) -> Vec<RuntimeCommand> {
        std::mem::take(&mut self.outbox)
    }

    // ----- contracts and forms -----

    pub fn load_contracts(&mut self, contracts: Vec<DeployedContract>) {
        self.contracts = contracts.into_iter().map(ContractEntry::new).collect();
        self.select_contract(0);
        if self.ctx.is_connected() {
            self.check_deployments();
        }
    }

    pub fn current_contract(&self) -> Option<&ContractEntry> {
        self.contracts.get(self.selected_contract)
    }

    pub fn select_contract(&mut self, index: usize) {
        self.selected_contract = index.min(self.contracts.len().saturating_sub(1));
        self.focus = 0;
        self.forms.clear();
        self.values.clear();
        self.reads.clear();
        self.txs.clear();
        if let Some(entry) = self.contracts.get(self.selected_contract) {
            for function in entry.functions.forms() {
                self.forms
                    .insert(function.id(), FormState::for_function(function));
            }
        }
        self.read_variables();
    }

    pub fn select_contract_by_name(&mut self, name: &str) -> bool {
        match self
            .contracts
            .iter()
            .position(|entry| entry.contract.name.eq_ignore_ascii_case(name))
        {
            Some(index) => {
                self.select_contract(index);
                true
            }
            None => false,
        }
    }

    pub fn cycle_contract(&mut self, forward: bool) {
        let len = self.contracts.len();
        if len < 2 {
            return;
        }
        let next = if forward {
            (self.selected_contract + 1) % len
        } else {
            (self.selected_contract + len - 1) % len
        };
        self.select_contract(next);
    }

    fn check_deployments(&mut self) {
        if self.contracts.is_empty() {
            return;
        }
        for entry in &mut self.contracts {
            entry.status = ContractCodeStatus::Loading;
        }
        let contracts = self.contracts.iter().map(|e| e.contract.clone()).collect();
        self.outbox
            .push(RuntimeCommand::CheckDeployments { contracts });
    }

    /// Read every zero-argument view function of the selected contract
    pub fn read_variables(&mut self) {
        if !self.ctx.is_connected() {
            return;
        }
        let Some(entry) = self.contracts.get(self.selected_contract) else {
            return;
        };
        let to = entry.contract.address;
        let mut queued = Vec::new();
        for function in &entry.functions.variables {
            match calls::build_calldata(function, &FormState::for_function(function)) {
                Ok(calldata) => queued.push((function.id(), function.function.clone(), calldata)),
                Err(err) => tracing::warn!(function = %function.id(), "cannot encode: {err}"),
            }
        }
        for (function_id, function, calldata) in queued {
            self.reads.insert(function_id.clone(), ReadState::Loading);
            self.outbox.push(RuntimeCommand::ReadCall {
                function_id,
                function,
                to,
                calldata,
            });
        }
    }

    /// Focusable rows of the selected contract's forms
    pub fn focus_rows(&self) -> Vec<FocusRow> {
        let Some(entry) = self.current_contract() else {
            return Vec::new();
        };
        let mut rows = Vec::new();
        for (index, function) in entry.functions.forms().enumerate() {
            for field in 0..function.inputs.len() {
                rows.push(FocusRow {
                    function: index,
                    slot: Slot::Field(field),
                });
            }
            if function.is_payable() {
                rows.push(FocusRow {
                    function: index,
                    slot: Slot::Value,
                });
            }
            if function.inputs.is_empty() && !function.is_payable() {
                rows.push(FocusRow {
                    function: index,
                    slot: Slot::Submit,
                });
            }
        }
        rows
    }

    pub fn focused_row(&self) -> Option<FocusRow> {
        self.focus_rows().get(self.focus).copied()
    }

    pub fn focused_function(&self) -> Option<&FunctionSpec> {
        let row = self.focused_row()?;
        self.current_contract()?.form(row.function)
    }

    pub fn move_focus(&mut self, down: bool) {
        let len = self.focus_rows().len();
        if len == 0 {
            self.focus = 0;
            return;
        }
        self.focus = if down {
            (self.focus + 1).min(len - 1)
        } else {
            self.focus.saturating_sub(1)
        };
    }

    /// Text and validity of the focused field
    pub fn field_text(&self, function: &FunctionSpec, slot: Slot) -> (String, FieldStatus) {
        let id = function.id();
        match slot {
            Slot::Field(index) => {
                let key = &function.field_keys()[index];
                let value = self
                    .forms
                    .get(&id)
                    .and_then(|form| form.get(key))
                    .cloned()
                    .unwrap_or_else(FieldValue::empty);
                let status = field_status(&function.inputs[index], &value);
                (value.to_string(), status)
            }
            Slot::Value => {
                let text = self.values.get(&id).cloned().unwrap_or_default();
                let status = if is_valid_integer(IntegerVariant::UINT256, &text, false) {
                    FieldStatus::Ok
                } else {
                    FieldStatus::Invalid
                };
                (text, status)
            }
            Slot::Submit => (String::new(), FieldStatus::Ok),
        }
    }

    fn edit_focused(&mut self, f: impl FnOnce(&WidgetKind, &FieldValue) -> Option<FieldValue>) {
        let Some(row) = self.focused_row() else {
            return;
        };
        let Some(function) = self.focused_function().cloned() else {
            return;
        };
        let id = function.id();
        match row.slot {
            Slot::Field(index) => {
                let key = function.field_keys()[index].clone();
                let widget = classify(&function.inputs[index]);
                let form = self
                    .forms
                    .entry(id.clone())
                    .or_insert_with(|| FormState::for_function(&function));
                let current = form.get(&key).cloned().unwrap_or_else(FieldValue::empty);
                match f(&widget, &current) {
                    Some(next) => form.update(&key, next),
                    None => return,
                }
            }
            Slot::Value => {
                let current = FieldValue::Text(self.values.get(&id).cloned().unwrap_or_default());
                let widget = WidgetKind::Integer(IntegerVariant::UINT256);
                match f(&widget, &current) {
                    Some(next) => {
                        self.values.insert(id.clone(), next.to_string());
                    }
                    None => return,
                }
            }
            Slot::Submit => return,
        }
        // A new edit hides the previous receipt
        if self.txs.get(&id).is_some_and(TxPhase::is_terminal) {
            self.txs.remove(&id);
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.edit_focused(|_, current| {
            let mut text = current.to_string();
            text.push(c);
            Some(FieldValue::Text(text))
        });
    }

    pub fn backspace(&mut self) {
        self.edit_focused(|_, current| {
            let mut text = current.to_string();
            text.pop();
            Some(FieldValue::Text(text))
        });
    }

    /// Integer fields: multiply the typed amount by 10^18
    pub fn scale_focused(&mut self) {
        let mut failed = false;
        self.edit_focused(|widget, current| {
            if !matches!(widget, WidgetKind::Integer(_)) {
                return None;
            }
            let scaled = multiply_by_1e18(&current.to_string());
            failed = scaled.is_none();
            scaled.map(FieldValue::Integer)
        });
        if failed {
            self.set_status("Not a number", StatusLevel::Warn);
        }
    }

    /// Bytes fields: turn typed text into hex
    pub fn convert_focused(&mut self) {
        let mut error = None;
        self.edit_focused(|widget, current| {
            let converted = match widget {
                WidgetKind::Bytes32 => convert_bytes32(&current.to_string()),
                WidgetKind::Bytes => convert_bytes(&current.to_string()),
                _ => return None,
            };
            match converted {
                Ok(hex) => Some(FieldValue::Text(hex)),
                Err(message) => {
                    error = Some(message);
                    None
                }
            }
        });
        if let Some(message) = error {
            self.set_status(message, StatusLevel::Warn);
        }
    }

    /// Fill the focused form from the last read result
    pub fn populate_focused(&mut self) {
        let Some(function) = self.focused_function().cloned() else {
            return;
        };
        let Some(values) = self.last_result.clone() else {
            self.set_status("No result to copy from", StatusLevel::Warn);
            return;
        };
        if values.len() != function.inputs.len() {
            self.set_status(
                format!(
                    "{} takes {} arguments, result has {}",
                    function.name(),
                    function.inputs.len(),
                    values.len()
                ),
                StatusLevel::Warn,
            );
            return;
        }
        self.forms
            .entry(function.id())
            .or_default()
            .populate(&function, &values);
    }

    /// Submit the form of the focused function
    pub fn submit_focused(&mut self) {
        if let Some(row) = self.focused_row() {
            self.submit_function(row.function);
        }
    }

    pub fn submit_function(&mut self, index: usize) {
        let Some(entry) = self.current_contract() else {
            return;
        };
        let Some(function) = entry.form(index).cloned() else {
            return;
        };
        let to = entry.contract.address;
        let id = function.id();
        let form = self
            .forms
            .get(&id)
            .cloned()
            .unwrap_or_else(|| FormState::for_function(&function));
        let calldata = match calls::build_calldata(&function, &form) {
            Ok(calldata) => calldata,
            Err(err) => {
                self.set_status(err.to_string(), StatusLevel::Error);
                return;
            }
        };

        match function.kind {
            FunctionKind::Read | FunctionKind::Variable => {
                self.reads.insert(id.clone(), ReadState::Loading);
                self.outbox.push(RuntimeCommand::ReadCall {
                    function_id: id,
                    function: function.function,
                    to,
                    calldata,
                });
            }
            FunctionKind::Write => {
                if self.txs.get(&id).is_some_and(TxPhase::is_pending) {
                    self.set_status("Transaction already pending", StatusLevel::Warn);
                    return;
                }
                let value = if function.is_payable() {
                    let text = self.values.get(&id).cloned().unwrap_or_default();
                    match calls::parse_value(&text) {
                        Ok(value) => value,
                        Err(err) => {
                            self.set_status(err.to_string(), StatusLevel::Error);
                            return;
                        }
                    }
                } else {
                    U256::ZERO
                };
                let request = calls::write_request(self.ctx.sender(), to, calldata, value);
                self.txs.insert(id.clone(), TxPhase::Idle);
                self.outbox.push(RuntimeCommand::WriteCall {
                    function_id: id,
                    request,
                });
            }
        }
    }

    /// What to show under a function
    pub fn function_output(&self, function: &FunctionSpec) -> Option<DisplayResult> {
        let id = function.id();
        if let Some(phase) = self.txs.get(&id) {
            return Some(match phase {
                TxPhase::Completed(receipt) => render(&CallValue::from(receipt), false),
                phase => DisplayResult::Text(phase.to_string()),
            });
        }
        match self.reads.get(&id)? {
            ReadState::Loading => Some(DisplayResult::Text("…".to_string())),
            ReadState::Ready { value, .. } => Some(render(value, false)),
            ReadState::Failed(message) => Some(DisplayResult::Text(format!("error: {message}"))),
        }
    }

    // ----- explorer -----

    pub fn open_address(&mut self, address: Address) {
        self.next_watch_id += 1;
        let watch_id = self.next_watch_id;
        self.explorer = ExplorerView::Address(AddressView {
            address,
            watch_id,
            balance: None,
            code: None,
            storage: None,
            logs: Vec::new(),
            tab: AddressTab::Code,
            disassemble: false,
        });
        self.search_error = None;
        self.current_tab = Tab::Explorer;
        self.outbox
            .push(RuntimeCommand::OpenAddress { watch_id, address });
    }

    pub fn close_explorer(&mut self) {
        if matches!(self.explorer, ExplorerView::Address(_)) {
            self.outbox.push(RuntimeCommand::CloseAddress);
        }
        self.explorer = ExplorerView::Empty;
    }

    pub fn cycle_address_tab(&mut self) {
        if let ExplorerView::Address(view) = &mut self.explorer {
            view.tab = view.tab.next();
        }
    }

    pub fn toggle_disassembly(&mut self) {
        if let ExplorerView::Address(view) = &mut self.explorer {
            view.disassemble = !view.disassemble;
        }
    }

    fn address_view(&mut self, watch_id: u64) -> Option<&mut AddressView> {
        match &mut self.explorer {
            ExplorerView::Address(view) if view.watch_id == watch_id => Some(view),
            _ => None,
        }
    }

    /// Switch to the explorer, loading the transactions page the first time
    pub fn show_explorer(&mut self) {
        self.current_tab = Tab::Explorer;
        if self.recent.loaded.is_none() && !self.recent.loading {
            self.load_transactions(self.recent.page);
        }
    }

    /// Why the home page shows no transactions at all
    pub fn explorer_notice(&self) -> Option<&'static str> {
        (self.ctx.target_chain_id != LOCAL_CHAIN_ID).then_some(NOT_LOCALHOST)
    }

    pub fn load_transactions(&mut self, page: u64) {
        if self.explorer_notice().is_some() || !self.ctx.is_connected() {
            return;
        }
        self.recent.page = page;
        self.recent.loading = true;
        self.outbox.push(RuntimeCommand::FetchTransactions { page });
    }

    /// Next or previous page, within the loaded page's bounds
    pub fn change_page(&mut self, forward: bool) {
        let Some(loaded) = &self.recent.loaded else {
            return;
        };
        let page = match forward {
            true if loaded.has_next() => loaded.page + 1,
            false if loaded.has_prev() => loaded.page - 1,
            _ => return,
        };
        self.recent.selected = 0;
        self.load_transactions(page);
    }

    pub fn move_transaction_selection(&mut self, down: bool) {
        let len = self.recent.loaded.as_ref().map_or(0, |page| page.rows.len());
        if len == 0 {
            return;
        }
        self.recent.selected = if down {
            (self.recent.selected + 1).min(len - 1)
        } else {
            self.recent.selected.saturating_sub(1)
        };
    }

    pub fn open_selected_transaction(&mut self) {
        let Some(row) = self
            .recent
            .loaded
            .as_ref()
            .and_then(|page| page.rows.get(self.recent.selected))
        else {
            return;
        };
        let tx = row.tx.clone();
        self.close_explorer();
        self.explorer = ExplorerView::Transaction(tx);
    }

    pub fn search(&mut self, query: String) {
        self.search_error = None;
        self.current_tab = Tab::Explorer;
        self.outbox.push(RuntimeCommand::Search { query });
    }

    pub fn toggle_usd(&mut self) {
        if !self.ctx.has_price() {
            self.set_status("No native currency price set (:price <usd>)", StatusLevel::Warn);
            return;
        }
        self.usd_mode = !self.usd_mode;
    }

    pub fn usd_price(&self) -> Option<f64> {
        (self.usd_mode && self.ctx.has_price()).then_some(self.ctx.native_currency_price)
    }

    fn send_faucet(&mut self, to: String, amount: String) {
        if !faucet::is_available(&self.ctx) {
            self.set_status("Faucet is only available on the local chain", StatusLevel::Warn);
            return;
        }
        if self.faucet_phase.as_ref().is_some_and(TxPhase::is_pending) {
            self.set_status("Faucet transaction already pending", StatusLevel::Warn);
            return;
        }
        if !accept_amount_input(self.usd_mode, &amount) {
            self.set_status(format!("'{amount}' is not an amount"), StatusLevel::Warn);
            return;
        }
        let price = self.ctx.native_currency_price;
        let ether = display_to_ether(self.usd_mode, &amount, price);
        self.faucet_phase = Some(TxPhase::Idle);
        let shown = if self.usd_mode {
            format!("{ether} ETH (${})", ether_to_display(true, &ether, price))
        } else {
            format!("{ether} ETH")
        };
        self.set_status(format!("Sending {shown} to {to}"), StatusLevel::Info);
        self.outbox.push(RuntimeCommand::Faucet { to, amount: ether });
    }

    // ----- commands -----

    pub fn enter_command(&mut self) {
        self.input_mode = InputMode::Command;
        self.command.input.clear();
    }

    pub fn exit_command(&mut self) {
        self.input_mode = InputMode::Normal;
        self.command.input.clear();
    }

    pub fn refresh(&mut self) {
        self.outbox.push(RuntimeCommand::Refresh);
        if self.ctx.is_connected() {
            self.check_deployments();
            self.read_variables();
        }
        self.set_status("Refreshing…", StatusLevel::Info);
    }

    /// Execute a parsed command
    pub fn execute_command(&mut self, cmd: &Command) -> Action {
        match cmd {
            Command::Debug => {
                self.current_tab = Tab::Debug;
                Action::None
            }
            Command::Explorer => {
                self.show_explorer();
                Action::None
            }
            Command::Contract(name) => {
                if self.select_contract_by_name(name) {
                    self.current_tab = Tab::Debug;
                    Action::None
                } else {
                    Action::Notify(format!("No contract named {name}"), NotifyLevel::Warn)
                }
            }
            Command::Address(addr) => match addr.trim().parse::<Address>() {
                Ok(address) => {
                    self.open_address(address);
                    Action::None
                }
                Err(_) => Action::Notify(format!("Invalid address: {addr}"), NotifyLevel::Warn),
            },
            Command::Search(query) => {
                self.search(query.clone());
                Action::None
            }
            Command::Faucet { to, amount } => {
                self.send_faucet(to.clone(), amount.clone());
                Action::None
            }
            Command::Price(price) => {
                self.ctx.native_currency_price = *price;
                if *price == 0.0 {
                    self.usd_mode = false;
                }
                Action::Notify(format!("Price set to ${price:.2}"), NotifyLevel::Info)
            }
            Command::ToggleUsd => {
                self.toggle_usd();
                Action::None
            }
            Command::Endpoint(index) => {
                if *index >= self.rpc_endpoints.len() {
                    return Action::Notify(
                        format!("No endpoint {} ({} configured)", index + 1, self.rpc_endpoints.len()),
                        NotifyLevel::Warn,
                    );
                }
                self.outbox
                    .push(RuntimeCommand::SwitchEndpoint { index: *index });
                Action::Notify(
                    format!("Switching to {}", self.rpc_endpoints[*index]),
                    NotifyLevel::Info,
                )
            }
            Command::Refresh => {
                self.refresh();
                Action::None
            }
            Command::Quit => Action::Quit,
            Command::Unknown(s) => {
                Action::Notify(format!("Unknown command: {}", s), NotifyLevel::Warn)
            }
        }
    }

    pub fn apply_command(&mut self) -> Action {
        let input = self.command.input.trim().to_string();
        self.exit_command();
        if input.is_empty() {
            return Action::None;
        }
        self.command.last = Some(input.clone());
        let cmd = crate::core::parse_command(&input);
        self.execute_command(&cmd)
    }

    /// Apply an action returned by a command
    pub fn apply_action(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Notify(msg, level) => self.set_status(msg, level.into()),
            Action::Quit => self.should_quit = true,
        }
    }

    /// Text `y` copies in the current view
    pub fn copy_target(&self) -> Option<String> {
        match self.current_tab {
            Tab::Debug => {
                if let Some(function) = self.focused_function() {
                    if let Some(output) = self.function_output(function) {
                        if output != DisplayResult::Empty {
                            return Some(output.to_string());
                        }
                    }
                }
                self.current_contract()
                    .map(|entry| entry.contract.address.to_checksum(None))
            }
            Tab::Explorer => match &self.explorer {
                ExplorerView::Address(view) => Some(view.address.to_checksum(None)),
                ExplorerView::Transaction(tx) => Some(tx.hash.to_string()),
                ExplorerView::Empty => None,
            },
        }
    }

    // ----- runtime events -----

    pub fn apply_event(&mut self, event: RuntimeEvent) {
        match event {
            RuntimeEvent::Connected {
                endpoint,
                chain_id,
                node_kind,
                accounts,
            } => {
                self.ctx.rpc_endpoint = endpoint;
                self.ctx.chain_id = Some(chain_id);
                self.ctx.node_kind = node_kind;
                self.ctx.accounts = accounts;
                self.banner = None;
                if chain_id != self.ctx.target_chain_id {
                    self.set_status(
                        format!(
                            "Connected to chain {chain_id}, contracts are for chain {}",
                            self.ctx.target_chain_id
                        ),
                        StatusLevel::Warn,
                    );
                } else {
                    self.set_status("Connected", StatusLevel::Info);
                }
                self.check_deployments();
                self.read_variables();
                if let ExplorerView::Address(view) = &self.explorer {
                    let address = view.address;
                    self.open_address(address);
                }
                self.recent = RecentTransactions::default();
                if self.current_tab == Tab::Explorer {
                    self.load_transactions(0);
                }
            }
            RuntimeEvent::NetworkUnavailable { message } => {
                self.ctx.chain_id = None;
                self.banner = Some(message);
            }
            RuntimeEvent::NewHead { number } => {
                let advanced = self.head != Some(number);
                self.head = Some(number);
                // The first page follows the head while it is on screen
                if advanced
                    && self.current_tab == Tab::Explorer
                    && matches!(self.explorer, ExplorerView::Empty)
                    && self.recent.page == 0
                    && !self.recent.loading
                {
                    self.load_transactions(0);
                }
            }
            RuntimeEvent::DeploymentChecked { statuses } => {
                for (name, status) in statuses {
                    if let Some(entry) = self.contracts.iter_mut().find(|e| e.contract.name == name) {
                        entry.status = status;
                    }
                }
            }
            RuntimeEvent::CallResult {
                function_id,
                outcome,
            } => {
                // Results for forms that were reset in the meantime are dropped
                if !matches!(self.reads.get(&function_id), Some(ReadState::Loading)) {
                    return;
                }
                match outcome {
                    Ok((values, value)) => {
                        self.last_result = Some(values.clone());
                        self.reads
                            .insert(function_id, ReadState::Ready { values, value });
                    }
                    Err(message) => {
                        self.set_status(message.clone(), StatusLevel::Error);
                        self.reads.insert(function_id, ReadState::Failed(message));
                    }
                }
            }
            RuntimeEvent::TxUpdate { origin, phase } => {
                match &phase {
                    TxPhase::Failed(message) => self.set_status(message.clone(), StatusLevel::Error),
                    TxPhase::Completed(receipt) if !receipt.status => {
                        self.set_status("Transaction reverted", StatusLevel::Error)
                    }
                    _ => {}
                }
                let succeeded = matches!(&phase, TxPhase::Completed(receipt) if receipt.status);
                match origin {
                    TxOrigin::Function(function_id) => {
                        if !self.txs.contains_key(&function_id) {
                            return;
                        }
                        self.txs.insert(function_id, phase);
                        if succeeded {
                            self.read_variables();
                        }
                    }
                    TxOrigin::Faucet => {
                        if succeeded {
                            self.set_status("Faucet transfer confirmed", StatusLevel::Info);
                        }
                        self.faucet_phase = Some(phase);
                    }
                }
            }
            RuntimeEvent::BalanceReady { watch_id, balance } => {
                if let Some(view) = self.address_view(watch_id) {
                    view.balance = Some(balance);
                }
            }
            RuntimeEvent::CodeReady { watch_id, code } => {
                if let Some(view) = self.address_view(watch_id) {
                    view.code = Some(code);
                }
            }
            RuntimeEvent::StorageReady { watch_id, outcome } => {
                if let Some(view) = self.address_view(watch_id) {
                    view.storage = Some(outcome);
                }
            }
            RuntimeEvent::LogsUpdated { watch_id, logs } => {
                if let Some(view) = self.address_view(watch_id) {
                    view.logs = logs;
                }
            }
            RuntimeEvent::SearchResolved { outcome } => match outcome {
                SearchOutcome::Transaction(tx) => {
                    self.close_explorer();
                    self.explorer = ExplorerView::Transaction(tx);
                }
                SearchOutcome::Address(address) => self.open_address(address),
                SearchOutcome::Error(message) => {
                    self.search_error = Some(message);
                    self.set_status(message, StatusLevel::Warn);
                }
            },
            RuntimeEvent::TransactionsLoaded { page, outcome } => {
                // Superseded by a later page request
                if page != self.recent.page {
                    return;
                }
                self.recent.loading = false;
                match outcome {
                    Ok(loaded) => {
                        self.recent.selected =
                            self.recent.selected.min(loaded.rows.len().saturating_sub(1));
                        self.recent.error = None;
                        self.recent.loaded = Some(loaded);
                    }
                    Err(message) => self.recent.error = Some(message),
                }
            }
            RuntimeEvent::Error { message } => self.set_status(message, StatusLevel::Error),
        }
    }
}
