use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use scaffold::app::{App, ExplorerView, InputMode, Slot, StatusLevel, Tab};
use scaffold::config;
use scaffold::core::AppContext;
use scaffold::infrastructure::contracts::load_contracts;
use scaffold::infrastructure::ethereum::ProviderConfig;
use scaffold::infrastructure::RuntimeBridge;
use scaffold::ui;

#[derive(Debug, Parser)]
#[command(
    name = "scaffold",
    version,
    about = "Scaffold: debug the contracts of a local Ethereum chain from the terminal"
)]
struct Args {
    /// HTTP JSON-RPC endpoint (e.g. http://localhost:8545)
    #[arg(long)]
    rpc: Option<String>,

    /// WebSocket endpoint (e.g. ws://localhost:8546)
    #[arg(long)]
    ws: Option<String>,

    /// IPC path (e.g. ~/.ethereum/geth.ipc). Unix only.
    #[arg(long)]
    ipc: Option<PathBuf>,

    /// Deployed contracts file
    #[arg(long)]
    contracts: Option<PathBuf>,

    /// Chain the contracts are deployed on
    #[arg(long)]
    chain_id: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let mut config = config::load();
    if let Some(chain_id) = args.chain_id {
        config.target_chain_id = chain_id;
    }
    let (endpoints, endpoint_labels) = endpoints_from_args_and_config(&args, &config)?;
    let contracts_path = args
        .contracts
        .clone()
        .unwrap_or_else(|| config.contracts_file());

    let ctx = AppContext {
        native_currency_price: config.native_currency_price.max(0.0),
        target_chain_id: config.target_chain_id,
        rpc_endpoint: endpoints
            .first()
            .map(|endpoint| endpoint.display())
            .unwrap_or_default(),
        node_kind: "connecting".to_string(),
        faucet_account_index: config.faucet_account_index,
        ..AppContext::default()
    };
    let mut app = App::new(ctx);
    app.rpc_endpoints = endpoint_labels;

    match load_contracts(&contracts_path, config.target_chain_id) {
        Ok(contracts) => app.load_contracts(contracts),
        Err(err) => {
            tracing::warn!("no contracts: {err:#}");
            app.set_status(format!("No contracts: {err:#}"), StatusLevel::Warn);
        }
    }

    let runtime = RuntimeBridge::new(endpoints, config.worker())?;

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, runtime);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("{err:?}");
    }

    Ok(())
}

/// Log to a file so the terminal stays clean; `SCAFFOLD_LOG` sets the filter
fn init_logging() {
    let Some(path) = config::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let Ok(file) = fs::OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let filter = EnvFilter::try_from_env("SCAFFOLD_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    runtime: RuntimeBridge,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        pump_background(&mut app, &runtime);
        terminal.draw(|f| ui::draw(f, &app))?;
        if app.should_quit {
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(&mut app, key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }
}

/// Apply runtime events, then hand queued commands to the runtime
fn pump_background(app: &mut App, runtime: &RuntimeBridge) {
    for event in runtime.poll_events() {
        app.apply_event(event);
    }
    for command in app.take_commands() {
        if let Err(err) = runtime.send(command) {
            tracing::error!("runtime unavailable: {err:#}");
            app.set_status("Runtime stopped", StatusLevel::Error);
        }
    }
}

fn endpoints_from_args_and_config(
    args: &Args,
    config: &config::Config,
) -> Result<(Vec<ProviderConfig>, Vec<String>)> {
    use std::collections::BTreeSet;

    fn push_endpoint(
        endpoints: &mut Vec<ProviderConfig>,
        labels: &mut Vec<String>,
        seen: &mut BTreeSet<String>,
        endpoint: ProviderConfig,
        name: Option<String>,
    ) {
        let display = endpoint.display();
        if !seen.insert(display.to_lowercase()) {
            return;
        }
        let label = name
            .filter(|value| !value.trim().is_empty())
            .map(|name| format!("{name} ({display})"))
            .unwrap_or(display);
        labels.push(label);
        endpoints.push(endpoint);
    }

    let mut endpoints = Vec::new();
    let mut labels = Vec::new();
    let mut seen = BTreeSet::<String>::new();

    // CLI arguments take precedence
    if let Some(ipc) = args.ipc.clone() {
        #[cfg(unix)]
        {
            push_endpoint(
                &mut endpoints,
                &mut labels,
                &mut seen,
                ProviderConfig::Ipc(ipc),
                Some("cli".to_string()),
            );
        }
        #[cfg(not(unix))]
        {
            let _ = ipc;
            return Err(anyhow::anyhow!("IPC is not supported on this platform"));
        }
    } else if let Some(ws) = args.ws.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        push_endpoint(
            &mut endpoints,
            &mut labels,
            &mut seen,
            ProviderConfig::WebSocket(ws.to_string()),
            Some("cli".to_string()),
        );
    } else if let Some(rpc) = args.rpc.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        push_endpoint(
            &mut endpoints,
            &mut labels,
            &mut seen,
            ProviderConfig::Http(normalize_http_endpoint(rpc)),
            Some("cli".to_string()),
        );
    }

    for (idx, entry) in config.endpoints.iter().enumerate() {
        let name = entry.name.clone().filter(|value| !value.trim().is_empty());
        if let Some(rpc) = entry.rpc.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            push_endpoint(
                &mut endpoints,
                &mut labels,
                &mut seen,
                ProviderConfig::Http(normalize_http_endpoint(rpc)),
                name,
            );
            continue;
        }
        if let Some(ws) = entry.ws.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            push_endpoint(
                &mut endpoints,
                &mut labels,
                &mut seen,
                ProviderConfig::WebSocket(ws.to_string()),
                name,
            );
            continue;
        }
        if let Some(ipc) = entry.ipc.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            #[cfg(unix)]
            {
                let Some(ipc_path) = expand_path(ipc) else {
                    continue;
                };
                push_endpoint(
                    &mut endpoints,
                    &mut labels,
                    &mut seen,
                    ProviderConfig::Ipc(ipc_path),
                    name.or_else(|| Some(format!("ipc-{idx}"))),
                );
            }
            #[cfg(not(unix))]
            {
                let _ = (idx, ipc);
            }
        }
    }

    // Local chain fallback
    if endpoints.is_empty() {
        push_endpoint(
            &mut endpoints,
            &mut labels,
            &mut seen,
            ProviderConfig::Http(normalize_http_endpoint("localhost:8545")),
            Some("local".to_string()),
        );
    }

    Ok((endpoints, labels))
}

fn normalize_http_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

#[cfg(unix)]
fn expand_path(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(rest) = trimmed.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
            return Some(home.join(rest));
        }
    }

    let mut buf = PathBuf::from(trimmed);
    if buf.is_relative() {
        if let Ok(cwd) = std::env::current_dir() {
            buf = cwd.join(buf);
        }
    }
    Some(buf)
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Command => handle_command_mode(app, key),
        InputMode::Edit => handle_edit_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    if app.help_open {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.help_open = false;
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.help_open = true,
        KeyCode::Char(':') => app.enter_command(),
        KeyCode::Char('1') => app.current_tab = Tab::Debug,
        KeyCode::Char('2') => app.show_explorer(),
        KeyCode::Char('r') => app.refresh(),
        KeyCode::Char('u') => app.toggle_usd(),
        KeyCode::Char('y') => handle_copy_to_clipboard(app),
        KeyCode::Esc => {
            if app.status.is_some() {
                app.dismiss_status();
            } else if app.current_tab == Tab::Explorer {
                app.close_explorer();
            }
        }
        _ => match app.current_tab {
            Tab::Debug => handle_debug_key(app, key),
            Tab::Explorer => handle_explorer_key(app, key),
        },
    }
}

fn handle_debug_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.move_focus(true),
        KeyCode::Char('k') | KeyCode::Up => app.move_focus(false),
        KeyCode::Char(']') | KeyCode::Tab => app.cycle_contract(true),
        KeyCode::Char('[') | KeyCode::BackTab => app.cycle_contract(false),
        KeyCode::Char('s') => app.submit_focused(),
        KeyCode::Char('i') | KeyCode::Enter => match app.focused_row().map(|row| row.slot) {
            Some(Slot::Submit) => app.submit_focused(),
            Some(_) if key.code == KeyCode::Enter => app.submit_focused(),
            Some(_) => app.input_mode = InputMode::Edit,
            None => {}
        },
        _ => {}
    }
}

fn handle_explorer_key(app: &mut App, key: KeyEvent) {
    if matches!(app.explorer, ExplorerView::Empty) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => app.move_transaction_selection(true),
            KeyCode::Char('k') | KeyCode::Up => app.move_transaction_selection(false),
            KeyCode::Char(']') | KeyCode::Right => app.change_page(true),
            KeyCode::Char('[') | KeyCode::Left => app.change_page(false),
            KeyCode::Enter => app.open_selected_transaction(),
            _ => {}
        }
        return;
    }
    match key.code {
        KeyCode::Tab => app.cycle_address_tab(),
        KeyCode::Char('d') => app.toggle_disassembly(),
        _ => {}
    }
}

fn handle_command_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.exit_command(),
        KeyCode::Enter => {
            let action = app.apply_command();
            app.apply_action(action);
        }
        KeyCode::Backspace => {
            app.command.input.pop();
        }
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return;
            }
            app.command.input.push(ch);
        }
        _ => {}
    }
}

fn handle_edit_mode(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('e') => app.scale_focused(),
            KeyCode::Char('t') => app.convert_focused(),
            KeyCode::Char('r') => app.populate_focused(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            app.submit_focused();
        }
        KeyCode::Tab | KeyCode::Down => app.move_focus(true),
        KeyCode::BackTab | KeyCode::Up => app.move_focus(false),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Char(ch) => app.insert_char(ch),
        _ => {}
    }
}

fn handle_copy_to_clipboard(app: &mut App) {
    use arboard::Clipboard;

    let Some(text) = app.copy_target() else {
        app.set_status("Nothing to copy", StatusLevel::Warn);
        return;
    };

    match Clipboard::new() {
        Ok(mut clipboard) => {
            if clipboard.set_text(&text).is_ok() {
                let shown = if text.chars().count() > 20 {
                    format!("{}...", text.chars().take(20).collect::<String>())
                } else {
                    text
                };
                app.set_status(format!("Copied: {shown}"), StatusLevel::Info);
            } else {
                app.set_status("Failed to copy to clipboard", StatusLevel::Error);
            }
        }
        Err(_) => {
            app.set_status("Clipboard not available", StatusLevel::Error);
        }
    }
}
