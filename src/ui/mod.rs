use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

pub mod layout;

use crate::app::{
    AddressTab, AddressView, App, ContractEntry, ExplorerView, InputMode, Slot, StatusLevel, Tab,
};
use crate::domain::abi::{
    classify, placeholder, ContractCodeStatus, FunctionSpec, IntegerVariant, WidgetKind,
};
use crate::domain::display::DisplayResult;
use crate::domain::form::FieldStatus;
use crate::infrastructure::ethereum::TxSummary;
use crate::modules::blocks::TxRow;
use crate::modules::bytecode;
use crate::modules::ether::format_balance;

pub fn draw(f: &mut Frame, app: &App) {
    let areas = layout::areas(f.size(), app.banner.is_some());

    draw_header(f, areas.header, app);
    if let Some(banner) = app.banner.as_deref() {
        draw_banner(f, areas.banner, banner);
    }
    draw_sidebar(f, areas.sidebar, app);
    match app.current_tab {
        Tab::Debug => draw_debug(f, areas.content, app),
        Tab::Explorer => draw_explorer(f, areas.content, app),
    }
    draw_status_line(f, areas.status_line, app);
    draw_command_line(f, areas.command_line, app);

    if app.help_open {
        draw_help_popup(f, areas.size);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let mut spans = vec![
        Span::styled(
            "Scaffold",
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
    ];
    for tab in Tab::ALL {
        let style = if tab == app.current_tab {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(
            format!(" {} {} ", tab.shortcut(), tab.title()),
            style,
        ));
        spans.push(Span::raw(" "));
    }
    let left = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    let chain = app
        .ctx
        .chain_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "--".to_string());
    let right_line = Line::from(vec![
        Span::styled("RPC ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", app.ctx.rpc_endpoint)),
        Span::styled("Node ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", app.ctx.node_kind)),
        Span::styled("Chain ", Style::default().fg(Color::DarkGray)),
        Span::raw(chain),
    ]);
    let right = Paragraph::new(right_line)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    f.render_widget(left, chunks[0]);
    f.render_widget(right, chunks[1]);
}

fn draw_banner(f: &mut Frame, area: Rect, message: &str) {
    let line = Line::from(vec![
        Span::styled(
            " ! ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {message}  (r to retry)"), Style::default().fg(Color::LightRed)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn draw_sidebar(f: &mut Frame, area: Rect, app: &App) {
    let border_style = if app.current_tab == Tab::Debug {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let items: Vec<ListItem> = if app.contracts.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "No contracts deployed",
            Style::default().fg(Color::DarkGray),
        )))]
    } else {
        app.contracts.iter().map(contract_item).collect()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .title("Contracts")
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    let mut state = ListState::default();
    if !app.contracts.is_empty() {
        state.select(Some(app.selected_contract));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn contract_item(entry: &ContractEntry) -> ListItem<'static> {
    let (marker, color) = match entry.status {
        ContractCodeStatus::Loading => ("…", Color::DarkGray),
        ContractCodeStatus::Deployed => ("●", Color::LightGreen),
        ContractCodeStatus::NotFound => ("○", Color::LightRed),
    };
    ListItem::new(Line::from(vec![
        Span::styled(format!("{marker} "), Style::default().fg(color)),
        Span::raw(entry.contract.name.clone()),
    ]))
}

fn draw_debug(f: &mut Frame, area: Rect, app: &App) {
    let Some(entry) = app.current_contract() else {
        let paragraph = Paragraph::new(Text::from(vec![
            Line::from("No contracts loaded."),
            Line::from(""),
            Line::from(Span::styled(
                "Deploy your contracts and point --contracts at the exported contracts file.",
                Style::default().fg(Color::DarkGray),
            )),
        ]))
        .block(Block::default().title("Debug Contracts").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
        return;
    };

    if entry.status == ContractCodeStatus::NotFound {
        let paragraph = Paragraph::new(Text::from(vec![
            Line::from(Span::styled(
                format!(
                    "No contract found by the name of \"{}\" on chain {}!",
                    entry.contract.name, app.ctx.target_chain_id
                ),
                Style::default().fg(Color::LightRed),
            )),
            Line::from(""),
            Line::from(format!("Address {}", entry.contract.address.to_checksum(None))),
        ]))
        .block(Block::default().title(entry.contract.name.clone()).borders(Borders::ALL))
        .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
        return;
    }

    let (lines, focus_line) = debug_lines(app, entry);
    let height = area.height.saturating_sub(2) as usize;
    let scroll = focus_line.saturating_sub(height.saturating_sub(4)) as u16;

    let title = format!(
        "{}  {}",
        entry.contract.name,
        entry.contract.address.to_checksum(None)
    );
    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .scroll((scroll, 0));
    f.render_widget(paragraph, area);
}

/// Lines of the contract panel and the index of the focused line
fn debug_lines(app: &App, entry: &ContractEntry) -> (Vec<Line<'static>>, usize) {
    let mut lines = Vec::new();
    let mut focus_line = 0;
    let mut row = 0;

    lines.push(section_line("Variables"));
    if entry.functions.variables.is_empty() {
        lines.push(dim_line("  (none)"));
    }
    for function in &entry.functions.variables {
        let mut spans = vec![Span::styled(
            format!("  {}: ", function.name()),
            Style::default().fg(Color::Gray),
        )];
        match app.function_output(function) {
            Some(output) => {
                let mut output_lines = result_lines(&output, "    ");
                if let Some(first) = output_lines.first_mut() {
                    spans.extend(first.spans.drain(..).map(|s| {
                        Span::styled(s.content.trim_start().to_string(), s.style)
                    }));
                    output_lines.remove(0);
                }
                lines.push(Line::from(spans));
                lines.extend(output_lines);
            }
            None => {
                spans.push(Span::styled("--", Style::default().fg(Color::DarkGray)));
                lines.push(Line::from(spans));
            }
        }
    }

    let read_count = entry.functions.read.len();
    for (index, function) in entry.functions.forms().enumerate() {
        if index == 0 && read_count > 0 {
            lines.push(Line::from(""));
            lines.push(section_line("Read"));
        }
        if index == read_count {
            lines.push(Line::from(""));
            lines.push(section_line("Write"));
        }

        lines.push(Line::from(vec![
            Span::styled(
                format!("  {}", function.name()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" {}", function.id().trim_start_matches(function.name())),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                if function.is_payable() { "  payable" } else { "" },
                Style::default().fg(Color::LightYellow),
            ),
        ]));

        let mut slots: Vec<Slot> = (0..function.inputs.len()).map(Slot::Field).collect();
        if function.is_payable() {
            slots.push(Slot::Value);
        }
        if slots.is_empty() {
            slots.push(Slot::Submit);
        }
        for slot in slots {
            let focused = row == app.focus;
            if focused {
                focus_line = lines.len();
            }
            lines.push(field_line(app, function, slot, focused));
            row += 1;
        }

        if let Some(output) = app.function_output(function) {
            lines.extend(result_lines(&output, "    → "));
        }
    }

    (lines, focus_line)
}

fn field_line(app: &App, function: &FunctionSpec, slot: Slot, focused: bool) -> Line<'static> {
    let editing = focused && app.input_mode == InputMode::Edit;
    let (label, widget) = match slot {
        Slot::Field(index) => (
            placeholder(&function.inputs[index]),
            classify(&function.inputs[index]),
        ),
        Slot::Value => (
            "value (wei)".to_string(),
            WidgetKind::Integer(IntegerVariant::UINT256),
        ),
        Slot::Submit => {
            let style = if focused {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default().fg(Color::Cyan)
            };
            return Line::from(vec![Span::raw("    "), Span::styled("[ send ]", style)]);
        }
    };
    let (text, status) = app.field_text(function, slot);

    let marker = if focused { "  ▸ " } else { "    " };
    let value_style = match (status, focused) {
        (FieldStatus::Invalid, _) => Style::default().fg(Color::LightRed),
        (FieldStatus::Ok, true) => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        (FieldStatus::Ok, false) => Style::default().fg(Color::White),
    };
    let mut spans = vec![
        Span::styled(marker, Style::default().fg(Color::Cyan)),
        Span::styled(format!("{label}: "), Style::default().fg(Color::DarkGray)),
        Span::styled(text, value_style),
    ];
    if editing {
        spans.push(Span::styled("▏", Style::default().fg(Color::Cyan)));
        if widget.has_conversion() {
            let hint = match widget {
                WidgetKind::Integer(_) => "  Ctrl-e ×1e18",
                _ => "  Ctrl-t hex",
            };
            spans.push(Span::styled(hint, Style::default().fg(Color::DarkGray)));
        }
    }
    Line::from(spans)
}

fn result_lines(result: &DisplayResult, prefix: &str) -> Vec<Line<'static>> {
    let style = match result {
        DisplayResult::Empty => return Vec::new(),
        DisplayResult::Number(_) => Style::default().fg(Color::LightGreen),
        DisplayResult::Ether(_) => Style::default().fg(Color::LightYellow),
        DisplayResult::Address(_) => Style::default().fg(Color::LightCyan),
        DisplayResult::Text(_) => Style::default().fg(Color::White),
    };
    let text = result.to_string();
    let pad = " ".repeat(prefix.chars().count());
    text.lines()
        .enumerate()
        .map(|(i, line)| {
            let lead = if i == 0 { prefix.to_string() } else { pad.clone() };
            Line::from(vec![
                Span::styled(lead, Style::default().fg(Color::DarkGray)),
                Span::styled(line.to_string(), style),
            ])
        })
        .collect()
}

fn draw_explorer(f: &mut Frame, area: Rect, app: &App) {
    let lines = match &app.explorer {
        ExplorerView::Empty => explorer_home_lines(app),
        ExplorerView::Address(view) => address_lines(app, view),
        ExplorerView::Transaction(tx) => tx_lines(app, tx),
    };
    let title = match &app.explorer {
        ExplorerView::Empty => "Explorer".to_string(),
        ExplorerView::Address(view) => format!("Address {}", view.address.to_checksum(None)),
        ExplorerView::Transaction(tx) => format!("Transaction {}", short_hash(&tx.hash.to_string(), 18)),
    };
    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn explorer_home_lines(app: &App) -> Vec<Line<'static>> {
    if let Some(notice) = app.explorer_notice() {
        return vec![
            Line::from(Span::styled(
                format!("targetNetwork is not localhost (chain {})", app.ctx.target_chain_id),
                Style::default().fg(Color::LightYellow).add_modifier(Modifier::BOLD),
            )),
            Line::from(notice),
        ];
    }
    if app.banner.is_some() {
        return vec![dim_line("Cannot connect to local provider")];
    }

    let mut lines = vec![
        Line::from("Search by transaction hash or address:"),
        Line::from(Span::styled(
            "  :search 0x<64-hex-txhash> | :search 0x<40-hex-address>",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    if let Some(error) = app.search_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error,
            Style::default().fg(Color::LightRed),
        )));
    }
    lines.push(Line::from(""));
    lines.extend(transactions_lines(app));
    lines
}

fn transactions_lines(app: &App) -> Vec<Line<'static>> {
    let recent = &app.recent;
    if let Some(error) = &recent.error {
        return vec![Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::LightRed),
        ))];
    }
    // A refresh keeps the previous page on screen until it lands
    let Some(page) = recent.loaded.as_ref() else {
        return vec![dim_line("Loading...")];
    };
    if page.rows.is_empty() && !page.has_next() && !page.has_prev() {
        return vec![dim_line("No transactions available")];
    }

    let header = format!(
        "  {:<14} {:<24} {:>7}  {:<19} {:<13} {:<28} {}",
        "Hash", "Function", "Block", "Time", "From", "To", "Value"
    );
    let mut lines = vec![Line::from(Span::styled(
        header,
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD),
    ))];
    for (i, row) in page.rows.iter().enumerate() {
        let text = transaction_row(app, row);
        if i == recent.selected {
            lines.push(Line::from(Span::styled(
                format!("> {text}"),
                Style::default().fg(Color::Black).bg(Color::Cyan),
            )));
        } else {
            lines.push(Line::from(format!("  {text}")));
        }
    }
    if page.rows.is_empty() {
        lines.push(dim_line("  No transactions in these blocks"));
    }

    // Paging controls stay hidden when there is only one page
    if page.has_prev() || page.has_next() {
        lines.push(Line::from(""));
        let mut spans = Vec::new();
        if page.has_prev() {
            spans.push(Span::styled("← [ ", Style::default().fg(Color::Cyan)));
        }
        spans.push(Span::raw(format!("Page {}", page.page + 1)));
        if page.has_next() {
            spans.push(Span::styled(" ] →", Style::default().fg(Color::Cyan)));
        }
        lines.push(Line::from(spans));
    }
    lines
}

fn transaction_row(app: &App, row: &TxRow) -> String {
    let tx = &row.tx;
    let function = function_label(app, &tx.input)
        .map(|(_, name)| name)
        .or_else(|| (tx.input.len() >= 4).then(|| format!("0x{}", hex::encode(&tx.input[..4]))))
        .unwrap_or_default();
    let block = tx.block_number.map(|n| n.to_string()).unwrap_or_default();
    let time = chrono::DateTime::from_timestamp(row.timestamp as i64, 0)
        .map(|at| at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default();
    let to = match (tx.to, row.created_contract()) {
        (Some(to), _) => short_addr(&to.to_checksum(None)),
        (None, Some(created)) => format!("Contract Creation {}", short_addr(&created.to_checksum(None))),
        (None, None) => "Contract Creation".to_string(),
    };
    format!(
        "{:<14} {:<24} {:>7}  {:<19} {:<13} {:<28} {}",
        short_hash(&tx.hash.to_string(), 14),
        truncate(&function, 24),
        block,
        time,
        short_addr(&tx.from.to_checksum(None)),
        to,
        format_balance(tx.value, app.usd_price()),
    )
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push('…');
    cut
}

/// Contract and signature of the loaded function whose selector starts `input`
fn function_label(app: &App, input: &[u8]) -> Option<(String, String)> {
    let selector = input.get(..4)?;
    app.contracts.iter().find_map(|entry| {
        entry
            .contract
            .abi
            .functions()
            .find(|f| f.selector().as_slice() == selector)
            .map(|f| (entry.contract.name.clone(), f.signature()))
    })
}

fn address_lines(app: &App, view: &AddressView) -> Vec<Line<'static>> {
    let balance = view
        .balance
        .map(|wei| format_balance(wei, app.usd_price()))
        .unwrap_or_else(|| "…".to_string());
    let code = view
        .code
        .as_ref()
        .map(|code| bytecode::describe(code))
        .unwrap_or_else(|| "…".to_string());

    let mut lines = vec![
        kv_line("Balance", balance),
        kv_line("Code", code),
        Line::from(""),
    ];

    let mut tabs = Vec::new();
    for tab in AddressTab::ALL {
        let style = if tab == view.tab {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        tabs.push(Span::styled(format!(" {} ", tab.title()), style));
        tabs.push(Span::raw(" "));
    }
    lines.push(Line::from(tabs));
    lines.push(Line::from(""));

    match view.tab {
        AddressTab::Code => match &view.code {
            None => lines.push(dim_line("loading…")),
            Some(code) if code.is_empty() => lines.push(dim_line("This address is not a contract")),
            Some(code) if view.disassemble => {
                lines.extend(bytecode::disassemble(code).into_iter().map(Line::from));
            }
            Some(code) => {
                let hex = hex::encode(code);
                lines.push(Line::from("0x"));
                lines.extend(
                    hex.as_bytes()
                        .chunks(64)
                        .map(|chunk| Line::from(String::from_utf8_lossy(chunk).into_owned())),
                );
            }
        },
        AddressTab::Storage => match &view.storage {
            None => lines.push(dim_line("scanning…")),
            Some(Err(message)) => lines.push(Line::from(Span::styled(
                message.clone(),
                Style::default().fg(Color::LightRed),
            ))),
            Some(Ok(slots)) if slots.is_empty() => lines.push(dim_line("No storage")),
            Some(Ok(slots)) => {
                for slot in slots {
                    lines.push(Line::from(vec![
                        Span::styled(
                            format!("slot {:>3}  ", slot.index),
                            Style::default().fg(Color::DarkGray),
                        ),
                        Span::raw(slot.value.to_string()),
                    ]));
                }
            }
        },
        AddressTab::Logs => {
            if view.logs.is_empty() {
                lines.push(dim_line("No logs"));
            }
            for log in view.logs.iter().rev() {
                let block = log
                    .block_number
                    .map(|n| format!("#{n}"))
                    .unwrap_or_else(|| "pending".to_string());
                let topic = log
                    .topics
                    .first()
                    .map(|t| short_hash(&t.to_string(), 18))
                    .unwrap_or_else(|| "anonymous".to_string());
                let tx = log
                    .transaction_hash
                    .map(|h| short_hash(&h.to_string(), 12))
                    .unwrap_or_default();
                lines.push(Line::from(vec![
                    Span::styled(format!("{block:>8} "), Style::default().fg(Color::DarkGray)),
                    Span::raw(format!("{tx}  ")),
                    Span::styled(topic, Style::default().fg(Color::LightCyan)),
                    Span::styled(
                        format!("  {} bytes", log.data.len()),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]));
            }
        }
    }
    lines
}

fn tx_lines(app: &App, tx: &TxSummary) -> Vec<Line<'static>> {
    let to = tx
        .to
        .map(|a| a.to_checksum(None))
        .unwrap_or_else(|| "contract creation".to_string());
    let block = tx
        .block_number
        .map(|n| n.to_string())
        .unwrap_or_else(|| "pending".to_string());
    let mut lines = vec![
        kv_line("Hash", tx.hash.to_string()),
        kv_line("Block", block),
        kv_line("From", tx.from.to_checksum(None)),
        kv_line("To", to),
        kv_line("Value", format_balance(tx.value, app.usd_price())),
        kv_line("Gas", tx.gas.to_string()),
        kv_line("Nonce", tx.nonce.to_string()),
    ];
    if let Some((contract, function)) = function_label(app, &tx.input) {
        lines.push(kv_line("Function", format!("{contract}.{function}")));
    }
    lines.push(Line::from(""));
    lines.push(section_line("Input"));
    let hex = format!("0x{}", hex::encode(&tx.input));
    lines.extend(
        hex.as_bytes()
            .chunks(64)
            .map(|chunk| Line::from(String::from_utf8_lossy(chunk).into_owned())),
    );
    lines
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let head = app
        .head
        .map(|n| n.to_string())
        .unwrap_or_else(|| "--".to_string());
    let account = app
        .ctx
        .sender()
        .map(|a| short_addr(&a.to_checksum(None)))
        .unwrap_or_else(|| "--".to_string());
    let mut spans = vec![
        Span::styled("Block ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", head)),
        Span::styled("Account ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", account)),
        Span::styled("Contracts ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", app.contracts.len())),
    ];
    if app.ctx.has_price() {
        spans.push(Span::styled("Price ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::raw(format!(
            "${:.2}{}  ",
            app.ctx.native_currency_price,
            if app.usd_mode { " (USD)" } else { "" }
        )));
    }
    if let Some(phase) = app.faucet_phase.as_ref() {
        spans.push(Span::styled("Faucet ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::raw(phase.to_string()));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left);
    f.render_widget(paragraph, area);
}

/// Get command hint for autocompletion
fn command_hint(input: &str) -> Option<&'static str> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    let commands = [
        ("contract", "Select contract by name"),
        ("address", "Open address in explorer"),
        ("search", "Search tx hash or address"),
        ("tx", "Open transaction"),
        ("faucet", "Send ether: faucet <to> <amount>"),
        ("price", "Set native currency price in USD"),
        ("usd", "Toggle USD display"),
        ("endpoint", "Switch RPC endpoint by number"),
        ("refresh", "Reconnect and re-read"),
        ("debug", "Debug contracts tab"),
        ("explorer", "Explorer tab"),
        ("quit", "Quit"),
    ];

    for (cmd, desc) in commands {
        if cmd.starts_with(&input) {
            return Some(desc);
        }
    }
    None
}

fn draw_command_line(f: &mut Frame, area: Rect, app: &App) {
    let content = match app.input_mode {
        InputMode::Command => {
            let hint = command_hint(&app.command.input);
            let hint_text = hint.unwrap_or("contract | address | search | faucet | price");
            Line::from(vec![
                Span::styled(": ", Style::default().fg(Color::Yellow)),
                Span::raw(app.command.input.clone()),
                Span::styled(
                    format!("  {}", hint_text),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        }
        InputMode::Edit => Line::from(vec![
            Span::styled("-- EDIT --", Style::default().fg(Color::LightCyan)),
            Span::styled(
                "  Enter=send  Esc=done  Ctrl-e=×1e18  Ctrl-t=to hex  Ctrl-r=fill from result",
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        InputMode::Normal => {
            if let Some(status) = app.status.as_ref() {
                let color = match status.level {
                    StatusLevel::Info => Color::LightGreen,
                    StatusLevel::Warn => Color::LightYellow,
                    StatusLevel::Error => Color::LightRed,
                };
                let mut spans = vec![
                    Span::styled(
                        format!("{} ", status.at.format("%H:%M:%S")),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(status.text.clone(), Style::default().fg(color)),
                ];
                if status.level == StatusLevel::Error {
                    spans.push(Span::styled("  (Esc to dismiss)", Style::default().fg(Color::DarkGray)));
                }
                Line::from(spans)
            } else {
                action_hints(app)
            }
        }
    };

    let paragraph = Paragraph::new(content).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}

fn action_hints(app: &App) -> Line<'static> {
    let hints = match app.current_tab {
        Tab::Debug => "j/k move  i edit  Enter send  [ ] contract  y copy  r refresh  ? help",
        Tab::Explorer => match app.explorer {
            ExplorerView::Empty => "j/k select  Enter open  [ ] page  :search  u USD  ? help",
            _ => "Tab switch view  d disassemble  y copy  Esc close  u USD  ? help",
        },
    };
    Line::from(Span::styled(hints, Style::default().fg(Color::DarkGray)))
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(72, 64, area);
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from("Navigation"),
        Line::from("  1 / 2      Debug / Explorer"),
        Line::from("  j / k      Move between fields"),
        Line::from("  [ / ]      Previous/next contract"),
        Line::from("  Tab        Code/Storage/Logs (Explorer)"),
        Line::from("  [ / ]      Previous/next page (Explorer home)"),
        Line::from("  Esc        Close / dismiss error"),
        Line::from(""),
        Line::from("Forms"),
        Line::from("  i          Edit focused field"),
        Line::from("  Enter      Send the focused function"),
        Line::from("  Ctrl-e     Multiply integer by 1e18"),
        Line::from("  Ctrl-t     Text to hex (bytes, bytes32)"),
        Line::from("  Ctrl-r     Fill form from last result"),
        Line::from(""),
        Line::from("Actions"),
        Line::from("  :          Command"),
        Line::from("  y          Copy result / address"),
        Line::from("  u          Toggle USD display"),
        Line::from("  d          Toggle disassembly"),
        Line::from("  r          Refresh"),
        Line::from("  ?          Toggle help"),
        Line::from("  q          Quit"),
        Line::from(""),
        Line::from("Commands"),
        Line::from("  :contract <name>   :address 0x..   :search <hash|addr>"),
        Line::from("  :faucet <to> <amount>   :price <usd>   :endpoint <n>"),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().title("Help").borders(Borders::ALL))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

fn section_line(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(Color::LightCyan)
            .add_modifier(Modifier::BOLD),
    ))
}

fn dim_line(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::DarkGray),
    ))
}

fn kv_line(key: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{key:<9}"), Style::default().fg(Color::DarkGray)),
        Span::raw(value),
    ])
}

fn short_addr(value: &str) -> String {
    if value.len() <= 10 {
        return value.to_string();
    }
    let start: String = value.chars().take(6).collect();
    let end: String = value
        .chars()
        .rev()
        .take(4)
        .collect::<String>()
        .chars()
        .rev()
        .collect();
    format!("{}..{}", start, end)
}

fn short_hash(value: &str, len: usize) -> String {
    if value.len() <= len {
        return value.to_string();
    }
    value.chars().take(len).collect::<String>() + "…"
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_addr() {
        assert_eq!(short_addr("0x1234"), "0x1234");
        assert_eq!(
            short_addr("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            "0xf39F..2266"
        );
    }

    #[test]
    fn test_result_lines_split_multiline_text() {
        let lines = result_lines(&DisplayResult::Text("[\n1,\n2]".into()), "→ ");
        assert_eq!(lines.len(), 3);
        assert!(result_lines(&DisplayResult::Empty, "→ ").is_empty());
    }

    fn text(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_contract_creation_row_shows_created_address() {
        use alloy::primitives::{Address, Bytes, B256, U256};

        use crate::infrastructure::ethereum::{ReceiptSummary, TxSummary};

        let created = Address::with_last_byte(0x42);
        let row = TxRow {
            tx: TxSummary {
                hash: B256::repeat_byte(0xab),
                from: Address::with_last_byte(1),
                to: None,
                value: U256::ZERO,
                input: Bytes::from(vec![0x60, 0x80, 0x60, 0x40]),
                gas: 100_000,
                nonce: 0,
                block_number: Some(1),
            },
            timestamp: 0,
            receipt: Some(ReceiptSummary {
                transaction_hash: B256::repeat_byte(0xab),
                block_number: Some(1),
                status: true,
                gas_used: 90_000,
                from: Address::with_last_byte(1),
                to: None,
                contract_address: Some(created),
            }),
        };
        let line = transaction_row(&App::default(), &row);
        assert!(line.contains("Contract Creation 0x0000..0042"));
        assert!(line.contains("0x60806040"));
    }

    #[test]
    fn test_explorer_home_states() {
        let app = App::default();
        assert!(text(&explorer_home_lines(&app)).contains("Loading..."));

        let mut app = App::default();
        app.ctx.target_chain_id = 10;
        let shown = text(&explorer_home_lines(&app));
        assert!(shown.contains("targetNetwork is not localhost (chain 10)"));
        assert!(shown.contains("only for localhost"));
    }

    #[test]
    fn test_command_hint() {
        assert_eq!(command_hint("fau"), Some("Send ether: faucet <to> <amount>"));
        assert_eq!(command_hint(""), None);
    }
}
