use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
    Frame,
};

use crate::cli::editor::SplitEditor;
use crate::cli::input::LineEdit;
use crate::cli::state::{self, App, ExpenseForm};
use crate::cli::util::{fmt_money, fmt_pct};
use crate::database::models::ExpenseStatus;
use crate::split::AllocationMode;

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.size();

    // top tabs | main content | bottom status bar
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(10), Constraint::Length(1)])
        .split(size);

    let titles = state::Tab::ALL
        .iter()
        .map(|t| Line::from(Span::raw(t.title())))
        .collect::<Vec<_>>();
    let tabs = Tabs::new(titles)
        .select(app.tab.index())
        .block(Block::default().borders(Borders::ALL).title(format!("Household Budget  {}", app.month)))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));
    f.render_widget(tabs, root[0]);

    match app.tab {
        state::Tab::Expenses => draw_expenses(f, root[1], app),
        state::Tab::Split => match &app.editor {
            Some(editor) => draw_split(f, root[1], editor),
            None => draw_split_placeholder(f, root[1]),
        },
        state::Tab::Summary => draw_summary(f, root[1], app),
        state::Tab::Help => draw_help(f, root[1]),
    }

    f.render_widget(Paragraph::new(app.status.as_str()), root[2]);

    if let Some(form) = &app.form {
        let area = center_rect(root[1], 60, 13);
        f.render_widget(Clear, area);
        draw_expense_form(f, area, form);
    }
    if let Some(note) = &app.clarifying {
        let area = center_rect(root[1], 60, 5);
        f.render_widget(Clear, area);
        draw_clarify(f, area, note);
    }
}

// Expenses Page

fn draw_expenses(f: &mut Frame, area: Rect, app: &mut App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let header = Row::new(vec!["Date", "Description", "Type", "Amount", "Status"]).height(1);
    let body: Vec<Row> = app.expenses.iter().map(|e| {
        let status = match e.status {
            ExpenseStatus::Confirmed => Cell::from("ok"),
            ExpenseStatus::NeedsClarification => {
                Cell::from("?").style(Style::default().fg(Color::Yellow))
            }
        };
        Row::new(vec![
            Cell::from(e.spent_on.to_string()),
            Cell::from(e.description.clone()),
            Cell::from(e.expense_type.as_str()),
            Cell::from(fmt_money(&e.amount)),
            status,
        ])
    }).collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Percentage(45),
        Constraint::Length(9),
        Constraint::Length(12),
        Constraint::Length(6),
    ];

    let mut esel: TableState = app.esel.clone();
    let table = Table::new(body, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Expenses  (←/→ month, n=new, Enter=split, c/f=confirm/flag, x=delete)"),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_stateful_widget(table, cols[0], &mut esel);
    app.esel = esel;

    // Details
    let right = if let Some(e) = app.current_expense() {
        let split = match &e.distribution {
            Some(d) => d
                .participants
                .iter()
                .map(|p| format!("  {}: {} ({})", p.name, fmt_money(&p.amount), fmt_pct(&p.percentage)))
                .collect::<Vec<_>>()
                .join("\n"),
            None if e.expense_type.is_split() => "  <default 50/50>".into(),
            None => "  -".into(),
        };
        Paragraph::new(format!(
            "ID: {}\nDescription: {}\nCategory: {}\nAmount: {}\nPaid by: {}\nStatus: {}\nNote: {}\nSplit:\n{}",
            e.id,
            e.description,
            e.category,
            fmt_money(&e.amount),
            e.paid_by.as_deref().unwrap_or("-"),
            e.status.as_str(),
            e.clarification_note.as_deref().unwrap_or("-"),
            split,
        ))
    } else {
        Paragraph::new("No expense selected")
    }
    .block(Block::default().borders(Borders::ALL).title("Details"))
    .wrap(Wrap { trim: false });
    f.render_widget(right, cols[1]);
}

fn draw_expense_form(f: &mut Frame, area: Rect, form: &ExpenseForm) {
    let marker = |i: usize| if form.focus_index == i { "  <editing>" } else { "" };

    let lines = vec![
        format!("Description : {}{}", form.description.value, marker(0)),
        format!("Category    : {}{}", form.category.value, marker(1)),
        format!("Amount      : {}{}", form.amount.value, marker(2)),
        format!("Date        : {}{}", form.date.value, marker(3)),
        format!("Type        : {}{}", form.kind, if form.focus_index == 4 { "  <editing> (use ← / →)" } else { "" }),
        format!("Paid by     : {}{}", form.paid_by.value, marker(5)),
        "".into(),
        "TAB: switch field | Enter: save | Esc: cancel".into(),
        form.error.clone().unwrap_or_default(),
    ].join("\n");

    let p = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("New Expense"));
    f.render_widget(p, area);
}

fn draw_clarify(f: &mut Frame, area: Rect, note: &LineEdit) {
    let p = Paragraph::new(format!("Note: {}\nEnter: flag | Esc: cancel", note.value))
        .block(Block::default().borders(Borders::ALL).title("Needs clarification"));
    f.render_widget(p, area);
}

// Split Page

fn draw_split(f: &mut Frame, area: Rect, editor: &SplitEditor) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(6)])
        .split(area);

    let set = &editor.set;
    let header = Row::new(vec!["Name", "Percent", "Amount", "Lock"]).height(1);
    let body: Vec<Row> = set.participants().iter().enumerate().map(|(i, p)| {
        let (pct, amt) = match (&editor.editing, set.mode()) {
            (Some(edit), AllocationMode::Percentage) if i == editor.selected => {
                (format!("[{}]", edit.value), fmt_money(&p.amount))
            }
            (Some(edit), AllocationMode::Amount) if i == editor.selected => {
                (fmt_pct(&p.percentage), format!("[{}]", edit.value))
            }
            _ => (fmt_pct(&p.percentage), fmt_money(&p.amount)),
        };
        Row::new(vec![
            Cell::from(p.name.clone()),
            Cell::from(pct),
            Cell::from(amt),
            Cell::from(if p.locked { "locked" } else { "" }),
        ])
    }).collect();

    let widths = [
        Constraint::Percentage(40),
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Length(8),
    ];

    let mut sel = TableState::default();
    sel.select(Some(editor.selected));
    let title = format!(
        "Split '{}' {}  [{} mode]",
        editor.expense.description,
        fmt_money(&set.total()),
        set.mode().as_str()
    );
    let table = Table::new(body, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_stateful_widget(table, rows[0], &mut sel);

    let (state_line, style) = match editor.save_blocker() {
        Some(reason) => (format!("Not saveable: {reason}"), Style::default().fg(Color::Red)),
        None => ("Ready to save".to_string(), Style::default().fg(Color::Green)),
    };
    let footer = vec![
        Line::from(format!(
            "Sum: {}  {} of {}  Unallocated: {}",
            fmt_pct(&set.percentage_sum()),
            fmt_money(&set.amount_sum()),
            fmt_money(&set.total()),
            fmt_money(&set.unallocated()),
        )),
        Line::from(Span::styled(state_line, style)),
        Line::from(editor.message.clone().unwrap_or_default()),
        Line::from("e/Enter edit | l lock | +/- add/remove | v even | m mode | s save | Esc close"),
    ];
    let p = Paragraph::new(footer).block(Block::default().borders(Borders::ALL));
    f.render_widget(p, rows[1]);
}

fn draw_split_placeholder(f: &mut Frame, area: Rect) {
    let p = Paragraph::new("Select a shared or child expense on the Expenses tab and press Enter.")
        .block(Block::default().borders(Borders::ALL).title("Split"));
    f.render_widget(p, area);
}

// Summary Page

fn draw_summary(f: &mut Frame, area: Rect, app: &App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let mut lines: Vec<Line> = Vec::new();
    match &app.summary {
        Some(s) => {
            for scope in &s.scopes {
                let budget = scope.budget.map(|b| fmt_money(&b)).unwrap_or_else(|| "-".into());
                let remaining = scope.remaining.map(|r| fmt_money(&r)).unwrap_or_else(|| "-".into());
                let style = if scope.over_budget {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default()
                };
                lines.push(Line::from(Span::styled(
                    format!(
                        "{:<9} spent {:>10}  budget {:>10}  left {:>10}",
                        scope.scope.as_str(),
                        fmt_money(&scope.spent),
                        budget,
                        remaining
                    ),
                    style,
                )));
            }
            lines.push(Line::from(format!("Total spent: {}", fmt_money(&s.total_spent))));
            lines.push(Line::from(format!("Needs clarification: {}", s.needs_clarification)));
            lines.push(Line::from(""));
            lines.push(Line::from("Balances (paid - share):"));
            for b in &s.balances {
                lines.push(Line::from(format!(
                    "  {:<12} paid {:>10}  share {:>10}  balance {:>10}",
                    b.name,
                    fmt_money(&b.paid),
                    fmt_money(&b.share),
                    fmt_money(&b.balance)
                )));
            }
        }
        None => lines.push(Line::from("No summary loaded (r to refresh)")),
    }
    let month = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(format!("Month {}  (←/→, r)", app.month)));
    f.render_widget(month, cols[0]);

    let header = Row::new(vec!["Month", "Personal", "Shared", "Child", "Total"]).height(1);
    let (title, body): (String, Vec<Row>) = match &app.yearly {
        Some(y) => (
            format!("Year {}  total {}", y.year, fmt_money(&y.total)),
            y.months.iter().map(|m| {
                Row::new(vec![
                    m.month.clone(),
                    fmt_money(&m.personal),
                    fmt_money(&m.shared),
                    fmt_money(&m.child),
                    fmt_money(&m.total),
                ])
            }).collect(),
        ),
        None => ("Year".into(), Vec::new()),
    };
    let widths = [
        Constraint::Length(8),
        Constraint::Length(11),
        Constraint::Length(11),
        Constraint::Length(11),
        Constraint::Length(11),
    ];
    let table = Table::new(body, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(table, cols[1]);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let help_text = vec![
        "Global Keys:",
        "  q        : Quit App",
        "  ?        : Show this Help tab",
        "  Tab      : Switch tabs (Expenses -> Split -> Summary -> Help)",
        "",
        "Expenses Tab:",
        "  Up/Down  : Navigate list",
        "  Left/Right or [ ] : Previous / next month",
        "  n        : New expense",
        "  Enter    : Open split editor (shared and child expenses)",
        "  c        : Confirm expense",
        "  f        : Flag expense for clarification",
        "  x/Del    : Delete selected expense",
        "  r        : Reload from store",
        "",
        "Split Editor:",
        "  Up/Down  : Select participant",
        "  e/Enter  : Edit percentage or amount (Enter applies, Esc cancels)",
        "  l        : Lock / unlock participant",
        "  + / -    : Add / remove participant",
        "  v        : Distribute evenly (unlocks everybody)",
        "  m        : Switch percentage / amount mode",
        "  s        : Save (only when the split adds up)",
        "  Esc      : Close without saving",
    ].join("\n");

    let p = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title("Help & Keybindings"));

    f.render_widget(p, area);
}

fn center_rect(rect: Rect, w: u16, h: u16) -> Rect {
    let x = rect.x + rect.width.saturating_sub(w) / 2;
    let y = rect.y + rect.height.saturating_sub(h) / 2;
    Rect { x, y, width: w.min(rect.width), height: h.min(rect.height) }
}
