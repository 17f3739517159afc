// src/cli/state.rs
use chrono::Datelike;
use rust_decimal::Decimal;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::widgets::TableState;

use crate::cli::editor::{EditorAction, SplitEditor};
use crate::cli::input::LineEdit;
use crate::cli::util;
use crate::database::models::{Expense, ExpenseStatus, ExpenseType, NewExpense};
use crate::service::ExpenseService;
use crate::split::MAX_AMOUNT;
use crate::summary::{MonthlySummary, YearlySummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Expenses,
    Split,
    Summary,
    Help,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Expenses, Tab::Split, Tab::Summary, Tab::Help];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Expenses => "Expenses",
            Tab::Split => "Split",
            Tab::Summary => "Summary",
            Tab::Help => "Help",
        }
    }

    pub fn index(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    fn next(&self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }
}

// 0: Description, 1: Category, 2: Amount, 3: Date, 4: Type, 5: Paid by
pub const FORM_FIELDS: usize = 6;

#[derive(Debug, Clone)]
pub struct ExpenseForm {
    pub description: LineEdit,
    pub category: LineEdit,
    pub amount: LineEdit,
    pub date: LineEdit,
    pub kind: ExpenseType,
    pub paid_by: LineEdit,
    pub focus_index: usize,
    pub error: Option<String>,
}

impl ExpenseForm {
    pub fn new(month: &str) -> Self {
        // default to today when browsing the current month, else the 1st of the shown month
        let today = util::today();
        let date = if util::current_month() == month {
            util::iso(&today)
        } else {
            format!("{month}-01")
        };
        Self {
            description: LineEdit::default(),
            category: LineEdit::default(),
            amount: LineEdit::numeric(),
            date: LineEdit::default().with_value(date),
            kind: ExpenseType::Shared,
            paid_by: LineEdit::default().with_value("Partner 1"),
            focus_index: 0,
            error: None,
        }
    }

    fn focused(&mut self) -> Option<&mut LineEdit> {
        match self.focus_index {
            0 => Some(&mut self.description),
            1 => Some(&mut self.category),
            2 => Some(&mut self.amount),
            3 => Some(&mut self.date),
            5 => Some(&mut self.paid_by),
            _ => None,
        }
    }

    fn cycle_kind(&mut self, delta: i32) {
        let types = ExpenseType::ALL;
        let pos = types.iter().position(|&t| t == self.kind).unwrap_or(0) as i32;
        let len = types.len() as i32;
        self.kind = types[(pos + delta).rem_euclid(len) as usize];
    }

    /// Builds the request, or the message to show next to the form.
    pub fn to_request(&self) -> Result<NewExpense, String> {
        let description = self.description.value.trim();
        if description.is_empty() {
            return Err("Description is required".into());
        }
        let amount = self
            .amount
            .parse_decimal()
            .ok_or_else(|| "Invalid amount format".to_string())?;
        if amount < Decimal::ZERO || amount > MAX_AMOUNT {
            return Err("Amount out of range".into());
        }
        if amount.normalize().scale() > 2 {
            return Err("At most two decimals".into());
        }
        let spent_on = util::parse_date_any(&self.date.value)
            .ok_or_else(|| "Format: YYYY-MM-DD".to_string())?;
        let paid_by = self.paid_by.value.trim();

        Ok(NewExpense {
            description: description.to_string(),
            category: self.category.value.trim().to_string(),
            amount,
            expense_type: self.kind,
            spent_on,
            paid_by: (!paid_by.is_empty()).then(|| paid_by.to_string()),
            distribution: None,
        })
    }
}

pub struct App {
    pub service: ExpenseService,
    pub tab: Tab,
    pub status: String,
    pub quit: bool,
    pub month: String,
    pub expenses: Vec<Expense>,
    pub esel: TableState,
    pub form: Option<ExpenseForm>,
    pub clarifying: Option<LineEdit>,
    pub editor: Option<SplitEditor>,
    pub summary: Option<MonthlySummary>,
    pub yearly: Option<YearlySummary>,
}

impl App {
    pub fn new(service: ExpenseService) -> Self {
        Self {
            status: format!("{} store | Tab: switch | ?: help | q: quit", service.store().kind()),
            service,
            tab: Tab::Expenses,
            quit: false,
            month: util::current_month(),
            expenses: Vec::new(),
            esel: TableState::default(),
            form: None,
            clarifying: None,
            editor: None,
            summary: None,
            yearly: None,
        }
    }

    pub async fn refresh_expenses(&mut self) -> anyhow::Result<()> {
        self.expenses = self.service.expenses_for_month(&self.month).await?;
        let n = self.expenses.len();
        match self.esel.selected() {
            _ if n == 0 => self.esel.select(None),
            Some(i) if i >= n => self.esel.select(Some(n - 1)),
            None => self.esel.select(Some(0)),
            _ => {}
        }
        Ok(())
    }

    pub async fn refresh_summary(&mut self) -> anyhow::Result<()> {
        self.summary = Some(self.service.monthly_summary(&self.month).await?);
        let year = util::parse_date_any(&format!("{}-01", self.month))
            .map(|d| d.year())
            .unwrap_or_else(|| util::today().year());
        self.yearly = Some(self.service.yearly_summary(year).await?);
        Ok(())
    }

    pub fn current_expense(&self) -> Option<&Expense> {
        let idx = self.esel.selected()?;
        self.expenses.get(idx)
    }

    fn move_expense(&mut self, delta: isize) {
        let n = self.expenses.len();
        if n == 0 { self.esel.select(None); return; }
        let cur = self.esel.selected().unwrap_or(0) as isize;
        let next = (cur + delta).rem_euclid(n as isize) as usize;
        self.esel.select(Some(next));
    }

    pub async fn handle_key(&mut self, k: KeyEvent) -> anyhow::Result<()> {
        if k.kind != KeyEventKind::Press { return Ok(()); }

        if self.form.is_some() {
            return self.handle_form_input(k).await;
        }
        if self.clarifying.is_some() {
            return self.handle_clarify_input(k).await;
        }
        if self.tab == Tab::Split && self.editor.is_some() {
            return self.handle_split_key(k).await;
        }

        match k.code {
            KeyCode::Char('q') => {
                self.quit = true;
                return Ok(());
            }
            KeyCode::Tab => {
                self.tab = self.tab.next();
                if self.tab == Tab::Summary {
                    self.load_summary().await;
                }
                return Ok(());
            }
            KeyCode::Char('?') => {
                self.tab = Tab::Help;
                return Ok(());
            }
            _ => {}
        }

        match self.tab {
            Tab::Expenses => match k.code {
                KeyCode::Up => self.move_expense(-1),
                KeyCode::Down => self.move_expense(1),
                KeyCode::Left | KeyCode::Char('[') => self.change_month(-1).await,
                KeyCode::Right | KeyCode::Char(']') => self.change_month(1).await,
                KeyCode::Char('n') => self.form = Some(ExpenseForm::new(&self.month)),
                KeyCode::Char('x') | KeyCode::Delete => self.delete_current().await,
                KeyCode::Char('c') => self.confirm_current().await,
                KeyCode::Char('f') => {
                    if self.current_expense().is_some() {
                        self.clarifying = Some(LineEdit::default());
                    }
                }
                KeyCode::Enter => self.open_split(),
                KeyCode::Char('r') => {
                    self.service.refresh();
                    self.reload().await;
                }
                _ => {}
            },
            Tab::Split => {
                if k.code == KeyCode::Esc {
                    self.tab = Tab::Expenses;
                }
            }
            Tab::Summary => match k.code {
                KeyCode::Left | KeyCode::Char('[') => {
                    self.change_month(-1).await;
                    self.load_summary().await;
                }
                KeyCode::Right | KeyCode::Char(']') => {
                    self.change_month(1).await;
                    self.load_summary().await;
                }
                KeyCode::Char('r') => self.load_summary().await,
                KeyCode::Esc => self.tab = Tab::Expenses,
                _ => {}
            },
            Tab::Help => match k.code {
                KeyCode::Esc | KeyCode::Char('b') => self.tab = Tab::Expenses,
                _ => {}
            },
        }
        Ok(())
    }

    async fn reload(&mut self) {
        if let Err(e) = self.refresh_expenses().await {
            self.status = format!("Load failed: {e}");
        }
    }

    async fn load_summary(&mut self) {
        if let Err(e) = self.refresh_summary().await {
            self.status = format!("Summary failed: {e}");
        }
    }

    async fn change_month(&mut self, delta: i32) {
        self.month = util::shift_month(&self.month, delta);
        self.esel.select(None);
        self.reload().await;
    }

    async fn delete_current(&mut self) {
        let Some(expense) = self.current_expense().cloned() else { return };
        match self.service.delete_expense(&expense).await {
            Ok(()) => {
                self.status = format!("Deleted '{}'.", expense.description);
                self.reload().await;
            }
            Err(e) => self.status = format!("Delete failed: {e}"),
        }
    }

    async fn confirm_current(&mut self) {
        let Some(expense) = self.current_expense().cloned() else { return };
        match self.service.set_status(&expense, ExpenseStatus::Confirmed, None).await {
            Ok(()) => {
                self.status = "Confirmed.".into();
                self.reload().await;
            }
            Err(e) => self.status = format!("Update failed: {e}"),
        }
    }

    fn open_split(&mut self) {
        let Some(expense) = self.current_expense().cloned() else { return };
        if !expense.expense_type.is_split() {
            self.status = "Personal expenses are not split.".into();
            return;
        }
        match self.service.open_distribution(&expense) {
            Ok(set) => {
                self.editor = Some(SplitEditor::new(expense, set));
                self.tab = Tab::Split;
            }
            Err(e) => self.status = format!("Cannot open split: {e}"),
        }
    }

    async fn handle_split_key(&mut self, k: KeyEvent) -> anyhow::Result<()> {
        let Some(editor) = self.editor.as_mut() else { return Ok(()) };
        match editor.handle_key(k) {
            EditorAction::None => {}
            EditorAction::Close => {
                self.editor = None;
                self.tab = Tab::Expenses;
            }
            EditorAction::Save => {
                let expense = editor.expense.clone();
                let set = editor.set.clone();
                match self.service.save_distribution(&expense, &set).await {
                    Ok(()) => {
                        self.status = format!("Split for '{}' saved.", expense.description);
                        self.editor = None;
                        self.tab = Tab::Expenses;
                        self.reload().await;
                    }
                    Err(e) => {
                        if let Some(editor) = self.editor.as_mut() {
                            editor.message = Some(format!("Save failed: {e}"));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    async fn handle_form_input(&mut self, k: KeyEvent) -> anyhow::Result<()> {
        let Some(form) = self.form.as_mut() else { return Ok(()) };
        match k.code {
            KeyCode::Esc => self.form = None,
            KeyCode::Enter => {
                let req = match form.to_request() {
                    Ok(req) => req,
                    Err(msg) => {
                        form.error = Some(msg);
                        return Ok(());
                    }
                };
                match self.service.add_expense(&req).await {
                    Ok(expense) => {
                        self.status = format!("Added '{}'.", expense.description);
                        self.form = None;
                        self.reload().await;
                    }
                    Err(e) => {
                        if let Some(form) = self.form.as_mut() {
                            form.error = Some(format!("Save failed: {e}"));
                        }
                    }
                }
            }
            KeyCode::Tab | KeyCode::Down => {
                form.focus_index = (form.focus_index + 1) % FORM_FIELDS;
            }
            KeyCode::BackTab | KeyCode::Up => {
                form.focus_index = (form.focus_index + FORM_FIELDS - 1) % FORM_FIELDS;
            }
            KeyCode::Left if form.focus_index == 4 => form.cycle_kind(-1),
            KeyCode::Right if form.focus_index == 4 => form.cycle_kind(1),
            KeyCode::Char(c) => {
                if let Some(field) = form.focused() {
                    field.push(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = form.focused() {
                    field.backspace();
                }
            }
            KeyCode::Left => {
                if let Some(field) = form.focused() {
                    field.left();
                }
            }
            KeyCode::Right => {
                if let Some(field) = form.focused() {
                    field.right();
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn handle_clarify_input(&mut self, k: KeyEvent) -> anyhow::Result<()> {
        let Some(note) = self.clarifying.as_mut() else { return Ok(()) };
        match k.code {
            KeyCode::Esc => self.clarifying = None,
            KeyCode::Enter => {
                let note = note.value.trim().to_string();
                self.clarifying = None;
                let Some(expense) = self.current_expense().cloned() else { return Ok(()) };
                let note = (!note.is_empty()).then_some(note);
                match self
                    .service
                    .set_status(&expense, ExpenseStatus::NeedsClarification, note.as_deref())
                    .await
                {
                    Ok(()) => {
                        self.status = "Flagged for clarification.".into();
                        self.reload().await;
                    }
                    Err(e) => self.status = format!("Update failed: {e}"),
                }
            }
            KeyCode::Char(c) => note.push(c),
            KeyCode::Backspace => note.backspace(),
            KeyCode::Left => note.left(),
            KeyCode::Right => note.right(),
            _ => {}
        }
        Ok(())
    }
}
