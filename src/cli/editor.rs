// src/cli/editor.rs
// Split editor: key handling on top of an AllocationSet. No I/O here, the App
// decides what to do with the returned EditorAction.
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::cli::input::LineEdit;
use crate::database::models::Expense;
use crate::split::{AllocationMode, AllocationSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    None,
    Save,
    Close,
}

#[derive(Debug, Clone)]
pub struct SplitEditor {
    pub expense: Expense,
    pub set: AllocationSet,
    pub selected: usize,
    pub editing: Option<LineEdit>,
    pub message: Option<String>,
}

impl SplitEditor {
    pub fn new(expense: Expense, set: AllocationSet) -> Self {
        Self {
            expense,
            set,
            selected: 0,
            editing: None,
            message: None,
        }
    }

    fn selected_id(&self) -> Option<String> {
        self.set.participants().get(self.selected).map(|p| p.id.clone())
    }

    fn clamp_selection(&mut self) {
        let n = self.set.len();
        if n == 0 {
            self.selected = 0;
        } else if self.selected >= n {
            self.selected = n - 1;
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let n = self.set.len();
        if n == 0 { return; }
        let next = (self.selected as isize + delta).rem_euclid(n as isize) as usize;
        self.selected = next;
    }

    /// Why saving is not possible right now, if it isn't.
    pub fn save_blocker(&self) -> Option<String> {
        if self.set.is_over_allocated() {
            return Some("over-allocated".into());
        }
        self.set.validate().err().map(|e| e.to_string())
    }

    pub fn handle_key(&mut self, k: KeyEvent) -> EditorAction {
        if k.kind != KeyEventKind::Press { return EditorAction::None; }

        if self.editing.is_some() {
            self.handle_edit_input(k);
            return EditorAction::None;
        }

        self.message = None;
        match k.code {
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Char('e') | KeyCode::Enter => self.start_edit(),
            KeyCode::Char('l') => {
                if let Some(id) = self.selected_id() {
                    self.set.toggle_lock(&id);
                }
            }
            KeyCode::Char('+') => {
                if let Err(e) = self.set.add_participant() {
                    self.message = Some(e.to_string());
                } else {
                    self.selected = self.set.len().saturating_sub(1);
                }
            }
            KeyCode::Char('-') => {
                if let Some(id) = self.selected_id() {
                    if let Err(e) = self.set.remove_participant(&id) {
                        self.message = Some(e.to_string());
                    }
                    self.clamp_selection();
                }
            }
            KeyCode::Char('v') => self.set.distribute_evenly(),
            KeyCode::Char('m') => self.set.switch_mode(),
            KeyCode::Char('s') => match self.save_blocker() {
                Some(reason) => self.message = Some(format!("Cannot save: {reason}")),
                None => return EditorAction::Save,
            },
            KeyCode::Esc => return EditorAction::Close,
            _ => {}
        }
        EditorAction::None
    }

    fn start_edit(&mut self) {
        let Some(p) = self.set.participants().get(self.selected) else { return };
        if p.locked {
            self.message = Some(format!("{} is locked (l to unlock)", p.name));
            return;
        }
        let current = match self.set.mode() {
            AllocationMode::Percentage => p.percentage,
            AllocationMode::Amount => p.amount,
        };
        self.editing = Some(LineEdit::numeric().with_value(current.normalize().to_string()));
    }

    fn handle_edit_input(&mut self, k: KeyEvent) {
        let Some(edit) = self.editing.as_mut() else { return };
        match k.code {
            KeyCode::Char(c) => edit.push(c),
            KeyCode::Backspace => edit.backspace(),
            KeyCode::Delete => edit.delete(),
            KeyCode::Left => edit.left(),
            KeyCode::Right => edit.right(),
            KeyCode::Esc => self.editing = None,
            KeyCode::Enter => {
                let parsed = edit.parse_decimal();
                self.editing = None;
                match (parsed, self.selected_id()) {
                    (Some(value), Some(id)) => match self.set.mode() {
                        AllocationMode::Percentage => self.set.set_percentage(&id, value),
                        AllocationMode::Amount => self.set.set_amount(&id, value),
                    },
                    (None, _) => self.message = Some("Not a number".into()),
                    _ => {}
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{ExpenseStatus, ExpenseType};
    use crate::split::SplitPolicy;
    use chrono::NaiveDate;
    use crossterm::event::KeyModifiers;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn editor(total: Decimal) -> SplitEditor {
        let spent_on = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let expense = Expense {
            id: 7,
            description: "Groceries".into(),
            category: "food".into(),
            amount: total,
            expense_type: ExpenseType::Shared,
            spent_on,
            paid_by: None,
            status: ExpenseStatus::Confirmed,
            clarification_note: None,
            distribution: None,
            created_at: spent_on.and_hms_opt(9, 0, 0).unwrap(),
        };
        let set = AllocationSet::default_split(total, SplitPolicy::default()).unwrap();
        SplitEditor::new(expense, set)
    }

    fn press(ed: &mut SplitEditor, code: KeyCode) -> EditorAction {
        ed.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(ed: &mut SplitEditor, s: &str) {
        for c in s.chars() {
            press(ed, KeyCode::Char(c));
        }
    }

    #[test]
    fn edit_percentage_rebalances_the_other_partner() {
        let mut ed = editor(dec!(200));
        press(&mut ed, KeyCode::Char('e'));
        let edit = ed.editing.as_mut().unwrap();
        edit.clear();
        type_str(&mut ed, "70");
        press(&mut ed, KeyCode::Enter);

        assert!(ed.editing.is_none());
        let p = ed.set.participants();
        assert_eq!(p[0].percentage, dec!(70));
        assert_eq!(p[1].percentage, dec!(30));
        assert_eq!(p[1].amount, dec!(60));
        assert_eq!(press(&mut ed, KeyCode::Char('s')), EditorAction::Save);
    }

    #[test]
    fn locked_participant_cannot_be_edited() {
        let mut ed = editor(dec!(100));
        press(&mut ed, KeyCode::Char('l'));
        press(&mut ed, KeyCode::Char('e'));

        assert!(ed.editing.is_none());
        assert!(ed.message.as_deref().unwrap().contains("locked"));
    }

    #[test]
    fn add_remove_and_even() {
        let mut ed = editor(dec!(90));
        press(&mut ed, KeyCode::Char('+'));
        assert_eq!(ed.set.len(), 3);
        assert_eq!(ed.selected, 2);

        press(&mut ed, KeyCode::Char('v'));
        let sum: Decimal = ed.set.participants().iter().map(|p| p.percentage).sum();
        assert_eq!(sum, dec!(100));

        press(&mut ed, KeyCode::Char('-'));
        assert_eq!(ed.set.len(), 2);
        assert_eq!(ed.selected, 1);
    }

    #[test]
    fn save_is_blocked_while_over_allocated() {
        let mut ed = editor(dec!(100));
        press(&mut ed, KeyCode::Char('m'));
        assert_eq!(ed.set.mode(), AllocationMode::Amount);

        // partner 2 locked, so nothing can absorb the raise
        press(&mut ed, KeyCode::Down);
        press(&mut ed, KeyCode::Char('l'));
        press(&mut ed, KeyCode::Up);
        press(&mut ed, KeyCode::Char('e'));
        ed.editing.as_mut().unwrap().clear();
        type_str(&mut ed, "80");
        press(&mut ed, KeyCode::Enter);

        assert!(ed.set.is_over_allocated());
        assert_eq!(press(&mut ed, KeyCode::Char('s')), EditorAction::None);
        assert_eq!(ed.message.as_deref(), Some("Cannot save: over-allocated"));
    }

    #[test]
    fn bad_input_and_escape() {
        let mut ed = editor(dec!(100));
        press(&mut ed, KeyCode::Char('e'));
        ed.editing.as_mut().unwrap().clear();
        press(&mut ed, KeyCode::Enter);
        assert_eq!(ed.message.as_deref(), Some("Not a number"));
        assert_eq!(ed.set.participants()[0].percentage, dec!(50));

        assert_eq!(press(&mut ed, KeyCode::Esc), EditorAction::Close);
    }
}
