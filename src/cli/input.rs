use rust_decimal::Decimal;

/// Single-line input editor used by the forms and the split editor.
/// `numeric` editors only accept characters that can form a decimal.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LineEdit {
    pub value: String,
    pub cursor: usize,
    pub numeric: bool,
}

impl LineEdit {
    pub fn numeric() -> Self {
        Self { numeric: true, ..Self::default() }
    }

    pub fn with_value(mut self, s: impl Into<String>) -> Self {
        self.set(s);
        self
    }

    pub fn set(&mut self, s: impl Into<String>) {
        self.value = s.into();
        self.cursor = self.value.len();
    }
    pub fn push(&mut self, ch: char) {
        // a comma is a decimal separator in German locales
        let ch = if self.numeric && ch == ',' { '.' } else { ch };
        if self.numeric && !(ch.is_ascii_digit() || ch == '.' || ch == '-') {
            return;
        }
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }
    pub fn backspace(&mut self) {
        if let Some(ch) = self.value[..self.cursor].chars().next_back() {
            self.cursor -= ch.len_utf8();
            self.value.remove(self.cursor);
        }
    }
    pub fn delete(&mut self) {
        if self.cursor < self.value.len() {
            self.value.remove(self.cursor);
        }
    }
    pub fn left(&mut self) {
        if let Some(ch) = self.value[..self.cursor].chars().next_back() {
            self.cursor -= ch.len_utf8();
        }
    }
    pub fn right(&mut self) {
        if let Some(ch) = self.value[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }
    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }
    pub fn parse_decimal(&self) -> Option<Decimal> {
        self.value.trim().parse::<Decimal>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn numeric_editor_filters_input() {
        let mut e = LineEdit::numeric();
        for ch in "4x2.5€".chars() {
            e.push(ch);
        }
        assert_eq!(e.value, "42.5");
        assert_eq!(e.parse_decimal(), Some(dec!(42.5)));

        e.left();
        e.backspace();
        assert_eq!(e.value, "425");
    }

    #[test]
    fn text_editor_handles_multibyte() {
        let mut e = LineEdit::default().with_value("Bäcker");
        e.left();
        e.backspace();
        e.backspace();
        assert_eq!(e.value, "Bäcr");
        e.clear();
        assert_eq!(e.parse_decimal(), None);
    }
}
