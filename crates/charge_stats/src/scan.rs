//! Structural line matching against versioned format descriptors.
//!
//! Patterns use the scanf conventions the charging firmware writes with:
//! - `%d` decimal `i32`, `%x` hexadecimal `u32` (optional `0x`), `%f` decimal `f32`;
//!   each conversion skips leading whitespace.
//! - A whitespace character matches zero or more whitespace characters.
//! - Any other character must match literally.
//! - Text after the last directive is ignored, so a looser pattern also matches a
//!   richer line. [`FormatSet`] therefore tries its formats in declared order.

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scanned {
    Int(i32),
    Hex(u32),
    Float(f32),
}

/// One known line layout: an identifier, a pattern, and one name per conversion.
#[derive(Debug, Clone, Copy)]
pub struct LineFormat {
    pub id: &'static str,
    pub pattern: &'static str,
    pub fields: &'static [&'static str],
}

impl LineFormat {
    pub const fn new(
        id: &'static str,
        pattern: &'static str,
        fields: &'static [&'static str],
    ) -> Self {
        Self {
            id,
            pattern,
            fields,
        }
    }

    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    /// Returns the scanned values only when every conversion in the pattern matched.
    pub fn scan(&self, line: &str) -> Option<ScannedFields> {
        let values = scan_pattern(self.pattern, line)?;
        if values.len() != self.arity() {
            return None;
        }
        Some(ScannedFields {
            format: *self,
            values,
        })
    }
}

/// Formats ordered richest first.
#[derive(Debug, Clone, Copy)]
pub struct FormatSet {
    pub formats: &'static [LineFormat],
}

impl FormatSet {
    pub const fn new(formats: &'static [LineFormat]) -> Self {
        Self { formats }
    }

    /// First format in declared order that structurally matches `line`.
    pub fn match_first(&self, line: &str) -> Option<ScannedFields> {
        self.formats.iter().find_map(|format| format.scan(line))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScannedFields {
    format: LineFormat,
    values: Vec<Scanned>,
}

impl PartialEq for LineFormat {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.pattern == other.pattern
    }
}

impl ScannedFields {
    pub fn format_id(&self) -> &'static str {
        self.format.id
    }

    pub fn values(&self) -> &[Scanned] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<Scanned> {
        let idx = self.format.fields.iter().position(|field| *field == name)?;
        self.values.get(idx).copied()
    }

    pub fn int(&self, name: &str) -> Option<i32> {
        match self.get(name)? {
            Scanned::Int(value) => Some(value),
            _ => None,
        }
    }

    pub fn hex(&self, name: &str) -> Option<u32> {
        match self.get(name)? {
            Scanned::Hex(value) => Some(value),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            Scanned::Float(value) => Some(value),
            _ => None,
        }
    }
}

fn scan_pattern(pattern: &str, line: &str) -> Option<Vec<Scanned>> {
    let pat = pattern.as_bytes();
    let mut cursor = Cursor::new(line);
    let mut out = Vec::new();
    let mut i = 0;

    while i < pat.len() {
        let directive = pat[i];
        if directive == b'%' {
            cursor.skip_whitespace();
            let value = match pat.get(i + 1)? {
                b'd' => Scanned::Int(cursor.int()?),
                b'x' => Scanned::Hex(cursor.hex()?),
                b'f' => Scanned::Float(cursor.float()?),
                _ => return None,
            };
            out.push(value);
            i += 2;
        } else if directive.is_ascii_whitespace() {
            cursor.skip_whitespace();
            i += 1;
        } else {
            if cursor.peek() != Some(directive) {
                return None;
            }
            cursor.pos += 1;
            i += 1;
        }
    }

    Some(out)
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.text.as_bytes().get(self.pos + offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn skip_sign(&mut self) {
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
    }

    /// Advances over ASCII bytes matching `pred`, returning how many were consumed.
    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> usize {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn int(&mut self) -> Option<i32> {
        let start = self.pos;
        self.skip_sign();
        if self.take_while(|b| b.is_ascii_digit()) == 0 {
            self.pos = start;
            return None;
        }
        self.text[start..self.pos].parse().ok()
    }

    fn hex(&mut self) -> Option<u32> {
        if self.peek() == Some(b'0')
            && matches!(self.peek_at(1), Some(b'x' | b'X'))
            && self.peek_at(2).is_some_and(|b| b.is_ascii_hexdigit())
        {
            self.pos += 2;
        }
        let start = self.pos;
        if self.take_while(|b| b.is_ascii_hexdigit()) == 0 {
            return None;
        }
        u32::from_str_radix(&self.text[start..self.pos], 16).ok()
    }

    fn float(&mut self) -> Option<f32> {
        let start = self.pos;
        self.skip_sign();
        let mut digits = self.take_while(|b| b.is_ascii_digit());
        if self.peek() == Some(b'.') {
            self.pos += 1;
            digits += self.take_while(|b| b.is_ascii_digit());
        }
        if digits == 0 {
            self.pos = start;
            return None;
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let mantissa_end = self.pos;
            self.pos += 1;
            self.skip_sign();
            if self.take_while(|b| b.is_ascii_digit()) == 0 {
                self.pos = mantissa_end;
            }
        }
        self.text[start..self.pos].parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAIR: LineFormat = LineFormat::new("pair", "%d,%d", &["a", "b"]);
    const TRIPLE: LineFormat = LineFormat::new("triple", "%d,%d %d", &["a", "b", "c"]);

    #[test]
    fn whitespace_directive_matches_zero_or_more() {
        let fmt = LineFormat::new("ws", "%d, %d", &["a", "b"]);
        assert_eq!(fmt.scan("1,2").unwrap().int("b"), Some(2));
        assert_eq!(fmt.scan("1,   2").unwrap().int("b"), Some(2));
        assert!(fmt.scan("1 ,2").is_none());
    }

    #[test]
    fn trailing_text_is_ignored_so_order_decides() {
        assert!(PAIR.scan("1,2 3").is_some());

        const RICHEST_FIRST: FormatSet = FormatSet::new(&[TRIPLE, PAIR]);
        let matched = RICHEST_FIRST.match_first("1,2 3").unwrap();
        assert_eq!(matched.format_id(), "triple");
        assert_eq!(matched.int("c"), Some(3));

        let matched = RICHEST_FIRST.match_first("1,2").unwrap();
        assert_eq!(matched.format_id(), "pair");
    }

    #[test]
    fn hex_accepts_optional_prefix() {
        let fmt = LineFormat::new("hex", "D:%x,%x", &["a", "b"]);
        let fields = fmt.scan("D:0x1F,ff").unwrap();
        assert_eq!(fields.hex("a"), Some(0x1f));
        assert_eq!(fields.hex("b"), Some(0xff));
        assert_eq!(fmt.scan("D:ffffffff,0").unwrap().hex("a"), Some(u32::MAX));
        assert!(fmt.scan("D:,1").is_none());
    }

    #[test]
    fn float_and_int_conversions() {
        let fmt = LineFormat::new("tier", "%d, %f,%d", &["tier", "soc", "cc"]);
        let fields = fmt.scan("3, 51.25,-7").unwrap();
        assert_eq!(fields.int("tier"), Some(3));
        assert_eq!(fields.float("soc"), Some(51.25));
        assert_eq!(fields.int("cc"), Some(-7));
        assert!(fmt.scan("3, .,1").is_none());
        assert!(fmt.scan("3, x,1").is_none());
    }

    #[test]
    fn overflowing_int_does_not_match() {
        assert!(PAIR.scan("99999999999,1").is_none());
    }

    #[test]
    fn typed_accessors_reject_wrong_conversion() {
        let fields = PAIR.scan("1,2").unwrap();
        assert_eq!(fields.hex("a"), None);
        assert_eq!(fields.int("missing"), None);
    }
}
