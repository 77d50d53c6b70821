//   Copyright (c) 2024-2026 Anton Kundenko <singaraiona@gmail.com>
//   All rights reserved.
//
//   Permission is hereby granted, free of charge, to any person obtaining a copy
//   of this software and associated documentation files (the "Software"), to deal
//   in the Software without restriction, including without limitation the rights
//   to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
//   copies of the Software, and to permit persons to whom the Software is
//   furnished to do so, subject to the following conditions:
//
//   The above copyright notice and this permission notice shall be included in all
//   copies or substantial portions of the Software.
//
//   THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
//   IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
//   FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
//   AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
//   LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
//   OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
//   SOFTWARE.

use reedline::{ValidationResult, Validator};

/// Input is complete once it ends with `;` outside any quote, comment or
/// open parenthesis. Dot commands complete on a single line.
pub struct SqlValidator;

impl Validator for SqlValidator {
    fn validate(&self, line: &str) -> ValidationResult {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('.') {
            return ValidationResult::Complete;
        }
        if is_complete(trimmed) {
            ValidationResult::Complete
        } else {
            ValidationResult::Incomplete
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Scan {
    Code,
    Single,
    Double,
    Backtick,
    LineComment,
}

fn is_complete(sql: &str) -> bool {
    let mut state = Scan::Code;
    let mut depth: i32 = 0;
    let mut last_code = None;
    let mut chars = sql.chars().peekable();
    while let Some(ch) = chars.next() {
        state = match (state, ch) {
            (Scan::Code, '\'') => Scan::Single,
            (Scan::Code, '"') => Scan::Double,
            (Scan::Code, '`') => Scan::Backtick,
            (Scan::Code, '-') if chars.peek() == Some(&'-') => Scan::LineComment,
            (Scan::Single, '\'') | (Scan::Double, '"') | (Scan::Backtick, '`') => Scan::Code,
            (Scan::LineComment, '\n') => Scan::Code,
            (Scan::Code, c) => {
                match c {
                    '(' => depth += 1,
                    ')' => depth -= 1,
                    _ => {}
                }
                if !c.is_whitespace() {
                    last_code = Some(c);
                }
                Scan::Code
            }
            (s, _) => s,
        };
    }
    matches!(state, Scan::Code | Scan::LineComment) && depth <= 0 && last_code == Some(';')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminator_outside_quotes() {
        assert!(is_complete("select 1;"));
        assert!(!is_complete("select 1"));
        assert!(!is_complete("select ';"));
        assert!(is_complete("select ';';"));
        assert!(is_complete("select 1; -- trailing"));
        assert!(!is_complete("select 1 -- ;"));
    }

    #[test]
    fn open_parens() {
        assert!(!is_complete("select sum(a) over (partition by k;"));
        assert!(is_complete("select sum(a) over (partition by k) from t;"));
    }
}
