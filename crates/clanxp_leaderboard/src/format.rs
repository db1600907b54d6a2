//! Text helpers for chat markup.

/// Escape underscores so names are not read as italics markup.
pub fn escape_markdown(name: &str) -> String {
    name.replace('_', "\\_")
}

/// Group digits in threes, e.g. `1234567` with `.` becomes `1.234.567`.
pub fn format_thousands(value: i64, separator: char) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(digit);
    }
    grouped
}
