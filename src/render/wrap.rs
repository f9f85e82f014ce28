//! Greedy word wrap for cell text.

/// Break `text` into lines no wider than `max_width`.
///
/// Words are split on single spaces and appended to the current line while
/// the measured line fits. A word that does not fit starts a new line; a
/// single word wider than `max_width` stays whole on its own line.
///
/// ```
/// use bingocard::render::wrap::wrap_text;
///
/// let measure = |s: &str| s.chars().count() as u32;
/// assert_eq!(wrap_text("a bb ccc", 4, measure), vec!["a bb", "ccc"]);
/// ```
pub fn wrap_text(text: &str, max_width: u32, measure: impl Fn(&str) -> u32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split(' ') {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };

        if measure(&candidate) > max_width && !current.is_empty() {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
