//! Markdown-style task lists: `- [ ] open`, `- [x] done`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static TASK_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*)[-*+]\s+\[([ xX]?)\](?:\s+(.*))?$")
        .unwrap_or_else(|e| panic!("Invalid task line regex: {e}"))
});

/// One checklist line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskItem {
    /// Text after the checkbox, trimmed.
    pub text: String,
    pub is_complete: bool,
    /// Leading whitespace characters, for nesting.
    pub indent: usize,
    /// Zero-based line number in the input.
    pub line: usize,
}

fn strip_line_ending(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

fn parse_line(line: &str, number: usize) -> Option<TaskItem> {
    let caps = TASK_LINE.captures(strip_line_ending(line))?;
    let mark = caps.get(2).map_or("", |m| m.as_str());

    Some(TaskItem {
        text: caps.get(3).map_or("", |m| m.as_str()).trim().to_string(),
        is_complete: mark.eq_ignore_ascii_case("x"),
        indent: caps.get(1).map_or(0, |m| m.as_str().chars().count()),
        line: number,
    })
}

/// Every task line in `text`, in order. Other lines are skipped.
///
/// ```
/// use nodesyntax::features::tasks::parse_task_list;
///
/// let tasks = parse_task_list("- [ ] Buy milk\n- [x] Call client");
/// assert_eq!(tasks.len(), 2);
/// assert!(!tasks[0].is_complete);
/// assert_eq!(tasks[1].text, "Call client");
/// ```
#[must_use]
pub fn parse_task_list(text: &str) -> Vec<TaskItem> {
    text.split_inclusive('\n')
        .enumerate()
        .filter_map(|(number, line)| parse_line(line, number))
        .collect()
}

/// Flip the checkbox on `line`, leaving the rest of the text untouched.
///
/// Returns `None` if that line is not a task.
#[must_use]
pub fn toggle_task(text: &str, line: usize) -> Option<String> {
    let mut out = String::with_capacity(text.len() + 1);
    let mut toggled = false;

    for (number, raw) in text.split_inclusive('\n').enumerate() {
        if number != line {
            out.push_str(raw);
            continue;
        }

        let content = strip_line_ending(raw);
        let caps = TASK_LINE.captures(content)?;
        let mark = caps.get(2)?;
        let replacement = if mark.as_str().eq_ignore_ascii_case("x") { " " } else { "x" };

        out.push_str(&content[..mark.start()]);
        out.push_str(replacement);
        out.push_str(&raw[mark.end()..]);
        toggled = true;
    }

    toggled.then_some(out)
}
