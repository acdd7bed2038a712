//! `[current/total] target` progress lines

use haul_config::ConfigStore;
use serde_json::Value;
use std::fmt::Display;
use std::io::{self, Write};

/// Template used when `output.progress` is `true`
pub const DEFAULT_PROGRESS_FORMAT: &str = "[{current}/{total}] {url}";

/// Pass-through iterator that reports each item before yielding it
///
/// The total is fixed when the wrapper is built, so it takes an
/// already-collected list. Items come out unchanged and in order.
pub struct Progress<T, W> {
    items: std::vec::IntoIter<T>,
    total: usize,
    current: usize,
    template: String,
    out: W,
}

impl<T> Progress<T, io::Stderr> {
    /// Report to stderr
    pub fn stderr(items: Vec<T>, template: impl Into<String>) -> Self {
        Self::new(items, template, io::stderr())
    }
}

impl<T, W: Write> Progress<T, W> {
    /// Report to `out`
    pub fn new(items: Vec<T>, template: impl Into<String>, out: W) -> Self {
        Self {
            total: items.len(),
            items: items.into_iter(),
            current: 0,
            template: template.into(),
            out,
        }
    }

    /// Recover the output stream
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Fill in `{current}`, `{total}` and `{url}`
pub fn render_progress(template: &str, current: usize, total: usize, url: &str) -> String {
    template
        .replace("{current}", &current.to_string())
        .replace("{total}", &total.to_string())
        .replace("{url}", url)
}

/// Progress template configured at `output.progress`, if reporting is enabled
///
/// Absent or `true` selects [`DEFAULT_PROGRESS_FORMAT`], a non-empty string is
/// used as the template, anything else turns reporting off.
pub fn progress_template(config: &ConfigStore) -> Option<String> {
    match config.get("output", "progress") {
        None | Some(Value::Bool(true)) => Some(DEFAULT_PROGRESS_FORMAT.to_string()),
        Some(Value::String(template)) if !template.is_empty() => Some(template.clone()),
        Some(_) => None,
    }
}

impl<T: Display, W: Write> Iterator for Progress<T, W> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let item = self.items.next()?;
        self.current += 1;

        let line = render_progress(&self.template, self.current, self.total, &item.to_string());
        // Progress is diagnostics only; a closed stderr must not stop the batch
        let _ = writeln!(self.out, "{}", line);

        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl<T: Display, W: Write> ExactSizeIterator for Progress<T, W> {}
