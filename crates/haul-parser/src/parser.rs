//! Line-by-line input file parser
//!
//! [`DirectiveParser`] is a lazy iterator adapter over a stream of lines.
//! Each line is one of:
//!
//! - blank or `# comment`: ignored
//! - `-G [section:]key=<json>`: global directive, queued
//! - `-[section:]key=<json>`: local directive, queued
//! - anything else: a target, which takes every queued directive with it
//!
//! Directives left queued when the input ends are dropped.

use crate::{Directive, EnrichedTarget, InputItem, ParseWarning, Scope};
use tracing::{debug, warn};

/// Lazy parser turning lines into [`InputItem`]s
///
/// Consumes its line source once; it cannot be restarted.
pub struct DirectiveParser<I> {
    lines: I,
    origin: String,
    line_no: usize,
    global_pending: Vec<Directive>,
    local_pending: Vec<Directive>,
    warnings: Vec<ParseWarning>,
}

impl<I, L> DirectiveParser<I>
where
    I: Iterator<Item = L>,
    L: AsRef<str>,
{
    /// Create a parser over any line source
    pub fn new<T>(lines: T) -> Self
    where
        T: IntoIterator<IntoIter = I>,
    {
        Self {
            lines: lines.into_iter(),
            origin: "input file".to_string(),
            line_no: 0,
            global_pending: Vec::new(),
            local_pending: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Name the source in log messages (a path, `stdin`, ...)
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Warnings collected so far
    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    /// Take ownership of the collected warnings
    pub fn into_warnings(self) -> Vec<ParseWarning> {
        self.warnings
    }

    /// Directives queued for the next target
    pub fn pending(&self) -> usize {
        self.global_pending.len() + self.local_pending.len()
    }

    fn queue(&mut self, line: &str) {
        match Directive::parse(line, self.line_no) {
            Ok(directive) => match directive.scope {
                Scope::Global => self.global_pending.push(directive),
                Scope::Local => self.local_pending.push(directive),
            },
            Err(warning) => {
                warn!("{}: {}", self.origin, warning);
                self.warnings.push(warning);
            }
        }
    }

    fn target(&mut self, value: &str) -> InputItem {
        if self.global_pending.is_empty() && self.local_pending.is_empty() {
            return InputItem::Plain(value.to_string());
        }

        InputItem::Enriched(EnrichedTarget {
            value: value.to_string(),
            global_directives: std::mem::take(&mut self.global_pending),
            local_directives: std::mem::take(&mut self.local_pending),
        })
    }
}

impl<I, L> Iterator for DirectiveParser<I>
where
    I: Iterator<Item = L>,
    L: AsRef<str>,
{
    type Item = InputItem;

    fn next(&mut self) -> Option<InputItem> {
        loop {
            let Some(raw) = self.lines.next() else {
                if self.pending() > 0 {
                    debug!(
                        "{}: {} directive(s) after the last target were ignored",
                        self.origin,
                        self.pending()
                    );
                    self.global_pending.clear();
                    self.local_pending.clear();
                }
                return None;
            };
            self.line_no += 1;

            let line = raw.as_ref().trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('-') {
                self.queue(line);
                continue;
            }

            return Some(self.target(line));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GLOBAL_SECTION;
    use serde_json::json;

    fn parse(lines: &[&str]) -> (Vec<InputItem>, Vec<ParseWarning>) {
        let mut parser = DirectiveParser::new(lines.iter().copied());
        let items: Vec<_> = parser.by_ref().collect();
        (items, parser.into_warnings())
    }

    #[test]
    fn directives_attach_to_next_target() {
        let (items, warnings) = parse(&["-G base-directory=\"/tmp\"", "-skip=true", "https://a"]);

        assert!(warnings.is_empty());
        assert_eq!(
            items,
            vec![InputItem::Enriched(EnrichedTarget {
                value: "https://a".to_string(),
                global_directives: vec![Directive::new(
                    Scope::Global,
                    GLOBAL_SECTION,
                    "base-directory",
                    json!("/tmp")
                )],
                local_directives: vec![Directive::new(
                    Scope::Local,
                    GLOBAL_SECTION,
                    "skip",
                    json!(true)
                )],
            })]
        );
    }

    #[test]
    fn target_without_directives_is_plain() {
        let (items, _) = parse(&["-skip=true", "https://a", "https://b"]);

        assert_eq!(items.len(), 2);
        assert!(items[0].is_enriched());
        assert_eq!(items[1], InputItem::Plain("https://b".to_string()));
    }

    #[test]
    fn comments_blanks_and_whitespace_are_ignored() {
        let (items, warnings) = parse(&[
            "# leading comment",
            "",
            "   ",
            "  https://a  ",
            "\t# indented comment",
        ]);

        assert!(warnings.is_empty());
        assert_eq!(items, vec![InputItem::from("https://a")]);
    }

    #[test]
    fn missing_equals_warns_and_is_skipped() {
        let (items, warnings) = parse(&["-badline", "https://a"]);

        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], ParseWarning::InvalidPair { line: 1, .. }));
        assert_eq!(items, vec![InputItem::from("https://a")]);
    }

    #[test]
    fn invalid_json_warns_and_is_skipped() {
        let (items, warnings) = parse(&["-x= not_json", "https://a"]);

        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], ParseWarning::InvalidValue { .. }));
        assert_eq!(items, vec![InputItem::from("https://a")]);
    }

    #[test]
    fn bad_lines_do_not_disturb_good_directives() {
        let (items, warnings) = parse(&["-a=1", "-broken", "-G b=\"x\"", "-c=oops", "https://a"]);

        assert_eq!(warnings.len(), 2);
        let (value, global, local) = items.into_iter().next().unwrap().into_parts();
        assert_eq!(value, "https://a");
        assert_eq!(global.len(), 1);
        assert_eq!(global[0].key, "b");
        assert_eq!(local.len(), 1);
        assert_eq!(local[0].key, "a");
    }

    #[test]
    fn section_prefix_is_parsed() {
        let (items, _) = parse(&["-plugin:opt=1", "https://a"]);
        let (_, _, local) = items.into_iter().next().unwrap().into_parts();
        assert_eq!(local, vec![Directive::new(Scope::Local, "plugin", "opt", json!(1))]);
    }

    #[test]
    fn directives_keep_input_order() {
        let (items, _) = parse(&["-G a=1", "-G a=2", "-b=1", "-b=2", "https://a"]);
        let (_, global, local) = items.into_iter().next().unwrap().into_parts();

        let global: Vec<_> = global.iter().map(|d| d.value.clone()).collect();
        let local: Vec<_> = local.iter().map(|d| d.value.clone()).collect();
        assert_eq!(global, vec![json!(1), json!(2)]);
        assert_eq!(local, vec![json!(1), json!(2)]);
    }

    #[test]
    fn trailing_directives_are_dropped() {
        let (items, warnings) = parse(&["https://a", "-G skip=false", "-skip=true"]);

        assert!(warnings.is_empty());
        assert_eq!(items, vec![InputItem::from("https://a")]);
    }

    #[test]
    fn parsing_is_lazy() {
        let mut parser = DirectiveParser::new(["-a=1", "https://a", "-b=2", "https://b"]);

        let first = parser.next().unwrap();
        assert_eq!(first.value(), "https://a");
        assert_eq!(parser.pending(), 0);

        let second = parser.next().unwrap();
        assert!(second.is_enriched());
        assert!(parser.next().is_none());
        assert!(parser.next().is_none());
    }

    #[test]
    fn warning_line_numbers_count_every_line() {
        let (_, warnings) = parse(&["# comment", "", "-nope", "https://a"]);
        assert_eq!(warnings[0].line(), 3);
    }
}
