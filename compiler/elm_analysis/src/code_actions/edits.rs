//! Text helpers shared by the providers.

use elm_diagnostic::TextEdit;
use elm_ir::ast::{ExposedItem, Exposing};
use elm_ir::Span;

/// Offset of the start of the line containing `offset`.
pub(super) fn line_start(text: &str, offset: u32) -> u32 {
    let offset = (offset as usize).min(text.len());
    text[..offset]
        .rfind('\n')
        .map_or(0, |nl| u32::try_from(nl + 1).unwrap_or(u32::MAX))
}

/// Byte column of `offset` on its line.
pub(super) fn column(text: &str, offset: u32) -> usize {
    (offset - line_start(text, offset)) as usize
}

/// Leading whitespace of the line containing `offset`.
pub(super) fn indentation(text: &str, offset: u32) -> &str {
    let start = line_start(text, offset) as usize;
    let line = &text[start..];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

/// `span` extended over the newline that ends its line, if any.
pub(super) fn through_newline(text: &str, span: Span) -> Span {
    match text.get(span.end as usize..) {
        Some(rest) if rest.starts_with("\r\n") => Span::new(span.start, span.end + 2),
        Some(rest) if rest.starts_with('\n') => Span::new(span.start, span.end + 1),
        _ => span,
    }
}

/// `span` shrunk to exclude surrounding whitespace.
pub(super) fn trim(text: &str, span: Span) -> Span {
    let slice = span.slice(text);
    let leading = slice.len() - slice.trim_start().len();
    let trailing = slice.len() - slice.trim_end().len();
    if leading == slice.len() {
        return Span::point(span.start);
    }
    let start = span.start + u32::try_from(leading).unwrap_or(0);
    let end = span.end - u32::try_from(trailing).unwrap_or(0);
    Span::new(start, end)
}

/// Re-indent the lines after the first: text that started at `column`
/// is moved to `indent`.
pub(super) fn reindent(text: &str, column: usize, indent: &str) -> String {
    let mut lines = text.lines();
    let mut out = lines.next().unwrap_or("").to_string();
    for line in lines {
        out.push('\n');
        if line.trim().is_empty() {
            continue;
        }
        let strip = column.min(line.len() - line.trim_start().len());
        out.push_str(indent);
        out.push_str(&line[strip..]);
    }
    out
}

/// Insert `item` at the end of an explicit exposing list.
pub(super) fn append_exposed(exposing: &Exposing, item: &str) -> Option<TextEdit> {
    let last = exposing.items().last()?;
    Some(TextEdit::insert(last.span.end, format!(", {item}")))
}

/// Remove `items[index]` together with one separating comma. `None` when
/// it is the only item: an exposing list cannot be empty.
pub(super) fn remove_exposed(items: &[ExposedItem], index: usize) -> Option<TextEdit> {
    let item = items.get(index)?;
    if items.len() == 1 {
        return None;
    }
    let span = match index.checked_sub(1).and_then(|prev| items.get(prev)) {
        Some(prev) => Span::new(prev.span.end, item.span.end),
        None => Span::new(item.span.start, items.get(1).map_or(item.span.end, |next| next.span.start)),
    };
    Some(TextEdit::delete(span))
}

/// Make `name` unique with respect to `taken`: `name`, `name1`, ...
pub(super) fn fresh_name(name: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(name) {
        return name.to_string();
    }
    (1u32..)
        .map(|n| format!("{name}{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| name.to_string())
}
