//! Text edits and their composition.
//!
//! Code actions describe changes as [`TextEdit`]s against the text the
//! action was computed from. A [`ChangeTracker`] applies one file's edits
//! from end to start so earlier spans stay valid; a [`WorkspaceEdit`] groups
//! edits per file; an [`EditComposer`] merges the output of several actions
//! for "fix all".

use std::collections::BTreeMap;

use elm_ir::{FileUri, Span};

/// A text edit that modifies source code.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct TextEdit {
    /// The span to replace (empty span for insert).
    pub span: Span,
    pub new_text: String,
}

impl TextEdit {
    pub fn replace(span: Span, new_text: impl Into<String>) -> Self {
        TextEdit {
            span,
            new_text: new_text.into(),
        }
    }

    pub fn insert(at: u32, text: impl Into<String>) -> Self {
        TextEdit {
            span: Span::point(at),
            new_text: text.into(),
        }
    }

    pub fn delete(span: Span) -> Self {
        TextEdit {
            span,
            new_text: String::new(),
        }
    }

    pub fn is_insert(&self) -> bool {
        self.span.is_empty() && !self.new_text.is_empty()
    }

    pub fn is_delete(&self) -> bool {
        self.new_text.is_empty() && !self.span.is_empty()
    }

    pub fn is_replace(&self) -> bool {
        !self.is_insert() && !self.is_delete()
    }

    /// Positive = text grows, negative = text shrinks.
    pub fn length_delta(&self) -> i64 {
        let removed = i64::from(self.span.len());
        let added = i64::try_from(self.new_text.len()).unwrap_or(i64::MAX);
        added - removed
    }

    /// Whether applying both edits to the same text is ill-defined.
    ///
    /// Touching ranges are fine. Two insertions at one point are not a
    /// conflict; they apply in order.
    pub fn conflicts_with(&self, other: &TextEdit) -> bool {
        let (a, b) = (self.span, other.span);
        match (a.is_empty(), b.is_empty()) {
            (true, true) => false,
            (true, false) => b.start < a.start && a.start < b.end,
            (false, true) => a.start < b.start && b.start < a.end,
            (false, false) => a.start < b.end && b.start < a.end,
        }
    }
}

/// Two edits in one batch overlap.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("edits overlap: {:?} and {:?}", first.span, second.span)]
pub struct EditConflict {
    pub first: TextEdit,
    pub second: TextEdit,
}

/// Collects one file's edits and applies them in a single pass.
#[derive(Clone, Debug, Default)]
pub struct ChangeTracker {
    edits: Vec<TextEdit>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        ChangeTracker { edits: Vec::new() }
    }

    pub fn from_edits(edits: impl IntoIterator<Item = TextEdit>) -> Self {
        ChangeTracker {
            edits: edits.into_iter().collect(),
        }
    }

    pub fn replace(&mut self, span: Span, text: impl Into<String>) {
        self.edits.push(TextEdit::replace(span, text));
    }

    pub fn insert_before(&mut self, at: u32, text: impl Into<String>) {
        self.edits.push(TextEdit::insert(at, text));
    }

    pub fn insert_after(&mut self, span: Span, text: impl Into<String>) {
        self.edits.push(TextEdit::insert(span.end, text));
    }

    pub fn delete(&mut self, span: Span) {
        self.edits.push(TextEdit::delete(span));
    }

    pub fn push(&mut self, edit: TextEdit) {
        self.edits.push(edit);
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn edits(&self) -> &[TextEdit] {
        &self.edits
    }

    pub fn into_edits(self) -> Vec<TextEdit> {
        self.edits
    }

    /// First pair of overlapping edits, if any.
    pub fn check_conflicts(&self) -> Option<EditConflict> {
        for (i, a) in self.edits.iter().enumerate() {
            for b in &self.edits[i + 1..] {
                if a.conflicts_with(b) {
                    return Some(EditConflict {
                        first: a.clone(),
                        second: b.clone(),
                    });
                }
            }
        }
        None
    }

    /// Apply all edits to `source`.
    ///
    /// Edits apply from end to start. Insertions at the same point end up in
    /// the order they were pushed.
    pub fn apply(&self, source: &str) -> String {
        if self.edits.is_empty() {
            return source.to_string();
        }

        let mut order: Vec<usize> = (0..self.edits.len()).collect();
        order.sort_by(|&a, &b| {
            let (ea, eb) = (&self.edits[a], &self.edits[b]);
            eb.span
                .start
                .cmp(&ea.span.start)
                .then(eb.span.end.cmp(&ea.span.end))
                .then(b.cmp(&a))
        });

        let mut result = source.to_string();
        for idx in order {
            let edit = &self.edits[idx];
            let start = (edit.span.start as usize).min(result.len());
            let end = (edit.span.end as usize).min(result.len()).max(start);
            if !result.is_char_boundary(start) || !result.is_char_boundary(end) {
                tracing::warn!(span = ?edit.span, "edit does not fall on a char boundary");
                continue;
            }
            result.replace_range(start..end, &edit.new_text);
        }
        result
    }

    /// Apply all edits, refusing overlapping ones.
    pub fn apply_checked(&self, source: &str) -> Result<String, EditConflict> {
        if let Some(conflict) = self.check_conflicts() {
            return Err(conflict);
        }
        Ok(self.apply(source))
    }

    pub fn total_delta(&self) -> i64 {
        self.edits.iter().map(TextEdit::length_delta).sum()
    }
}

/// Edits across one or more files, each file's edits against the text the
/// edit was computed from.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct WorkspaceEdit {
    pub changes: BTreeMap<FileUri, Vec<TextEdit>>,
}

impl WorkspaceEdit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Edits to a single file.
    pub fn single(uri: FileUri, edits: Vec<TextEdit>) -> Self {
        let mut changes = BTreeMap::new();
        if !edits.is_empty() {
            changes.insert(uri, edits);
        }
        WorkspaceEdit { changes }
    }

    pub fn push(&mut self, uri: &FileUri, edit: TextEdit) {
        self.changes.entry(uri.clone()).or_default().push(edit);
    }

    pub fn edits_for(&self, uri: &FileUri) -> &[TextEdit] {
        self.changes.get(uri).map_or(&[], Vec::as_slice)
    }

    pub fn files(&self) -> impl Iterator<Item = &FileUri> {
        self.changes.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.values().all(Vec::is_empty)
    }

    /// Apply this edit's changes for `uri` to `text`.
    pub fn apply_to(&self, uri: &FileUri, text: &str) -> String {
        ChangeTracker::from_edits(self.edits_for(uri).iter().cloned()).apply(text)
    }
}

/// Merges several workspace edits, file by file, for "fix all".
///
/// Later edits compose on top of earlier ones:
/// - an edit identical to one already accepted collapses into it;
/// - an insertion at the same point as an accepted insertion is appended
///   to it;
/// - an edit that overlaps an accepted edit is dropped.
#[derive(Debug, Default)]
pub struct EditComposer {
    changes: BTreeMap<FileUri, Vec<TextEdit>>,
    dropped: usize,
}

impl EditComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, edit: &WorkspaceEdit) {
        for (uri, edits) in &edit.changes {
            for e in edits {
                self.add_edit(uri, e.clone());
            }
        }
    }

    pub fn add_edit(&mut self, uri: &FileUri, edit: TextEdit) {
        let accepted = self.changes.entry(uri.clone()).or_default();
        if accepted.contains(&edit) {
            return;
        }
        if edit.is_insert() {
            if let Some(same_point) = accepted
                .iter_mut()
                .find(|e| e.is_insert() && e.span == edit.span)
            {
                same_point.new_text.push_str(&edit.new_text);
                return;
            }
        }
        if let Some(existing) = accepted.iter().find(|e| e.conflicts_with(&edit)) {
            tracing::debug!(
                uri = %uri,
                kept = ?existing.span,
                dropped = ?edit.span,
                "dropping conflicting edit"
            );
            self.dropped += 1;
            return;
        }
        accepted.push(edit);
    }

    /// Number of edits dropped because they overlapped accepted ones.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// The merged edit, each file's edits sorted by position.
    pub fn finish(self) -> WorkspaceEdit {
        let mut changes = self.changes;
        changes.retain(|_, edits| !edits.is_empty());
        for edits in changes.values_mut() {
            edits.sort_by_key(|e| (e.span.start, e.span.end));
        }
        WorkspaceEdit { changes }
    }
}
