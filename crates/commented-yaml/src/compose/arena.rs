//! Working storage for a document under composition.
//!
//! Values and entries are addressed by index so that sinks can hold a handle
//! to an entry while its value is still being built, and so that aliases share
//! the anchored value until the tree is materialized.

use indexmap::IndexMap;
use indexmap::map::Entry as MapEntry;

use crate::comments::CommentData;
use crate::value::{Entry, Scalar, Tree, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ValueId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct EntryId(usize);

impl EntryId {
    #[cfg(test)]
    pub fn from_raw(raw: usize) -> Self {
        Self(raw)
    }
}

#[derive(Debug)]
enum Draft {
    Scalar(Scalar),
    List(Vec<EntryId>),
    Tree(IndexMap<String, EntryId>),
}

#[derive(Debug, Default)]
pub(crate) struct DraftEntry {
    pub value: Option<ValueId>,
    pub line: Option<usize>,
    pub comments: CommentData,
}

#[derive(Debug, Default)]
pub(crate) struct Arena {
    values: Vec<Draft>,
    entries: Vec<DraftEntry>,
}

impl Arena {
    fn alloc(&mut self, draft: Draft) -> ValueId {
        self.values.push(draft);
        ValueId(self.values.len() - 1)
    }

    pub fn scalar(&mut self, scalar: Scalar) -> ValueId {
        self.alloc(Draft::Scalar(scalar))
    }

    pub fn list(&mut self) -> ValueId {
        self.alloc(Draft::List(Vec::new()))
    }

    pub fn tree(&mut self) -> ValueId {
        self.alloc(Draft::Tree(IndexMap::new()))
    }

    pub fn entry(&mut self, line: usize) -> EntryId {
        self.entries.push(DraftEntry {
            line: Some(line),
            ..DraftEntry::default()
        });
        EntryId(self.entries.len() - 1)
    }

    pub fn entry_mut(&mut self, id: EntryId) -> Option<&mut DraftEntry> {
        self.entries.get_mut(id.0)
    }

    pub fn set_value(&mut self, entry: EntryId, value: ValueId) {
        if let Some(draft) = self.entries.get_mut(entry.0) {
            draft.value = Some(value);
        }
    }

    pub fn is_collection(&self, id: ValueId) -> bool {
        matches!(
            self.values.get(id.0),
            Some(Draft::List(_) | Draft::Tree(_))
        )
    }

    pub fn as_scalar(&self, id: ValueId) -> Option<&Scalar> {
        match self.values.get(id.0) {
            Some(Draft::Scalar(scalar)) => Some(scalar),
            _ => None,
        }
    }

    pub fn push_element(&mut self, list: ValueId, entry: EntryId) {
        if let Some(Draft::List(items)) = self.values.get_mut(list.0) {
            items.push(entry);
        }
    }

    /// Add `key` to `tree`. When the key already exists the previous entry is
    /// returned and, if `replace` is set, superseded in place.
    pub fn insert_key(
        &mut self,
        tree: ValueId,
        key: String,
        entry: EntryId,
        replace: bool,
    ) -> Option<EntryId> {
        let Some(Draft::Tree(map)) = self.values.get_mut(tree.0) else {
            return None;
        };
        match map.entry(key) {
            MapEntry::Vacant(slot) => {
                slot.insert(entry);
                None
            }
            MapEntry::Occupied(mut slot) if replace => Some(slot.insert(entry)),
            MapEntry::Occupied(slot) => Some(*slot.get()),
        }
    }

    /// Build the owned value for `id`, copying shared (aliased) values.
    pub fn materialize(&self, id: ValueId) -> Value {
        match self.values.get(id.0) {
            Some(Draft::Scalar(scalar)) => Value::Scalar(scalar.clone()),
            Some(Draft::List(items)) => {
                Value::List(items.iter().map(|&e| self.materialize_entry(e)).collect())
            }
            Some(Draft::Tree(map)) => Value::Tree(self.materialize_tree(map)),
            None => Value::Scalar(Scalar::Null),
        }
    }

    pub fn materialize_root(&self, id: ValueId) -> Option<Tree> {
        match self.values.get(id.0) {
            Some(Draft::Tree(map)) => Some(self.materialize_tree(map)),
            _ => None,
        }
    }

    fn materialize_tree(&self, map: &IndexMap<String, EntryId>) -> Tree {
        map.iter()
            .map(|(key, &entry)| (key.clone(), self.materialize_entry(entry)))
            .collect()
    }

    fn materialize_entry(&self, id: EntryId) -> Entry {
        let Some(draft) = self.entries.get(id.0) else {
            return Entry::new(Scalar::Null);
        };
        Entry {
            value: draft
                .value
                .map_or(Value::Scalar(Scalar::Null), |v| self.materialize(v)),
            line: draft.line,
            comments: draft.comments.clone(),
        }
    }
}
