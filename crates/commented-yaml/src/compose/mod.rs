//! Builds a [`Document`] from an event stream, attributing comments as it goes.

pub(crate) mod arena;
mod attribution;
mod buffer;
mod sink;

use core::mem;
use std::collections::HashMap;

use tracing::{debug, trace, warn};

use self::arena::{Arena, ValueId};
use self::attribution::Target;
use self::buffer::{Cluster, Pending};
use self::sink::{Depth, Sink, SinkStack, SinkTarget};
use crate::error::{Error, KeyPath};
use crate::event::{CollectionStyle, CommentKind, Event, EventKind, EventSource, Mark};
use crate::options::{DuplicateKeyPolicy, ReadOptions};
use crate::resolve::{self, Nulls};
use crate::value::{Document, Scalar};

/// Compose the single document in `source`.
///
/// Returns `Ok(None)` when the stream holds no document.
///
/// # Errors
///
/// Fails on a malformed event stream, a non-mapping root, more than one
/// document, undefined or recursive aliases, too many collection aliases, and
/// duplicate keys under [`DuplicateKeyPolicy::Error`].
#[tracing::instrument(level = "debug", skip_all)]
pub fn compose<S: EventSource>(
    source: S,
    options: &ReadOptions,
) -> Result<Option<Document>, Error> {
    Composer::new(source, options).document()
}

struct Composer<'o, S> {
    source: S,
    options: &'o ReadOptions,
    peeked: Option<Event>,
    buffer: Vec<Pending>,
    stack: SinkStack,
    arena: Arena,
    header: Vec<String>,
    footer: Vec<String>,
    anchors: HashMap<String, ValueId>,
    /// Collections whose end event has not been seen yet.
    open: Vec<ValueId>,
    collection_aliases: usize,
    path: KeyPath,
    line: usize,
}

impl<'o, S: EventSource> Composer<'o, S> {
    fn new(source: S, options: &'o ReadOptions) -> Self {
        Self {
            source,
            options,
            peeked: None,
            buffer: Vec::new(),
            stack: SinkStack::default(),
            arena: Arena::default(),
            header: Vec::new(),
            footer: Vec::new(),
            anchors: HashMap::new(),
            open: Vec::new(),
            collection_aliases: 0,
            path: KeyPath::new(),
            line: 0,
        }
    }

    fn error(&self, err: Error) -> Error {
        err.at_path(&self.path).at_line(self.line)
    }

    fn end_of_stream(&self) -> Error {
        self.error(Error::malformed("unexpected end of event stream"))
    }

    /// Pull events until a structural one is available, buffering comments.
    fn fill(&mut self) -> Result<(), Error> {
        while self.peeked.is_none() {
            let Some(event) = self.source.next_event()? else {
                return Err(self.end_of_stream());
            };
            match event.kind {
                EventKind::Comment { text, kind } => self.buffer.push(Pending {
                    kind,
                    text,
                    mark: event.start,
                }),
                kind => self.peeked = Some(Event { kind, ..event }),
            }
        }
        Ok(())
    }

    fn peek(&mut self) -> Result<&Event, Error> {
        self.fill()?;
        match &self.peeked {
            Some(event) => Ok(event),
            None => Err(self.end_of_stream()),
        }
    }

    fn next(&mut self) -> Result<Event, Error> {
        self.fill()?;
        let event = self.peeked.take().ok_or_else(|| self.end_of_stream())?;
        self.line = event.start.line;
        Ok(event)
    }

    fn expect(&mut self, expected: &EventKind) -> Result<Event, Error> {
        let event = self.next()?;
        if event.kind == *expected {
            Ok(event)
        } else {
            Err(self.error(Error::malformed(format!(
                "expected {}, found {}",
                expected.describe(),
                event.kind.describe()
            ))))
        }
    }

    fn document(mut self) -> Result<Option<Document>, Error> {
        self.expect(&EventKind::StreamStart)?;
        if self.peek()?.kind == EventKind::StreamEnd {
            self.next()?;
            debug!("stream holds no document");
            return Ok(None);
        }
        self.expect(&EventKind::DocumentStart)?;
        self.stack.push(Sink::header());

        let root_kind = &self.peek()?.kind;
        if !matches!(root_kind, EventKind::MappingStart { .. }) {
            let found = root_kind.describe();
            return Err(self.error(Error::malformed(format!(
                "document root must be a mapping, found {found}"
            ))));
        }
        let root = self.node(SinkTarget::Header)?;
        self.expect(&EventKind::DocumentEnd)?;

        let after = self.next()?;
        match after.kind {
            EventKind::StreamEnd => {}
            EventKind::DocumentStart => {
                return Err(self.error(Error::malformed(
                    "stream contains more than one document",
                )));
            }
            other => {
                return Err(self.error(Error::malformed(format!(
                    "expected stream end, found {}",
                    other.describe()
                ))));
            }
        }
        self.open_sink(Sink::footer());

        let root = self
            .arena
            .materialize_root(root)
            .ok_or_else(|| Error::malformed("document root must be a mapping"))?;
        debug!(
            keys = root.len(),
            header = self.header.len(),
            footer = self.footer.len(),
            "document composed"
        );
        Ok(Some(Document {
            header: self.header,
            root,
            footer: self.footer,
        }))
    }

    fn node(&mut self, holder: SinkTarget) -> Result<ValueId, Error> {
        let event = self.next()?;
        match event.kind {
            EventKind::Scalar {
                value,
                anchor,
                tag,
                implicit,
                ..
            } => {
                let scalar = resolve_scalar(value, tag.as_deref(), implicit, Nulls::Resolve);
                let id = self.arena.scalar(scalar);
                self.register(anchor, id);
                Ok(id)
            }
            EventKind::Alias { anchor } => self.alias(&anchor),
            EventKind::MappingStart { anchor, style } => {
                self.mapping(event.start, anchor, style, holder)
            }
            EventKind::SequenceStart { anchor, style } => {
                self.sequence(event.start, anchor, style, holder)
            }
            other => Err(self.error(Error::malformed(format!(
                "expected a value, found {}",
                other.describe()
            )))),
        }
    }

    fn register(&mut self, anchor: Option<String>, id: ValueId) {
        if let Some(name) = anchor {
            trace!(anchor = %name, "anchor registered");
            self.anchors.insert(name, id);
        }
    }

    fn alias(&mut self, name: &str) -> Result<ValueId, Error> {
        let Some(&target) = self.anchors.get(name) else {
            return Err(self.error(Error::reference(format!(
                "alias `*{name}` refers to an undefined anchor"
            ))));
        };
        if self.arena.is_collection(target) {
            if self.open.contains(&target) {
                return Err(self.error(Error::cycle(format!(
                    "alias `*{name}` refers to a collection that contains it"
                ))));
            }
            self.collection_aliases += 1;
            let limit = self.options.max_non_scalar_aliases;
            if self.collection_aliases > limit {
                return Err(self.error(Error::resource_exhausted(format!(
                    "more than {limit} aliases refer to lists or trees"
                ))));
            }
            debug!(alias = %name, count = self.collection_aliases, "collection alias expanded");
        }
        Ok(target)
    }

    fn mapping(
        &mut self,
        start: Mark,
        anchor: Option<String>,
        style: CollectionStyle,
        holder: SinkTarget,
    ) -> Result<ValueId, Error> {
        let id = self.arena.tree();
        self.register(anchor, id);
        self.open.push(id);
        let outer = self.enter_flow(style, holder, start);
        while self.peek()?.kind != EventKind::MappingEnd {
            self.map_entry(id)?;
        }
        let end = self.next()?;
        self.leave_flow(outer, holder, start, end.start);
        self.open.pop();
        Ok(id)
    }

    fn map_entry(&mut self, tree: ValueId) -> Result<(), Error> {
        let key_event = self.next()?;
        let key = match key_event.kind {
            EventKind::Scalar {
                value,
                anchor,
                tag,
                implicit,
                ..
            } => {
                let scalar = resolve_scalar(value, tag.as_deref(), implicit, Nulls::Keep);
                let text = scalar.key_text();
                if anchor.is_some() {
                    let id = self.arena.scalar(scalar);
                    self.register(anchor, id);
                }
                text
            }
            EventKind::Alias { anchor } => {
                let target = self.alias(&anchor)?;
                let Some(scalar) = self.arena.as_scalar(target) else {
                    return Err(self.error(Error::malformed(format!(
                        "unsupported key shape: alias `*{anchor}` used as a key refers to a collection"
                    ))));
                };
                scalar.key_text()
            }
            other => {
                return Err(self.error(Error::malformed(format!(
                    "unsupported key shape: mapping keys must be scalars, found {}",
                    other.describe()
                ))));
            }
        };

        let entry = self.arena.entry(key_event.start.line);
        let replace = self.options.duplicate_keys == DuplicateKeyPolicy::LastWins;
        if self
            .arena
            .insert_key(tree, key.clone(), entry, replace)
            .is_some()
        {
            if !replace {
                return Err(self.error(Error::malformed(format!("duplicate key `{key}`"))));
            }
            warn!(key = %key, line = key_event.start.line + 1, "duplicate key, keeping the last value");
        }

        let target = SinkTarget::Entry(entry);
        self.open_sink(Sink::new(target, Depth::at(key_event.start.col)));
        self.path.push_key(key);
        let value = self.node(target)?;
        self.arena.set_value(entry, value);
        self.path.pop();
        Ok(())
    }

    fn sequence(
        &mut self,
        start: Mark,
        anchor: Option<String>,
        style: CollectionStyle,
        holder: SinkTarget,
    ) -> Result<ValueId, Error> {
        let id = self.arena.list();
        self.register(anchor, id);
        self.open.push(id);
        let outer = self.enter_flow(style, holder, start);
        let mut index = 0;
        loop {
            let element = self.peek()?;
            if element.kind == EventKind::SequenceEnd {
                break;
            }
            let element_start = element.start;
            // Block elements share the column of their `-` indicators.
            let col = match style {
                CollectionStyle::Block => start.col,
                CollectionStyle::Flow => element_start.col,
            };
            let entry = self.arena.entry(element_start.line);
            self.arena.push_element(id, entry);
            let target = SinkTarget::Entry(entry);
            self.open_sink(Sink::new(target, Depth::at(col)));
            self.path.push_index(index);
            let value = self.node(target)?;
            self.arena.set_value(entry, value);
            self.path.pop();
            index += 1;
        }
        let end = self.next()?;
        self.leave_flow(outer, holder, start, end.start);
        self.open.pop();
        Ok(id)
    }

    /// Start a flow collection in its own attribution scope.
    ///
    /// The enclosing stack is set aside and replaced by a boundary sink for the
    /// collection's holder at the opening delimiter.
    fn enter_flow(
        &mut self,
        style: CollectionStyle,
        holder: SinkTarget,
        start: Mark,
    ) -> Option<SinkStack> {
        if style != CollectionStyle::Flow {
            return None;
        }
        let outer = mem::take(&mut self.stack);
        self.stack.push(Sink::new(holder, Depth::at(start.col)));
        Some(outer)
    }

    /// Close a flow scope opened by [`Self::enter_flow`].
    ///
    /// Comments left of both delimiters belong to the enclosing scope and are
    /// handed back to it; the rest are attributed against a closing boundary
    /// spanning the delimiters before the enclosing stack is restored.
    fn leave_flow(&mut self, outer: Option<SinkStack>, holder: SinkTarget, start: Mark, end: Mark) {
        let Some(outer) = outer else {
            return;
        };
        let outdented = buffer::split_outdented(&mut self.buffer, start.col.min(end.col));
        self.open_sink(Sink::closing(holder, Depth::between(start.col, end.col)));
        for sink in self.stack.drain() {
            trace!(target = ?sink.target, "sink finalized with flow scope");
        }
        self.stack = outer;
        self.buffer = outdented;
    }

    /// Attribute the buffered comments, then make `incoming` visible in place
    /// of every sink it obscures.
    fn open_sink(&mut self, incoming: Sink) {
        if !self.buffer.is_empty() {
            let clusters = buffer::partition(mem::take(&mut self.buffer));
            let targets = attribution::attribute(&clusters, &self.stack, incoming.depth);
            for (cluster, target) in clusters.into_iter().zip(targets) {
                let (sink, below) = match target {
                    Target::Visible(index) => match self.stack.get(index) {
                        Some(sink) => (*sink, true),
                        None => (incoming, incoming.closing),
                    },
                    Target::Incoming => (incoming, incoming.closing),
                };
                trace!(
                    target = ?sink.target,
                    below,
                    lines = cluster.len(),
                    weight = cluster.weight,
                    "cluster attributed"
                );
                self.deliver(sink.target, cluster, below);
            }
        }
        for sink in self.stack.obscure(incoming.depth) {
            trace!(target = ?sink.target, "sink finalized");
        }
        self.stack.push(incoming);
    }

    fn deliver(&mut self, target: SinkTarget, cluster: Cluster, below: bool) {
        let lines = cluster.lines.into_iter();
        match target {
            SinkTarget::Header => self.header.extend(lines.map(|p| p.text)),
            SinkTarget::Footer => self.footer.extend(lines.map(|p| p.text)),
            SinkTarget::Entry(id) => {
                let Some(entry) = self.arena.entry_mut(id) else {
                    return;
                };
                let comments = &mut entry.comments;
                if !below {
                    comments.above.extend(lines.map(|p| p.text));
                    return;
                }
                for (i, line) in lines.enumerate() {
                    if i == 0 && line.kind == CommentKind::Inline && comments.inline.is_empty() {
                        comments.inline.push(line.text);
                    } else {
                        comments.below.push(line.text);
                    }
                }
            }
        }
    }
}

fn resolve_scalar(value: String, tag: Option<&str>, implicit: bool, nulls: Nulls) -> Scalar {
    if implicit {
        return resolve::resolve_plain(&value, nulls);
    }
    match tag {
        Some(tag) => resolve::resolve_tagged(&value, tag),
        None => Scalar::String(value),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::ErrorKind;
    use crate::event::EventQueue;
    use crate::value::{Entry, Value};

    /// Builds positioned events line by line.
    struct Script(Vec<Event>);

    impl Script {
        fn new() -> Self {
            Self(vec![
                Event::at(EventKind::StreamStart, 0, 0),
                Event::at(EventKind::DocumentStart, 0, 0),
            ])
        }

        fn push(mut self, kind: EventKind, line: usize, col: usize) -> Self {
            self.0.push(Event::at(kind, line, col));
            self
        }

        fn map(self, line: usize, col: usize) -> Self {
            self.push(EventKind::block_mapping(), line, col)
        }

        fn seq(self, line: usize, col: usize) -> Self {
            self.push(EventKind::block_sequence(), line, col)
        }

        fn scalar(self, text: &str, line: usize, col: usize) -> Self {
            self.push(EventKind::plain(text), line, col)
        }

        fn comment(self, text: &str, line: usize, col: usize) -> Self {
            self.push(EventKind::comment(text, CommentKind::Block), line, col)
        }

        fn inline(self, text: &str, line: usize, col: usize) -> Self {
            self.push(EventKind::comment(text, CommentKind::Inline), line, col)
        }

        fn blank(self, line: usize) -> Self {
            self.push(EventKind::blank(), line, 0)
        }

        fn end(self, kind: EventKind, line: usize) -> Self {
            self.push(kind, line, 0)
        }

        fn finish(self, line: usize) -> EventQueue {
            self.end(EventKind::DocumentEnd, line)
                .end(EventKind::StreamEnd, line)
                .0
                .into_iter()
                .collect()
        }

        fn compose(self, line: usize) -> Result<Option<Document>, Error> {
            compose(self.finish(line), &ReadOptions::default())
        }
    }

    fn read(script: Script, line: usize) -> Document {
        script
            .compose(line)
            .expect("composes")
            .expect("has a document")
    }

    #[test]
    fn empty_stream_has_no_document() {
        let events = EventQueue::new([
            Event::at(EventKind::StreamStart, 0, 0),
            Event::at(EventKind::comment("lonely", CommentKind::Block), 0, 0),
            Event::at(EventKind::StreamEnd, 1, 0),
        ]);
        assert_eq!(compose(events, &ReadOptions::default()).expect("ok"), None);
    }

    #[test]
    fn header_inline_and_above() {
        // # head
        // a: 1 # one
        //
        // # about b
        // b: 2
        let doc = read(
            Script::new()
                .comment("head", 0, 0)
                .map(1, 0)
                .scalar("a", 1, 0)
                .scalar("1", 1, 3)
                .inline("one", 1, 5)
                .blank(2)
                .comment("about b", 3, 0)
                .scalar("b", 4, 0)
                .scalar("2", 4, 3)
                .end(EventKind::MappingEnd, 5),
            5,
        );
        assert_eq!(doc.header, ["head"]);
        let a = doc.root.get("a").expect("a");
        assert_eq!(a.comments.inline, ["one"]);
        assert_eq!(a.line, Some(1));
        let b = doc.root.get("b").expect("b");
        assert_eq!(b.comments.above, ["about b"]);
        assert_eq!(b.value, Value::from(2_i64));
    }

    #[test]
    fn footer_after_blank_line() {
        // a: 1
        // # below a
        //
        // # foot
        let doc = read(
            Script::new()
                .map(0, 0)
                .scalar("a", 0, 0)
                .scalar("1", 0, 3)
                .comment("below a", 1, 0)
                .blank(2)
                .comment("foot", 3, 0)
                .end(EventKind::MappingEnd, 4),
            4,
        );
        assert_eq!(doc.root.get("a").expect("a").comments.below, ["below a"]);
        assert_eq!(doc.footer, ["foot"]);
    }

    #[test]
    fn nested_sink_obscures_parent_siblings() {
        // a:
        //   b: 1
        //
        //   # near c
        //   c: 2
        let doc = read(
            Script::new()
                .map(0, 0)
                .scalar("a", 0, 0)
                .map(1, 2)
                .scalar("b", 1, 2)
                .scalar("1", 1, 5)
                .blank(2)
                .comment("near c", 3, 2)
                .scalar("c", 4, 2)
                .scalar("2", 4, 5)
                .end(EventKind::MappingEnd, 5)
                .end(EventKind::MappingEnd, 5),
            5,
        );
        let inner = doc
            .root
            .get("a")
            .and_then(|a| a.value.as_tree())
            .expect("nested tree");
        assert_eq!(inner.get("c").expect("c").comments.above, ["near c"]);
        assert!(inner.get("b").expect("b").comments.is_empty());
    }

    #[test]
    fn list_elements_own_their_comments() {
        // xs:
        //   - one # first
        //
        //   # before two
        //   - two
        let doc = read(
            Script::new()
                .map(0, 0)
                .scalar("xs", 0, 0)
                .seq(1, 2)
                .scalar("one", 1, 4)
                .inline("first", 1, 8)
                .blank(2)
                .comment("before two", 3, 2)
                .scalar("two", 4, 4)
                .end(EventKind::SequenceEnd, 5)
                .end(EventKind::MappingEnd, 5),
            5,
        );
        let items = doc
            .root
            .get("xs")
            .and_then(|e| e.value.as_list())
            .expect("list");
        assert_eq!(items[0].comments.inline, ["first"]);
        assert_eq!(items[1].comments.above, ["before two"]);
        assert_eq!(items[1].line, Some(4));
    }

    #[test]
    fn root_must_be_a_mapping() {
        let err = Script::new()
            .seq(0, 0)
            .end(EventKind::SequenceEnd, 1)
            .compose(1)
            .expect_err("sequence root");
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert!(err.message().contains("found a sequence"));

        let err = Script::new()
            .scalar("x", 0, 0)
            .compose(1)
            .expect_err("scalar root");
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }

    #[test]
    fn second_document_is_rejected() {
        let mut events = Script::new()
            .map(0, 0)
            .end(EventKind::MappingEnd, 0)
            .end(EventKind::DocumentEnd, 0)
            .0;
        events.push(Event::at(EventKind::DocumentStart, 1, 0));
        let err = compose(EventQueue::new(events), &ReadOptions::default())
            .expect_err("two documents");
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert!(err.message().contains("more than one document"));
    }

    #[test]
    fn truncated_stream_is_malformed() {
        let events = EventQueue::new([
            Event::at(EventKind::StreamStart, 0, 0),
            Event::at(EventKind::DocumentStart, 0, 0),
            Event::at(EventKind::block_mapping(), 0, 0),
            Event::at(EventKind::plain("a"), 0, 0),
        ]);
        let err = compose(events, &ReadOptions::default()).expect_err("truncated");
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert_eq!(err.path().to_string(), "a");
    }

    #[test]
    fn collection_keys_are_rejected() {
        let err = Script::new()
            .map(0, 0)
            .seq(0, 0)
            .compose(1)
            .expect_err("sequence key");
        assert!(err.message().contains("unsupported key shape"));
    }

    #[test]
    fn duplicate_keys_follow_policy() {
        let script = || {
            Script::new()
                .map(0, 0)
                .scalar("k", 0, 0)
                .scalar("1", 0, 3)
                .scalar("k", 1, 0)
                .scalar("2", 1, 3)
                .end(EventKind::MappingEnd, 2)
        };
        let err = script().compose(2).expect_err("duplicate");
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert_eq!(err.line(), Some(1));

        let options = ReadOptions {
            duplicate_keys: DuplicateKeyPolicy::LastWins,
            ..ReadOptions::default()
        };
        let doc = compose(script().finish(2), &options)
            .expect("last wins")
            .expect("document");
        assert_eq!(doc.root.get("k"), Some(&Entry::new(2_i64)));
        assert_eq!(doc.root.len(), 1);
    }

    #[test]
    fn empty_implicit_key_is_null_text() {
        let doc = read(
            Script::new()
                .map(0, 0)
                .scalar("", 0, 0)
                .scalar("v", 0, 2)
                .scalar("~", 1, 0)
                .scalar("", 1, 2)
                .end(EventKind::MappingEnd, 2),
            2,
        );
        assert_eq!(doc.root.keys().collect::<Vec<_>>(), ["null", "~"]);
        assert_eq!(
            doc.root.get("~").map(Entry::value),
            Some(&Value::Scalar(Scalar::Null))
        );
    }
}
