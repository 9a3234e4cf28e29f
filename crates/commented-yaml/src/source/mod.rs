//! Event source backed by `saphyr-parser`.

mod scan;

use alloc::borrow::Cow;
use alloc::collections::VecDeque;
use std::collections::HashMap;

use saphyr_parser::{Event as RawEvent, Marker, Parser, ScanError, Span, Tag};

use self::scan::{Protected, SourceComment};
use crate::error::Error;
use crate::event::{CollectionStyle, Event, EventKind, EventSource, Mark, ScalarStyle};

/// Events for one YAML text, with comments and blank lines interleaved by
/// position.
#[derive(Debug, Clone)]
pub struct SaphyrSource {
    events: VecDeque<Event>,
}

impl SaphyrSource {
    /// Parse `content` eagerly.
    ///
    /// # Errors
    ///
    /// Returns a syntax error for invalid YAML and a reference error for an
    /// alias to an undefined anchor.
    pub fn new(content: &str) -> Result<Self, Error> {
        let raw = collect_events(content)?;
        let chars: Vec<char> = content.chars().collect();
        let protected = protected_ranges(&raw, &chars);
        let comments = scan::scan(content, &protected);

        let mut converter = Converter {
            chars: &chars,
            anchors: HashMap::new(),
            flow: Vec::new(),
        };
        let structural: Vec<Event> = raw
            .into_iter()
            .filter_map(|(event, span)| {
                let kind = converter.convert(event, span)?;
                Some(Event::new(kind, mark(span.start), mark(span.end)))
            })
            .collect();
        tracing::debug!(
            events = structural.len(),
            comments = comments.len(),
            "collected source events"
        );
        Ok(Self {
            events: interleave(structural, comments),
        })
    }

    /// Remaining events, for inspection.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }
}

impl EventSource for SaphyrSource {
    fn next_event(&mut self) -> Result<Option<Event>, Error> {
        Ok(self.events.pop_front())
    }
}

fn collect_events(content: &str) -> Result<Vec<(RawEvent<'_>, Span)>, Error> {
    Parser::new_from_str(content)
        .map(|result| result.map_err(scan_error))
        .collect()
}

fn scan_error(err: ScanError) -> Error {
    let line = err.marker().line().saturating_sub(1);
    let info = err.info();
    if info.contains("unknown anchor") {
        Error::reference("alias refers to an undefined anchor").at_line(line)
    } else {
        Error::syntax(info.to_string()).at_line(line)
    }
}

fn mark(marker: Marker) -> Mark {
    Mark::new(marker.line().saturating_sub(1), marker.col())
}

/// Char ranges whose `#` and blank lines are scalar content.
///
/// Quoted scalars end at their closing quote; the parser's span runs on to
/// the end of the line. Block scalars are protected from the line after their
/// header (which may carry a comment) to their last non-whitespace character.
fn protected_ranges(raw: &[(RawEvent<'_>, Span)], chars: &[char]) -> Vec<Protected> {
    use saphyr_parser::ScalarStyle as Style;

    let mut ranges: Vec<Protected> = raw
        .iter()
        .filter_map(|(event, span)| {
            let RawEvent::Scalar(_, style, _, _) = event else {
                return None;
            };
            let start = span.start.index().min(chars.len());
            let end = span.end.index().clamp(start, chars.len());
            let range = match style {
                Style::SingleQuoted => quoted_range(chars, start, '\'', end),
                Style::DoubleQuoted => quoted_range(chars, start, '"', end),
                Style::Literal | Style::Folded => block_range(chars, start, end),
                Style::Plain => Protected { start, end },
            };
            (range.start < range.end).then_some(range)
        })
        .collect();
    ranges.sort_by_key(|range| range.start);
    ranges
}

/// From the opening `quote` at or after `from` through its closing quote.
///
/// Backslash escapes in double quotes and `''` in single quotes do not close
/// the scalar. Falls back to `fallback` as the end when no closing quote is found.
fn quoted_range(chars: &[char], from: usize, quote: char, fallback: usize) -> Protected {
    let Some(open) = chars[from..].iter().position(|&c| c == quote).map(|at| from + at) else {
        return Protected {
            start: from,
            end: fallback,
        };
    };
    let mut i = open + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' if quote == '"' => i += 2,
            c if c == quote && quote == '\'' && chars.get(i + 1) == Some(&'\'') => i += 2,
            c if c == quote => {
                return Protected {
                    start: open,
                    end: i + 1,
                };
            }
            _ => i += 1,
        }
    }
    Protected {
        start: open,
        end: fallback.max(open + 1),
    }
}

/// Body of a literal or folded scalar, starting at the line after its header.
///
/// The span may start at the header or at the first body character, so walk
/// back over whitespace to the header line before looking for its newline.
fn block_range(chars: &[char], start: usize, end: usize) -> Protected {
    let mut header = start;
    while header > 0 && chars[header - 1].is_whitespace() {
        header -= 1;
    }
    let body = chars[header..end]
        .iter()
        .position(|&c| c == '\n')
        .map_or(end, |at| header + at + 1);
    let mut end = end;
    while end > body && chars[end - 1].is_whitespace() {
        end -= 1;
    }
    Protected { start: body, end }
}

struct Converter<'a> {
    chars: &'a [char],
    anchors: HashMap<usize, String>,
    /// Flow-ness of each open collection.
    flow: Vec<bool>,
}

impl Converter<'_> {
    fn convert(&mut self, event: RawEvent<'_>, span: Span) -> Option<EventKind> {
        Some(match event {
            RawEvent::Nothing => return None,
            RawEvent::StreamStart => EventKind::StreamStart,
            RawEvent::StreamEnd => EventKind::StreamEnd,
            RawEvent::DocumentStart(_) => EventKind::DocumentStart,
            RawEvent::DocumentEnd => EventKind::DocumentEnd,
            RawEvent::Alias(id) => EventKind::Alias {
                anchor: self
                    .anchors
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| format!("anchor{id}")),
            },
            RawEvent::Scalar(value, style, id, tag) => {
                let implicit = style == saphyr_parser::ScalarStyle::Plain && tag.is_none();
                // An omitted node arrives as `~` positioned on some other token.
                let omitted = value == "~" && self.chars.get(span.start.index()) != Some(&'~');
                let value = if implicit && omitted {
                    String::new()
                } else {
                    value.into_owned()
                };
                EventKind::Scalar {
                    value,
                    style: scalar_style(style),
                    anchor: self.anchor(id, span),
                    tag: tag.as_ref().map(tag_text),
                    implicit,
                }
            }
            RawEvent::SequenceStart(id, _) => EventKind::SequenceStart {
                anchor: self.anchor(id, span),
                style: self.open_collection(span, '['),
            },
            RawEvent::MappingStart(id, _) => EventKind::MappingStart {
                anchor: self.anchor(id, span),
                style: self.open_collection(span, '{'),
            },
            RawEvent::SequenceEnd => {
                self.flow.pop();
                EventKind::SequenceEnd
            }
            RawEvent::MappingEnd => {
                self.flow.pop();
                EventKind::MappingEnd
            }
        })
    }

    fn open_collection(&mut self, span: Span, delimiter: char) -> CollectionStyle {
        let flow = self.flow.last().copied().unwrap_or(false)
            || self.chars.get(span.start.index()) == Some(&delimiter);
        self.flow.push(flow);
        if flow {
            CollectionStyle::Flow
        } else {
            CollectionStyle::Block
        }
    }

    fn anchor(&mut self, id: usize, span: Span) -> Option<String> {
        if id == 0 {
            return None;
        }
        let name = anchor_before(self.chars, span.start.index())
            .unwrap_or_else(|| format!("anchor{id}"));
        self.anchors.insert(id, name.clone());
        Some(name)
    }
}

/// Name of the `&anchor` property directly preceding the node at `start`,
/// possibly separated from it by whitespace and a tag.
fn anchor_before(chars: &[char], start: usize) -> Option<String> {
    let mut end = start.min(chars.len());
    for _ in 0..2 {
        while end > 0 && chars[end - 1].is_whitespace() {
            end -= 1;
        }
        let token_start = chars[..end]
            .iter()
            .rposition(|c| c.is_whitespace())
            .map_or(0, |at| at + 1);
        let token = &chars[token_start..end];
        match token.first() {
            Some('&') if token.len() > 1 => {
                return Some(token[1..].iter().take_while(|&&c| is_anchor_char(c)).collect());
            }
            Some('!') => end = token_start,
            _ => return None,
        }
    }
    None
}

fn is_anchor_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '[' | ']' | '{' | '}' | ',')
}

fn tag_text(tag: &Cow<'_, Tag>) -> String {
    if tag.is_yaml_core_schema() || tag.handle == "!!" {
        format!("!!{}", tag.suffix)
    } else {
        tag.to_string()
    }
}

fn scalar_style(style: saphyr_parser::ScalarStyle) -> ScalarStyle {
    match style {
        saphyr_parser::ScalarStyle::Plain => ScalarStyle::Plain,
        saphyr_parser::ScalarStyle::SingleQuoted => ScalarStyle::SingleQuoted,
        saphyr_parser::ScalarStyle::DoubleQuoted => ScalarStyle::DoubleQuoted,
        saphyr_parser::ScalarStyle::Literal => ScalarStyle::Literal,
        saphyr_parser::ScalarStyle::Folded => ScalarStyle::Folded,
    }
}

/// Merge comments into the structural stream: each comment is placed before
/// the first structural event that starts after it.
fn interleave(structural: Vec<Event>, comments: Vec<SourceComment>) -> VecDeque<Event> {
    let mut merged = VecDeque::with_capacity(structural.len() + comments.len());
    let mut comments = comments.into_iter().peekable();
    for event in structural {
        while let Some(comment) = comments.next_if(|c| c.mark < event.start) {
            merged.push_back(comment_event(comment));
        }
        merged.push_back(event);
    }
    merged.extend(comments.map(comment_event));
    merged
}

fn comment_event(comment: SourceComment) -> Event {
    let end = Mark::new(
        comment.mark.line,
        comment.mark.col + comment.text.chars().count(),
    );
    Event::new(
        EventKind::Comment {
            text: comment.text,
            kind: comment.kind,
        },
        comment.mark,
        end,
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::ErrorKind;
    use crate::event::CommentKind;

    fn kinds(content: &str) -> Vec<EventKind> {
        SaphyrSource::new(content)
            .expect("valid yaml")
            .events()
            .map(|e| e.kind.clone())
            .collect()
    }

    #[test]
    fn comments_precede_the_next_structural_event() {
        assert_eq!(
            kinds("# head\na: 1 # one\n\nb: 2\n"),
            vec![
                EventKind::StreamStart,
                EventKind::comment("head", CommentKind::Block),
                EventKind::DocumentStart,
                EventKind::block_mapping(),
                EventKind::plain("a"),
                EventKind::plain("1"),
                EventKind::comment("one", CommentKind::Inline),
                EventKind::blank(),
                EventKind::plain("b"),
                EventKind::plain("2"),
                EventKind::MappingEnd,
                EventKind::DocumentEnd,
                EventKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn positions_are_zero_based() {
        let source = SaphyrSource::new("a:\n  b: 1\n").expect("valid yaml");
        let b = source
            .events()
            .find(|e| e.kind == EventKind::plain("b"))
            .expect("key b");
        assert_eq!(b.start, Mark::new(1, 2));
    }

    #[test]
    fn flow_collections_are_marked() {
        let events = kinds("a: [1, {b: 2}]\n");
        let styles: Vec<CollectionStyle> = events
            .iter()
            .filter_map(|kind| match kind {
                EventKind::MappingStart { style, .. } | EventKind::SequenceStart { style, .. } => {
                    Some(*style)
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            styles,
            vec![
                CollectionStyle::Block,
                CollectionStyle::Flow,
                CollectionStyle::Flow
            ]
        );
    }

    #[test]
    fn anchors_and_aliases_share_names() {
        let events = kinds("base: &base\n  x: 1\nother: *base\n");
        assert!(events.contains(&EventKind::MappingStart {
            anchor: Some("base".to_string()),
            style: CollectionStyle::Block,
        }));
        assert!(events.contains(&EventKind::Alias {
            anchor: "base".to_string()
        }));
    }

    #[test]
    fn omitted_value_is_empty_implicit_scalar() {
        let events = kinds("a:\n");
        assert!(events.contains(&EventKind::plain("")));
    }

    #[test]
    fn core_tags_use_shorthand() {
        let events = kinds("a: !!str 12\n");
        assert!(events.contains(&EventKind::Scalar {
            value: "12".to_string(),
            style: ScalarStyle::Plain,
            anchor: None,
            tag: Some("!!str".to_string()),
            implicit: false,
        }));
    }

    #[test]
    fn hashes_inside_scalars_are_not_comments() {
        let events = kinds("a: \"x # y\"\nb: |\n  # not a comment\n\n  tail\nc: 1 # yes\n");
        let comments: Vec<&EventKind> = events
            .iter()
            .filter(|kind| matches!(kind, EventKind::Comment { .. }))
            .collect();
        assert_eq!(
            comments,
            vec![&EventKind::comment("yes", CommentKind::Inline)]
        );
    }

    #[test]
    fn quoted_scalars_end_at_their_closing_quote() {
        let events = kinds("a: \"x\" # t\nb: '' # u\nc: \"q\\\"#\" # v\nd: 'it''s # no' # w\n");
        let comments: Vec<&EventKind> = events
            .iter()
            .filter(|kind| matches!(kind, EventKind::Comment { .. }))
            .collect();
        assert_eq!(
            comments,
            vec![
                &EventKind::comment("t", CommentKind::Inline),
                &EventKind::comment("u", CommentKind::Inline),
                &EventKind::comment("v", CommentKind::Inline),
                &EventKind::comment("w", CommentKind::Inline),
            ]
        );
    }

    #[test]
    fn block_scalar_body_is_protected_from_its_first_line() {
        let events = kinds("a: | # header\n\n  # body\nb: 1\n");
        let comments: Vec<&EventKind> = events
            .iter()
            .filter(|kind| matches!(kind, EventKind::Comment { .. }))
            .collect();
        assert_eq!(
            comments,
            vec![&EventKind::comment("header", CommentKind::Inline)]
        );
    }

    #[test]
    fn protected_ranges_follow_scalar_spans() {
        let content = "a: \"x # y\" # real\nb: |\n  one\n\n  # two\nc: 1\n";
        let raw = collect_events(content).expect("valid yaml");
        let chars: Vec<char> = content.chars().collect();
        let ranges = protected_ranges(&raw, &chars);
        // The quoted scalar stops at its closing quote.
        assert!(ranges.contains(&Protected { start: 3, end: 10 }), "{ranges:?}");
        // The block body runs from the line after `|` to the end of `# two`.
        assert!(ranges.contains(&Protected { start: 23, end: 37 }), "{ranges:?}");
    }

    #[test]
    fn undefined_alias_is_a_reference_error() {
        let err = SaphyrSource::new("a: *missing\n").expect_err("unknown anchor");
        assert_eq!(err.kind(), ErrorKind::Reference);
        assert_eq!(err.line(), Some(0));
    }

    #[test]
    fn invalid_yaml_is_a_syntax_error() {
        let err = SaphyrSource::new("a: [1, 2\n").expect_err("unterminated flow");
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }
}
