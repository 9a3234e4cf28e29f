use commented_yaml::{
    CommentData, Document, Entry, ReadOptions, Scalar, Tree, Value, WriteOptions, read_str,
    write_string,
};
use pretty_assertions::assert_eq;

fn read(input: &str) -> Document {
    read_str(input, &ReadOptions::default())
        .expect("valid document")
        .expect("non-empty document")
}

fn write(document: &Document) -> String {
    write_string(document, &WriteOptions::default()).expect("writable")
}

/// Text already in the writer's layout comes back byte for byte.
#[test]
fn canonical_text_is_stable() {
    let input = "\
# Service configuration

# Where to listen
server:
  host: localhost # loopback only
  port: 8080

  # Seconds
  timeout: 2.5
  # end of server
features:
  - auth # required

  # optional
  - metrics
  - id: 1
    name: \"true\"
empty: {}
nothing: null

# trailing notes
";
    let document = read(input);
    assert_eq!(write(&document), input);
}

#[test]
fn comments_land_on_their_owners() {
    let input = "\
# Service configuration

# Where to listen
server:
  host: localhost # loopback only
  port: 8080

  # Seconds
  timeout: 2.5
# end of server
features:
  - auth # required

  # optional
  - metrics
";
    let doc = read(input);
    assert_eq!(doc.header, ["Service configuration"]);

    let server = doc.root.get("server").expect("server");
    assert_eq!(server.comments.above, ["Where to listen"]);
    assert_eq!(server.line, Some(3));
    let host = doc.root.get_path(&["server", "host"]).expect("host");
    assert_eq!(host.comments.inline, ["loopback only"]);
    let timeout = doc.root.get_path(&["server", "timeout"]).expect("timeout");
    assert_eq!(timeout.comments.above, ["Seconds"]);
    assert_eq!(timeout.comments.below, ["end of server"]);
    assert_eq!(timeout.value, Value::from(2.5));

    let features = doc
        .root
        .get("features")
        .and_then(|e| e.value.as_list())
        .expect("features");
    assert_eq!(features[0].comments.inline, ["required"]);
    assert_eq!(features[1].comments.above, ["optional"]);
    assert_eq!(features[1].line, Some(14));
}

#[test]
fn key_order_is_preserved() {
    let doc = read("zeta: 1\nalpha: 2\nmid: 3\n");
    assert_eq!(doc.root.keys().collect::<Vec<_>>(), ["zeta", "alpha", "mid"]);
    assert_eq!(write(&doc), "zeta: 1\nalpha: 2\nmid: 3\n");
}

#[test]
fn scalars_resolve_with_the_core_schema() {
    let doc = read(
        "n: ~\nb: true\ni: 0x10\nf: -.inf\ns: 'quoted'\nt: !!str 12\nu: yes\nbig: 99999999999999999999\n",
    );
    let value = |key: &str| doc.root.get(key).map(|e| e.value.clone()).expect(key);
    assert_eq!(value("n"), Value::Scalar(Scalar::Null));
    assert_eq!(value("b"), Value::from(true));
    assert_eq!(value("i"), Value::from(16_i64));
    assert_eq!(value("f"), Value::from(f64::NEG_INFINITY));
    assert_eq!(value("s"), Value::from("quoted"));
    assert_eq!(value("t"), Value::from("12"));
    assert_eq!(value("u"), Value::from("yes"));
    assert_eq!(value("big"), Value::from("99999999999999999999"));

    assert_eq!(
        write(&doc),
        "n: null\nb: true\ni: 16\nf: -.inf\ns: quoted\nt: \"12\"\nu: yes\nbig: 99999999999999999999\n"
    );
}

#[test]
fn keys_are_canonical_text() {
    let doc = read("1: one\n0x10: sixteen\ntrue: yes\n~: tilde\n");
    assert_eq!(doc.root.keys().collect::<Vec<_>>(), ["1", "16", "true", "~"]);
}

#[test]
fn hashes_inside_scalars_are_not_comments() {
    let doc = read("a: \"x # y\" # real\nb: |\n  line # kept\n\n  more\n# after b\nc: http://h/#frag\n");
    let a = doc.root.get("a").expect("a");
    assert_eq!(a.value, Value::from("x # y"));
    assert_eq!(a.comments.inline, ["real"]);
    let b = doc.root.get("b").expect("b");
    assert_eq!(b.value, Value::from("line # kept\n\nmore\n"));
    assert_eq!(b.comments.below, ["after b"]);
    assert_eq!(
        doc.root.get("c").map(|e| e.value.clone()),
        Some(Value::from("http://h/#frag"))
    );
}

#[test]
fn comments_after_quoted_scalars_are_kept() {
    let doc = read("a: \"x\" # t\nb: '' # u\nc: \"q\\\"\" # v\nd: 'it''s # no' # w\n");
    for (key, inline) in [("a", "t"), ("b", "u"), ("c", "v"), ("d", "w")] {
        assert_eq!(doc.root.get(key).expect(key).comments.inline, [inline], "{key}");
    }
    assert_eq!(doc.root.get("d").map(|e| e.value.clone()), Some(Value::from("it's # no")));
    assert_eq!(read(&write(&doc)), doc);
}

#[test]
fn quoted_empty_string_keeps_its_empty_inline_comment() {
    let inner: Tree = [(
        "a",
        Entry::new("").with_comments(CommentData::new().with_inline("")),
    )]
    .into_iter()
    .collect();
    let doc = Document::new([("outer", Entry::new(inner))].into_iter().collect());
    let output = write(&doc);
    assert_eq!(output, "outer:\n  a: \"\" #\n");
    assert_eq!(read(&output), doc);
}

#[test]
fn block_scalar_first_line_is_content() {
    let doc = read("a: |\n  # not a comment\n  body\nb: 1\n");
    let a = doc.root.get("a").expect("a");
    assert_eq!(a.value, Value::from("# not a comment\nbody\n"));
    assert!(a.comments.is_empty());
    assert!(doc.root.get("b").expect("b").comments.is_empty());
    assert_eq!(read(&write(&doc)), doc);
}

#[test]
fn flow_collections_are_single_entries_for_outer_comments() {
    let doc = read("a: [1, 2] # after flow\nb: {x: 1} # after map\n\n# about c\nc: 3\n");
    assert_eq!(doc.root.get("a").expect("a").comments.inline, ["after flow"]);
    assert_eq!(doc.root.get("b").expect("b").comments.inline, ["after map"]);
    assert_eq!(doc.root.get("c").expect("c").comments.above, ["about c"]);
    let a = doc
        .root
        .get("a")
        .and_then(|e| e.value.as_list())
        .expect("list");
    assert!(a.iter().all(|item| item.comments.is_empty()));
}

#[test]
fn comments_inside_multiline_flow_stay_inside() {
    let doc = read("a: [\n  1, # one\n  2\n  ] # end\nb: 3\n");
    let a = doc.root.get("a").expect("a");
    assert_eq!(a.comments.inline, ["end"]);
    let items = a.value.as_list().expect("list");
    assert_eq!(items[0].comments.inline, ["one"]);
    assert!(items[1].comments.is_empty());
}

#[test]
fn reread_after_write_is_equal() {
    let input = "\
a: # on a
  b: 1
  # below b
list:
  - x # ex
  # below x
  - - nested
    - items

# footer
";
    let doc = read(input);
    let again = read(&write(&doc));
    assert_eq!(again, doc);
}

#[test]
fn custom_indent_reads_back() {
    let doc = read("a:\n  b:\n    c: 1\n  d:\n    - 1\n");
    let text = write_string(&doc, &WriteOptions { indent: 4 }).expect("writable");
    assert_eq!(text, "a:\n    b:\n        c: 1\n    d:\n        - 1\n");
    assert_eq!(read(&text), doc);
}
