//! Property tests for the pipeline invariants.

use proptest::prelude::*;
use pull_xml::events::{Content, Event};
use pull_xml::{parse_bytes, parse_str};

/// Replaces the five reserved characters with their predefined entities.
fn escape(s: &str) -> String {
    let mut out = String::new();
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

fn events(xml: &str) -> Vec<Event> {
    parse_str(xml).collect::<Result<_, _>>().unwrap()
}

fn text_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop::sample::select(vec![
            '&', '<', '>', '\'', '"', 'a', 'b', 'k', 'x', 'y', 'z', ' ',
        ]),
        0..24,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

#[derive(Debug, Clone)]
enum Node {
    Text(String),
    Elem {
        name: String,
        attrs: Vec<(String, String)>,
        children: Vec<Node>,
    },
}

fn attr_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-z]{1,6}",
        1 => Just("xmlns".to_string()),
        1 => "xmlns:[a-z]{1,4}",
    ]
}

fn attrs_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    proptest::collection::vec((attr_name_strategy(), "[a-z ]{0,8}"), 0..3)
}

fn elem_strategy() -> impl Strategy<Value = Node> {
    let leaf = text_strategy().prop_map(Node::Text);
    leaf.prop_recursive(3, 24, 4, |inner| {
        (
            "[a-z]{1,6}",
            attrs_strategy(),
            proptest::collection::vec(inner, 0..4),
        )
            .prop_map(|(name, attrs, children)| Node::Elem {
                name,
                attrs,
                children,
            })
    })
}

/// A whole document: always a single element at the root.
fn doc_strategy() -> impl Strategy<Value = Node> {
    (
        "[a-z]{1,6}",
        attrs_strategy(),
        proptest::collection::vec(elem_strategy(), 0..4),
    )
        .prop_map(|(name, attrs, children)| Node::Elem {
            name,
            attrs,
            children,
        })
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(t) => out.push_str(&escape(t)),
        Node::Elem {
            name,
            attrs,
            children,
        } => {
            out.push('<');
            out.push_str(name);
            for (k, v) in attrs {
                out.push(' ');
                out.push_str(k);
                out.push_str("=\"");
                out.push_str(&escape(v));
                out.push('"');
            }
            if children.is_empty() {
                out.push_str("/>");
            } else {
                out.push('>');
                for child in children {
                    write_node(child, out);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
    }
}

fn render(doc: &Node) -> String {
    let mut out = String::new();
    write_node(doc, &mut out);
    out
}

fn utf16le(text: &str) -> Vec<u8> {
    let mut out = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

proptest! {
    /// Flattening the content of `<t>escaped</t>` recovers the original
    /// text exactly.
    #[test]
    fn entity_round_trip(text in text_strategy()) {
        let xml = format!("<t>{}</t>", escape(&text));
        let mut flat = String::new();
        for event in events(&xml) {
            if let Event::Text(fragment) = event {
                fragment.push_to(&mut flat);
            }
        }
        prop_assert_eq!(flat, text);
    }

    /// `<x a="v"/>` and `<x a="v"></x>` produce identical event sequences.
    #[test]
    fn self_closing_equivalence(name in "[a-z]{1,6}", value in text_strategy()) {
        let value = escape(&value);
        let collapsed = format!("<{} a=\"{}\"/>", name, value);
        let spelled = format!("<{} a=\"{}\"></{}>", name, value, name);
        prop_assert_eq!(events(&collapsed), events(&spelled));
    }

    /// Every emitted stream is framed exactly once and perfectly nested.
    #[test]
    fn balanced_events(doc in doc_strategy()) {
        let evts = events(&render(&doc));
        prop_assert!(matches!(evts.first(), Some(Event::StartDocument(_))));
        prop_assert_eq!(evts.last(), Some(&Event::EndDocument));
        let mut stack = Vec::new();
        for event in &evts[1..evts.len() - 1] {
            match event {
                Event::StartDocument(_) | Event::EndDocument => {
                    return Err(TestCaseError::fail("framing event repeated"));
                }
                Event::Start { name, .. } => stack.push(name.clone()),
                Event::End { name } => {
                    let popped = stack.pop();
                    prop_assert_eq!(popped.as_ref(), Some(name))
                }
                _ => {}
            }
        }
        prop_assert!(stack.is_empty());
    }

    /// No event carries an attribute that was lexically an `xmlns`
    /// declaration, and unprefixed attributes never gain a namespace.
    #[test]
    fn xmlns_hygiene(doc in doc_strategy()) {
        for event in events(&render(&doc)) {
            if let Event::Start { attributes, .. } = event {
                for attr in attributes {
                    prop_assert_ne!(attr.name.prefix.as_deref(), Some("xmlns"));
                    prop_assert!(!(attr.name.prefix.is_none() && attr.name.local == "xmlns"));
                    if attr.name.prefix.is_none() {
                        prop_assert_eq!(attr.name.namespace, None);
                    }
                }
            }
        }
    }

    /// UTF-16 input produces the same events as the UTF-8 source text.
    #[test]
    fn encoding_agnosticism(doc in doc_strategy()) {
        let xml = render(&doc);
        let reference = events(&xml);
        let transcoded: Vec<Event> = parse_bytes(utf16le(&xml))
            .collect::<Result<_, _>>()
            .unwrap();
        prop_assert_eq!(transcoded, reference);
    }

    /// Consecutive text fragments always flatten back to the decoded
    /// attribute text.
    #[test]
    fn attribute_text_round_trip(value in text_strategy()) {
        let xml = format!("<t a=\"{}\"/>", escape(&value));
        match &events(&xml)[1] {
            Event::Start { attributes, .. } => {
                prop_assert_eq!(attributes[0].text(), value);
            }
            other => return Err(TestCaseError::fail(format!("expected Start, got {:?}", other))),
        }
    }
}

#[test]
fn entity_fragments_survive_flattening() {
    let evts = events("<t>&unknown;</t>");
    assert_eq!(evts[2], Event::Text(Content::Entity("unknown".to_string())));
}
