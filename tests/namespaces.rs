//! Namespace resolution tests.

use pretty_assertions::assert_eq;
use pull_xml::events::Event;
use pull_xml::{parse_str, QName, XML_NAMESPACE};

fn events(xml: &str) -> Vec<Event> {
    parse_str(xml).collect::<Result<_, _>>().unwrap()
}

/// Element names of Start events, in document order.
fn start_names(xml: &str) -> Vec<QName> {
    events(xml)
        .into_iter()
        .filter_map(|e| match e {
            Event::Start { name, .. } => Some(name),
            _ => None,
        })
        .collect()
}

#[test]
fn default_namespace() {
    assert_eq!(
        start_names(r#"<a xmlns="u"><b/></a>"#),
        vec![
            QName::with_namespace("a", "u"),
            QName::with_namespace("b", "u"),
        ]
    );
}

#[test]
fn end_tags_resolve_in_their_own_scope() {
    let evts = events(r#"<a xmlns="u"><b/></a>"#);
    assert_eq!(
        evts[2..5],
        [
            Event::Start {
                name: QName::with_namespace("b", "u"),
                attributes: Vec::new(),
            },
            Event::End {
                name: QName::with_namespace("b", "u"),
            },
            Event::End {
                name: QName::with_namespace("a", "u"),
            },
        ]
    );
}

#[test]
fn prefixed_element_with_unprefixed_attribute() {
    let evts = events(r#"<r xmlns:x="u"><x:c k="v"/></r>"#);
    match &evts[2] {
        Event::Start { name, attributes } => {
            assert_eq!(name, &QName::with_namespace("c", "u"));
            assert_eq!(name.prefix.as_deref(), Some("x"));
            // unprefixed attributes never take a namespace
            assert_eq!(attributes[0].name, QName::new("k"));
            assert_eq!(attributes[0].text(), "v");
        }
        other => panic!("expected Start, got {:?}", other),
    }
}

#[test]
fn prefixed_attribute_resolves() {
    let evts = events(r#"<r xmlns:x="u"><c x:k="v"/></r>"#);
    match &evts[2] {
        Event::Start { attributes, .. } => {
            assert_eq!(attributes[0].name, QName::with_namespace("k", "u"));
        }
        other => panic!("expected Start, got {:?}", other),
    }
}

#[test]
fn xmlns_attributes_never_surface() {
    let evts = events(r#"<a xmlns="u" xmlns:x="v" x:k="w"/>"#);
    match &evts[1] {
        Event::Start { attributes, .. } => {
            assert_eq!(attributes.len(), 1);
            assert_eq!(attributes[0].name, QName::with_namespace("k", "v"));
        }
        other => panic!("expected Start, got {:?}", other),
    }
}

#[test]
fn children_inherit_parent_scope_verbatim() {
    assert_eq!(
        start_names(r#"<a xmlns="u" xmlns:x="v"><b><x:c/></b></a>"#),
        vec![
            QName::with_namespace("a", "u"),
            QName::with_namespace("b", "u"),
            QName::with_namespace("c", "v"),
        ]
    );
}

#[test]
fn inner_declaration_shadows_and_unshadows() {
    assert_eq!(
        start_names(r#"<a xmlns:x="o"><b xmlns:x="i"><x:p/></b><x:q/></a>"#),
        vec![
            QName::new("a"),
            QName::new("b"),
            QName::with_namespace("p", "i"),
            QName::with_namespace("q", "o"),
        ]
    );
}

#[test]
fn empty_default_namespace_reverts() {
    assert_eq!(
        start_names(r#"<a xmlns="u"><b xmlns=""><c/></b></a>"#),
        vec![
            QName::with_namespace("a", "u"),
            QName::new("b"),
            QName::new("c"),
        ]
    );
}

#[test]
fn xml_prefix_is_predeclared() {
    let evts = events(r#"<r xml:lang="en"/>"#);
    match &evts[1] {
        Event::Start { attributes, .. } => {
            assert_eq!(
                attributes[0].name,
                QName::with_namespace("lang", XML_NAMESPACE)
            );
        }
        other => panic!("expected Start, got {:?}", other),
    }
}

#[test]
fn unknown_prefix_keeps_prefix_without_namespace() {
    let names = start_names("<u:r/>");
    assert_eq!(names[0], QName::new("r"));
    assert_eq!(names[0].prefix.as_deref(), Some("u"));
}

#[test]
fn self_closing_scope_is_not_leaked() {
    assert_eq!(
        start_names(r#"<r><b xmlns="u"/><c/></r>"#),
        vec![
            QName::new("r"),
            QName::with_namespace("b", "u"),
            QName::new("c"),
        ]
    );
}

#[test]
fn declaration_on_the_element_itself_applies_to_its_name() {
    assert_eq!(
        start_names(r#"<x:c xmlns:x="u"/>"#),
        vec![QName::with_namespace("c", "u")]
    );
}
