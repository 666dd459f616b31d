use crate::cfi::{chapter, element};
use epubcfi::cfi;
use epubcfi::dom::xml::{NodeId, XmlDocument};
use epubcfi::dom::{self, AcceptAll, Boundary, Document, DomRange, FilterAction, Position, Slot};

fn resolve(doc: &XmlDocument, value: &str) -> Option<Position<NodeId>> {
    dom::resolve(doc, &cfi::parse(value).collapse(false)[0], &AcceptAll)
}

fn text_at(doc: &XmlDocument, value: &str) -> (String, usize) {
    match resolve(doc, value) {
        Some(Position::At { node, offset }) => (doc.text(node).to_owned(), offset.unwrap_or(0)),
        other => panic!("Expected a text position for {value}: {other:?}"),
    }
}

#[test]
fn test_body_index() {
    let doc = chapter();
    let html = doc.document_element().unwrap();
    let slots = dom::index_children(&doc, &html, &AcceptAll);

    // Whitespace around <head> and <body> forms text chunks
    assert_eq!(7, slots.len());
    assert_eq!(Slot::Element(element(&doc, "head", 0)), slots[2]);
    assert_eq!(Slot::Element(element(&doc, "body", 0)), slots[4]);
}

#[test]
fn test_resolve_elements() {
    let doc = chapter();
    #[rustfmt::skip]
    let expected = [
        ("/4/2", "heading"),
        ("/4/4", "para01"),
        ("/4/6", "para02"),
        ("/4/12", "para05"),
    ];

    for (value, id) in expected {
        let Some(Position::At { node, offset: None }) = resolve(&doc, value) else {
            panic!("Expected an element at {value}");
        };
        assert_eq!(Some(id.to_owned()), doc.id(&node));
    }
}

#[test]
fn test_resolve_text() {
    let doc = chapter();

    let (text, offset) = text_at(&doc, "/4[body01]/4[para01]/1:8");
    assert_eq!("Ishmael", &text[offset..offset + 7]);

    // Offsets are UTF-16 units; the em dash preceding "never" is 3 bytes in UTF-8
    let (text, offset) = text_at(&doc, "/4/4/1:32");
    let units: Vec<u16> = text.encode_utf16().collect();
    assert!(text.contains('\u{2014}'));
    assert_eq!("never", String::from_utf16(&units[offset..offset + 5]).unwrap());

    let (text, offset) = text_at(&doc, "/4/6/3:5");
    assert_eq!(" and regulating the ", text);
    assert_eq!(5, offset);
}

#[test]
fn test_resolve_cdata_chunk() {
    let doc = chapter();
    let third = element(&doc, "p", 2);
    let members = doc.children(&third);

    assert_eq!(3, members.len());
    // "...coral reefs" (104) + " & " (3)
    assert_eq!(
        Some(Position::At { node: members[2], offset: Some(4) }),
        resolve(&doc, "/4/8/1:111")
    );
    assert_eq!(
        Some(Position::At { node: members[1], offset: Some(1) }),
        resolve(&doc, "/4/8/1:105")
    );

    let path = dom::derive_path(&doc, &members[2], Some(4), &AcceptAll);
    assert_eq!("/4[body01]/8/1:111", path.to_string());
}

#[test]
fn test_resolve_misses() {
    let doc = chapter();

    // Out of range, through text, past the end of the text, unreadable index
    for value in ["/4/40", "/4/4/1/2", "/4/4/1:500", "/4/x/2", "/4/4/3"] {
        assert_eq!(None, resolve(&doc, value), "{value}");
    }
    assert_eq!(None, dom::to_range(&doc, &cfi::parse("/4/40"), &AcceptAll));
}

#[test]
fn test_id_fast_path_fallback() {
    let doc = chapter();
    let para05 = element(&doc, "p", 3);

    // A stale index is corrected by the id assertion
    assert_eq!(Some(para05), dom::to_element(&doc, &cfi::parse("/4/10[para05]")));
    // An unknown id falls back to the index
    assert_eq!(Some(para05), dom::to_element(&doc, &cfi::parse("/4/12[renamed]")));
    // An id on a text position is not trusted
    let Some(Position::At { node, .. }) = resolve(&doc, "/4/12/1[para05]") else {
        panic!("Expected text");
    };
    assert_eq!(Some(node), doc.first_child(&para05));
}

#[test]
fn test_virtual_positions() {
    let doc = chapter();
    let body = element(&doc, "body", 0);
    let div = element(&doc, "div", 0);

    assert_eq!(Some(Position::Before(body)), resolve(&doc, "/4/0"));
    assert_eq!(Some(Position::After(body)), resolve(&doc, "/4/14"));
    assert_eq!(Some(Position::After(div)), resolve(&doc, "/4/10/4"));
}

#[test]
fn test_range_round_trip() {
    let doc = chapter();
    let cfi = cfi::parse("epubcfi(/4[body01],/4[para01]/1:8,/6[para02]/2/1:3)");
    let range = dom::to_range(&doc, &cfi, &AcceptAll).unwrap();

    let Boundary::At { node, offset } = &range.end else {
        panic!("Expected a text boundary");
    };
    assert_eq!("spleen", doc.text(*node));
    assert_eq!(3, *offset);

    assert_eq!(cfi, dom::from_range(&doc, &range, &AcceptAll));
}

#[test]
fn test_point_round_trip() {
    let doc = chapter();
    let para02 = element(&doc, "p", 1);
    let text = doc.last_child(&para02).unwrap();
    let range = DomRange::collapsed(Boundary::At { node: text, offset: 0 });

    let cfi = dom::from_range(&doc, &range, &AcceptAll);
    assert_eq!("epubcfi(/4[body01]/6[para02]/5:0)", cfi.to_string());
    assert_eq!(Some(range), dom::to_range(&doc, &cfi, &AcceptAll));
}

#[test]
fn test_element_boundaries_stay_apart() {
    let doc = chapter();
    let em = element(&doc, "em", 0);
    let para02 = element(&doc, "p", 1);
    let text = doc.children(&para02);

    let around = DomRange::new(Boundary::Before(em), Boundary::After(em));
    let cfi = dom::from_range(&doc, &around, &AcceptAll);
    let range = dom::to_range(&doc, &cfi, &AcceptAll).unwrap();

    // The text ending right before <em>, and the text starting right after it
    assert!(!range.is_collapsed());
    assert_eq!(
        Boundary::At { node: text[0], offset: doc.text_len(&text[0]) },
        range.start
    );
    assert_eq!(Boundary::At { node: text[2], offset: 0 }, range.end);
    assert_eq!(" and regulating the ", doc.text(text[2]));
}

#[test]
fn test_injected_highlight_is_invisible() {
    let original = chapter();
    let marked = XmlDocument::parse(&crate::cfi::CHAPTER.replace(
        "Call me Ishmael.",
        "Call me <span class=\"highlight\">Ishmael</span>.",
    ))
    .unwrap();
    let filter = |node: &NodeId| match marked.name(*node) {
        Some("span") => FilterAction::Flatten,
        _ => FilterAction::Keep,
    };

    let span = element(&marked, "span", 0);
    let text = marked.first_child(&span).unwrap();
    let range = DomRange::new(
        Boundary::At { node: text, offset: 0 },
        Boundary::At { node: text, offset: 7 },
    );
    let cfi = dom::from_range(&marked, &range, &filter);
    assert_eq!("epubcfi(/4[body01]/4[para01],/1:8,/1:15)", cfi.to_string());

    // The same CFI resolves against the unmodified document
    let range = dom::to_range(&original, &cfi, &AcceptAll).unwrap();
    let Boundary::At { node, offset: 8 } = range.start else {
        panic!("Expected a text boundary");
    };
    assert!(original.text(node).starts_with("Call me Ishmael."));
}

#[test]
fn test_from_elements_matches_from_range() {
    let doc = chapter();
    let body = element(&doc, "body", 0);
    let children: Vec<NodeId> = doc
        .children(&body)
        .into_iter()
        .filter(|child| doc.name(*child).is_some())
        .collect();

    let batch = dom::from_elements(&doc, &children);
    assert_eq!(children.len(), batch.len());

    for (child, cfi) in children.iter().zip(&batch) {
        let range = DomRange::collapsed(Boundary::At { node: *child, offset: 0 });
        let single = dom::from_range(&doc, &range, &AcceptAll);

        assert_eq!(single.to_string(), cfi.to_string());
        assert_eq!(Some(*child), dom::to_element(&doc, cfi));
    }
    assert_eq!("epubcfi(/4[body01]/10)", batch[4].to_string());
}

#[test]
fn test_from_elements_stops_at_foreign_element() {
    let doc = chapter();
    let paragraphs: Vec<NodeId> = doc.elements("p").collect();
    let title = element(&doc, "title", 0);

    let cfis = dom::from_elements(&doc, &[paragraphs[0], title, paragraphs[1]]);
    assert_eq!(vec![cfi::parse("/4[body01]/4[para01]")], cfis);
}
