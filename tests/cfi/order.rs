use crate::cfi::chapter;
use epubcfi::cfi::{self, Cfi, IndirectPath, Path};
use epubcfi::dom::{self, AcceptAll, Boundary, Document, DomRange};
use std::cmp::Ordering;

/// Annotations as they may be stored, out of reading order.
const ANNOTATIONS: &[&str] = &[
    "epubcfi(/6/8!/4/2/1:0)",
    "epubcfi(/6/4[chap01ref]!/4[body01]/12[para05]/1:10)",
    "epubcfi(/6/4[chap01ref]!/4[body01]/4[para01],/1:8,/1:15)",
    "epubcfi(/6/4[chap01ref]!/4[body01]/4[para01]/1:0)",
    "epubcfi(/6/2)",
    "epubcfi(/6/4[chap01ref]!/4[body01]/4[para01],/1:8,/1:20)",
];

#[test]
fn test_sort_annotations() {
    let mut cfis: Vec<Cfi> = ANNOTATIONS.iter().map(|value| cfi::parse(value)).collect();
    cfis.sort_by(cfi::compare);

    let sorted: Vec<String> = cfis.iter().map(Cfi::to_string).collect();
    assert_eq!(
        vec![
            "epubcfi(/6/2)",
            "epubcfi(/6/4[chap01ref]!/4[body01]/4[para01]/1:0)",
            "epubcfi(/6/4[chap01ref]!/4[body01]/4[para01],/1:8,/1:15)",
            "epubcfi(/6/4[chap01ref]!/4[body01]/4[para01],/1:8,/1:20)",
            "epubcfi(/6/4[chap01ref]!/4[body01]/12[para05]/1:10)",
            "epubcfi(/6/8!/4/2/1:0)",
        ],
        sorted
    );
}

#[test]
fn test_document_order() {
    let doc = chapter();
    let root = doc.document_element().unwrap();
    let mut texts = Vec::new();
    let mut stack = vec![root];

    // Every text node of the chapter, in document order
    while let Some(node) = stack.pop() {
        if doc.kind(&node).is_text() {
            texts.push(node);
        }
        stack.extend(doc.children(&node).into_iter().rev());
    }

    let cfis: Vec<Cfi> = texts
        .iter()
        .map(|node| {
            let range = DomRange::collapsed(Boundary::At { node: *node, offset: 0 });
            dom::from_range(&doc, &range, &AcceptAll)
        })
        .collect();

    assert!(cfis.len() > 20);
    for pair in cfis.windows(2) {
        assert_eq!(Ordering::Less, cfi::compare(&pair[0], &pair[1]), "{pair:?}");
    }
}

#[test]
fn test_missing_parts_order_first() {
    let shallow = Cfi::from(IndirectPath(vec![Path::new()]));
    let deep = cfi::parse("/2");

    assert_eq!(Ordering::Less, cfi::compare(&shallow, &deep));
    assert_eq!(Ordering::Greater, cfi::compare(&deep, &shallow));
    assert_eq!(
        Ordering::Equal,
        cfi::compare_str("epubcfi(/6/4!/2)", "/6/4!/2")
    );
}
