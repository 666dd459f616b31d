use epubcfi::cfi::{self, Assertion, Cfi, IndirectPath, Part, Path, Side, Spatial, fake};
use epubcfi::dom::xml::XmlDocument;
use epubcfi::dom::{self, AcceptAll, Document, Position, Slot};
use proptest::prelude::*;

/// Any part that survives being written and read back.
///
/// Offsets only appear on odd indices, and a lone text segment is never
/// empty, as an empty bracket carries no assertion.
fn part() -> impl Strategy<Value = Part> {
    (
        0usize..500,
        prop::option::of(0usize..10_000),
        prop::option::of(0.0f64..10_000.0),
        prop::option::of((0.0f64..100.0, 0.0f64..100.0)),
        prop::option::of(prop_oneof![Just(Side::Before), Just(Side::After)]),
        prop_oneof![
            Just(None),
            "\\PC{1,16}".prop_map(|id| Some(Assertion::Id(id))),
            "\\PC{1,12}".prop_map(|text| Some(Assertion::Text(vec![text]))),
            prop::collection::vec("\\PC{0,12}", 2..4).prop_map(|text| Some(Assertion::Text(text))),
        ],
    )
        .prop_map(|(index, offset, temporal, spatial, side, assertion)| Part {
            index: Some(index),
            offset: offset.filter(|_| index % 2 == 1),
            temporal,
            spatial: spatial.map(|(x, y)| Spatial { x, y }),
            assertion,
            side,
        })
}

fn path(len: std::ops::Range<usize>) -> impl Strategy<Value = Path> {
    prop::collection::vec(part(), len).prop_map(Path)
}

fn indirect_path() -> impl Strategy<Value = IndirectPath> {
    prop::collection::vec(path(1..5), 1..3).prop_map(IndirectPath)
}

fn element_part() -> impl Strategy<Value = Part> {
    (1usize..50).prop_map(|n| Part::new(n * 2))
}

proptest! {
    #[test]
    fn prop_point_round_trip(paths in indirect_path()) {
        let cfi = Cfi::from(paths);
        prop_assert_eq!(&cfi, &cfi::parse(&cfi.to_string()));
    }

    #[test]
    fn prop_id_escaping(id in "\\PC{1,24}") {
        let part = Part::new(4).with_id(id.as_str());
        let cfi = Cfi::from(IndirectPath(vec![Path(vec![part])]));

        let Cfi::Point(parsed) = cfi::parse(&cfi.to_string()) else {
            return Err(TestCaseError::fail("expected a point"));
        };
        prop_assert_eq!(Some(id.as_str()), parsed[0][0].id());
    }

    #[test]
    fn prop_range_collapses_to_endpoints(
        outer in prop::collection::vec(path(1..4), 0..2),
        parent in prop::collection::vec(element_part(), 0..4),
        a in prop::collection::vec(part(), 1..4),
        b in prop::collection::vec(part(), 1..4),
    ) {
        prop_assume!(a[0].index != b[0].index);

        let endpoint = |suffix: &[Part]| {
            let mut paths = outer.clone();
            paths.push(Path(parent.iter().chain(suffix).cloned().collect()));
            IndirectPath(paths)
        };
        let from = endpoint(&a[..]);
        let to = endpoint(&b[..]);
        let range = cfi::build_range(&from, &to);

        prop_assert_eq!(parent.len(), range.parent.local().map_or(0, |local| local.len()));
        prop_assert_eq!(&from, &cfi::collapse_range(&range, false));
        prop_assert_eq!(&to, &cfi::collapse_range(&range, true));

        let cfi = Cfi::from(range);
        prop_assert_eq!(&cfi, &cfi::parse(&cfi.to_string()));
    }

    #[test]
    fn prop_compare_is_antisymmetric(a in indirect_path(), b in indirect_path()) {
        let a = Cfi::from(a);
        let b = Cfi::from(b);
        prop_assert_eq!(cfi::compare(&a, &b), cfi::compare(&b, &a).reverse());
    }

    #[test]
    fn prop_chunk_offsets_round_trip(
        segments in prop::collection::vec("[a-z ]{1,8}", 1..5),
        pick in any::<prop::sample::Index>(),
    ) {
        // Comments split the text into several nodes of one chunk
        let xml = format!("<html><body><p>{}</p></body></html>", segments.join("<!---->"));
        let doc = XmlDocument::parse(&xml).unwrap();
        let total: usize = segments.iter().map(String::len).sum();
        let value = format!("/2/2/1:{}", pick.index(total + 1));

        let paths = cfi::parse(&value).collapse(false);
        let Some(Position::At { node, offset: Some(offset) }) = dom::resolve(&doc, &paths[0], &AcceptAll)
        else {
            return Err(TestCaseError::fail(format!("{value} did not resolve to text")));
        };
        prop_assert!(offset <= doc.text_len(&node));
        prop_assert_eq!(value, dom::derive_path(&doc, &node, Some(offset), &AcceptAll).to_string());
    }

    #[test]
    fn prop_index_parity(
        children in prop::collection::vec(prop_oneof![Just("<e/>"), Just("t"), Just("<!---->")], 0..12),
    ) {
        let doc = XmlDocument::parse(&format!("<r>{}</r>", children.concat())).unwrap();
        let root = doc.document_element().unwrap();
        let slots = dom::index_children(&doc, &root, &AcceptAll);

        prop_assert_eq!(Some(&Slot::Before), slots.first());
        prop_assert_eq!(Some(&Slot::After), slots.last());
        prop_assert_eq!(
            children.iter().filter(|child| **child == "<e/>").count(),
            slots.iter().filter(|slot| matches!(slot, Slot::Element(_))).count()
        );

        for (i, slot) in slots.iter().enumerate() {
            let even = matches!(slot, Slot::Before | Slot::Element(_) | Slot::After);
            prop_assert_eq!(even, i % 2 == 0, "{:?} at {}", slot, i);
        }
    }

    #[test]
    fn prop_fake_index_round_trip(index in 0usize..100_000) {
        prop_assert_eq!(Some(index), fake::to_index(&fake::from_index(index)[0]));
    }
}
