use facet_proxy::{
    HandleInfo, Inline, Placement, Proxy, make_proxy, make_proxy_with, placement,
    try_make_proxy_with,
};
use facet_proxy_testhelpers::setup;

use super::fixtures::*;

#[test]
fn placement_prefers_inline() {
    setup();
    assert_eq!(placement::<Shape, Circle>(), Some(Placement::Inline));
    assert_eq!(placement::<Shape, Triangle>(), Some(Placement::Indirect));
    assert_eq!(placement::<Shape, Tag>(), Some(Placement::Indirect));

    // Heap handles need drop glue, which a trivial facade rejects.
    assert_eq!(placement::<ShapeRef, Tag>(), None);
}

#[test]
fn make_proxy_falls_back_to_the_heap() {
    setup();
    let circle = make_proxy::<Shape, _>(Circle { radius: 2.0 });
    assert!(circle.reflect().is::<Inline<Circle>>());

    let triangle = make_proxy::<Shape, _>(Triangle {
        sides: [3.0, 4.0, 5.0],
    });
    let info: HandleInfo = triangle.reflect();
    assert!(info.type_name.contains("Indirect<"), "{info}");
    assert_eq!(triangle.invoke(Area, ()), 6.0);
}

#[test]
fn make_proxy_needs_only_the_reachable_strategy() {
    setup();
    // Trivial facades never reach the heap, so `Indirect<Square>` is not
    // asked to be `Copy`.
    assert_eq!(placement::<ShapeRef, Square>(), Some(Placement::Inline));
    let square = make_proxy::<ShapeRef, _>(Square { side: 2.0 });
    assert_eq!(square.call(()), 4.0);
    let copy = square.clone();
    assert_eq!(copy.call(()), 4.0);
}

#[test]
fn storage_is_transparent_to_dispatch() {
    setup();
    let inline = Proxy::<Shape>::new(Inline::new(Circle { radius: 1.25 }));
    let indirect = make_proxy_with::<Shape, _>(|| Tag {
        name: "disc".into(),
        side: 1.25,
    });
    assert_eq!(indirect.invoke(Area, ()), 1.25 * 1.25);
    assert_eq!(inline.invoke(Text, (2,)), "circle r=1.25");
    assert_eq!(indirect.invoke(Text, (2,)), "disc (1.25)");
}

#[test]
fn try_make_proxy_with_forwards_errors() {
    setup();
    let built = try_make_proxy_with::<Shape, _, NameError>(|| Ok(Circle { radius: 1.0 })).unwrap();
    assert!(built.has_value());

    let failed = try_make_proxy_with::<Shape, Triangle, _>(|| Err(NameError("no".into())));
    assert_eq!(failed.unwrap_err(), NameError("no".into()));
}
