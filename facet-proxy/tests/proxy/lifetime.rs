use facet_proxy::{Call, Indirect, Inline, Proxy};
use facet_proxy_testhelpers::{Ledger, setup};

use super::fixtures::*;

static SMALL: Circle = Circle { radius: 1.0 };
static LARGE: Circle = Circle { radius: 3.0 };

fn id_of(proxy: &Proxy<Counted>) -> Option<u32> {
    proxy.try_invoke(Id, ()).ok()
}

#[test]
fn clones_are_independent() {
    setup();
    let ledger = Ledger::new();

    let original = Proxy::<Counted>::new(Inline::new(ledger.track(1)));
    let mut copy = original.clone();
    assert_eq!(ledger.clones(), 1);
    copy.invoke_mut(Id, (2,));
    assert_eq!(id_of(&original), Some(1));
    assert_eq!(id_of(&copy), Some(2));

    let boxed = Proxy::<Counted>::new(Indirect::new(ledger.track(3)));
    let mut deep = boxed.clone();
    assert_eq!(ledger.clones(), 2);
    deep.invoke_mut(Id, (4,));
    assert_eq!(id_of(&boxed), Some(3));
    assert_eq!(id_of(&deep), Some(4));

    drop((original, copy, boxed, deep));
    assert_eq!(ledger.drops(), 4);
}

#[test]
fn cloning_an_empty_proxy() {
    setup();
    let empty = Proxy::<Counted>::empty();
    assert!(!empty.clone().has_value());
}

#[test]
fn clone_from_through_a_temporary() {
    setup();
    let ledger = Ledger::new();
    let source = Proxy::<Counted>::new(Inline::new(ledger.track(1)));
    let mut target = Proxy::<Counted>::new(Inline::new(ledger.track(2)));

    target.clone_from(&source);
    assert_eq!((ledger.clones(), ledger.drops()), (1, 1));
    assert_eq!(id_of(&target), Some(1));

    target.clone_from(&Proxy::empty());
    assert!(!target.has_value());
    assert_eq!(ledger.drops(), 2);
}

#[test]
fn clone_from_in_place() {
    setup();
    let ledger = Ledger::new();
    let source = Proxy::<CountedInfallible>::new(Inline::new(Ticket(ledger.track(1))));
    let mut target = Proxy::<CountedInfallible>::new(Inline::new(Ticket(ledger.track(2))));

    target.clone_from(&source);
    assert_eq!((ledger.clones(), ledger.drops()), (1, 1));
    assert_eq!(target.invoke(Id, ()), 1);
    assert_eq!(source.invoke(Id, ()), 1);
}

#[test]
fn take_moves_without_copying() {
    setup();
    let ledger = Ledger::new();
    let mut source = Proxy::<CountedMoveOnly>::new(Inline::new(ledger.track(5)));
    let moved = source.take();

    assert!(!source.has_value());
    assert_eq!(moved.invoke(Id, ()), 5);
    assert_eq!((ledger.clones(), ledger.drops()), (0, 0));

    let moved_again = source.take();
    assert!(!moved_again.has_value());
    assert_eq!(ledger.drops(), 0);
}

#[test]
fn take_moves_heap_handles_without_copying() {
    setup();
    let ledger = Ledger::new();
    let mut source = Proxy::<CountedMoveOnly>::new(Indirect::new(ledger.track(6)));
    let mut moved = source.take();

    assert!(!source.has_value());
    assert!(moved.type_name().unwrap().contains("Indirect<"));
    moved.invoke_mut(Id, (8,));
    assert_eq!(moved.invoke(Id, ()), 8);
    assert_eq!((ledger.clones(), ledger.drops()), (0, 0));

    drop(moved);
    assert_eq!(ledger.drops(), 1);
}

#[test]
fn leaking_facades_never_drop() {
    setup();
    let ledger = Ledger::new();
    let proxy = Proxy::<Leaking>::new(Inline::new(ledger.track(1)));
    assert!(!proxy.table().unwrap().has_destroy());
    assert_eq!(proxy.invoke(Id, ()), 1);

    let mut source = Proxy::<Leaking>::new(Inline::new(ledger.track(2)));
    let moved = source.take();
    assert_eq!(moved.invoke(Id, ()), 2);
    drop(source);
    drop(proxy);
    drop(moved);
    assert_eq!(ledger.drops(), 0);
}

#[test]
fn values_are_dropped_exactly_once() {
    setup();
    let ledger = Ledger::new();
    let proxy = Proxy::<Counted>::new(Indirect::new(ledger.track(1)));
    drop(proxy);
    assert_eq!(ledger.drops(), 1);

    let mut proxy = Proxy::<Counted>::new(Inline::new(ledger.track(2)));
    proxy.reset();
    assert!(!proxy.has_value());
    proxy.reset();
    drop(proxy);
    assert_eq!(ledger.drops(), 2);
}

#[test]
fn set_replaces_the_held_value() {
    setup();
    let ledger = Ledger::new();
    let mut proxy = Proxy::<Counted>::new(Inline::new(ledger.track(1)));
    proxy.set(Box::new(ledger.track(2)));
    assert_eq!(ledger.drops(), 1);
    assert_eq!(id_of(&proxy), Some(2));
    assert!(proxy.type_name().unwrap().contains("Box<"));

    let mut empty = Proxy::<Counted>::empty();
    empty.set(Inline::new(ledger.track(3)));
    assert_eq!(id_of(&empty), Some(3));
    assert_eq!(ledger.drops(), 1);
}

#[test]
fn swap_exchanges_contents() {
    setup();
    let ledger = Ledger::new();
    let mut left = Proxy::<Counted>::new(Inline::new(ledger.track(1)));
    let mut right = Proxy::<Counted>::new(Indirect::new(ledger.track(2)));

    left.swap(&mut right);
    assert_eq!((id_of(&left), id_of(&right)), (Some(2), Some(1)));
    assert_eq!((ledger.clones(), ledger.drops()), (0, 0));

    let mut empty = Proxy::<Counted>::empty();
    left.swap(&mut empty);
    assert_eq!((id_of(&left), id_of(&empty)), (None, Some(2)));

    // Both empty.
    let mut other = Proxy::<Counted>::empty();
    left.swap(&mut other);
    assert!(!left.has_value() && !other.has_value());
    assert_eq!(ledger.drops(), 0);
}

#[test]
fn trivially_relocatable_proxies_swap_bitwise() {
    setup();
    let mut small = Proxy::<ShapeRef>::new(&SMALL);
    let mut large = Proxy::<ShapeRef>::new(&LARGE);
    assert!(!small.table().unwrap().has_relocate());

    small.swap(&mut large);
    assert_eq!(small.call(()), <Circle as Call<AreaOf>>::call(&LARGE, ()));
    assert_eq!(large.call(()), <Circle as Call<AreaOf>>::call(&SMALL, ()));

    let copy = small.clone();
    assert!(!copy.table().unwrap().has_copy());
    assert_eq!(copy.call(()), small.call(()));
}
