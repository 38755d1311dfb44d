use facet_proxy::{Call, CallMut, Indirect, Inline, Proxy, ProxyError};
use facet_proxy_testhelpers::{Ledger, setup};

use super::fixtures::*;

static UNIT: Circle = Circle { radius: 1.0 };

#[test]
fn invoke_matches_direct_calls() {
    setup();
    let circle = Circle { radius: 1.5 };
    let proxy = Proxy::<Shape>::new(Inline::new(circle.clone()));

    assert_eq!(
        proxy.invoke(Area, ()),
        <Circle as Call<AreaOf>>::call(&circle, ())
    );
    assert_eq!(
        proxy.invoke(Text, ()),
        <Circle as Call<Describe>>::call(&circle, ())
    );
}

#[test]
fn arguments_pick_the_overload() {
    setup();
    let proxy = Proxy::<Shape>::new(Indirect::new(Tag {
        name: "door".into(),
        side: 0.5,
    }));
    assert_eq!(proxy.invoke(Text, ()), "door (0.5)");
    assert_eq!(proxy.invoke(Text, (3,)), "door (0.500)");

    let triangle = Proxy::<Shape>::new(Box::new(Triangle {
        sides: [1.0, 1.5, 2.0],
    }));
    assert_eq!(triangle.invoke(Text, ()), "triangle 1/1.5/2");
    assert_eq!(triangle.invoke(Text, (1,)), "triangle 1.0/1.5/2.0");
}

#[test]
fn invoke_mut_reaches_the_held_value() {
    setup();
    let mut proxy = Proxy::<Shape>::new(Inline::new(Circle { radius: 1.0 }));
    proxy.invoke_mut(Scale, (2.0,));
    assert_eq!(proxy.invoke(Text, ()), "circle r=2");

    // Shared overloads are reachable through an exclusive borrow too.
    assert_eq!(proxy.invoke_mut(Text, (1,)), "circle r=2.0");
}

#[test]
fn fallible_overloads_forward_their_result() {
    setup();
    let mut tag = Proxy::<Shape>::new(Indirect::new(Tag {
        name: "door".into(),
        side: 1.0,
    }));
    assert_eq!(tag.invoke_mut(Name, ("window".to_string(),)), Ok(()));
    assert_eq!(tag.invoke(Text, ()), "window (1)");

    assert_eq!(
        tag.invoke_mut(Name, (String::new(),)),
        Err(NameError(String::new()))
    );
    assert_eq!(tag.invoke(Text, ()), "window (1)");

    let mut circle = Proxy::<Shape>::new(Inline::new(Circle { radius: 1.0 }));
    let err = circle.invoke_mut(Name, ("ring".to_string(),)).unwrap_err();
    assert_eq!(err, NameError("circles are anonymous, not \"ring\"".into()));
}

#[test]
#[should_panic(expected = "cannot invoke: proxy is empty")]
fn invoking_an_empty_proxy_panics() {
    setup();
    let proxy = Proxy::<Shape>::empty();
    proxy.invoke(Area, ());
}

#[test]
#[should_panic(expected = "cannot call: proxy is empty")]
fn calling_an_empty_proxy_panics() {
    setup();
    let proxy = Proxy::<Measured>::empty();
    proxy.call(());
}

#[test]
fn try_invoke_reports_the_dispatch() {
    setup();
    let mut proxy = Proxy::<Shape>::empty();
    assert_eq!(
        proxy.try_invoke(Area, ()),
        Err(ProxyError::Empty { operation: "Area" })
    );
    assert_eq!(
        proxy.try_invoke_mut(Scale, (2.0,)),
        Err(ProxyError::Empty { operation: "Scale" })
    );
    insta::assert_snapshot!(
        proxy.try_invoke(Text, ()).unwrap_err(),
        @"cannot Text: proxy is empty"
    );

    proxy.set(Inline::new(Circle { radius: 2.0 }));
    assert_eq!(proxy.try_invoke(Text, (0,)), Ok("circle r=2".to_string()));
    assert_eq!(proxy.try_invoke_mut(Scale, (0.5,)), Ok(()));
    assert_eq!(proxy.try_invoke(Text, ()), Ok("circle r=1".to_string()));
}

#[test]
fn call_sugar_for_single_dispatch_facades() {
    setup();
    let borrowed = Proxy::<ShapeRef>::new(&UNIT);
    assert_eq!(borrowed.call(()), borrowed.invoke(Area, ()));

    let ledger = Ledger::new();
    let mut counted = Proxy::<Counted>::new(Inline::new(ledger.track(7)));
    assert_eq!(counted.call(()), 7);
    counted.call_mut((9,));
    assert_eq!(counted.invoke(Id, ()), 9);
    assert_eq!(ledger.clones(), 0);
}

#[test]
fn shared_overloads_may_mutate_through_cells() {
    setup();
    let tally = Proxy::<Counter>::new(Inline::new(Tally::default()));
    assert_eq!(tally.invoke(Bumper, ()), 1);
    assert_eq!(tally.call(()), 2);

    let copy = &tally;
    assert_eq!(copy.invoke(Bumper, ()), 3);
    assert_eq!(tally.try_invoke(Bumper, ()), Ok(4));
}

#[test]
fn handles_serve_overloads_through_their_target() {
    setup();
    let ledger = Ledger::new();
    let mut boxed = Proxy::<Counted>::new(Box::new(ledger.track(1)));
    boxed.invoke_mut(Id, (2,));
    assert_eq!(boxed.invoke(Id, ()), 2);

    let mut tracked = ledger.track(3);
    <facet_proxy_testhelpers::Tracked as CallMut<SetId>>::call_mut(&mut tracked, (4,));
    assert_eq!(tracked.id(), 4);
}
