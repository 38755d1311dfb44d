use facet_proxy::{HandleInfo, Indirect, Inline, Proxy, ProxyError};
use facet_proxy_testhelpers::setup;

use super::fixtures::*;

#[test]
fn reflection_describes_the_held_handle() {
    setup();
    let mut proxy = Proxy::<Shape>::new(Inline::new(Circle { radius: 1.0 }));

    let info: HandleInfo = proxy.reflect();
    assert!(info.is::<Inline<Circle>>());
    assert!(!info.is::<Circle>());
    assert_eq!((info.size, info.align), (8, 8));
    assert_eq!(Some(info.type_name), proxy.type_name());

    proxy.set(Indirect::new(Tag {
        name: "door".into(),
        side: 1.0,
    }));
    let info = proxy.reflect();
    assert!(info.is::<Indirect<Tag>>());
    assert_eq!(info.size, size_of::<usize>());
    assert!(info.to_string().contains("Indirect<"));
}

#[test]
fn reflection_is_per_handle_type_not_per_value() {
    setup();
    let first = Proxy::<Shape>::new(Inline::new(Circle { radius: 1.0 }));
    let second = Proxy::<Shape>::new(Inline::new(Circle { radius: 7.0 }));
    assert_eq!(first.reflect(), second.reflect());

    let boxed = Proxy::<Shape>::new(Box::new(Circle { radius: 1.0 }));
    assert_ne!(first.reflect(), boxed.reflect());
}

#[test]
fn reflecting_an_empty_proxy() {
    setup();
    let proxy = Proxy::<Shape>::empty();
    let err = proxy.try_reflect().unwrap_err();
    assert_eq!(
        err,
        ProxyError::Empty {
            operation: "reflect"
        }
    );
    insta::assert_snapshot!(err, @"cannot reflect: proxy is empty");
}

#[test]
#[should_panic(expected = "cannot reflect: proxy is empty")]
fn reflect_panics_when_empty() {
    setup();
    let proxy = Proxy::<Shape>::default();
    let _ = proxy.reflect();
}
