use std::panic::{AssertUnwindSafe, catch_unwind};

use facet_proxy::{HandleMut, Inline, Proxy};
use facet_proxy_testhelpers::{Ledger, Tracked, setup};

use super::fixtures::*;

#[test]
fn emplace_drops_the_old_value_first() {
    setup();
    let ledger = Ledger::new();
    let mut proxy = Proxy::<Counted>::new(Inline::new(ledger.track(1)));

    let held = proxy.emplace(|| {
        assert_eq!(ledger.drops(), 1);
        Inline::new(ledger.track(2))
    });
    held.target_mut().set_id(20);
    assert_eq!(proxy.invoke(Id, ()), 20);
    assert_eq!((ledger.clones(), ledger.drops()), (0, 1));
}

#[test]
fn failed_try_emplace_leaves_the_proxy_empty() {
    setup();
    let ledger = Ledger::new();
    let mut proxy = Proxy::<Counted>::new(Inline::new(ledger.track(1)));

    let result = proxy.try_emplace(|| Err::<Inline<Tracked>, _>("out of ids"));
    assert_eq!(result.unwrap_err(), "out of ids");
    assert!(!proxy.has_value());
    assert_eq!(ledger.drops(), 1);

    let held = proxy
        .try_emplace(|| Ok::<_, &str>(Box::new(ledger.track(2))))
        .unwrap();
    assert_eq!(held.id(), 2);
    assert_eq!(proxy.invoke(Id, ()), 2);
}

#[test]
fn failed_try_replace_keeps_the_old_value() {
    setup();
    let ledger = Ledger::new();
    let mut proxy = Proxy::<Counted>::new(Inline::new(ledger.track(1)));

    let result = proxy.try_replace(|| Err::<Inline<Tracked>, _>("out of ids"));
    assert_eq!(result, Err("out of ids"));
    assert_eq!(proxy.invoke(Id, ()), 1);
    assert_eq!(ledger.drops(), 0);

    proxy
        .try_replace(|| {
            assert_eq!(ledger.drops(), 0);
            Ok::<_, &str>(Inline::new(ledger.track(2)))
        })
        .unwrap();
    assert_eq!(proxy.invoke(Id, ()), 2);
    assert_eq!(ledger.drops(), 1);
}

#[test]
fn panicking_emplace_leaves_the_proxy_empty() {
    setup();
    let ledger = Ledger::new();
    let mut proxy = Proxy::<Counted>::new(Inline::new(ledger.track(1)));

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        proxy.emplace(|| -> Inline<Tracked> { panic!("constructor failed") });
    }));
    assert!(outcome.is_err());
    assert!(!proxy.has_value());
    assert_eq!(ledger.drops(), 1);

    proxy.emplace(|| Inline::new(ledger.track(3)));
    assert_eq!(proxy.invoke(Id, ()), 3);
}
