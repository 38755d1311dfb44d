use facet_proxy::{Inline, Proxy};
use facet_proxy_testhelpers::{Ledger, proxy_events, setup};

use super::fixtures::*;

#[test]
fn lifetime_operations_emit_events() {
    setup();
    let ledger = Ledger::new();
    let before = proxy_events();

    let mut proxy = Proxy::<Counted>::new(Inline::new(ledger.track(1)));
    let mut copy = proxy.clone();
    proxy.swap(&mut copy);
    let moved = proxy.take();
    drop((moved, copy));

    assert_eq!((ledger.clones(), ledger.drops()), (1, 2));
    assert!(proxy_events() > before);
}

#[test]
fn rejections_are_logged() {
    setup();
    let before = proxy_events();
    let rejected = Proxy::<Shape>::try_new(Inline::new(Triangle {
        sides: [3.0, 4.0, 5.0],
    }));
    assert!(rejected.is_err());
    assert!(proxy_events() > before);
}
