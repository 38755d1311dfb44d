use facet_proxy::{Indirect, Proxy};
use facet_proxy_testhelpers::setup;

use super::fixtures::*;

fn nameplate(label: &str) -> Proxy<Badge> {
    Proxy::<Badge>::new(Indirect::new(Nameplate {
        label: label.to_string(),
        fed: 0,
    }))
}

#[test]
fn arguments_borrow_for_the_call_only() {
    setup();
    let badge = nameplate("front desk");
    let greeting = {
        let visitor = String::from("ada");
        badge.invoke(Greeting, (visitor.as_str(),))
    };
    assert_eq!(greeting, "front desk greets ada");
}

#[test]
fn outputs_borrow_from_the_proxy() {
    setup();
    let mut badge = nameplate("lobby");
    let label: &str = badge.invoke(Label, ());
    assert_eq!(label, "lobby");
    assert_eq!(badge.try_invoke(Label, ()), Ok("lobby"));

    badge.set(Indirect::new(Nameplate {
        label: "annex".into(),
        fed: 0,
    }));
    assert_eq!(badge.invoke(Label, ()), "annex");
}

#[test]
fn exclusive_overloads_take_borrowed_slices() {
    setup();
    let mut badge = nameplate("intake");
    let first = vec![1u8, 2, 3];
    assert_eq!(badge.invoke_mut(Feed, (&first[..],)), 3);
    drop(first);
    assert_eq!(badge.invoke_mut(Feed, (b"four".as_slice(),)), 7);
}
