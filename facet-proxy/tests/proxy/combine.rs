use facet_proxy::{DispatchList, Facade, Indirect, Inline, OverloadList, Proxy, validate};
use facet_proxy_testhelpers::setup;
use static_assertions::assert_type_eq_all;

use super::fixtures::*;

assert_type_eq_all!(
    <Drafted as Facade>::Dispatches,
    <Shape as Facade>::Dispatches
);

#[test]
fn combined_dispatch_reaches_every_merged_overload() {
    setup();
    assert_eq!(<<Edit as facet_proxy::Dispatch>::Overloads as OverloadList>::LEN, 2);

    let mut tag = Proxy::<Editable>::new(Indirect::new(Tag {
        name: "door".into(),
        side: 1.0,
    }));
    tag.invoke_mut(Edit, (2.0,));
    assert_eq!(tag.invoke_mut(Edit, ("gate".to_string(),)), Ok(()));
    assert_eq!(tag.invoke(Area, ()), 4.0);
    assert_eq!(tag.invoke(Text, ()), "gate (2)");

    let mut circle = Proxy::<Editable>::new(Inline::new(Circle { radius: 1.0 }));
    assert!(circle.invoke_mut(Edit, ("ring".to_string(),)).is_err());
}

#[test]
fn packs_flatten_into_the_facade() {
    setup();
    assert_eq!(<<Editable as Facade>::Dispatches as DispatchList>::LEN, 3);
    assert_eq!(<<Editable as Facade>::Dispatches as DispatchList>::OVERLOADS, 5);
    assert_eq!(<<Drafted as Facade>::Dispatches as DispatchList>::LEN, 4);
    assert_eq!(validate::<Editable>(), Ok(()));
    assert_eq!(validate::<Drafted>(), Ok(()));

    let drafted = Proxy::<Drafted>::new(Inline::new(Circle { radius: 2.0 }));
    assert_eq!(drafted.invoke(Text, (1,)), "circle r=2.0");
}
