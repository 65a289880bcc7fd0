//! Exercises the proxy (client) side generated with `--connection-type
//! blocking`, focused on `org.example.Laundry`'s struct-typed `Birthday`
//! property -- the struct synthesizer's end-to-end output, matching
//! scenario B of `SPEC_FULL.md` §8.

#[allow(dead_code)]
mod proxy_blocking {
    include!(concat!(env!("OUT_DIR"), "/proxy_blocking.rs"));
}

#[test]
fn birthday_struct_has_three_positional_fields() {
    let b = proxy_blocking::OrgExampleLaundryBirthdayValueStruct0 {
        item0: 1984,
        item1: 3,
        item2: 28,
    };
    assert_eq!(b.item0, 1984);
    assert_eq!(b.item1, 3);
    assert_eq!(b.item2, 28);
}

#[test]
fn birthday_struct_round_trips_through_arg() {
    use dbus::arg::{Arg, RefArg};

    let b = proxy_blocking::OrgExampleLaundryBirthdayValueStruct0 {
        item0: 1984,
        item1: 3,
        item2: 28,
    };
    assert_eq!(<proxy_blocking::OrgExampleLaundryBirthdayValueStruct0 as Arg>::signature().to_string(), "(iii)");
    assert_eq!(b.arg_type(), dbus::arg::ArgType::Struct);
}

#[test]
fn properties_view_reports_missing_key_as_none() {
    let map = dbus::arg::PropMap::new();
    let view = proxy_blocking::OrgExampleLaundryProperties(&map);
    assert!(view.get_birthday().is_none());
}
