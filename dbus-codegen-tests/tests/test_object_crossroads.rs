//! Exercises the object (server) side generated with
//! `--server-backend crossroads` against the `org.freedesktop.DBus.Peer`
//! interface -- the simplest fixture interface in `build.rs`, with no
//! properties or signals to complicate the registration call.

#[allow(dead_code)]
mod object_crossroads {
    include!(concat!(env!("OUT_DIR"), "/object_crossroads.rs"));
}

use object_crossroads::OrgFreedesktopDBusPeer;

struct MyPeer;

impl OrgFreedesktopDBusPeer for MyPeer {
    fn ping(&self) -> Result<(), dbus::MethodErr> {
        Ok(())
    }
    fn get_machine_id(&self) -> Result<String, dbus::MethodErr> {
        Ok("test-machine".to_string())
    }
}

#[test]
fn registers_peer_interface() {
    let mut cr = dbus_crossroads::Crossroads::new();
    let token = object_crossroads::register_org_freedesktop_dbus_peer::<MyPeer>(&mut cr);
    cr.insert("/test", &[token], MyPeer);
}
