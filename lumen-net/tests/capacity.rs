mod common;

use std::time::Duration;

#[test]
fn test_full_server_rejects_with_single_line() {
    let server = common::TestServer::start_with_capacity(2);
    let mut alice = server.connect_admitted();
    let mut bob = server.connect_admitted();

    let mut carol = server.connect();
    assert_eq!(carol.recv().unwrap(), "full");
    assert!(carol.read_until_closed().is_empty());

    assert_eq!(server.registry.session_count(), 2);
    alice.sync();
    bob.sync();
}

#[test]
fn test_slot_frees_after_disconnect() {
    let server = common::TestServer::start_with_capacity(1);
    let alice = server.connect_admitted();

    let mut bob = server.connect();
    assert_eq!(bob.recv().unwrap(), "full");

    drop(alice);
    common::wait_for_sessions(&server.registry, 0, Duration::from_secs(2));

    let mut carol = server.connect_admitted();
    carol.hello();
    assert_eq!(server.registry.session_count(), 1);
}
