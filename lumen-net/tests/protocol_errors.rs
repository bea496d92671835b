mod common;

use std::time::Duration;

/// Send `line` and check the server drops the session without replying.
fn assert_dropped(line: &str) {
    let server = common::TestServer::start();
    let mut client = server.connect_admitted();

    client.send(line).unwrap();

    assert!(
        client.read_until_closed().is_empty(),
        "server replied to {:?}",
        line
    );
    common::wait_for_sessions(&server.registry, 0, Duration::from_secs(2));
}

#[test]
fn test_empty_message_drops_session() {
    assert_dropped("");
}

#[test]
fn test_unknown_command_drops_session() {
    assert_dropped("goodbye");
    assert_dropped("get colors");
    assert_dropped("set volume 3");
}

#[test]
fn test_non_numeric_priority_drops_session() {
    assert_dropped("set priority abc");
}

#[test]
fn test_wrong_argument_count_drops_session() {
    assert_dropped("set priority");
    assert_dropped("set light kitchen rgb 1 0");
    assert_dropped("hello again");
}

#[test]
fn test_bad_argument_type_drops_session() {
    assert_dropped("set light kitchen speed fast");
    assert_dropped("set light kitchen interpolation maybe");
    assert_dropped("set light kitchen use 2");
}

#[test]
fn test_unknown_light_drops_session() {
    assert_dropped("set light garage rgb 1 1 1");
}

#[test]
fn test_violation_only_drops_offender() {
    let server = common::TestServer::start();
    let mut good = server.connect_admitted();
    let mut bad = server.connect_admitted();

    bad.send("set priority abc").unwrap();
    assert!(bad.read_until_closed().is_empty());
    common::wait_for_sessions(&server.registry, 1, Duration::from_secs(2));

    good.sync();
}

#[test]
fn test_earlier_commands_in_same_read_still_reply() {
    let server = common::TestServer::start();
    let mut client = server.connect_admitted();

    // One write, so both lines usually arrive in a single read
    client.send("ping\nbogus").unwrap();

    assert_eq!(client.recv().unwrap(), "ping");
    assert!(client.read_until_closed().is_empty());
}
