//! Fuzz target: `SerialLink::receive_string`
//!
//! Drives arbitrary inbound bytes through the link framing and asserts
//! that it never panics, never yields a frame longer than a credential,
//! and never returns a frame containing the terminator.
//!
//! cargo fuzz run fuzz_link_frame

#![no_main]

use doorlock::app::ports::LinkPort;
use doorlock::credential::MAX_CREDENTIAL_LEN;
use doorlock::link::SerialLink;
use doorlock::link::transport::BufferTransport;
use doorlock::protocol::WIRE_TERMINATOR;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut link = SerialLink::new(BufferTransport::with_inbound(data));

    // Each call consumes at least one byte or reports a disconnect.
    for _ in 0..=data.len() {
        match link.receive_string() {
            Ok(frame) => {
                assert!(frame.len() <= MAX_CREDENTIAL_LEN);
                assert!(!frame.contains(&WIRE_TERMINATOR));
            }
            Err(_) => {}
        }
    }
    assert_eq!(link.transport().remaining(), 0);
});
