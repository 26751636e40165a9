#![no_main]

use libfuzzer_sys::fuzz_target;
use spelldoor_core::{HttpReply, KeypressResponse};

fuzz_target!(|data: &[u8]| {
    let Ok(body) = std::str::from_utf8(data) else {
        return;
    };

    // Decoding arbitrary bodies must never panic.
    let direct = KeypressResponse::from_json(body);

    // A 2xx reply decodes exactly like the bare body.
    let reply = HttpReply {
        status: 200,
        status_text: "OK".to_owned(),
        body: body.to_owned(),
    };
    assert_eq!(direct.is_ok(), reply.into_response().is_ok());

    // Non-2xx replies never reach the decoder.
    let reply = HttpReply {
        status: 503,
        status_text: "Service Unavailable".to_owned(),
        body: body.to_owned(),
    };
    assert!(reply.into_response().is_err());
});
