#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use spelldoor_core::{
    DisplayEffect, FocusTarget, InputMode, KeypressResponse, PageEffect, PageSession, SessionId,
    SpellConfig, TimerToken,
};

#[derive(Debug, Arbitrary)]
enum Signal {
    Keydown { key: String, on_surface: bool },
    TextInput(String),
    FireTimer { newest: bool },
    Respond { index: u8, granted: bool },
}

fuzz_target!(|input: (bool, Vec<Signal>)| {
    let (touch, signals) = input;
    let mode = InputMode::from_coarse_pointer(touch);
    let mut page = PageSession::with_session(SpellConfig::default(), mode, SessionId::generate());
    let session = page.session_id();

    let mut issued: Vec<TimerToken> = Vec::new();
    let mut sequences: Vec<u64> = Vec::new();

    for signal in signals.into_iter().take(256) {
        let reaction = match signal {
            Signal::Keydown { key, on_surface } => {
                let focus = if on_surface {
                    FocusTarget::TextSurface
                } else {
                    FocusTarget::Elsewhere
                };
                Some(page.on_keydown(&key, focus))
            }
            Signal::TextInput(value) => Some(page.on_text_input(&value)),
            Signal::FireTimer { newest } => {
                let token = if newest { issued.last() } else { issued.first() };
                if let Some(&token) = token {
                    record_timers(&page.on_timer(token), &mut issued);
                }
                None
            }
            Signal::Respond { index, granted } => {
                if let Some(&sequence) = sequences.get(usize::from(index)) {
                    let response = KeypressResponse {
                        spell_successful: granted,
                        message: None,
                    };
                    let _ = page.on_response(sequence, Ok(response));
                }
                None
            }
        };

        if let Some(reaction) = reaction {
            record_timers(&reaction.effects, &mut issued);
            if let Some(request) = reaction.request {
                assert_eq!(request.request.uuid, session);
                assert!(!request.request.key.is_empty());
                assert_ne!(request.request.key, "Unidentified");
                sequences.push(request.sequence);
            }
        }

        // A pending fade timer implies the display is shown.
        assert!(page.pending_timer().is_none() || page.display_state().is_shown());
    }

    assert!(sequences.windows(2).all(|pair| pair[0] < pair[1]));
});

fn record_timers(effects: &[PageEffect], issued: &mut Vec<TimerToken>) {
    for effect in effects {
        if let PageEffect::Display(DisplayEffect::ScheduleTimer(request)) = effect {
            issued.push(request.token);
        }
    }
}
