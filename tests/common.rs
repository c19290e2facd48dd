//! Test utilities & fixtures.
//! Builds sessions on a manual clock and walks locations through the full loop.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use treasurehunt::config::Config;
use treasurehunt::hunt::{CodeSource, HuntSession, ManualClock, VerifyOutcome, View};

/// (location id, code on the sticker, correct option) for the built-in venue, in unlock order.
#[allow(dead_code)]
pub const CANONICAL_HUNT: [(&str, &str, usize); 4] = [
    ("food-court", "FOODCOURT001", 1),
    ("cinema", "CINEMA001", 0),
    ("hypermart", "HYPERMART001", 1),
    ("atrium", "ATRIUM001", 1),
];

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, 17, 9, 0, 0).unwrap()
}

pub fn session_with_config(config: Config) -> (HuntSession, ManualClock) {
    let clock = ManualClock::new(start_time());
    let session = HuntSession::with_clock(config, Arc::new(clock.clone()));
    (session, clock)
}

/// Fill in all three registration steps. Returns the result of the last one.
pub fn fill_registration(
    session: &mut HuntSession,
) -> Result<Option<treasurehunt::hunt::Player>, treasurehunt::hunt::HuntError> {
    for value in ["treas1", "Ayu Lestari"] {
        session.registration_input(value);
        session.registration_next().expect("registration step");
    }
    session.registration_input("081234567890");
    session.registration_next()
}

/// A session with a registered player sitting on the dashboard.
#[allow(dead_code)]
pub fn registered_session() -> (HuntSession, ManualClock) {
    let (mut session, clock) = session_with_config(Config::default());
    let player = fill_registration(&mut session).expect("registration");
    assert!(player.is_some());
    (session, clock)
}

/// Open, verify, photograph and answer one location.
#[allow(dead_code)]
pub fn complete_location(session: &mut HuntSession, id: &str, code: &str, answer: usize) {
    assert_eq!(session.open_location(id).unwrap(), View::Scanner(id.to_string()));
    assert_eq!(
        session.submit_code(id, code, CodeSource::Manual).unwrap(),
        VerifyOutcome::Matched
    );
    assert_eq!(session.view(), &View::Photo(id.to_string()));
    session
        .submit_photo(id, format!("data:image/jpeg;base64,{}", id))
        .unwrap();
    assert!(session.answer_quiz(id, answer).unwrap(), "answer for {id} rejected");
}

#[allow(dead_code)]
pub fn toast_messages(session: &HuntSession) -> Vec<String> {
    session
        .state()
        .toasts
        .into_iter()
        .map(|t| t.message)
        .collect()
}
