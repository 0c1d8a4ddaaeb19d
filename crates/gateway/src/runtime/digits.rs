//! Digit processor.
//!
//! One submitted digit string moves the dialog through the collection
//! steps. Each whole turn runs under the call's lock so provider
//! redeliveries cannot interleave. The digits themselves are card data and
//! are never logged; only the call identifier and step appear in traces.

use secrecy::SecretString;

use vx_sessions::{GatherStep, SessionUpdate};

use crate::state::AppState;
use crate::twiml::Twiml;

use super::flow;

/// Invalid submissions tolerated per step before the call is ended.
pub const MAX_STRIKES: u8 = 3;

const SESSION_EXPIRED_MESSAGE: &str = "Session expired or invalid.";
const MAX_ATTEMPTS_MESSAGE: &str = "Maximum attempts reached. Hanging up.";
const SUCCESS_MESSAGE: &str = "Payment successful. Thank you.";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Transition table
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Verdict on one digit submission for a collection step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitCheck {
    Accept,
    /// Rejection with the message spoken back to the caller.
    Reject(&'static str),
}

/// Validation per step. The submission must be ASCII digits (the telephony
/// layer can pass through `*` or other junk, which must never reach the
/// processor); card numbers allow the full PAN range of 13 to 19 digits,
/// expiry is exactly MMYY, security codes are 3 or 4.
pub fn check_digits(step: GatherStep, digits: &str) -> DigitCheck {
    // Non-digit input fails every length gate below.
    let len = if digits.bytes().all(|b| b.is_ascii_digit()) {
        digits.len()
    } else {
        0
    };
    match step {
        GatherStep::CollectCard if (13..=19).contains(&len) => DigitCheck::Accept,
        GatherStep::CollectCard => DigitCheck::Reject("Invalid card length."),
        GatherStep::CollectExpiry if len == 4 => DigitCheck::Accept,
        GatherStep::CollectExpiry => DigitCheck::Reject("Invalid format. Enter 4 digits."),
        GatherStep::CollectCvv if len == 3 || len == 4 => DigitCheck::Accept,
        GatherStep::CollectCvv => DigitCheck::Reject("Invalid security code length."),
        // The charge already started; nothing more is collected.
        GatherStep::Confirm => DigitCheck::Reject("Your payment is already being processed."),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Turn driver
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Process one digit submission for a call and render the next document.
pub async fn process_digits(state: &AppState, call_sid: &str, digits: &str) -> Twiml {
    let _permit = match state.call_locks.acquire(call_sid).await {
        Ok(permit) => permit,
        Err(e) => {
            tracing::error!(call_sid, error = %e, "failed to serialize call turn");
            return Twiml::internal_error();
        }
    };

    let Some(session) = state.sessions.get(call_sid) else {
        tracing::warn!(call_sid, "digits for unknown or expired call");
        return Twiml::new().say(SESSION_EXPIRED_MESSAGE).hangup();
    };

    let gather_url = state.public_url(flow::GATHER_PATH);

    // Gather timeouts can deliver an empty Digits field; loop back to the
    // prompt without charging a strike.
    if digits.is_empty() {
        return Twiml::new().redirect(&gather_url);
    }

    match check_digits(session.step, digits) {
        DigitCheck::Accept => {
            accept_digits(state, call_sid, session.step, digits, &gather_url).await
        }
        DigitCheck::Reject(message) => {
            let strikes = session.strikes + 1;
            if strikes >= MAX_STRIKES {
                tracing::info!(call_sid, step = ?session.step, "strike limit reached, ending call");
                state.sessions.delete(call_sid);
                return Twiml::new().say(MAX_ATTEMPTS_MESSAGE).hangup();
            }
            state.sessions.update(
                call_sid,
                SessionUpdate {
                    strikes: Some(strikes),
                    ..Default::default()
                },
            );
            tracing::debug!(call_sid, step = ?session.step, strikes, "invalid submission");
            Twiml::new().say(message).redirect(&gather_url)
        }
    }
}

/// Store the accepted field, advance the step, and on the final field run
/// the charge synchronously inside the turn.
async fn accept_digits(
    state: &AppState,
    call_sid: &str,
    step: GatherStep,
    digits: &str,
    gather_url: &str,
) -> Twiml {
    let captured = SecretString::from(digits.to_owned());

    let update = match step {
        GatherStep::CollectCard => SessionUpdate {
            card_number: Some(captured),
            step: Some(GatherStep::CollectExpiry),
            strikes: Some(0),
            ..Default::default()
        },
        GatherStep::CollectExpiry => SessionUpdate {
            expiry: Some(captured),
            step: Some(GatherStep::CollectCvv),
            strikes: Some(0),
            ..Default::default()
        },
        GatherStep::CollectCvv => SessionUpdate {
            cvv: Some(captured),
            step: Some(GatherStep::Confirm),
            strikes: Some(0),
            ..Default::default()
        },
        GatherStep::Confirm => return Twiml::internal_error(),
    };

    let Some(updated) = state.sessions.update(call_sid, update) else {
        // Session vanished between get and update.
        return Twiml::new().say(SESSION_EXPIRED_MESSAGE).hangup();
    };
    tracing::debug!(call_sid, step = ?updated.step, "field captured");

    if updated.step != GatherStep::Confirm {
        return Twiml::new().redirect(gather_url);
    }

    // All fields captured. Charge now; the session never survives the
    // attempt, whatever the outcome.
    let outcome = state.payments.charge_session(&updated).await;
    state.sessions.delete(call_sid);

    if outcome.success {
        Twiml::new()
            .say(SUCCESS_MESSAGE)
            .redirect(&updated.callback_url)
    } else {
        let message = outcome
            .message
            .unwrap_or_else(|| "Please try again later".to_owned());
        Twiml::new()
            .say(&format!("Payment declined. {message}"))
            .hangup()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;
    use vx_domain::transaction::{Transaction, TransactionStatus};
    use vx_processor::MockProcessor;
    use vx_sessions::SessionCreate;

    use super::*;
    use crate::testutil;

    // ── Transition table ────────────────────────────────────────────

    #[test]
    fn card_length_boundaries() {
        let ok = |d: &str| check_digits(GatherStep::CollectCard, d) == DigitCheck::Accept;
        assert!(!ok(&"4".repeat(12)));
        assert!(ok(&"4".repeat(13)));
        assert!(ok(&"4".repeat(16)));
        assert!(ok(&"4".repeat(19)));
        assert!(!ok(&"4".repeat(20)));
    }

    #[test]
    fn expiry_requires_exactly_four_digits() {
        assert_eq!(
            check_digits(GatherStep::CollectExpiry, "1225"),
            DigitCheck::Accept
        );
        assert_eq!(
            check_digits(GatherStep::CollectExpiry, "125"),
            DigitCheck::Reject("Invalid format. Enter 4 digits.")
        );
        assert_eq!(
            check_digits(GatherStep::CollectExpiry, "12250"),
            DigitCheck::Reject("Invalid format. Enter 4 digits.")
        );
    }

    #[test]
    fn cvv_allows_three_or_four_digits() {
        assert_eq!(check_digits(GatherStep::CollectCvv, "123"), DigitCheck::Accept);
        assert_eq!(check_digits(GatherStep::CollectCvv, "1234"), DigitCheck::Accept);
        assert_eq!(
            check_digits(GatherStep::CollectCvv, "12"),
            DigitCheck::Reject("Invalid security code length.")
        );
        assert_eq!(
            check_digits(GatherStep::CollectCvv, "12345"),
            DigitCheck::Reject("Invalid security code length.")
        );
    }

    #[test]
    fn non_digit_input_is_rejected_at_every_step() {
        // Multibyte input whose byte length passes the length gates.
        assert_eq!(
            check_digits(GatherStep::CollectExpiry, "\u{20ac}a"),
            DigitCheck::Reject("Invalid format. Enter 4 digits.")
        );
        assert_eq!(
            check_digits(GatherStep::CollectCvv, "\u{20ac}"),
            DigitCheck::Reject("Invalid security code length.")
        );
        assert_eq!(
            check_digits(GatherStep::CollectCard, "4242424242424a42"),
            DigitCheck::Reject("Invalid card length.")
        );
        // DTMF control keys are not digits.
        assert_eq!(
            check_digits(GatherStep::CollectExpiry, "12*5"),
            DigitCheck::Reject("Invalid format. Enter 4 digits.")
        );
    }

    // ── Turn driver ─────────────────────────────────────────────────

    fn open_session(state: &crate::state::AppState, call_sid: &str) -> Uuid {
        let tx = Transaction::pending(500, "usd", "pi_test", None);
        let tx_id = tx.id;
        state.transactions.insert(tx);
        state.sessions.create(
            call_sid,
            SessionCreate {
                amount: 500,
                currency: "usd".into(),
                intent_id: "pi_test".into(),
                transaction_id: tx_id,
                callback_url: "https://agent.example/cb".into(),
            },
        );
        tx_id
    }

    #[tokio::test]
    async fn unknown_call_is_told_session_expired() {
        let (state, _dir) = testutil::test_state(Arc::new(MockProcessor::new()));
        let xml = process_digits(&state, "CA404", "4242424242424242")
            .await
            .finish();
        assert!(xml.contains("Session expired or invalid."));
        assert!(xml.contains("<Hangup/>"));
    }

    #[tokio::test]
    async fn empty_digits_redirect_without_strike() {
        let (state, _dir) = testutil::test_state(Arc::new(MockProcessor::new()));
        open_session(&state, "CA1");

        let xml = process_digits(&state, "CA1", "").await.finish();
        assert!(xml.contains("<Redirect>https://vortex.test/api/twilio/gather</Redirect>"));
        assert!(!xml.contains("<Say>"));

        let session = state.sessions.get("CA1").unwrap();
        assert_eq!(session.strikes, 0);
        assert_eq!(session.step, GatherStep::CollectCard);
    }

    #[tokio::test]
    async fn accepted_card_advances_and_redirects() {
        let (state, _dir) = testutil::test_state(Arc::new(MockProcessor::new()));
        open_session(&state, "CA1");

        let xml = process_digits(&state, "CA1", "4242424242424242")
            .await
            .finish();
        assert!(xml.contains("<Redirect>https://vortex.test/api/twilio/gather</Redirect>"));

        let session = state.sessions.get("CA1").unwrap();
        assert_eq!(session.step, GatherStep::CollectExpiry);
        assert!(session.card_number.is_some());
    }

    #[tokio::test]
    async fn rejection_strikes_and_reprompts() {
        let (state, _dir) = testutil::test_state(Arc::new(MockProcessor::new()));
        open_session(&state, "CA1");

        let xml = process_digits(&state, "CA1", "1234").await.finish();
        assert!(xml.contains("Invalid card length."));
        assert!(xml.contains("<Redirect>"));
        assert!(!xml.contains("<Hangup/>"));

        assert_eq!(state.sessions.get("CA1").unwrap().strikes, 1);
    }

    #[tokio::test]
    async fn valid_submission_resets_strikes() {
        let (state, _dir) = testutil::test_state(Arc::new(MockProcessor::new()));
        open_session(&state, "CA1");

        process_digits(&state, "CA1", "12").await;
        process_digits(&state, "CA1", "12").await;
        assert_eq!(state.sessions.get("CA1").unwrap().strikes, 2);

        process_digits(&state, "CA1", "4242424242424242").await;
        let session = state.sessions.get("CA1").unwrap();
        assert_eq!(session.strikes, 0);
        assert_eq!(session.step, GatherStep::CollectExpiry);
    }

    #[tokio::test]
    async fn third_strike_hangs_up_and_deletes_session() {
        let (state, _dir) = testutil::test_state(Arc::new(MockProcessor::new()));
        open_session(&state, "CA1");

        process_digits(&state, "CA1", "1").await;
        process_digits(&state, "CA1", "1").await;
        let xml = process_digits(&state, "CA1", "1").await.finish();

        assert!(xml.contains("Maximum attempts reached. Hanging up."));
        assert!(xml.contains("<Hangup/>"));
        assert!(!xml.contains("<Redirect>"));
        assert!(state.sessions.get("CA1").is_none());

        // A later submission for the same call behaves as "no session".
        let xml = process_digits(&state, "CA1", "4242424242424242")
            .await
            .finish();
        assert!(xml.contains("Session expired or invalid."));
    }

    #[tokio::test]
    async fn full_dialog_charges_and_redirects_to_callback() {
        let (state, _dir) = testutil::test_state(Arc::new(MockProcessor::new()));
        let tx_id = open_session(&state, "CA123");

        process_digits(&state, "CA123", "4242424242424242").await;
        process_digits(&state, "CA123", "1225").await;
        let xml = process_digits(&state, "CA123", "123").await.finish();

        assert!(xml.contains("Payment successful. Thank you."));
        assert!(xml.contains("<Redirect>https://agent.example/cb</Redirect>"));

        // Session cleared, transaction committed.
        assert!(state.sessions.get("CA123").is_none());
        let tx = state.transactions.get(&tx_id).unwrap();
        assert_eq!(tx.status, TransactionStatus::Succeeded);
        assert!(tx.completed_at.is_some());
    }

    #[tokio::test]
    async fn declined_charge_hangs_up_and_clears_session() {
        let processor = Arc::new(MockProcessor::new().with_tokenize_failure("card_declined"));
        let (state, _dir) = testutil::test_state(processor);
        let tx_id = open_session(&state, "CA1");

        process_digits(&state, "CA1", "4242424242424242").await;
        process_digits(&state, "CA1", "1225").await;
        let xml = process_digits(&state, "CA1", "123").await.finish();

        assert!(xml.contains("Payment declined."));
        assert!(xml.contains("<Hangup/>"));
        assert!(!xml.contains("agent.example"));

        assert!(state.sessions.get("CA1").is_none());
        let tx = state.transactions.get(&tx_id).unwrap();
        assert_eq!(tx.status, TransactionStatus::Failed);
    }

    #[tokio::test]
    async fn multibyte_expiry_strikes_and_the_dialog_recovers() {
        let (state, _dir) = testutil::test_state(Arc::new(MockProcessor::new()));
        let tx_id = open_session(&state, "CA1");

        process_digits(&state, "CA1", "4242424242424242").await;

        // Four bytes, two chars. Must strike, not advance or panic.
        let xml = process_digits(&state, "CA1", "\u{20ac}a").await.finish();
        assert!(xml.contains("Invalid format. Enter 4 digits."));
        let session = state.sessions.get("CA1").unwrap();
        assert_eq!(session.step, GatherStep::CollectExpiry);
        assert_eq!(session.strikes, 1);

        // A valid resubmission completes the dialog normally.
        process_digits(&state, "CA1", "1225").await;
        let xml = process_digits(&state, "CA1", "123").await.finish();
        assert!(xml.contains("Payment successful. Thank you."));
        assert!(state.sessions.get("CA1").is_none());
        assert_eq!(
            state.transactions.get(&tx_id).unwrap().status,
            TransactionStatus::Succeeded
        );
    }

    #[tokio::test]
    async fn raw_digits_never_appear_in_responses_after_capture() {
        let (state, _dir) = testutil::test_state(Arc::new(MockProcessor::new()));
        open_session(&state, "CA1");

        let card = "4242424242424242";
        let xml = process_digits(&state, "CA1", card).await.finish();
        assert!(!xml.contains(card));
    }
}
