//! Call flow controller.
//!
//! Renders the digit-collection document for the caller's current step.
//! Pure read path: it never mutates session state, so the telephony
//! provider can refetch it safely after a redirect or a timeout.

use vx_sessions::GatherStep;

use crate::state::AppState;
use crate::twiml::Twiml;

pub const PROCESS_PATH: &str = "/api/twilio/process";
pub const GATHER_PATH: &str = "/api/twilio/gather";

const NO_SESSION_MESSAGE: &str =
    "Error. No active payment session found for this call. Please try again.";
const NO_INPUT_MESSAGE: &str = "We didn't receive any input. Goodbye.";

/// Spoken prompt for a collection step.
fn step_prompt(step: GatherStep) -> Option<&'static str> {
    match step {
        GatherStep::CollectCard => {
            Some("Please enter your 16 digit card number, followed by the pound sign.")
        }
        GatherStep::CollectExpiry => Some(
            "Please enter your card expiration date as 4 digits, month and year, followed by the pound sign.",
        ),
        GatherStep::CollectCvv => {
            Some("Please enter your 3 or 4 digit security code, followed by the pound sign.")
        }
        // All fields captured; the charge is running on the process side.
        GatherStep::Confirm => None,
    }
}

/// Render the gather document for a call.
///
/// Unknown call → spoken error and hangup. Known call → `<Gather>` with the
/// step prompt plus a no-input fallback that ends the call.
pub fn render_gather(state: &AppState, call_sid: &str) -> Twiml {
    let Some(session) = state.sessions.get(call_sid) else {
        tracing::warn!(call_sid, "gather request for unknown call");
        return Twiml::new().say(NO_SESSION_MESSAGE).hangup();
    };

    let Some(prompt) = step_prompt(session.step) else {
        // A gather refetch can race the charge; hold the line and end.
        return Twiml::new()
            .say("Your payment is already being processed. Goodbye.")
            .hangup();
    };

    Twiml::new()
        .gather(
            &state.public_url(PROCESS_PATH),
            state.config.telephony.gather_timeout_secs,
            prompt,
        )
        .say(NO_INPUT_MESSAGE)
        .hangup()
}
