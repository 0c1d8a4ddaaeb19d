use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Telephony
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Settings for the IVR digit-collection dialog.
///
/// Note that the "do not log captured input" flag on `<Gather>` is *not*
/// configurable: suppressing provider-side logging of card digits is a
/// compliance requirement, not a preference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelephonyConfig {
    /// Seconds the provider waits for keypad input before giving up
    /// and falling through to the no-input message.
    #[serde(default = "d_10")]
    pub gather_timeout_secs: u64,
}

impl Default for TelephonyConfig {
    fn default() -> Self {
        Self {
            gather_timeout_secs: 10,
        }
    }
}

fn d_10() -> u64 {
    10
}
