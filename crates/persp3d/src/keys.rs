//! Arena keys.
//!
//! Perspectives and boxes live in slot maps owned by the [`Scene`](crate::Scene).
//! Keys are generational: a key to a removed entity never aliases a newer one.

use slotmap::new_key_type;

new_key_type! {
    /// Key for a perspective.
    pub struct PerspKey;

    /// Key for a box.
    pub struct BoxKey;
}
