use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::control::Advisory;
use crate::links::{classify, LinkKind, LinkRole};

/// How long the "Link valid!" confirmation stays up.
pub const LINK_VALID_TTL: Duration = Duration::from_secs(3);

pub const LINK_VALID_MESSAGE: &str = "Link valid!";
pub const LINK_UNRECOGNIZED_MESSAGE: &str =
    "Unrecognized link. Copy it from the \"Share\" menu of the design.";

/// An advisory that may carry an expiry deadline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransientAlert {
    advisory: Advisory,
    expires_at: Option<Instant>,
}

impl TransientAlert {
    /// Alert for a freshly edited link field.
    pub fn for_link(role: LinkRole, raw: &str, now: Instant) -> Self {
        let expected = role.expected_kind();
        match classify(raw) {
            LinkKind::Empty => Self::default(),
            kind if kind == expected => Self {
                advisory: Advisory::positive(LINK_VALID_MESSAGE),
                expires_at: Some(now + LINK_VALID_TTL),
            },
            LinkKind::Unknown => Self {
                advisory: Advisory::warn(LINK_UNRECOGNIZED_MESSAGE),
                expires_at: None,
            },
            kind => Self {
                advisory: Advisory::warn(format!(
                    "You entered a {kind} link. Please enter a {expected} link."
                )),
                expires_at: None,
            },
        }
    }

    pub fn advisory(&self) -> &Advisory {
        &self.advisory
    }

    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    /// Hide the alert once its deadline has passed. Returns true if it changed.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) if now >= deadline => {
                *self = Self::default();
                true
            }
            _ => false,
        }
    }
}

/// Per-role link alerts; a newer edit replaces the older alert and its deadline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkAlerts {
    alerts: BTreeMap<LinkRole, TransientAlert>,
}

impl LinkAlerts {
    pub fn on_edit(&mut self, role: LinkRole, raw: &str, now: Instant) {
        self.alerts
            .insert(role, TransientAlert::for_link(role, raw, now));
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        for alert in self.alerts.values_mut() {
            changed |= alert.expire(now);
        }
        changed
    }

    pub fn advisory(&self, role: LinkRole) -> Advisory {
        self.alerts
            .get(&role)
            .map(|alert| alert.advisory().clone())
            .unwrap_or_default()
    }
}
