//! Two-phase local patches: propose, then commit or revert once the
//! transport answers.

use casino_core::CompletionFlags;
use client_blockchain_core::Modifier;

/// A value with at most one unconfirmed proposal on top.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tentative<T> {
    confirmed: T,
    proposed: Option<T>,
}

impl<T: Clone> Tentative<T> {
    pub fn new(value: T) -> Self {
        Self {
            confirmed: value,
            proposed: None,
        }
    }

    /// Value to display: the proposal if one is outstanding.
    pub fn value(&self) -> &T {
        self.proposed.as_ref().unwrap_or(&self.confirmed)
    }

    pub fn confirmed(&self) -> &T {
        &self.confirmed
    }

    pub fn is_tentative(&self) -> bool {
        self.proposed.is_some()
    }

    /// Returns `false` if a proposal is already outstanding.
    pub fn propose(&mut self, value: T) -> bool {
        if self.proposed.is_some() {
            return false;
        }
        self.proposed = Some(value);
        true
    }

    pub fn commit(&mut self) {
        if let Some(value) = self.proposed.take() {
            self.confirmed = value;
        }
    }

    pub fn revert(&mut self) {
        self.proposed = None;
    }

    /// Replaces the confirmed value underneath an outstanding proposal.
    pub fn rebase(&mut self, value: T) {
        self.confirmed = value;
    }
}

/// Armed state of the session modifiers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    shield: Tentative<bool>,
    double: Tentative<bool>,
}

impl Modifiers {
    pub fn get(&self, modifier: Modifier) -> &Tentative<bool> {
        match modifier {
            Modifier::Shield => &self.shield,
            Modifier::Double => &self.double,
        }
    }

    pub fn get_mut(&mut self, modifier: Modifier) -> &mut Tentative<bool> {
        match modifier {
            Modifier::Shield => &mut self.shield,
            Modifier::Double => &mut self.double,
        }
    }

    /// Disarms every modifier the ledger reports as used. A toggle still
    /// awaiting the transport stays pending.
    pub fn consume(&mut self, flags: CompletionFlags) {
        for modifier in [Modifier::Shield, Modifier::Double] {
            if flags.contains(modifier.consumed_flag()) {
                self.get_mut(modifier).rebase(false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proposal_commits_or_reverts() {
        let mut value = Tentative::new(false);
        assert!(value.propose(true));
        assert!(!value.propose(false));
        assert!(*value.value());
        assert!(!*value.confirmed());

        value.revert();
        assert!(!*value.value());
        assert!(!value.is_tentative());

        value.propose(true);
        value.commit();
        assert!(*value.confirmed());
    }

    #[test]
    fn completion_flags_disarm_used_modifiers() {
        let mut modifiers = Modifiers::default();
        modifiers.get_mut(Modifier::Shield).rebase(true);
        modifiers.get_mut(Modifier::Double).rebase(true);
        modifiers.consume(CompletionFlags::DOUBLE_USED);
        assert!(*modifiers.get(Modifier::Shield).value());
        assert!(!*modifiers.get(Modifier::Double).value());
    }

    #[test]
    fn consuming_keeps_a_pending_toggle() {
        let mut modifiers = Modifiers::default();
        assert!(modifiers.get_mut(Modifier::Shield).propose(true));
        modifiers.consume(CompletionFlags::SHIELD_USED);

        let shield = modifiers.get_mut(Modifier::Shield);
        assert!(shield.is_tentative());
        assert!(!*shield.confirmed());
        shield.commit();
        assert!(*shield.value());
    }
}
