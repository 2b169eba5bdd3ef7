//! Damage application records.

use std::collections::HashMap;

use crate::entity::EntityId;

/// One damage application, built by the attacker, passed through any
/// modifiers, and consumed by a single damageable component.
///
/// Not persisted anywhere — a `DamageInfo` lives for exactly one
/// [`World::apply_damage`](crate::World::apply_damage) call.
#[derive(Debug, Clone)]
pub struct DamageInfo {
    /// Base damage amount.
    pub base: i32,
    /// Multiplier applied by modifiers (resistances, scaling).
    pub multiplier: f32,
    /// Upper clamp on the final amount.
    pub max: i32,
    /// The entity responsible for the damage.
    pub attacker: EntityId,
    /// The entity that directly inflicted it (a weapon, a trap).
    pub inflictor: EntityId,
    /// Open-ended side channel for modifiers, e.g. damage type or
    /// material.
    pub tags: HashMap<String, serde_json::Value>,
}

impl DamageInfo {
    /// A plain damage application with no attacker and no clamp.
    #[must_use]
    pub fn new(base: i32) -> Self {
        Self {
            base,
            multiplier: 1.0,
            max: i32::MAX,
            attacker: EntityId::INVALID,
            inflictor: EntityId::INVALID,
            tags: HashMap::new(),
        }
    }

    /// Set the responsible entity.
    #[must_use]
    pub fn with_attacker(mut self, attacker: EntityId) -> Self {
        self.attacker = attacker;
        self
    }

    /// Set the directly inflicting entity.
    #[must_use]
    pub fn with_inflictor(mut self, inflictor: EntityId) -> Self {
        self.inflictor = inflictor;
        self
    }

    /// Attach a modifier tag.
    #[must_use]
    pub fn with_tag(mut self, key: &str, value: serde_json::Value) -> Self {
        self.tags.insert(key.to_string(), value);
        self
    }

    /// The effective amount: base times multiplier, clamped to `max` and
    /// never negative.
    #[must_use]
    pub fn amount(&self) -> i32 {
        ((self.base as f32 * self.multiplier) as i32).clamp(0, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_applies_multiplier_and_clamp() {
        let mut info = DamageInfo::new(10);
        assert_eq!(info.amount(), 10);
        info.multiplier = 2.5;
        assert_eq!(info.amount(), 25);
        info.max = 20;
        assert_eq!(info.amount(), 20);
    }

    #[test]
    fn test_amount_never_negative() {
        let mut info = DamageInfo::new(5);
        info.multiplier = -3.0;
        assert_eq!(info.amount(), 0);
    }

    #[test]
    fn test_tags_side_channel() {
        let info = DamageInfo::new(1).with_tag("material", serde_json::json!("silver"));
        assert_eq!(info.tags["material"], serde_json::json!("silver"));
    }
}
