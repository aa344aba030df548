//! Melee attack finite state machine.
//!
//! Windup -> Active -> Recovery -> Idle, all timed in seconds and advanced by
//! the frame dt. The hitbox exists only while the state is `Active`; the
//! combat manager spawns it on the Windup->Active edge.

/// Timing/cost profile for one melee swing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttackSpec {
    pub windup_s: f32,
    pub active_s: f32,
    pub recovery_s: f32,
    pub damage: i32,
    /// Reach of the hitbox in front of the attacker (meters).
    pub reach: f32,
    /// Half-extents of the spawned hitbox.
    pub half_extent: [f32; 3],
    pub stamina_cost: f32,
}

impl Default for AttackSpec {
    fn default() -> Self {
        Self {
            windup_s: 0.25,
            active_s: 0.20,
            recovery_s: 0.35,
            damage: 12,
            reach: 1.2,
            half_extent: [0.6, 0.7, 0.7],
            stamina_cost: 18.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum AttackState {
    #[default]
    Idle,
    Windup {
        remaining_s: f32,
    },
    Active {
        remaining_s: f32,
    },
    Recovery {
        remaining_s: f32,
    },
}

impl AttackState {
    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, AttackState::Idle)
    }

    /// Begin a swing; only legal from Idle (no canceling).
    pub fn start(&mut self, spec: &AttackSpec) -> bool {
        if !self.is_idle() {
            return false;
        }
        *self = AttackState::Windup {
            remaining_s: spec.windup_s,
        };
        true
    }

    /// Advance timers by dt. Returns true exactly once per swing, on the
    /// Windup->Active edge, which is when the hitbox must spawn.
    pub fn tick(&mut self, spec: &AttackSpec, dt: f32) -> bool {
        let mut entered_active = false;
        // Carry leftover dt across an edge so short phases are not skipped at
        // low frame rates.
        let mut dt = dt;
        loop {
            match *self {
                AttackState::Idle => break,
                AttackState::Windup { remaining_s } => {
                    if dt < remaining_s {
                        *self = AttackState::Windup {
                            remaining_s: remaining_s - dt,
                        };
                        break;
                    }
                    dt -= remaining_s;
                    *self = AttackState::Active {
                        remaining_s: spec.active_s,
                    };
                    entered_active = true;
                }
                AttackState::Active { remaining_s } => {
                    if dt < remaining_s {
                        *self = AttackState::Active {
                            remaining_s: remaining_s - dt,
                        };
                        break;
                    }
                    dt -= remaining_s;
                    *self = AttackState::Recovery {
                        remaining_s: spec.recovery_s,
                    };
                }
                AttackState::Recovery { remaining_s } => {
                    if dt < remaining_s {
                        *self = AttackState::Recovery {
                            remaining_s: remaining_s - dt,
                        };
                        break;
                    }
                    dt -= remaining_s;
                    *self = AttackState::Idle;
                }
            }
        }
        entered_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_swing_walks_every_phase() {
        let spec = AttackSpec::default();
        let mut st = AttackState::Idle;
        assert!(st.start(&spec));
        assert!(matches!(st, AttackState::Windup { .. }));
        // Not yet active
        assert!(!st.tick(&spec, spec.windup_s * 0.5));
        // Crossing the edge reports active exactly once
        assert!(st.tick(&spec, spec.windup_s));
        assert!(matches!(st, AttackState::Active { .. }));
        assert!(!st.tick(&spec, spec.active_s));
        assert!(matches!(st, AttackState::Recovery { .. }));
        assert!(!st.tick(&spec, spec.recovery_s));
        assert!(st.is_idle());
    }

    #[test]
    fn cannot_start_mid_swing() {
        let spec = AttackSpec::default();
        let mut st = AttackState::Idle;
        assert!(st.start(&spec));
        assert!(!st.start(&spec));
        st.tick(&spec, spec.windup_s + 0.01);
        assert!(!st.start(&spec));
    }

    #[test]
    fn giant_dt_still_reports_active_edge() {
        // A hitch spanning the whole swing must not swallow the hitbox spawn.
        let spec = AttackSpec::default();
        let mut st = AttackState::Idle;
        st.start(&spec);
        assert!(st.tick(&spec, 10.0));
        assert!(st.is_idle());
    }
}
