use serde::Deserialize;

use crate::pattern::oscillator::Direction;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct VelocityConfig {
    /// Most negative speed in pixels per second.
    pub floor: f32,
    /// Most positive speed in pixels per second.
    pub ceiling: f32,
    /// Change in speed per second while ramping.
    pub step: f32,
    /// Seconds spent at each bound before reversing.
    pub hold_delay: f32,
    /// Accepted for compatibility with existing settings; the state machine only reads `hold_delay`.
    pub hold: f32,
    /// Oscillate automatically; otherwise the speed only changes on request.
    pub auto: bool,
    /// Manual speed change per nudge.
    pub increment: f32,
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            floor: -4000.0,
            ceiling: 4000.0,
            step: 100.0,
            hold_delay: 2.5,
            hold: 6.0,
            auto: true,
            increment: 100.0,
        }
    }
}

impl VelocityConfig {
    /// Floor forced negative; ceiling, step and delays forced positive.
    pub fn normalized(self) -> Self {
        Self {
            floor: -self.floor.abs(),
            ceiling: self.ceiling.abs(),
            step: self.step.abs(),
            hold_delay: self.hold_delay.max(0.0),
            hold: self.hold,
            auto: self.auto,
            increment: self.increment.abs(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VelocityPhase {
    Changing,
    HoldAtCeiling,
    HoldAtFloor,
}

/// Scroll speed that ramps between a negative floor and a positive ceiling,
/// pausing at each bound.
#[derive(Clone, Debug)]
pub struct VelocityModulator {
    config: VelocityConfig,
    velocity: f32,
    direction: Direction,
    phase: VelocityPhase,
    phase_timer: f32,
    auto: bool,
}

impl VelocityModulator {
    pub fn new(config: VelocityConfig) -> Self {
        let config = config.normalized();
        Self {
            config,
            velocity: config.floor,
            direction: Direction::Rising,
            phase: VelocityPhase::Changing,
            phase_timer: 0.0,
            auto: config.auto,
        }
    }

    /// Steps the state machine by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        if !self.auto || !dt.is_finite() || dt <= 0.0 {
            return;
        }

        match self.phase {
            VelocityPhase::Changing => match self.direction {
                Direction::Rising => {
                    self.velocity += self.config.step * dt;
                    if self.velocity >= self.config.ceiling {
                        self.velocity = self.config.ceiling;
                        self.enter(VelocityPhase::HoldAtCeiling);
                    }
                },
                Direction::Falling => {
                    self.velocity -= self.config.step * dt;
                    if self.velocity <= self.config.floor {
                        self.velocity = self.config.floor;
                        self.enter(VelocityPhase::HoldAtFloor);
                    }
                },
            },
            VelocityPhase::HoldAtCeiling | VelocityPhase::HoldAtFloor => {
                self.phase_timer += dt;
                if self.phase_timer >= self.config.hold_delay {
                    self.direction = match self.phase {
                        VelocityPhase::HoldAtCeiling => Direction::Falling,
                        _ => Direction::Rising,
                    };
                    self.phase = VelocityPhase::Changing;
                }
            },
        }
    }

    fn enter(&mut self, phase: VelocityPhase) {
        self.phase = phase;
        self.phase_timer = 0.0;
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn phase(&self) -> VelocityPhase {
        self.phase
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn config(&self) -> &VelocityConfig {
        &self.config
    }

    pub fn is_auto(&self) -> bool {
        self.auto
    }

    /// Switching automatic mode back on restarts the oscillation from the floor.
    pub fn set_auto(&mut self, auto: bool) {
        self.auto = auto;
        if auto {
            self.reset();
        }
    }

    pub fn reset(&mut self) {
        self.velocity = self.config.floor;
        self.direction = Direction::Rising;
        self.phase = VelocityPhase::Changing;
        self.phase_timer = 0.0;
    }

    /// Manual speed change by `steps` increments; ignored while automatic.
    pub fn nudge(&mut self, steps: i32) {
        if !self.auto {
            self.velocity += steps as f32 * self.config.increment;
        }
    }

    pub fn set_velocity(&mut self, velocity: f32) {
        if velocity.is_finite() {
            self.velocity = velocity;
        }
    }
}
