//! Race bookkeeping around the vehicle core
//!
//! The session owns the race state, the run timer and the reset token the
//! controller watches. Win and lose only count while a run is active.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::vehicle::SpeedSink;
use crate::consts::*;

/// Phase of the current run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceState {
    /// Waiting for the first start
    #[default]
    Idle,
    /// Player has control
    Running,
    /// Crossed the finish line
    Win,
    /// Fell off the course
    Lose,
}

impl RaceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RaceState::Idle => "Ready",
            RaceState::Running => "Racing",
            RaceState::Win => "You Win!",
            RaceState::Lose => "Try Again",
        }
    }
}

/// Outcome signals fed into the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceEvent {
    Finished,
    Fell,
}

/// Sensor volume at the end of the course
#[derive(Debug, Clone)]
pub struct FinishLine {
    pub center: Vec3,
    pub half_extents: Vec3,
    /// Car was inside on the previous check
    inside: bool,
}

impl Default for FinishLine {
    fn default() -> Self {
        Self::new(FINISH_SENSOR_CENTER, FINISH_SENSOR_HALF_EXTENTS)
    }
}

impl FinishLine {
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self { center, half_extents, inside: false }
    }

    /// Does the car's box overlap the sensor (car treated as axis-aligned)
    pub fn overlaps(&self, car_position: Vec3) -> bool {
        let reach = self.half_extents + CAR_HALF_EXTENTS;
        let d = (car_position - self.center).abs();
        d.x <= reach.x && d.y <= reach.y && d.z <= reach.z
    }

    /// True only on the check where the car enters the sensor
    pub fn check(&mut self, car_position: Vec3) -> bool {
        let inside = self.overlaps(car_position);
        let entered = inside && !self.inside;
        self.inside = inside;
        entered
    }
}

/// State of one play session
#[derive(Debug, Clone, Default)]
pub struct RaceSession {
    pub state: RaceState,
    /// Seconds since the current run started
    pub elapsed: f32,
    /// Frozen time of the last finished run (0 until one finishes)
    pub final_time: f32,
    /// Latest absolute speed reported by the controller
    pub speed: f32,
    /// Bumped on every start; the controller resets when it changes
    pub reset_token: u64,
}

impl RaceSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a fresh run from the start line
    pub fn start_run(&mut self) {
        self.reset_token += 1;
        self.elapsed = 0.0;
        self.final_time = 0.0;
        self.state = RaceState::Running;
        log::info!("Run {} started", self.reset_token);
    }

    /// Advance the run timer
    pub fn tick(&mut self, dt: f32) {
        if self.state == RaceState::Running {
            self.elapsed += dt;
        }
    }

    /// Apply an outcome; ignored unless a run is active
    pub fn handle(&mut self, event: RaceEvent) {
        if self.state != RaceState::Running {
            log::debug!("Ignoring {event:?} while {:?}", self.state);
            return;
        }
        self.state = match event {
            RaceEvent::Finished => RaceState::Win,
            RaceEvent::Fell => RaceState::Lose,
        };
        if self.final_time <= 0.0 {
            self.final_time = self.elapsed;
        }
        self.speed = 0.0;
        log::info!("Run {} ended: {:?} in {:.2}s", self.reset_token, self.state, self.final_time);
    }

    pub fn is_running(&self) -> bool {
        self.state == RaceState::Running
    }

    /// Time shown to the player: live while running, frozen afterwards
    pub fn display_time(&self) -> f32 {
        if self.is_running() || self.final_time <= 0.0 {
            self.elapsed
        } else {
            self.final_time
        }
    }

    /// Speed readout in km/h
    pub fn display_speed_kmh(&self) -> u32 {
        (self.speed * SPEED_DISPLAY_SCALE).round() as u32
    }
}

impl SpeedSink for RaceSession {
    fn report_speed(&mut self, speed: f32) {
        self.speed = speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_run_bumps_token_and_clears_times() {
        let mut session = RaceSession::new();
        session.elapsed = 4.0;
        session.final_time = 4.0;
        session.start_run();
        assert_eq!(session.state, RaceState::Running);
        assert_eq!(session.reset_token, 1);
        assert_eq!(session.elapsed, 0.0);
        assert_eq!(session.final_time, 0.0);
    }

    #[test]
    fn test_timer_only_runs_while_racing() {
        let mut session = RaceSession::new();
        session.tick(1.0);
        assert_eq!(session.elapsed, 0.0);
        session.start_run();
        session.tick(0.5);
        session.tick(0.25);
        assert!((session.elapsed - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_finish_freezes_time_and_zeroes_speed() {
        let mut session = RaceSession::new();
        session.start_run();
        session.tick(12.5);
        session.report_speed(40.0);
        session.handle(RaceEvent::Finished);

        assert_eq!(session.state, RaceState::Win);
        assert_eq!(session.final_time, 12.5);
        assert_eq!(session.speed, 0.0);
        session.tick(3.0);
        assert_eq!(session.display_time(), 12.5);
    }

    #[test]
    fn test_outcomes_ignored_outside_a_run() {
        let mut session = RaceSession::new();
        session.handle(RaceEvent::Fell);
        assert_eq!(session.state, RaceState::Idle);

        session.start_run();
        session.handle(RaceEvent::Finished);
        session.handle(RaceEvent::Fell);
        assert_eq!(session.state, RaceState::Win);
    }

    #[test]
    fn test_speed_readout() {
        let mut session = RaceSession::new();
        session.report_speed(48.0);
        assert_eq!(session.display_speed_kmh(), 288);
        session.report_speed(0.04);
        assert_eq!(session.display_speed_kmh(), 0);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(RaceState::Idle.as_str(), "Ready");
        assert_eq!(RaceState::Lose.as_str(), "Try Again");
    }

    #[test]
    fn test_finish_line_fires_on_entry_only() {
        let mut line = FinishLine::default();
        assert!(!line.check(Vec3::new(0.0, 0.35, -180.0)));
        assert!(line.check(Vec3::new(0.0, 0.35, FINISH_Z + 1.5)));
        assert!(!line.check(Vec3::new(0.0, 0.35, FINISH_Z)));
        assert!(!line.check(Vec3::new(0.0, 0.35, FINISH_Z - 10.0)));
        assert!(line.check(Vec3::new(0.0, 0.35, FINISH_Z)));
    }

    #[test]
    fn test_finish_line_spans_track_width() {
        let line = FinishLine::default();
        assert!(line.overlaps(Vec3::new(TRACK_WIDTH / 2.0, 0.35, FINISH_Z)));
        assert!(!line.overlaps(Vec3::new(TRACK_WIDTH, 0.35, FINISH_Z)));
    }
}
