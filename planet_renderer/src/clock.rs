//! Simulation clock with a signed, wrapping speed multiplier

pub const SPEED_STEP: f32 = 0.5;
pub const MIN_SPEED: f32 = -2.0;
pub const MAX_SPEED: f32 = 5.0;
/// Where slowing down past `MIN_SPEED` lands
pub const SLOW_WRAP_SPEED: f32 = 0.1;

#[derive(Debug, Clone)]
pub struct SimulationClock {
    /// Simulation seconds; runs backwards while the speed is negative
    pub current_time: f32,
    pub time_speed: f32,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            time_speed: 1.0,
        }
    }
}

impl SimulationClock {
    pub fn advance(&mut self, dt: f32) {
        self.current_time += dt * self.time_speed;
    }

    /// Step the speed up; past the maximum it wraps to reversed time
    pub fn speed_up(&mut self) -> f32 {
        self.time_speed += SPEED_STEP;
        if self.time_speed > MAX_SPEED {
            self.time_speed = MIN_SPEED;
        }
        self.time_speed
    }

    pub fn slow_down(&mut self) -> f32 {
        self.time_speed -= SPEED_STEP;
        if self.time_speed < MIN_SPEED {
            self.time_speed = SLOW_WRAP_SPEED;
        }
        self.time_speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_scales_by_speed() {
        let mut clock = SimulationClock::default();
        clock.advance(0.5);
        assert_eq!(clock.current_time, 0.5);

        clock.time_speed = -2.0;
        clock.advance(1.0);
        assert_eq!(clock.current_time, -1.5);
    }

    #[test]
    fn speed_up_wraps_to_reverse() {
        let mut clock = SimulationClock {
            time_speed: 5.0,
            ..Default::default()
        };
        assert_eq!(clock.speed_up(), -2.0);
    }

    #[test]
    fn slow_down_wraps_to_crawl() {
        let mut clock = SimulationClock {
            time_speed: -2.0,
            ..Default::default()
        };
        assert_eq!(clock.slow_down(), 0.1);
    }

    #[test]
    fn speed_up_from_default_reaches_max_before_wrapping() {
        let mut clock = SimulationClock::default();
        let seen: Vec<f32> = (0..9).map(|_| clock.speed_up()).collect();
        assert_eq!(seen, vec![1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0, -2.0]);
    }

    #[test]
    fn speed_stays_within_range() {
        let mut clock = SimulationClock::default();
        for i in 0..100 {
            let speed = if i % 3 == 0 { clock.slow_down() } else { clock.speed_up() };
            assert!((MIN_SPEED..=MAX_SPEED).contains(&speed));
        }
    }
}
