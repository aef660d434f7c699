//! Water droplet state.

use glam::Vec2;

/// Droplets with less water than this are considered dried up.
pub const MIN_WATER: f32 = 0.01;

/// Mutable state of one simulated droplet.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    position: Vec2,
    velocity: Vec2,
    sediment: f32,
    water: f32,
}

impl Particle {
    /// A droplet at rest at `(x, y)` carrying no sediment and a full unit of water.
    pub fn new(x: f32, y: f32) -> Self {
        Self::with_water(x, y, 1.0)
    }

    pub fn with_water(x: f32, y: f32, water: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            velocity: Vec2::ZERO,
            sediment: 0.0,
            water,
        }
    }

    pub fn x(&self) -> f32 {
        self.position.x
    }

    pub fn y(&self) -> f32 {
        self.position.y
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    pub fn sediment(&self) -> f32 {
        self.sediment
    }

    /// Adds (or, with a negative amount, removes) carried sediment.
    pub fn add_sediment(&mut self, amount: f32) {
        self.sediment += amount;
    }

    pub fn set_sediment(&mut self, amount: f32) {
        self.sediment = amount;
    }

    pub fn water(&self) -> f32 {
        self.water
    }

    /// Loses `rate` of the remaining water.
    pub fn evaporate(&mut self, rate: f32) {
        self.water *= 1.0 - rate;
    }

    pub fn is_active(&self) -> bool {
        self.water > MIN_WATER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_particle() {
        let p = Particle::new(3.5, 7.25);
        assert_eq!(p.x(), 3.5);
        assert_eq!(p.y(), 7.25);
        assert_eq!(p.velocity(), Vec2::ZERO);
        assert_eq!(p.sediment(), 0.0);
        assert_eq!(p.water(), 1.0);
        assert!(p.is_active());
    }

    #[test]
    fn test_sediment_updates() {
        let mut p = Particle::new(0.0, 0.0);
        p.add_sediment(0.4);
        p.add_sediment(-0.1);
        assert!((p.sediment() - 0.3).abs() < 1e-6);
        p.set_sediment(-1.0);
        assert_eq!(p.sediment(), -1.0);
    }

    #[test]
    fn test_evaporation_shrinks_water_until_inactive() {
        let mut p = Particle::new(0.0, 0.0);
        let mut last = p.water();
        let mut steps = 0;
        while p.is_active() {
            p.evaporate(0.5);
            assert!(p.water() < last);
            last = p.water();
            steps += 1;
        }
        assert_eq!(steps, 7);
    }
}
