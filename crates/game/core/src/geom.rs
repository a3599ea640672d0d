//! Minimal 2D vector math for the playfield.

/// 2D vector; the field origin is top-left and +y points down.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector for a firing angle in degrees: 0° points straight up
    /// (toward -y), positive angles rotate clockwise.
    pub fn from_angle_deg(deg: f32) -> Self {
        let rad = deg.to_radians();
        Self {
            x: rad.sin(),
            y: -rad.cos(),
        }
    }

    /// Firing angle of this vector in degrees (inverse of
    /// [`Vec2::from_angle_deg`]).
    pub fn angle_deg(self) -> f32 {
        self.x.atan2(-self.y).to_degrees()
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    pub fn normalized(self) -> Self {
        let len = self.length();
        if len <= f32::EPSILON {
            return Self::ZERO;
        }
        self.scaled(1.0 / len)
    }

    pub fn distance_to(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    /// Advance by velocity over `dt_ms` milliseconds (velocity is units
    /// per second).
    pub fn integrated(self, vel: Vec2, dt_ms: u64) -> Self {
        self + vel.scaled(dt_ms as f32 / 1000.0)
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_zero_points_up() {
        let v = Vec2::from_angle_deg(0.0);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn angle_round_trips() {
        for deg in [-170.0f32, -45.0, 0.0, 30.0, 90.0, 179.0] {
            let v = Vec2::from_angle_deg(deg);
            assert!((v.angle_deg() - deg).abs() < 1e-3);
        }
    }

    #[test]
    fn integration_uses_seconds() {
        let pos = Vec2::new(0.0, 0.0).integrated(Vec2::new(100.0, 0.0), 500);
        assert!((pos.x - 50.0).abs() < 1e-6);
    }
}
