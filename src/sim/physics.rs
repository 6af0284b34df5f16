//! Agent integration and collision tests
//!
//! All geometry is screen-space: y grows downward, boxes are anchored at
//! their top-left corner.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Agent, Obstacle, Pickup};

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Box of half-extent `half` around a center point
    pub fn around(center: Vec2, half: f32) -> Self {
        Self::new(center.x - half, center.y - half, half * 2.0, half * 2.0)
    }

    /// Shrink by `margin` on every side
    pub fn inset(&self, margin: f32) -> Self {
        Self::new(
            self.x + margin,
            self.y + margin,
            (self.w - margin * 2.0).max(0.0),
            (self.h - margin * 2.0).max(0.0),
        )
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Open-interval overlap on the x axis
    #[inline]
    pub fn overlaps_x(&self, left: f32, right: f32) -> bool {
        self.x < right && self.right() > left
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.overlaps_x(other.x, other.right()) && self.y < other.bottom() && self.bottom() > other.y
    }
}

/// Which half of an obstacle was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleHit {
    Top,
    Bottom,
}

/// Outcome of the vertical boundary check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Inside,
    /// Hit the ceiling and was clamped
    Ceiling,
    /// Fell through the floor (lethal)
    Floor,
}

/// One semi-implicit Euler step: velocity first, then position
pub fn integrate(agent: &mut Agent, gravity: f32, time_scale: f32) {
    agent.vel += gravity * time_scale;
    agent.y += agent.vel * time_scale;
}

/// Apply the soft ceiling and report a floor breach
pub fn check_bounds(agent: &mut Agent, playfield_height: f32) -> Boundary {
    if agent.y < 0.0 {
        agent.y = 0.0;
        agent.vel = 0.0;
        return Boundary::Ceiling;
    }
    if agent.y + agent.height > playfield_height {
        return Boundary::Floor;
    }
    Boundary::Inside
}

/// Test an agent hitbox against both halves of an obstacle
pub fn obstacle_collision(hitbox: &Rect, obstacle: &Obstacle) -> Option<ObstacleHit> {
    if !hitbox.overlaps_x(obstacle.x, obstacle.right()) {
        return None;
    }
    if hitbox.y < obstacle.gap_y {
        return Some(ObstacleHit::Top);
    }
    if hitbox.bottom() > obstacle.gap_bottom() {
        return Some(ObstacleHit::Bottom);
    }
    None
}

/// Generous pickup hitbox: `radius * scale` on each side of the center
pub fn pickup_hitbox(pickup: &Pickup, scale: f32) -> Rect {
    Rect::around(pickup.pos, pickup.radius * scale)
}

/// Box test between the agent's full sprite box and the enlarged pickup box
pub fn pickup_collision(agent_box: &Rect, pickup: &Pickup, scale: f32) -> bool {
    agent_box.intersects(&pickup_hitbox(pickup, scale))
}

/// Pull a point toward a target by `pull` of the offset if within `radius`.
/// Returns whether the pull applied.
pub fn magnet_pull(pos: &mut Vec2, target: Vec2, radius: f32, pull: f32) -> bool {
    let offset = target - *pos;
    if offset.length() < radius {
        *pos += offset * pull;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::PickupKind;
    use crate::tuning::Tuning;

    fn obstacle(x: f32, gap_y: f32, gap_size: f32) -> Obstacle {
        Obstacle {
            id: 1,
            x,
            gap_y,
            gap_size,
            width: 60.0,
            passed: false,
        }
    }

    fn agent_at(y: f32) -> Agent {
        let mut agent = Agent::new(&Tuning::desktop());
        agent.y = y;
        agent
    }

    #[test]
    fn test_integrate_one_tick() {
        let mut agent = agent_at(300.0);
        integrate(&mut agent, 0.2, 1.0);
        assert!((agent.vel - 0.2).abs() < 1e-6);
        assert!((agent.y - 300.2).abs() < 1e-4);
    }

    #[test]
    fn test_integrate_slow_time() {
        let mut agent = agent_at(300.0);
        agent.vel = 2.0;
        integrate(&mut agent, 0.2, 0.5);
        assert!((agent.vel - 2.1).abs() < 1e-6);
        assert!((agent.y - 301.05).abs() < 1e-4);
    }

    #[test]
    fn test_ceiling_clamps_without_damage() {
        let mut agent = agent_at(-4.0);
        agent.vel = -3.0;
        assert_eq!(check_bounds(&mut agent, 600.0), Boundary::Ceiling);
        assert_eq!(agent.y, 0.0);
        assert_eq!(agent.vel, 0.0);
    }

    #[test]
    fn test_floor_is_lethal_not_clamped() {
        let mut agent = agent_at(575.0);
        assert_eq!(check_bounds(&mut agent, 600.0), Boundary::Floor);
        assert_eq!(agent.y, 575.0);
    }

    #[test]
    fn test_inside_gap_is_safe() {
        // Agent box 80..120 x 285..315, inset 5 -> 85..115 x 290..310
        let agent = agent_at(285.0);
        let hitbox = agent.hitbox(5.0);
        let obs = obstacle(70.0, 250.0, 100.0);
        assert_eq!(obstacle_collision(&hitbox, &obs), None);
    }

    #[test]
    fn test_top_and_bottom_hits() {
        let agent = agent_at(285.0);
        let hitbox = agent.hitbox(5.0);
        assert_eq!(
            obstacle_collision(&hitbox, &obstacle(70.0, 295.0, 150.0)),
            Some(ObstacleHit::Top)
        );
        assert_eq!(
            obstacle_collision(&hitbox, &obstacle(70.0, 150.0, 150.0)),
            Some(ObstacleHit::Bottom)
        );
    }

    #[test]
    fn test_margin_forgives_grazes() {
        // Full box would clip the top edge by 3px, the inset box does not
        let agent = agent_at(285.0);
        let obs = obstacle(70.0, 288.0, 100.0);
        assert_eq!(obstacle_collision(&agent.hitbox(5.0), &obs), None);
        assert_eq!(
            obstacle_collision(&agent.bounds(), &obs),
            Some(ObstacleHit::Top)
        );
    }

    #[test]
    fn test_no_hit_when_horizontally_clear() {
        let agent = agent_at(0.0);
        let hitbox = agent.hitbox(5.0);
        // Inset box spans x 85..115
        assert_eq!(obstacle_collision(&hitbox, &obstacle(115.0, 300.0, 100.0)), None);
        assert_eq!(obstacle_collision(&hitbox, &obstacle(25.0, 300.0, 100.0)), None);
        assert!(obstacle_collision(&hitbox, &obstacle(26.0, 300.0, 100.0)).is_some());
    }

    #[test]
    fn test_pickup_box_is_generous() {
        let agent = agent_at(285.0);
        // Agent box right edge at 120; pickup radius 15 * 1.4 = 21
        let pickup = Pickup {
            id: 1,
            kind: PickupKind::Coin,
            pos: Vec2::new(140.0, 300.0),
            radius: 15.0,
            rotation: 0.0,
            magnetized: false,
        };
        assert!(pickup_collision(&agent.bounds(), &pickup, 1.4));
        // Nominal radius alone would miss
        assert!(!pickup_collision(&agent.bounds(), &pickup, 1.0));
    }

    #[test]
    fn test_magnet_pull_range() {
        let mut pos = Vec2::new(200.0, 300.0);
        assert!(magnet_pull(&mut pos, Vec2::new(100.0, 300.0), 150.0, 0.05));
        assert!((pos.x - 195.0).abs() < 1e-4);

        let mut far = Vec2::new(400.0, 300.0);
        assert!(!magnet_pull(&mut far, Vec2::new(100.0, 300.0), 150.0, 0.05));
        assert_eq!(far.x, 400.0);
    }
}
