//! Ball kinematics and wall collision.

use core::f32::consts::FRAC_1_SQRT_2;

use crate::{
    config::{
        Geometry,
        Physics,
    },
    maze::{
        Cell,
        CellPos,
        Maze,
    },
    sample::Tilt,
};

/// Unit vectors at 0°, 45°, ... 315°; the ball rim is probed at these points.
const RIM: [(f32, f32); 8] = [
    (1.0, 0.0),
    (FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    (0.0, 1.0),
    (-FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    (-1.0, 0.0),
    (-FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
    (0.0, -1.0),
    (FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
];

/// Ball state in screen pixels (position), px/s (velocity) and px/s² (acceleration).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Ball {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub ax: f32,
    pub ay: f32,
}

/// What a physics step did with the tentative move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Motion {
    Moved,
    Bounced,
}

impl Ball {
    /// A ball at rest in the middle of `cell`.
    pub fn at_cell(geo: &Geometry, cell: CellPos) -> Self {
        let (x, y) = geo.cell_center(cell.0, cell.1);
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    pub fn speed(&self) -> f32 {
        libm::sqrtf(self.vx * self.vx + self.vy * self.vy)
    }

    /// Advances the ball by `dt` seconds under `tilt`.
    ///
    /// The tentative position is accepted only if none of the rim probes
    /// lands in a wall; otherwise the ball stays put and its velocity is
    /// reversed and damped by `physics.bounce`.
    pub fn step(
        &mut self,
        dt: f32,
        tilt: Tilt,
        maze: &Maze,
        geo: &Geometry,
        physics: &Physics,
    ) -> Motion {
        self.ax = tilt.x * physics.gravity * physics.tilt_scale;
        self.ay = tilt.y * physics.gravity * physics.tilt_scale;

        self.vx += self.ax * dt;
        self.vy += self.ay * dt;
        self.vx *= physics.friction;
        self.vy *= physics.friction;

        let speed = self.speed();
        if speed > physics.max_speed {
            self.vx = self.vx / speed * physics.max_speed;
            self.vy = self.vy / speed * physics.max_speed;
        }

        let new_x = self.x + self.vx * dt;
        let new_y = self.y + self.vy * dt;

        if self.touches_wall(new_x, new_y, maze, geo) {
            self.vx *= physics.bounce;
            self.vy *= physics.bounce;
            Motion::Bounced
        } else {
            self.x = new_x;
            self.y = new_y;
            Motion::Moved
        }
    }

    fn touches_wall(&self, x: f32, y: f32, maze: &Maze, geo: &Geometry) -> bool {
        RIM.iter().any(|&(dx, dy)| {
            maze.cell_at(geo, x + dx * geo.ball_radius, y + dy * geo.ball_radius) == Cell::Wall
        })
    }

    /// Cell kind under the ball's center.
    pub fn cell(&self, maze: &Maze, geo: &Geometry) -> Cell {
        maze.cell_at(geo, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn setup() -> (Maze, Geometry, Physics) {
        (Maze::load(2), Geometry::default(), Physics::default())
    }

    #[test]
    fn free_move_is_position_plus_velocity_times_dt() {
        let (maze, geo, physics) = setup();
        // PILLARS row 1 is open from column 1 to 14.
        let mut ball = Ball::at_cell(&geo, (5, 1));
        ball.vx = 12.0;
        let before = ball;
        let dt = 0.033;

        assert_eq!(ball.step(dt, Tilt::default(), &maze, &geo, &physics), Motion::Moved);
        assert!((ball.x - (before.x + ball.vx * dt)).abs() < EPS);
        assert!((ball.y - before.y).abs() < EPS);
    }

    #[test]
    fn wall_contact_reverses_and_damps_velocity() {
        let (maze, geo, physics) = setup();
        // Row 0 is wall; push the ball upward from the top corridor.
        let mut ball = Ball::at_cell(&geo, (5, 1));
        ball.y = geo.offset_y + geo.cell_size + geo.ball_radius + 0.5;
        ball.vy = -30.0;
        ball.vx = 4.0;
        let before = ball;

        assert_eq!(
            ball.step(0.033, Tilt::default(), &maze, &geo, &physics),
            Motion::Bounced
        );
        assert_eq!((ball.x, ball.y), (before.x, before.y));
        assert!((ball.vx - before.vx * -0.3).abs() < EPS);
        assert!((ball.vy - before.vy * -0.3).abs() < EPS);
    }

    #[test]
    fn speed_never_exceeds_cap() {
        let (maze, geo, physics) = setup();
        let mut ball = Ball::at_cell(&geo, (5, 5));
        let mut seed: u32 = 0x1234_5678;
        for _ in 0..500 {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let tx = ((seed >> 16) as i16) as f32;
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let ty = ((seed >> 16) as i16) as f32;
            ball.step(0.033, Tilt { x: tx, y: ty }, &maze, &geo, &physics);
            assert!(ball.speed() <= physics.max_speed + EPS, "speed {}", ball.speed());
        }
    }

    #[test]
    fn clamp_keeps_direction() {
        let (maze, geo, physics) = setup();
        let mut ball = Ball::at_cell(&geo, (5, 5));
        ball.vx = 300.0;
        ball.vy = 400.0;
        ball.step(0.0, Tilt::default(), &maze, &geo, &physics);
        assert!((ball.vx - 24.0).abs() < EPS);
        assert!((ball.vy - 32.0).abs() < EPS);
    }

    #[test]
    fn friction_decays_velocity() {
        let (maze, geo, _) = setup();
        let physics = Physics {
            friction: 0.9,
            ..Physics::default()
        };
        let mut ball = Ball::at_cell(&geo, (5, 5));
        ball.vx = 10.0;
        ball.step(0.0, Tilt::default(), &maze, &geo, &physics);
        assert!((ball.vx - 9.0).abs() < EPS);
    }

    #[test]
    fn tilt_sets_acceleration() {
        let (maze, geo, physics) = setup();
        let mut ball = Ball::at_cell(&geo, (5, 5));
        ball.step(0.01, Tilt { x: 100.0, y: -200.0 }, &maze, &geo, &physics);
        assert!((ball.ax - 10.0).abs() < EPS);
        assert!((ball.ay + 20.0).abs() < EPS);
        assert!((ball.vx - 0.1).abs() < EPS);
    }
}
