use super::*;

pub struct Plugin;

impl bevy::app::Plugin for Plugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PhysicsState>()
            .init_resource::<SolidTiles>()
            .init_resource::<LadderTiles>();
    }
}

/// How far below the player to probe for ground contact, in pixels.
const GROUND_PROBE: f32 = 2.0;
/// Keeps a rect resting exactly on a cell boundary out of the next cell.
const EDGE_EPS: f32 = 0.01;

/// Answers the two queries the rest of the game asks the physics engine.
#[derive(Resource, Default)]
pub struct PhysicsState {
    pub grounded: bool,
    pub on_ladder: bool,
}

impl PhysicsState {
    pub fn can_jump(&self) -> bool {
        self.grounded
    }

    pub fn is_on_ladder(&self) -> bool {
        self.on_ladder
    }
}

#[derive(Component, Default, Clone, Copy, Debug, PartialEq)]
pub struct Velocity(pub Vec2);

/// Solid cells of the Platforms layer, keyed by grid coordinates.
#[derive(Resource, Default)]
pub struct SolidTiles(pub TileGrid);

/// Cells of the Ladders layer.
#[derive(Resource, Default)]
pub struct LadderTiles(pub TileGrid);

#[derive(Default)]
pub struct TileGrid {
    pub cells: HashSet<(i32, i32)>,
    pub grid_size: f32,
}

impl TileGrid {
    pub fn overlaps(&self, rect: Rect) -> bool {
        if self.cells.is_empty() {
            return false;
        }
        let g = self.grid_size;
        let x0 = (rect.min.x / g).floor() as i32;
        let y0 = (rect.min.y / g).floor() as i32;
        let x1 = ((rect.max.x - EDGE_EPS) / g).floor() as i32;
        let y1 = ((rect.max.y - EDGE_EPS) / g).floor() as i32;
        (x0..=x1).any(|x| (y0..=y1).any(|y| self.cells.contains(&(x, y))))
    }
}

pub fn intersects(a: Rect, b: Rect) -> bool {
    !a.intersect(b).is_empty()
}

pub fn shifted(rect: Rect, delta: Vec2) -> Rect {
    Rect {
        min: rect.min + delta,
        max: rect.max + delta,
    }
}

fn unit(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

pub struct StepResult {
    pub offset: Vec2,
    pub velocity: Vec2,
    pub grounded: bool,
}

/// Walks `rect` along one axis in whole-pixel steps plus a fractional
/// remainder, stopping at the first solid contact. Stepping instead of
/// testing only the endpoint keeps fast falls from tunnelling through tiles.
fn sweep(mut rect: Rect, delta: Vec2, solid: &dyn Fn(Rect) -> bool) -> (Vec2, bool) {
    let mut travelled = Vec2::ZERO;
    let mut remaining = delta.x.abs().max(delta.y.abs());
    let dir = Vec2::new(unit(delta.x), unit(delta.y));
    while remaining > 0.0 {
        let step = dir * remaining.min(1.0);
        let next = shifted(rect, step);
        if solid(next) {
            return (travelled, true);
        }
        travelled += step;
        rect = next;
        remaining -= 1.0;
    }
    (travelled, false)
}

/// One platformer integration step: x axis first, then y, each clamped to the
/// touching edge of whatever solid it runs into.
pub fn step(rect: Rect, velocity: Vec2, solid: &dyn Fn(Rect) -> bool) -> StepResult {
    let (dx, hit_x) = sweep(rect, Vec2::new(velocity.x, 0.0), solid);
    let rect = shifted(rect, dx);
    let (dy, hit_y) = sweep(rect, Vec2::new(0.0, velocity.y), solid);
    let rect = shifted(rect, dy);
    let mut velocity = velocity;
    if hit_x {
        velocity.x = 0.0;
    }
    if hit_y {
        velocity.y = 0.0;
    }
    let grounded = velocity.y <= 0.0 && solid(shifted(rect, Vec2::new(0.0, -GROUND_PROBE)));
    StepResult {
        offset: dx + dy,
        velocity,
        grounded,
    }
}

pub fn physics_step(
    config: Res<Config>,
    solids: Res<SolidTiles>,
    ladders: Res<LadderTiles>,
    platforms: Query<(&Transform, &MovingPlatform, &Velocity), Without<Player>>,
    mut players: Query<(&mut Transform, &mut Velocity), With<Player>>,
    mut state: ResMut<PhysicsState>,
) {
    let platform_rects: Vec<(Rect, Vec2)> = platforms
        .iter()
        .map(|(transform, platform, velocity)| {
            (
                Rect::from_center_size(transform.translation.truncate(), platform.size),
                velocity.0,
            )
        })
        .collect();
    let solid = |rect: Rect| {
        solids.0.overlaps(rect) || platform_rects.iter().any(|&(r, _)| intersects(r, rect))
    };
    for (mut transform, mut velocity) in players.iter_mut() {
        let mut rect = Rect::from_center_size(transform.translation.truncate(), config.player.hitbox());

        // A platform underfoot carries the player along with it.
        let feet = shifted(rect, Vec2::new(0.0, -GROUND_PROBE));
        let carry = platform_rects
            .iter()
            .find(|&&(r, _)| intersects(r, feet) && !intersects(r, rect))
            .map(|&(_, v)| v);
        if let Some(carry) = carry {
            transform.translation += carry.extend(0.0);
            rect = shifted(rect, carry);
        }

        let on_ladder = ladders.0.overlaps(rect);
        if !on_ladder {
            velocity.0.y -= config.gravity;
        }

        let result = step(rect, velocity.0, &solid);
        transform.translation += result.offset.extend(0.0);
        velocity.0 = result.velocity;
        state.grounded = result.grounded;
        state.on_ladder = on_ladder;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor_grid() -> TileGrid {
        // A flat floor along grid row 0, tiles 64px wide.
        TileGrid {
            cells: (0..32).map(|x| (x, 0)).collect(),
            grid_size: 64.0,
        }
    }

    fn player_rect(center: Vec2) -> Rect {
        Rect::from_center_size(center, Vec2::new(44.0, 92.0))
    }

    #[test]
    fn falling_player_lands_flush_on_tiles() {
        let grid = floor_grid();
        let solid = |rect: Rect| grid.overlaps(rect);
        let mut rect = player_rect(Vec2::new(100.0, 300.0));
        let mut velocity = Vec2::new(0.0, 0.0);
        let mut grounded = false;
        for _ in 0..100 {
            velocity.y -= 3.0;
            let result = step(rect, velocity, &solid);
            rect = shifted(rect, result.offset);
            velocity = result.velocity;
            grounded = result.grounded;
            if grounded {
                break;
            }
        }
        assert!(grounded);
        // Floor tiles top out at y = 64; the player rests exactly on them.
        assert_eq!(rect.min.y, 64.0);
        assert_eq!(velocity.y, 0.0);
    }

    #[test]
    fn walking_into_a_wall_zeroes_horizontal_velocity() {
        let mut grid = floor_grid();
        grid.cells.insert((4, 1));
        grid.cells.insert((4, 2));
        let solid = |rect: Rect| grid.overlaps(rect);
        // Standing on the floor just left of the wall at x = 256.
        let rect = player_rect(Vec2::new(230.0, 110.0));
        let result = step(rect, Vec2::new(7.0, 0.0), &solid);
        assert_eq!(result.velocity.x, 0.0);
        let rect = shifted(rect, result.offset);
        assert_eq!(rect.max.x, 256.0);
    }

    #[test]
    fn fast_fall_does_not_tunnel_through_the_floor() {
        let grid = floor_grid();
        let solid = |rect: Rect| grid.overlaps(rect);
        let rect = player_rect(Vec2::new(100.0, 300.0));
        let result = step(rect, Vec2::new(0.0, -400.0), &solid);
        let rect = shifted(rect, result.offset);
        assert_eq!(rect.min.y, 64.0);
        assert!(result.grounded);
    }

    #[test]
    fn resting_on_a_boundary_does_not_count_as_overlap() {
        let grid = floor_grid();
        let rect = player_rect(Vec2::new(100.0, 64.0 + 46.0));
        assert!(!grid.overlaps(rect));
        assert!(grid.overlaps(shifted(rect, Vec2::new(0.0, -GROUND_PROBE))));
    }
}
