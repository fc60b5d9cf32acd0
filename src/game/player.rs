use super::*;

pub struct Plugin;

impl bevy::app::Plugin for Plugin {
    fn build(&self, app: &mut App) {
        app.add_system(spawn_player.in_schedule(OnEnter(GameState::Playing)));
    }
}

#[derive(Default, Component)]
pub struct Player;

#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

#[derive(Default, Component)]
pub struct AnimationState {
    pub facing: Facing,
    pub counter: usize,
    pub jumping: bool,
    pub climbing: bool,
}

/// Frame layout of the character sheet, one row of equally sized cells.
pub mod frames {
    pub const IDLE: usize = 0;
    pub const JUMP: usize = 1;
    pub const FALL: usize = 2;
    pub const WALK: usize = 3;
    pub const WALK_FRAMES: usize = 8;
    pub const CLIMB: usize = 11;
    pub const CLIMB_FRAMES: usize = 2;
    pub const COUNT: usize = 13;
}

#[derive(Bundle)]
pub struct PlayerBundle {
    player: Player,
    velocity: Velocity,
    animation: AnimationState,
    sprite_sheet: SpriteSheetBundle,
    name: Name,
}

fn spawn_player(
    mut commands: Commands,
    config: Res<Config>,
    asset_server: Res<AssetServer>,
    mut atlases: ResMut<Assets<TextureAtlas>>,
    players: Query<(), With<Player>>,
) {
    // The player survives level changes; only the first entry spawns it.
    if !players.is_empty() {
        return;
    }
    let texture = asset_server.load("character_sheet.png");
    let atlas = TextureAtlas::from_grid(
        texture,
        Vec2::splat(config.player.frame_size),
        frames::COUNT,
        1,
        None,
        None,
    );
    commands.spawn(PlayerBundle {
        player: Player,
        velocity: Velocity::default(),
        animation: AnimationState::default(),
        sprite_sheet: SpriteSheetBundle {
            texture_atlas: atlases.add(atlas),
            sprite: TextureAtlasSprite::new(frames::IDLE),
            transform: Transform::from_translation(config.player.start().extend(config.player.z)),
            ..default()
        },
        name: Name::new("Player"),
    });
}

/// Selects the sprite frame the way the state machine reads: ladder contact
/// wins, then airborne jump/fall by vertical sign, then idle, then the walk
/// cycle advancing one counter per tick.
pub fn update_animation(
    config: Res<Config>,
    physics: Res<PhysicsState>,
    mut players: Query<(&Velocity, &mut AnimationState, &mut TextureAtlasSprite), With<Player>>,
) {
    for (velocity, mut state, mut sprite) in players.iter_mut() {
        let vel = velocity.0;
        if vel.x < 0.0 {
            state.facing = Facing::Left;
        } else if vel.x > 0.0 {
            state.facing = Facing::Right;
        }
        sprite.flip_x = state.facing == Facing::Left;

        if physics.can_jump() {
            state.jumping = false;
        }

        state.climbing = physics.is_on_ladder();
        if state.climbing {
            if vel.y.abs() > 1.0 {
                state.counter = (state.counter + 1) % (frames::CLIMB_FRAMES * 4);
            }
            sprite.index = frames::CLIMB + state.counter / 4 % frames::CLIMB_FRAMES;
            continue;
        }

        if state.jumping {
            sprite.index = if vel.y >= 0.0 {
                frames::JUMP
            } else {
                frames::FALL
            };
            continue;
        }

        if vel.x == 0.0 {
            sprite.index = frames::IDLE;
            continue;
        }

        state.counter =
            (state.counter + 1) % (frames::WALK_FRAMES * config.player.updates_per_frame);
        sprite.index = frames::WALK + state.counter / config.player.updates_per_frame;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_cycle_stays_within_its_frames() {
        let updates_per_frame = Config::default().player.updates_per_frame;
        let mut counter = 0;
        for _ in 0..1000 {
            counter = (counter + 1) % (frames::WALK_FRAMES * updates_per_frame);
            let index = frames::WALK + counter / updates_per_frame;
            assert!((frames::WALK..frames::WALK + frames::WALK_FRAMES).contains(&index));
        }
    }

    #[test]
    fn climb_frames_alternate() {
        let indices: Vec<usize> = (0..frames::CLIMB_FRAMES * 4)
            .map(|counter| frames::CLIMB + counter / 4 % frames::CLIMB_FRAMES)
            .collect();
        assert_eq!(indices[0], frames::CLIMB);
        assert_eq!(indices[4], frames::CLIMB + 1);
    }
}
