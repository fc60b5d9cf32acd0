use super::*;

pub struct Plugin;

impl bevy::app::Plugin for Plugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<IntentState>();
    }
}

/// The four directional intents, recomputed from the keyboard every tick.
#[derive(Default, Clone, Copy, Debug)]
pub struct Intents {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

#[derive(Resource, Default)]
pub struct IntentState {
    pub intents: Intents,
    /// Holding Up must not jump again until the key is released.
    pub jump_needs_reset: bool,
}

pub struct Resolved {
    pub velocity: Vec2,
    pub jumped: bool,
}

/// Turns the intent flags into a player velocity, consulting the physics
/// queries for jumping and ladder climbing. Opposing intents cancel.
pub fn resolve_velocity(
    state: &IntentState,
    physics: &PhysicsState,
    config: &config::PlayerConfig,
    current: Vec2,
) -> Resolved {
    let Intents {
        left,
        right,
        up,
        down,
    } = state.intents;
    let mut velocity = current;
    let mut jumped = false;
    if up && !down {
        if physics.is_on_ladder() {
            velocity.y = config.movement_speed;
        } else if physics.can_jump() && !state.jump_needs_reset {
            velocity.y = config.jump_speed;
            jumped = true;
        }
    } else if down && !up {
        if physics.is_on_ladder() {
            velocity.y = -config.movement_speed;
        }
    }
    if physics.is_on_ladder() && up == down {
        velocity.y = 0.0;
    }
    velocity.x = if right && !left {
        config.movement_speed
    } else if left && !right {
        -config.movement_speed
    } else {
        0.0
    };
    Resolved { velocity, jumped }
}

pub fn process_keychange(
    keyboard: Res<Input<KeyCode>>,
    config: Res<Config>,
    physics: Res<PhysicsState>,
    mut state: ResMut<IntentState>,
    mut players: Query<(&mut Velocity, &mut AnimationState), With<Player>>,
    mut sfx: EventWriter<SfxEvent>,
) {
    state.intents = Intents {
        up: keyboard.any_pressed([KeyCode::Up, KeyCode::W]),
        down: keyboard.any_pressed([KeyCode::Down, KeyCode::S]),
        left: keyboard.any_pressed([KeyCode::Left, KeyCode::A]),
        right: keyboard.any_pressed([KeyCode::Right, KeyCode::D]),
    };
    if keyboard.any_just_released([KeyCode::Up, KeyCode::W]) {
        state.jump_needs_reset = false;
    }
    for (mut velocity, mut animation) in players.iter_mut() {
        let resolved = resolve_velocity(&state, &physics, &config.player, velocity.0);
        velocity.0 = resolved.velocity;
        if resolved.jumped {
            state.jump_needs_reset = true;
            animation.jumping = true;
            sfx.send(SfxEvent::Jump);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_config() -> config::PlayerConfig {
        Config::default().player
    }

    fn state(intents: Intents) -> IntentState {
        IntentState {
            intents,
            jump_needs_reset: false,
        }
    }

    #[test]
    fn opposing_intents_cancel_horizontal_velocity() {
        let config = player_config();
        let physics = PhysicsState::default();
        let right = state(Intents {
            right: true,
            ..Default::default()
        });
        let moving = resolve_velocity(&right, &physics, &config, Vec2::ZERO);
        assert_eq!(moving.velocity.x, config.movement_speed);
        let both = state(Intents {
            right: true,
            left: true,
            ..Default::default()
        });
        let stopped = resolve_velocity(&both, &physics, &config, moving.velocity);
        assert_eq!(stopped.velocity.x, 0.0);
    }

    #[test]
    fn grounded_up_jumps_once_until_released() {
        let config = player_config();
        let physics = PhysicsState {
            grounded: true,
            on_ladder: false,
        };
        let mut state = state(Intents {
            up: true,
            ..Default::default()
        });
        let first = resolve_velocity(&state, &physics, &config, Vec2::ZERO);
        assert!(first.jumped);
        assert_eq!(first.velocity.y, config.jump_speed);
        state.jump_needs_reset = true;
        let second = resolve_velocity(&state, &physics, &config, Vec2::ZERO);
        assert!(!second.jumped);
    }

    #[test]
    fn ladder_intents_drive_vertical_velocity() {
        let config = player_config();
        let physics = PhysicsState {
            grounded: false,
            on_ladder: true,
        };
        let up = resolve_velocity(
            &state(Intents {
                up: true,
                ..Default::default()
            }),
            &physics,
            &config,
            Vec2::ZERO,
        );
        assert_eq!(up.velocity.y, config.movement_speed);
        let both = resolve_velocity(
            &state(Intents {
                up: true,
                down: true,
                ..Default::default()
            }),
            &physics,
            &config,
            Vec2::new(0.0, 5.0),
        );
        assert_eq!(both.velocity.y, 0.0);
        let idle = resolve_velocity(&state(Intents::default()), &physics, &config, Vec2::new(0.0, 5.0));
        assert_eq!(idle.velocity.y, 0.0);
    }
}
