use super::*;

pub struct Plugin;

impl bevy::app::Plugin for Plugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Viewport>();
        app.add_startup_system(setup);
    }
}

/// Bottom-left corner of the window into the level world, in pixels.
/// (0, 0) is the bottom-left of the world.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f32,
    pub bottom: f32,
}

fn setup(mut commands: Commands, config: Res<Config>) {
    commands.spawn({
        let mut bundle = Camera2dBundle::default();
        bundle.projection.scaling_mode =
            bevy::render::camera::ScalingMode::FixedVertical(config.screen_height);
        bundle
    });
}

/// Four independent margin checks, one per screen edge. Offsets are truncated
/// to integers after any shift so pixels stay aligned, and the left offset
/// never scrolls past the start of the level.
pub fn scroll(viewport: Viewport, player: Rect, config: &Config) -> Viewport {
    let margins = &config.camera;
    let mut left = viewport.left;
    let mut bottom = viewport.bottom;
    let mut changed = false;

    let left_boundary = left + margins.left_margin;
    if player.min.x < left_boundary {
        left -= left_boundary - player.min.x;
        changed = true;
    }

    let right_boundary = left + config.screen_width - margins.right_margin;
    if player.max.x > right_boundary {
        left += player.max.x - right_boundary;
        changed = true;
    }

    let top_boundary = bottom + config.screen_height - margins.top_margin;
    if player.max.y > top_boundary {
        bottom += player.max.y - top_boundary;
        changed = true;
    }

    let bottom_boundary = bottom + margins.bottom_margin;
    if player.min.y < bottom_boundary {
        bottom -= bottom_boundary - player.min.y;
        changed = true;
    }

    if changed {
        left = left.trunc().max(0.0);
        bottom = bottom.trunc();
    }
    Viewport { left, bottom }
}

pub fn scroll_viewport(
    config: Res<Config>,
    mut viewport: ResMut<Viewport>,
    players: Query<&Transform, With<Player>>,
) {
    let Ok(transform) = players.get_single() else {
        return;
    };
    let rect = Rect::from_center_size(transform.translation.truncate(), config.player.hitbox());
    let next = scroll(*viewport, rect, &config);
    if next != *viewport {
        *viewport = next;
    }
}

pub fn sync_camera(
    config: Res<Config>,
    viewport: Res<Viewport>,
    mut cameras: Query<&mut Transform, With<Camera2d>>,
) {
    for mut transform in cameras.iter_mut() {
        transform.translation.x = viewport.left + config.screen_width / 2.0;
        transform.translation.y = viewport.bottom + config.screen_height / 2.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_at(x: f32, y: f32) -> Rect {
        Rect::from_center_size(Vec2::new(x, y), Vec2::new(44.0, 92.0))
    }

    #[test]
    fn left_offset_never_goes_negative_at_level_start() {
        let config = Config::default();
        // Spawn position sits inside the left margin band.
        let viewport = scroll(Viewport::default(), player_at(64.0, 500.0), &config);
        assert_eq!(viewport.left, 0.0);
    }

    #[test]
    fn player_inside_the_margin_band_does_not_scroll() {
        let config = Config::default();
        let viewport = Viewport {
            left: 100.0,
            bottom: 0.0,
        };
        let after = scroll(viewport, player_at(900.0, 500.0), &config);
        assert_eq!(after, viewport);
    }

    #[test]
    fn crossing_the_right_margin_scrolls_by_the_excess() {
        let config = Config::default();
        let player = player_at(1400.0, 500.0);
        let after = scroll(Viewport::default(), player, &config);
        // Right boundary is screen_width - right_margin = 1300.
        assert_eq!(after.left, player.max.x - 1300.0);
    }

    #[test]
    fn offsets_are_truncated_to_integers() {
        let config = Config::default();
        let after = scroll(Viewport::default(), player_at(1400.5, 500.0), &config);
        assert_eq!(after.left, after.left.trunc());
        assert_eq!(after.bottom, after.bottom.trunc());
    }
}
