use bevy_ecs_ldtk::ldtk::FieldValue;

use super::*;

pub struct Plugin;

impl bevy::app::Plugin for Plugin {
    fn build(&self, app: &mut App) {
        app.register_ldtk_entity::<MovingPlatformBundle>("MovingPlatform");
    }
}

#[derive(Default, Component)]
pub struct MovingPlatform {
    pub size: Vec2,
}

/// Optional reversal limits, in world pixels, read from the LDtk entity.
#[derive(Default, Component, Clone, Debug)]
pub struct Boundaries {
    pub left: Option<f32>,
    pub right: Option<f32>,
    pub top: Option<f32>,
    pub bottom: Option<f32>,
}

#[derive(Bundle, LdtkEntity)]
struct MovingPlatformBundle {
    #[with(platform_extent)]
    platform: MovingPlatform,
    #[from_entity_instance]
    velocity: Velocity,
    #[from_entity_instance]
    boundaries: Boundaries,
    #[sprite_sheet_bundle]
    sprite_sheet: SpriteSheetBundle,
    #[with(entity_name)]
    name: Name,
}

fn platform_extent(instance: &EntityInstance) -> MovingPlatform {
    MovingPlatform {
        size: tile_size(instance),
    }
}

fn float_field(instance: &EntityInstance, identifier: &str) -> Option<f32> {
    instance
        .field_instances
        .iter()
        .find(|field| field.identifier == identifier)
        .and_then(|field| match &field.value {
            FieldValue::Float(value) => *value,
            _ => None,
        })
}

impl From<&EntityInstance> for Velocity {
    fn from(instance: &EntityInstance) -> Self {
        Velocity(Vec2::new(
            float_field(instance, "change_x").unwrap_or(0.0),
            float_field(instance, "change_y").unwrap_or(0.0),
        ))
    }
}

impl From<&EntityInstance> for Boundaries {
    fn from(instance: &EntityInstance) -> Self {
        Boundaries {
            left: float_field(instance, "boundary_left"),
            right: float_field(instance, "boundary_right"),
            top: float_field(instance, "boundary_top"),
            bottom: float_field(instance, "boundary_bottom"),
        }
    }
}

pub fn move_platforms(
    mut platforms: Query<(&mut Transform, &Velocity), With<MovingPlatform>>,
) {
    for (mut transform, velocity) in platforms.iter_mut() {
        transform.translation += velocity.0.extend(0.0);
    }
}

/// A reflective boundary: the velocity component flips sign exactly when the
/// leading edge has passed the limit while still moving toward it.
pub fn bounce(rect: Rect, mut velocity: Vec2, boundaries: &Boundaries) -> Vec2 {
    if let Some(limit) = boundaries.right {
        if rect.max.x > limit && velocity.x > 0.0 {
            velocity.x = -velocity.x;
        }
    }
    if let Some(limit) = boundaries.left {
        if rect.min.x < limit && velocity.x < 0.0 {
            velocity.x = -velocity.x;
        }
    }
    if let Some(limit) = boundaries.top {
        if rect.max.y > limit && velocity.y > 0.0 {
            velocity.y = -velocity.y;
        }
    }
    if let Some(limit) = boundaries.bottom {
        if rect.min.y < limit && velocity.y < 0.0 {
            velocity.y = -velocity.y;
        }
    }
    velocity
}

pub fn reverse_at_boundaries(
    mut platforms: Query<(&Transform, &MovingPlatform, &Boundaries, &mut Velocity)>,
) {
    for (transform, platform, boundaries, mut velocity) in platforms.iter_mut() {
        let rect = Rect::from_center_size(transform.translation.truncate(), platform.size);
        let bounced = bounce(rect, velocity.0, boundaries);
        if bounced != velocity.0 {
            velocity.0 = bounced;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform_at(center_x: f32) -> Rect {
        Rect::from_center_size(Vec2::new(center_x, 100.0), Vec2::new(64.0, 32.0))
    }

    #[test]
    fn reverses_exactly_when_right_edge_passes_limit_moving_right() {
        let boundaries = Boundaries {
            right: Some(300.0),
            ..Default::default()
        };
        // Right edge at the limit: not yet past, keeps going.
        let at = bounce(platform_at(268.0), Vec2::new(2.0, 0.0), &boundaries);
        assert_eq!(at, Vec2::new(2.0, 0.0));
        // Past the limit and moving toward it: flips.
        let past = bounce(platform_at(270.0), Vec2::new(2.0, 0.0), &boundaries);
        assert_eq!(past, Vec2::new(-2.0, 0.0));
        // Past the limit but already moving away: left alone.
        let leaving = bounce(platform_at(270.0), Vec2::new(-2.0, 0.0), &boundaries);
        assert_eq!(leaving, Vec2::new(-2.0, 0.0));
    }

    #[test]
    fn unset_boundaries_never_reverse() {
        let velocity = bounce(platform_at(0.0), Vec2::new(5.0, -5.0), &Boundaries::default());
        assert_eq!(velocity, Vec2::new(5.0, -5.0));
    }

    #[test]
    fn vertical_boundaries_flip_vertical_velocity() {
        let boundaries = Boundaries {
            bottom: Some(90.0),
            ..Default::default()
        };
        let rising = bounce(platform_at(0.0), Vec2::new(0.0, -3.0), &boundaries);
        assert_eq!(rising, Vec2::new(0.0, 3.0));
    }
}
