use bevy::prelude::*;

#[derive(Debug, serde::Deserialize, Resource, Reflect)]
pub struct PlayerConfig {
    /// Horizontal (and ladder climb) speed, in pixels per tick.
    pub movement_speed: f32,
    pub jump_speed: f32,
    pub hitbox: [f32; 2],
    pub start: [f32; 2],
    pub z: f32,
    pub frame_size: f32,
    pub updates_per_frame: usize,
}

impl PlayerConfig {
    pub fn start(&self) -> Vec2 {
        Vec2::from(self.start)
    }

    pub fn hitbox(&self) -> Vec2 {
        Vec2::from(self.hitbox)
    }
}

#[derive(Debug, serde::Deserialize, Resource, Reflect)]
pub struct CameraConfig {
    pub left_margin: f32,
    pub right_margin: f32,
    pub top_margin: f32,
    pub bottom_margin: f32,
}

#[derive(Debug, serde::Deserialize, Resource, Reflect)]
pub struct Config {
    pub screen_width: f32,
    pub screen_height: f32,
    /// Downward acceleration applied to the player each tick, in pixels.
    pub gravity: f32,
    /// Falling below this y teleports the player back to the spawn point.
    pub fall_limit: f32,
    pub player: PlayerConfig,
    pub camera: CameraConfig,
}
