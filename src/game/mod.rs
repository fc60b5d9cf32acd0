use bevy::{prelude::*, utils::HashSet};
use bevy_ecs_ldtk::prelude::*;
use bevy_ecs_tilemap::prelude::TilemapGridSize;

use self::{
    audio::SfxEvent,
    camera::Viewport,
    coins::Score,
    physics::{intersects, LadderTiles, PhysicsState, SolidTiles, Velocity},
    platforms::MovingPlatform,
    player::{AnimationState, Player},
};

pub mod audio;
pub mod camera;
pub mod coins;
pub mod config;
pub mod input;
pub mod level;
pub mod physics;
pub mod platforms;
pub mod player;

pub use self::config::Config;

pub struct Plugin;

impl Default for Config {
    fn default() -> Self {
        serde_json::from_str(include_str!("config.json")).unwrap()
    }
}

#[derive(Default, Debug, Clone, Eq, PartialEq, Hash, States)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
}

impl bevy::app::Plugin for Plugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Config>()
            .register_type::<Config>()
            .add_plugin(bevy_inspector_egui::quick::ResourceInspectorPlugin::<Config>::default())
            .add_plugin(LdtkPlugin)
            .add_state::<GameState>()
            .insert_resource(LevelSelection::Index(0))
            .insert_resource(LdtkSettings {
                set_clear_color: SetClearColor::FromLevelBackground,
                ..Default::default()
            });
        app.add_plugin(audio::Plugin)
            .add_plugin(camera::Plugin)
            .add_plugin(coins::Plugin)
            .add_plugin(input::Plugin)
            .add_plugin(level::Plugin)
            .add_plugin(physics::Plugin)
            .add_plugin(platforms::Plugin)
            .add_plugin(player::Plugin);
        // One tick: intents, platform motion, physics, animation, pickups,
        // terminal checks, then the camera follows whatever happened.
        app.add_systems(
            (
                input::process_keychange,
                platforms::move_platforms,
                platforms::reverse_at_boundaries,
                physics::physics_step,
                player::update_animation,
                coins::collect_coins,
                level::terminal_conditions,
                level::respawn_player,
                level::advance_level,
                camera::scroll_viewport,
                camera::sync_camera,
            )
                .chain()
                .in_set(OnUpdate(GameState::Playing)),
        );
    }
}

fn entity_name(instance: &EntityInstance) -> Name {
    Name::new(instance.identifier.clone())
}

fn tile_size(instance: &EntityInstance) -> Vec2 {
    let tile = instance.tile.as_ref().unwrap();
    Vec2::new(tile.w as f32, tile.h as f32)
}
