use bevy::asset::LoadState;

use super::*;

pub struct Plugin;

impl bevy::app::Plugin for Plugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CurrentLevel>()
            .init_resource::<EndOfMap>()
            .add_event::<RespawnEvent>()
            .add_event::<AdvanceEvent>();
        app.add_startup_system(setup);
        app.add_system(cache_tile_layers);
        app.add_system(watch_level_spawn);
        app.add_system(assert_map_exists.in_set(OnUpdate(GameState::Loading)));
        app.add_system(level_restart);
        app.register_ldtk_entity::<HazardBundle>("Hazard");
    }
}

/// Int grid values of the Platforms and Ladders layers.
const PLATFORM_CELL: i32 = 1;
const LADDER_CELL: i32 = 2;

#[derive(Resource)]
pub struct CurrentLevel(pub u32);

impl Default for CurrentLevel {
    fn default() -> Self {
        Self(1)
    }
}

impl CurrentLevel {
    pub fn map_path(&self) -> String {
        format!("the_map_level_{}.ldtk", self.0)
    }
}

/// World x coordinate of the right edge of the current map, in pixels.
#[derive(Resource, Default)]
pub struct EndOfMap(pub f32);

/// The player died and goes back to the spawn point.
pub struct RespawnEvent;

/// The player reached the right edge of the map.
pub struct AdvanceEvent;

#[derive(Default, Component)]
pub struct Hazard {
    pub size: Vec2,
}

#[derive(Bundle, LdtkEntity)]
struct HazardBundle {
    #[with(hazard_extent)]
    hazard: Hazard,
    #[sprite_sheet_bundle]
    sprite_sheet: SpriteSheetBundle,
    #[with(entity_name)]
    name: Name,
}

fn hazard_extent(instance: &EntityInstance) -> Hazard {
    Hazard {
        size: tile_size(instance),
    }
}

fn setup(mut commands: Commands, asset_server: Res<AssetServer>, level: Res<CurrentLevel>) {
    commands.spawn((
        LdtkWorldBundle {
            ldtk_handle: asset_server.load(level.map_path()),
            ..default()
        },
        Name::new("World"),
    ));
}

/// Collects freshly spawned int grid cells into the solid and ladder caches
/// the physics engine collides against.
fn cache_tile_layers(
    cells: Query<(&Parent, &GridCoords, &IntGridCell), Added<IntGridCell>>,
    layers: Query<&TilemapGridSize>,
    mut solids: ResMut<SolidTiles>,
    mut ladders: ResMut<LadderTiles>,
) {
    for (parent, coords, cell) in cells.iter() {
        let Ok(grid_size) = layers.get(parent.get()) else {
            continue;
        };
        let grid = match cell.value {
            PLATFORM_CELL => &mut solids.0,
            LADDER_CELL => &mut ladders.0,
            _ => continue,
        };
        grid.grid_size = grid_size.x;
        grid.cells.insert((coords.x, coords.y));
    }
}

fn watch_level_spawn(
    mut events: EventReader<LevelEvent>,
    worlds: Query<&Handle<LdtkAsset>>,
    assets: Res<Assets<LdtkAsset>>,
    mut solids: ResMut<SolidTiles>,
    mut ladders: ResMut<LadderTiles>,
    mut end_of_map: ResMut<EndOfMap>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    for event in events.iter() {
        match event {
            LevelEvent::SpawnTriggered(_) => {
                solids.0 = default();
                ladders.0 = default();
            }
            LevelEvent::Transformed(_) => {
                let Ok(handle) = worlds.get_single() else {
                    continue;
                };
                let Some(asset) = assets.get(handle) else {
                    continue;
                };
                let Some(level) = asset.iter_levels().next() else {
                    warn!("map asset has no levels");
                    continue;
                };
                end_of_map.0 = level.px_wid as f32;
                next_state.set(GameState::Playing);
            }
            _ => {}
        }
    }
}

/// A map asset that fails to load is fatal, the same as a failed synchronous
/// read at startup would be.
fn assert_map_exists(
    worlds: Query<&Handle<LdtkAsset>>,
    asset_server: Res<AssetServer>,
    level: Res<CurrentLevel>,
) {
    for handle in worlds.iter() {
        if asset_server.get_load_state(handle) == LoadState::Failed {
            panic!("failed to load map asset {:?}", level.map_path());
        }
    }
}

fn reset_to_spawn(
    config: &Config,
    players: &mut Query<(&mut Transform, &mut Velocity), With<Player>>,
    viewport: &mut Viewport,
) {
    for (mut transform, mut velocity) in players.iter_mut() {
        let start = config.player.start();
        transform.translation.x = start.x;
        transform.translation.y = start.y;
        velocity.0 = Vec2::ZERO;
    }
    *viewport = Viewport::default();
}

/// The three terminal checks, in fixed order: falling off the map, touching
/// a hazard, reaching the right edge.
pub fn terminal_conditions(
    config: Res<Config>,
    end_of_map: Res<EndOfMap>,
    players: Query<&Transform, With<Player>>,
    hazards: Query<(&Transform, &Hazard)>,
    mut respawns: EventWriter<RespawnEvent>,
    mut advances: EventWriter<AdvanceEvent>,
    mut sfx: EventWriter<SfxEvent>,
) {
    let Ok(transform) = players.get_single() else {
        return;
    };
    let position = transform.translation.truncate();
    if position.y < config.fall_limit {
        respawns.send(RespawnEvent);
        sfx.send(SfxEvent::GameOver);
        return;
    }
    let player_rect = Rect::from_center_size(position, config.player.hitbox());
    let touched = hazards.iter().any(|(hazard_transform, hazard)| {
        intersects(
            player_rect,
            Rect::from_center_size(hazard_transform.translation.truncate(), hazard.size),
        )
    });
    if touched {
        respawns.send(RespawnEvent);
        sfx.send(SfxEvent::GameOver);
        return;
    }
    if position.x >= end_of_map.0 {
        advances.send(AdvanceEvent);
    }
}

pub fn respawn_player(
    mut events: EventReader<RespawnEvent>,
    config: Res<Config>,
    mut players: Query<(&mut Transform, &mut Velocity), With<Player>>,
    mut viewport: ResMut<Viewport>,
) {
    if events.is_empty() {
        return;
    }
    events.clear();
    reset_to_spawn(&config, &mut players, &mut viewport);
}

pub fn advance_level(
    mut events: EventReader<AdvanceEvent>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    worlds: Query<Entity, With<Handle<LdtkAsset>>>,
    config: Res<Config>,
    mut level: ResMut<CurrentLevel>,
    mut players: Query<(&mut Transform, &mut Velocity), With<Player>>,
    mut score: ResMut<Score>,
    mut viewport: ResMut<Viewport>,
    mut solids: ResMut<SolidTiles>,
    mut ladders: ResMut<LadderTiles>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if events.is_empty() {
        return;
    }
    events.clear();
    level.0 += 1;
    info!("advancing to level {}", level.0);
    for world in worlds.iter() {
        commands.entity(world).despawn_recursive();
    }
    commands.spawn((
        LdtkWorldBundle {
            ldtk_handle: asset_server.load(level.map_path()),
            ..default()
        },
        Name::new("World"),
    ));
    score.0 = 0;
    solids.0 = default();
    ladders.0 = default();
    reset_to_spawn(&config, &mut players, &mut viewport);
    next_state.set(GameState::Loading);
}

fn level_restart(
    keyboard: Res<Input<KeyCode>>,
    worlds: Query<Entity, With<Handle<LdtkAsset>>>,
    mut commands: Commands,
    config: Res<Config>,
    mut players: Query<(&mut Transform, &mut Velocity), With<Player>>,
    mut score: ResMut<Score>,
    mut viewport: ResMut<Viewport>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if !keyboard.any_just_released([KeyCode::R, KeyCode::Back]) {
        return;
    }
    for world in worlds.iter() {
        commands.entity(world).insert(Respawn);
    }
    score.0 = 0;
    reset_to_spawn(&config, &mut players, &mut viewport);
    next_state.set(GameState::Loading);
}
