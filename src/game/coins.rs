use super::*;

pub struct Plugin;

impl bevy::app::Plugin for Plugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Score(0));
        app.register_ldtk_entity::<CoinBundle>("Coin");
        app.add_system(score_label);
    }
}

#[derive(Resource)]
pub struct Score(pub u32);

#[derive(Default, Component)]
pub struct Coin {
    pub size: Vec2,
}

#[derive(Bundle, LdtkEntity)]
struct CoinBundle {
    #[with(coin_extent)]
    coin: Coin,
    #[sprite_sheet_bundle]
    sprite_sheet: SpriteSheetBundle,
    #[with(entity_name)]
    name: Name,
}

fn coin_extent(instance: &EntityInstance) -> Coin {
    Coin {
        size: tile_size(instance),
    }
}

/// Despawns touched coins. A coin despawns exactly once; the score can never
/// count it twice within a tick because each coin entity is visited once.
pub fn collect_coins(
    config: Res<Config>,
    mut commands: Commands,
    players: Query<&Transform, With<Player>>,
    coins: Query<(Entity, &Transform, &Coin)>,
    mut score: ResMut<Score>,
    mut sfx: EventWriter<SfxEvent>,
) {
    let Ok(player) = players.get_single() else {
        return;
    };
    let player_rect = Rect::from_center_size(player.translation.truncate(), config.player.hitbox());
    for (entity, transform, coin) in coins.iter() {
        let coin_rect = Rect::from_center_size(transform.translation.truncate(), coin.size);
        if !intersects(player_rect, coin_rect) {
            continue;
        }
        commands.entity(entity).despawn_recursive();
        score.0 += 1;
        sfx.send(SfxEvent::Coin);
    }
}

#[derive(Component)]
struct ScoreLabel;

fn score_label(
    score: Res<Score>,
    labels: Query<Entity, With<ScoreLabel>>,
    asset_server: Res<AssetServer>,
    mut commands: Commands,
) {
    if !score.is_changed() {
        return;
    }
    for label in &labels {
        commands.entity(label).despawn();
    }
    commands.spawn((
        TextBundle::from_section(
            format!("Score: {}", score.0),
            TextStyle {
                font: asset_server.load("Pixellari.ttf"),
                font_size: 36.0,
                color: Color::BLACK,
            },
        )
        .with_style(Style {
            position_type: PositionType::Absolute,
            position: UiRect {
                bottom: Val::Px(10.0),
                left: Val::Px(10.0),
                ..default()
            },
            ..default()
        }),
        ScoreLabel,
    ));
}
