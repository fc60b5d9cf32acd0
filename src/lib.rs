use bevy::prelude::*;

pub mod game;

pub fn run() {
    let config = game::Config::default();
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Cliffside".into(),
                resolution: (config.screen_width, config.screen_height).into(),
                // Tells wasm to resize the window according to the available canvas
                fit_canvas_to_parent: true,
                // Tells wasm not to override default event handling, like F5, Ctrl+R etc.
                prevent_default_event_handling: false,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(config)
        .add_plugin(game::Plugin)
        .run();
}
