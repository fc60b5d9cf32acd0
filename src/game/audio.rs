use super::*;

pub struct Plugin;

impl bevy::app::Plugin for Plugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SfxEvent>();
        app.add_system(play_sfx);
    }
}

/// Fire-and-forget sound effects, routed through one event channel so the
/// gameplay systems never touch the audio device directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SfxEvent {
    Jump,
    Coin,
    GameOver,
}

impl SfxEvent {
    fn path(self) -> &'static str {
        match self {
            SfxEvent::Jump => "sounds/jump1.wav",
            SfxEvent::Coin => "sounds/coin3.wav",
            SfxEvent::GameOver => "sounds/gameover2.wav",
        }
    }
}

// AudioExt was made so that all sound effects have same volume
pub trait AudioExt {
    fn play_sfx(&self, source: Handle<AudioSource>) -> Handle<AudioSink>;
}

impl AudioExt for Audio {
    fn play_sfx(&self, source: Handle<AudioSource>) -> Handle<AudioSink> {
        self.play_with_settings(
            source,
            PlaybackSettings {
                volume: 0.5, // The volume of all sfx
                ..default()
            },
        )
    }
}

fn play_sfx(
    mut events: EventReader<SfxEvent>,
    audio: Res<Audio>,
    asset_server: Res<AssetServer>,
) {
    for event in events.iter() {
        audio.play_sfx(asset_server.load(event.path()));
    }
}
