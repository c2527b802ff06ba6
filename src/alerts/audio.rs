use rodio::{OutputStream, Sink};
use std::sync::{
    mpsc::{self, Sender},
    Arc, Mutex,
};
use std::thread;

use super::tone::AlertTone;
use super::{AlertKind, AlertSink};

enum AudioCommand {
    Play(AlertKind),
    Silence,
    SetVolume(f32),
}

/// Alert playback on a dedicated audio thread. The rodio output handles
/// are not Send, so they live on that thread and the rest of the engine
/// talks to it through a command channel. The output stream is created
/// lazily on the first play so constructing the player never touches the
/// audio device.
pub struct AudioAlertPlayer {
    tx: Arc<Mutex<Option<Sender<AudioCommand>>>>,
}

impl AudioAlertPlayer {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<AudioCommand>, String> {
        if let Some(tx) = self.tx.lock().map_err(|e| e.to_string())?.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<AudioCommand>();

        // Spawn dedicated audio thread holding non-Send audio objects
        thread::Builder::new()
            .name("alert-audio".to_string())
            .spawn(move || {
                let mut _stream: Option<OutputStream> = None;
                let mut sink: Option<Sink> = None;
                let mut volume: f32 = 1.0;

                fn ensure_sink(
                    stream: &mut Option<OutputStream>,
                    sink: &mut Option<Sink>,
                ) -> Result<(), String> {
                    if sink.is_none() {
                        let (s, handle) = OutputStream::try_default()
                            .map_err(|e| format!("Failed to create audio output stream: {}", e))?;
                        let new_sink = Sink::try_new(&handle)
                            .map_err(|e| format!("Failed to create audio sink: {}", e))?;
                        *stream = Some(s);
                        *sink = Some(new_sink);
                    }
                    Ok(())
                }

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        AudioCommand::Play(kind) => {
                            if let Err(err) = ensure_sink(&mut _stream, &mut sink) {
                                log::warn!("alert playback unavailable: {err}");
                                continue;
                            }
                            if let Some(ref s) = sink {
                                s.set_volume(volume);
                                s.append(AlertTone::for_kind(kind));
                            }
                        }
                        AudioCommand::Silence => {
                            if let Some(s_old) = sink.take() {
                                s_old.stop();
                            }
                            _stream = None;
                        }
                        AudioCommand::SetVolume(v) => {
                            volume = v.clamp(0.0, 1.0);
                            if let Some(ref s) = sink {
                                s.set_volume(volume);
                            }
                        }
                    }
                }
            })
            .map_err(|e| e.to_string())?;

        let tx_clone = tx.clone();
        *self.tx.lock().map_err(|e| e.to_string())? = Some(tx);
        Ok(tx_clone)
    }

    fn send(&self, cmd: AudioCommand) -> Result<(), String> {
        let tx = self.ensure_thread()?;
        tx.send(cmd).map_err(|e| e.to_string())
    }

    pub fn set_volume(&self, volume: f32) -> Result<(), String> {
        self.send(AudioCommand::SetVolume(volume))
    }
}

impl Default for AudioAlertPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertSink for AudioAlertPlayer {
    fn play(&self, kind: AlertKind) {
        // Fail-soft: a dead audio backend must never disturb the
        // detection loop or the dispatcher's cooldown state.
        if let Err(err) = self.send(AudioCommand::Play(kind)) {
            log::warn!("failed to play {} alert: {err}", kind.as_str());
        }
    }

    fn silence(&self) {
        if let Err(err) = self.send(AudioCommand::Silence) {
            log::warn!("failed to silence alert audio: {err}");
        }
    }
}
