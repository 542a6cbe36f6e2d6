//! Text-to-speech collaborator.
//!
//! Speech is best effort: nothing is returned and failures are only logged.

use serde::{Deserialize, Serialize};
use std::process::{Child, Command, Stdio};
use std::thread;

/// Words per minute at rate 1.0 for command-line synthesizers.
const BASE_WPM: f32 = 175.0;

/// Something to say.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub text: String,
    /// Pronunciation guide, e.g. IPA. Synthesizers may ignore it.
    pub hint: Option<String>,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Fixed voice parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub rate: f32,
    pub pitch: f32,
    pub locale: String,
}

impl Default for Voice {
    fn default() -> Self {
        Self {
            rate: 0.8,
            pitch: 1.0,
            locale: "en-US".to_string(),
        }
    }
}

/// Plays utterances.
pub trait Speaker {
    fn speak(&self, request: &SpeechRequest);
}

/// Discards every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSpeaker;

impl Speaker for SilentSpeaker {
    fn speak(&self, request: &SpeechRequest) {
        tracing::trace!(text = %request.text, "speech disabled");
    }
}

/// Spawns an espeak-compatible program and does not wait for it.
///
/// Each child is reaped by a short-lived background thread.
#[derive(Debug, Clone)]
pub struct CommandSpeaker {
    program: String,
    voice: Voice,
}

impl CommandSpeaker {
    pub fn new(program: impl Into<String>, voice: Voice) -> Self {
        Self {
            program: program.into(),
            voice,
        }
    }

    /// Command-line arguments for a request.
    pub fn args(&self, text: &str) -> Vec<String> {
        let wpm = (BASE_WPM * self.voice.rate).round() as u32;
        let pitch = (50.0 * self.voice.pitch).clamp(0.0, 99.0).round() as u32;
        vec![
            "-s".to_string(),
            wpm.to_string(),
            "-p".to_string(),
            pitch.to_string(),
            "-v".to_string(),
            self.voice.locale.to_lowercase(),
            text.to_string(),
        ]
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&self, request: &SpeechRequest) {
        let text = request.text.trim();
        if text.is_empty() {
            return;
        }
        let spawned = Command::new(&self.program)
            .args(self.args(text))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(child) => {
                tracing::debug!(program = %self.program, text, hint = ?request.hint, "speaking");
                reap(child);
            }
            Err(e) => tracing::debug!(program = %self.program, error = %e, "speech unavailable"),
        }
    }
}

fn reap(mut child: Child) {
    let waiter = thread::Builder::new()
        .name("speech-reaper".to_string())
        .spawn(move || match child.wait() {
            Ok(status) if !status.success() => tracing::debug!(%status, "speech program failed"),
            Ok(_) => {}
            Err(e) => tracing::debug!(error = %e, "failed to wait for speech program"),
        });
    if let Err(e) = waiter {
        tracing::warn!(error = %e, "could not start speech reaper");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_from_default_voice() {
        let speaker = CommandSpeaker::new("espeak-ng", Voice::default());
        assert_eq!(
            speaker.args("hello"),
            vec!["-s", "140", "-p", "50", "-v", "en-us", "hello"]
        );
    }

    #[test]
    fn test_missing_program_is_silent() {
        let speaker = CommandSpeaker::new("definitely-not-a-tts-binary", Voice::default());
        speaker.speak(&SpeechRequest::new("hello").with_hint("/həˈləʊ/"));
        speaker.speak(&SpeechRequest::new("   "));
    }

    /// Zombie children of this process, from `/proc/<pid>/stat`.
    #[cfg(target_os = "linux")]
    fn zombie_children() -> usize {
        let parent = std::process::id().to_string();
        std::fs::read_dir("/proc")
            .unwrap()
            .filter_map(|entry| std::fs::read_to_string(entry.ok()?.path().join("stat")).ok())
            .filter(|stat| {
                // Fields after the parenthesised command name: state, ppid, ...
                let Some((_, rest)) = stat.rsplit_once(')') else {
                    return false;
                };
                let mut fields = rest.split_whitespace();
                fields.next() == Some("Z") && fields.next() == Some(parent.as_str())
            })
            .count()
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_finished_programs_are_reaped() {
        let speaker = CommandSpeaker::new("true", Voice::default());
        for _ in 0..5 {
            speaker.speak(&SpeechRequest::new("hello"));
        }

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while zombie_children() > 0 && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(50));
        }
        assert_eq!(zombie_children(), 0);
    }
}
