use anyhow::bail;
use log::{info, warn};
use std::process::Command;
use std::thread;

/// Delivery side of an alert. Implementations must not block the audio
/// callback beyond a negligible dispatch cost.
pub trait Notifier: Send {
    fn notify(&mut self, message: &str);
}

/// Fallback notifier that only writes to the application log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, message: &str) {
        warn!("ALERT: {message}");
    }
}

/// Hands each alert message to an external program (typically a TTS command
/// such as `spd-say` or `say`) without waiting for it to finish.
pub struct CommandNotifier {
    program: String,
}

impl CommandNotifier {
    pub fn new(program: &str) -> anyhow::Result<Self> {
        let program = program.trim();
        if program.is_empty() {
            bail!("notify command is empty");
        }
        Ok(Self {
            program: program.to_string(),
        })
    }
}

impl Notifier for CommandNotifier {
    fn notify(&mut self, message: &str) {
        match Command::new(&self.program).arg(message).spawn() {
            Ok(mut child) => {
                info!("Dispatched notification via {}", self.program);
                // Reap the child off the audio path
                thread::spawn(move || {
                    let _ = child.wait();
                });
            }
            Err(err) => warn!("Notify command {} failed to start: {err}", self.program),
        }
    }
}
