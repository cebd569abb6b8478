/// ----- PORT MODULE -----
/// Boundary between the transport and the simulation core. Text commands
/// are validated when submitted, so a rejection can be answered right away,
/// and queued for the next tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::debug;

use shared_resources::config::ElevatorConfig;
use shared_resources::error::CommandError;
use shared_resources::request::{action_of, Command};

/// Submitting side, cloned into the transport threads.
#[derive(Debug, Clone)]
pub struct Port {
    limits: ElevatorConfig,
    commands_tx: Sender<Command>,
    ready: Arc<AtomicBool>,
}

/// Receiving side, drained by the tick loop.
#[derive(Debug)]
pub struct CommandQueue {
    commands_rx: Receiver<Command>,
}

pub fn channel(limits: &ElevatorConfig) -> (Port, CommandQueue) {
    let (commands_tx, commands_rx) = unbounded();
    let port = Port {
        limits: limits.clone(),
        commands_tx,
        ready: Arc::new(AtomicBool::new(false)),
    };
    (port, CommandQueue { commands_rx })
}

impl Port {
    /// Marks the core as running. Commands submitted before are refused.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub fn submit(&self, text: &str) -> Result<Command, CommandError> {
        if !self.is_ready() {
            return Err(CommandError::NotReady);
        }
        let command = Command::parse(text, &self.limits)?;
        self.commands_tx.send(command).map_err(|_| CommandError::NotReady)?;
        debug!("Queued command {}", command);
        Ok(command)
    }

    /// Submits `text` and returns the error reply to send back, if any.
    pub fn submit_for_reply(&self, text: &str) -> Option<String> {
        self.submit(text).err().map(|e| e.reply(action_of(text)))
    }
}

impl CommandQueue {
    /// Every command queued so far, in submission order.
    pub fn drain(&self) -> Vec<Command> {
        self.commands_rx.try_iter().collect()
    }
}
