//! Collaborators the host application supplies for user interaction.
//!
//! The validator never opens dialogs itself. Messages that a desktop host
//! would show in a modal box go through a [`Notifier`], and the one case that
//! needs the user to pick a file goes through a [`ConfigSelector`].

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::warn;

use crate::job::JobLocation;

pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Asks the user to choose a configuration file for a job whose configuration
/// could not be restored. Returns true when a file was put in place.
pub trait ConfigSelector: Send + Sync {
    fn select_configuration(&self, location: &JobLocation) -> bool;
}

/// Writes every message to the `log` facade at warn level.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        warn!("{}", message);
    }
}

/// Discards every message. For unit tests and headless batch runs.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _message: &str) {}
}

/// Posts messages over a channel so a UI thread can display them.
#[derive(Clone)]
pub struct ChannelNotifier {
    sender: Sender<String>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, Receiver<String>) {
        let (sender, receiver) = unbounded();
        (Self { sender }, receiver)
    }

    pub fn with_sender(sender: Sender<String>) -> Self {
        Self { sender }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, message: &str) {
        // Ignore errors - a closed receiver just means nobody is listening
        let _ = self.sender.send(message.to_string());
    }
}

/// Selector used when no interactive selection is possible.
pub struct NoConfigSelection;

impl ConfigSelector for NoConfigSelection {
    fn select_configuration(&self, location: &JobLocation) -> bool {
        warn!(
            "Configuration for job '{}' must be selected manually",
            location.job_name()
        );
        false
    }
}
