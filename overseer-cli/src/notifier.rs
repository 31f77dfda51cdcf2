//! Terminal notifications

use colored::*;
use overseer_monitor::{Notification, NotificationKind, Notifier};

/// Prints operator notifications as coloured lines
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => println!(
                "{} {} {}",
                "✓".green(),
                notification.title.green().bold(),
                notification.message
            ),
            NotificationKind::Error => eprintln!(
                "{} {} {}",
                "✗".red(),
                notification.title.red().bold(),
                notification.message
            ),
        }
    }
}
