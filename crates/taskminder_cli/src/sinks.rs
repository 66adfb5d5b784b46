//! Terminal-backed reminder sinks for the `watch` command.

use taskminder_core::{AlertSink, Notification, NotificationSink, Permission, SinkError};

/// Prints reminders to stdout. A terminal never refuses permission.
#[derive(Debug, Default)]
pub struct TerminalNotifier {
    permission: Permission,
}

impl NotificationSink for TerminalNotifier {
    fn permission(&self) -> Permission {
        self.permission
    }

    fn request_permission(&mut self) -> Permission {
        self.permission = Permission::Granted;
        self.permission
    }

    fn deliver(&mut self, notification: &Notification) -> Result<(), SinkError> {
        println!("[reminder] {}: {}", notification.title, notification.body);
        Ok(())
    }
}

/// Rings the terminal bell; terminals cannot vibrate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalAlerts;

impl AlertSink for TerminalAlerts {
    fn play_sound(&mut self) -> Result<(), SinkError> {
        use std::io::Write;

        let mut stdout = std::io::stdout();
        stdout
            .write_all(b"\x07")
            .and_then(|()| stdout.flush())
            .map_err(|err| SinkError(err.to_string()))
    }

    fn vibrate(&mut self) -> Result<(), SinkError> {
        Err(SinkError("vibration is not supported on a terminal".to_string()))
    }
}
