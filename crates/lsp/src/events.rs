//! Observer contract for document service notifications.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceEvent {
    DocumentOpened { uri: String, version: i32 },
    DocumentChanged { uri: String, version: i32 },
    DocumentClosed { uri: String },
    DiagnosticsUpdated { uri: String, version: i32, count: usize },
}

pub trait ServiceObserver: Send {
    fn on_service_event(&self, event: &ServiceEvent);
}

impl<F> ServiceObserver for F
where
    F: Fn(&ServiceEvent) + Send,
{
    fn on_service_event(&self, event: &ServiceEvent) {
        self(event)
    }
}
