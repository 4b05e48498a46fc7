use crate::engine::AdmissionEngine;

// app's shared state
pub struct AppState {
    pub engine: AdmissionEngine,
}
