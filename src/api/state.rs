//! Application state for the Compensation Resolution Engine API.

use std::sync::Arc;

use crate::config::PayrollSettings;
use crate::payrun::PayrunController;
use crate::statement::Reconstructor;
use crate::store::{AttendanceProvider, EmployeeDirectory, PayrollStore};

/// Shared application state.
///
/// Contains the lifecycle controller, the statement reconstructor and the
/// store handle shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    controller: Arc<PayrunController>,
    reconstructor: Arc<Reconstructor>,
    store: Arc<dyn PayrollStore>,
}

impl AppState {
    /// Wires the engine over the given collaborators and settings.
    pub fn new(
        store: Arc<dyn PayrollStore>,
        directory: Arc<dyn EmployeeDirectory>,
        attendance: Arc<dyn AttendanceProvider>,
        settings: PayrollSettings,
    ) -> Self {
        let controller = Arc::new(PayrunController::new(
            store.clone(),
            directory,
            attendance,
        ));
        let reconstructor = Arc::new(Reconstructor::new(store.clone(), settings));
        Self {
            controller,
            reconstructor,
            store,
        }
    }

    /// Returns the payrun lifecycle controller.
    pub fn controller(&self) -> &PayrunController {
        &self.controller
    }

    /// Returns the statement reconstructor.
    pub fn reconstructor(&self) -> &Reconstructor {
        &self.reconstructor
    }

    /// Returns the payroll store.
    pub fn store(&self) -> &Arc<dyn PayrollStore> {
        &self.store
    }
}
