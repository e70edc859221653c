use std::sync::Arc;

use anyhow::Result;
use catalog::DirectorySource;
use shared::domain::{Application, LocationId};
use tracing::info;

pub mod applications;
pub mod clipboard;
pub mod directory;
pub mod filter;
pub mod notify;
pub mod selection;
pub mod submission;

pub use applications::{ApplicationCatalog, EnvironmentView};
pub use clipboard::{ClipboardError, ClipboardService, ClipboardSink};
pub use directory::{DirectorySnapshot, DirectoryStore, FetchOutcome};
pub use notify::Notifier;
pub use selection::{SelectionController, SelectionSnapshot, SubmissionState, TransitionError};
pub use submission::{LocationSubmitter, SimulatedSubmitter};

/// Wires the directory, the location selection flow and the application
/// catalog to one notification stream.
pub struct Dashboard {
    directory: Arc<DirectoryStore>,
    selection: SelectionController,
    applications: ApplicationCatalog,
    submitter: Arc<dyn LocationSubmitter>,
    notifier: Notifier,
}

impl Dashboard {
    pub async fn load(
        source: Arc<dyn DirectorySource>,
        applications: Vec<Application>,
        submitter: Arc<dyn LocationSubmitter>,
    ) -> Result<Self> {
        let directory = Arc::new(DirectoryStore::load(source).await?);
        let notifier = Notifier::new();
        info!(
            businesses = directory.list_entities().len(),
            applications = applications.len(),
            "dashboard ready"
        );
        Ok(Self {
            directory,
            selection: SelectionController::new(notifier.clone()),
            applications: ApplicationCatalog::new(applications),
            submitter,
            notifier,
        })
    }

    pub fn directory(&self) -> &Arc<DirectoryStore> {
        &self.directory
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn applications(&self) -> &ApplicationCatalog {
        &self.applications
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Selects a location of the currently selected chain.
    pub fn select_location(&self, location_id: LocationId) -> Result<(), TransitionError> {
        if self.directory.find_child(&location_id).is_none() {
            return Err(TransitionError::UnknownLocation(location_id));
        }
        self.selection.select(location_id)
    }

    /// Adds the selected location to the selected chain.
    pub async fn add_selected_location(&self) -> Result<SubmissionState, TransitionError> {
        let chain_id = self
            .directory
            .selected_entity_id()
            .ok_or(TransitionError::NoChainSelected)?;
        if let Some(selected) = self.selection.selected() {
            if self.directory.find_child(&selected).is_none() {
                return Err(TransitionError::UnknownLocation(selected));
            }
        }
        self.selection
            .add_selected_location(&chain_id, self.submitter.as_ref())
            .await
    }
}
