//! Builder for [`Histograph`]

#![allow(clippy::result_large_err)]

use std::path::Path;
use std::sync::Arc;

use histograph_core::diff::ListDiffPolicy;
use histograph_core::logging_facility;
use histograph_core::{
    CommitFactory, CommitIdFactory, CoreConfiguration, DateProvider, DiffFactory,
    InMemoryRepository, Metamodel, MetamodelGraphFactory, Repository, Result, SystemDateProvider,
};
use histograph_store::SqliteRepository;

use crate::histograph::Histograph;

/// Collects the collaborators of a [`Histograph`]
///
/// Defaults: an [`InMemoryRepository`], the system clock and
/// [`CoreConfiguration::default`]. Logging is left alone unless
/// [`HistographBuilder::init_logging`] is called.
pub struct HistographBuilder<M> {
    metamodel: M,
    repository: Option<Arc<dyn Repository>>,
    date_provider: Option<Arc<dyn DateProvider>>,
    configuration: CoreConfiguration,
    init_logging: bool,
}

impl<M: Metamodel> HistographBuilder<M> {
    pub fn new(metamodel: M) -> Self {
        Self {
            metamodel,
            repository: None,
            date_provider: None,
            configuration: CoreConfiguration::default(),
            init_logging: false,
        }
    }

    pub fn with_repository(mut self, repository: Arc<dyn Repository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Use a SQLite database at `path`, created and migrated as needed
    ///
    /// # Errors
    ///
    /// `Persistence` if the database cannot be opened or migrated.
    pub fn with_sqlite<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        let repository = SqliteRepository::open(path)?;
        Ok(self.with_repository(Arc::new(repository)))
    }

    pub fn with_date_provider(mut self, date_provider: Arc<dyn DateProvider>) -> Self {
        self.date_provider = Some(date_provider);
        self
    }

    pub fn with_configuration(mut self, configuration: CoreConfiguration) -> Self {
        self.configuration = configuration;
        self
    }

    /// Load the configuration from a TOML file
    ///
    /// # Errors
    ///
    /// `Configuration` if the file cannot be read or parsed.
    pub fn with_configuration_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        let configuration = CoreConfiguration::from_toml_file(path)?;
        Ok(self.with_configuration(configuration))
    }

    /// Install the configured logging profile when building
    pub fn init_logging(mut self) -> Self {
        self.init_logging = true;
        self
    }

    /// Wire everything together
    ///
    /// Commit numbering continues after the later of the configured seed and
    /// the repository head.
    ///
    /// # Errors
    ///
    /// Repository failures while reading the head commit id.
    pub fn build(self) -> Result<Histograph<M>> {
        if self.init_logging {
            logging_facility::init(self.configuration.logging_profile);
        }

        let repository = self
            .repository
            .unwrap_or_else(|| Arc::new(InMemoryRepository::new()));
        let date_provider = self
            .date_provider
            .unwrap_or_else(|| Arc::new(SystemDateProvider));

        let start_after = self.configuration.seed_commit_id().max(repository.head_id()?);
        tracing::debug!(
            start_after = ?start_after,
            list_compare_algorithm = ?self.configuration.list_compare_algorithm,
            "Building histograph"
        );

        let commit_factory = CommitFactory::new(
            MetamodelGraphFactory::new(self.metamodel),
            Arc::clone(&repository),
            DiffFactory::new(ListDiffPolicy::from(&self.configuration)),
            Arc::new(CommitIdFactory::new(start_after)),
            date_provider,
        );

        Ok(Histograph::new(commit_factory, repository, self.configuration))
    }
}
