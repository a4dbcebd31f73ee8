//! Fetch, build and package orchestration
//!
//! Every stage is bracketed by `StageStarted` and `StageCompleted` or
//! `StageFailed` events. Stages can run on their own against an existing
//! staging root, or in sequence through [`Pipeline::run`].

use crate::build_systems::BuildLayout;
use crate::builder::Builder;
use crate::fetch::{Fetcher, SourceManifest, UrlTemplate};
use crate::packaging::Packager;
use crate::recipe::LlvmRecipe;
use llvmpkg_config::Config;
use llvmpkg_errors::Error;
use llvmpkg_events::{EventEmitter, EventSender, Stage};
use llvmpkg_net::{NetClient, NetConfig};
use llvmpkg_types::{BuildReport, FetchReport, PackageReport, PipelineReport, Settings};
use std::future::Future;
use std::time::Instant;

pub struct Pipeline {
    config: Config,
    settings: Settings,
    recipe: LlvmRecipe,
    client: NetClient,
    tx: EventSender,
}

impl EventEmitter for Pipeline {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }
}

impl Pipeline {
    /// Create a pipeline with an HTTP client built from `[network]`
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: Config, settings: Settings, tx: EventSender) -> Result<Self, Error> {
        let client = NetClient::new(&NetConfig::from(&config.network))?;
        Self::with_client(config, settings, client, tx)
    }

    /// Create a pipeline around an existing HTTP client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails [`Config::validate`]; no
    /// staging directory is touched in that case.
    pub fn with_client(
        config: Config,
        settings: Settings,
        client: NetClient,
        tx: EventSender,
    ) -> Result<Self, Error> {
        config.validate()?;
        let recipe = LlvmRecipe::from_config(&config);
        Ok(Self {
            config,
            settings,
            recipe,
            client,
            tx,
        })
    }

    #[must_use]
    pub fn recipe(&self) -> &LlvmRecipe {
        &self.recipe
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn layout(&self) -> BuildLayout {
        BuildLayout::new(
            self.config.source_path(),
            self.config.build_path(),
            self.config.install_path(),
        )
    }

    fn package_ref(&self) -> String {
        self.recipe.metadata().reference()
    }

    async fn stage<T, F>(&self, stage: Stage, work: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        let package = self.package_ref();
        let start = Instant::now();
        self.emit_stage_started(stage, package.as_str());
        match work.await {
            Ok(value) => {
                self.emit_stage_completed(stage, package, start.elapsed());
                Ok(value)
            }
            Err(e) => {
                self.emit_stage_failed(stage, package, &e);
                Err(e)
            }
        }
    }

    /// Replace the source tree with the recipe's source set
    ///
    /// # Errors
    ///
    /// Returns the first download, extraction or relocation failure.
    pub async fn fetch(&self) -> Result<FetchReport, Error> {
        self.stage(Stage::Fetch, async {
            let template = UrlTemplate::from_config(&self.config.source)?;
            let fetcher = Fetcher::new(
                self.client.clone(),
                template,
                self.config.staging_root(),
                self.config.source_path(),
                self.tx.clone(),
            );
            fetcher.fetch_all(&self.recipe.components()).await
        })
        .await
    }

    /// Configure, compile and install the fetched source tree
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InvalidSourceManifest` if no source tree was
    /// fetched, and any failure of the build itself.
    pub async fn build(&self) -> Result<BuildReport, Error> {
        self.stage(Stage::Build, async {
            let layout = self.layout();
            let manifest = SourceManifest::load(&layout.source_dir).await?;
            let configuration = self
                .recipe
                .build_configuration(self.settings.clone(), &self.config.build);
            Builder::cmake(self.config.build.program.clone(), self.tx.clone())
                .build(&layout, &configuration, &manifest)
                .await
        })
        .await
    }

    /// Copy the install tree into the package layout
    ///
    /// # Errors
    ///
    /// Returns `PackagingError` variants from the packager.
    pub async fn package(&self) -> Result<PackageReport, Error> {
        self.stage(Stage::Package, async {
            Packager::new(self.recipe.copy_rules(), self.tx.clone())
                .package(&self.config.install_path(), &self.config.package_path())
                .await
        })
        .await
    }

    /// Fetch, build and package in sequence, stopping at the first failure
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing stage.
    pub async fn run(&self) -> Result<PipelineReport, Error> {
        let operation = format!("run {}", self.package_ref());
        self.emit_operation_started(operation.as_str());
        match self.run_stages().await {
            Ok(report) => {
                self.emit_operation_completed(operation);
                Ok(report)
            }
            Err(e) => {
                self.emit_operation_failed(operation, &e);
                Err(e)
            }
        }
    }

    async fn run_stages(&self) -> Result<PipelineReport, Error> {
        let fetch = self.fetch().await?;
        let build = self.build().await?;
        let packaging = self.package().await?;
        Ok(PipelineReport {
            package: self.package_ref(),
            fetch,
            build,
            packaging,
        })
    }
}
