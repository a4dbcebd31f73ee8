//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};
use console::{Style, Term};
use llvmpkg_config::Config;
use llvmpkg_types::{
    BuildReport, ColorChoice, FetchReport, PackageMetadata, PackageReport, PipelineReport,
    Settings,
};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Package metadata and the configuration a stage command would use
#[derive(Debug, Serialize)]
pub struct InfoReport {
    pub metadata: PackageMetadata,
    pub settings: Settings,
    /// Components of the configured source set as `name-version`
    pub components: Vec<String>,
    pub url_template: String,
    pub staging_root: PathBuf,
    pub config: Config,
}

/// Result of one command
#[derive(Debug, Serialize)]
#[serde(tag = "kind", content = "report", rename_all = "snake_case")]
pub enum CommandResult {
    Fetch(FetchReport),
    Build(BuildReport),
    Package(PackageReport),
    Run(PipelineReport),
    Info(Box<InfoReport>),
}

impl CommandResult {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Color configuration
    color_choice: ColorChoice,
    /// Terminal instance
    term: Term,
}

impl OutputRenderer {
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        Self {
            json_output,
            color_choice,
            term: Term::stdout(),
        }
    }

    /// Render command result
    pub fn render_result(&self, result: &CommandResult) -> io::Result<()> {
        if self.json_output {
            let json = result.to_json().map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }
        match result {
            CommandResult::Fetch(report) => self.render_fetch_report(report),
            CommandResult::Build(report) => self.render_build_report(report),
            CommandResult::Package(report) => self.render_package_report(report),
            CommandResult::Run(report) => {
                println!("{}", self.bold(&report.package));
                self.render_fetch_report(&report.fetch);
                self.render_build_report(&report.build);
                self.render_package_report(&report.packaging);
            }
            CommandResult::Info(info) => self.render_info(info),
        }
        Ok(())
    }

    fn render_fetch_report(&self, report: &FetchReport) {
        println!(
            "Fetched {} components ({} bytes) into {}",
            report.components.len(),
            report.bytes_downloaded,
            report.source_dir.display()
        );
        for component in &report.components {
            println!("  • {component}");
        }
    }

    #[allow(clippy::unused_self)]
    fn render_build_report(&self, report: &BuildReport) {
        println!(
            "Installed into {} in {:.1}s",
            report.install_dir.display(),
            Duration::from_millis(report.duration_ms).as_secs_f64()
        );
    }

    fn render_package_report(&self, report: &PackageReport) {
        if report.files.is_empty() {
            println!("No files matched; {} is empty.", report.package_dir.display());
            return;
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Category").add_attribute(Attribute::Bold),
            Cell::new("Files").add_attribute(Attribute::Bold),
        ]);
        for (category, count) in &report.files {
            table.add_row(vec![Cell::new(category), Cell::new(count)]);
        }
        table.add_row(vec![
            Cell::new("total").add_attribute(Attribute::Bold),
            Cell::new(report.total_files()).add_attribute(Attribute::Bold),
        ]);

        println!("Package tree: {}", self.bold(&report.package_dir.display().to_string()));
        println!("{table}");
    }

    fn render_info(&self, info: &InfoReport) {
        let metadata = &info.metadata;
        println!("{}", self.bold(&metadata.reference()));
        println!();
        println!("License:     {}", metadata.license);
        println!("Homepage:    {}", metadata.url);
        println!("Settings:    {}", metadata.settings.join(", "));
        println!("Options:     shared={}", metadata.default_options.shared);
        println!();
        println!("Target:      {}", info.settings);
        println!("Source set:  {}", info.config.source.variant);
        println!("URL:         {}", info.url_template);
        println!("Build tool:  {}", info.config.build.program);
        println!("Shared:      {}", info.config.build.shared);
        println!("Jobs:        {}", info.config.build.jobs);
        println!("Root:        {}", info.staging_root.display());
        println!();
        println!("Components:");
        for component in &info.components {
            println!("  • {component}");
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.supports_color() {
            Style::new().bold().apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Check if color output is supported
    fn supports_color(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.term.features().colors_supported(),
        }
    }
}
