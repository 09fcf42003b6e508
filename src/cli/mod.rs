use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::render::{JsonRenderer, Renderer, TextRenderer};
use crate::services::{demo, loader, today, Report, Settings};

/// Yearly and monthly aggregation tables with growth, forecast and diffs
#[derive(Parser)]
#[command(name = "tallytable")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a JSON report definition
    Render {
        /// Report definition file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// Render a generated sample report
    Demo {
        /// Keep only the N largest transaction currencies
        #[arg(long, default_value_t = 3)]
        top: usize,

        #[command(flatten)]
        window: WindowArgs,
    },
}

#[derive(Args, Debug, Default)]
struct WindowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Year to display (default: current year)
    #[arg(long)]
    year: Option<i32>,

    /// Comparison year
    #[arg(long)]
    diff_year: Option<i32>,

    /// Show diff columns against the comparison year
    #[arg(long)]
    show_diff: bool,
}

impl WindowArgs {
    fn apply(&self, report: &mut Report) {
        let options = report.options_mut();
        if let Some(year) = self.year {
            options.target_year = year;
        }
        if let Some(year) = self.diff_year {
            options.diff_year = year;
        }
        if self.show_diff {
            options.show_diff = true;
        }
    }

    fn renderer(&self) -> Box<dyn Renderer> {
        if self.json {
            Box::new(JsonRenderer)
        } else {
            Box::new(TextRenderer::new())
        }
    }
}

fn load_settings() -> Settings {
    match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("ignoring settings: {}", e);
            Settings::default()
        }
    }
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let settings = load_settings();

        let (mut report, window) = match self.command {
            Commands::Render { file, window } => {
                let report = loader::load_report(&file)
                    .with_context(|| format!("failed to load {}", file.display()))?;
                (report, window)
            }
            Commands::Demo { top, window } => (demo::demo_report(today(), top), window),
        };

        settings.apply(report.options_mut());
        window.apply(&mut report);
        report.set_renderer(window.renderer());

        println!("{}", report.render()?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReportOptions;

    #[test]
    fn test_cli_requires_command() {
        assert!(Cli::try_parse_from(["tallytable"]).is_err());
    }

    #[test]
    fn test_cli_parse_render() {
        let cli = Cli::try_parse_from(["tallytable", "render", "report.json"]).unwrap();
        match cli.command {
            Commands::Render { file, window } => {
                assert_eq!(file, PathBuf::from("report.json"));
                assert!(!window.json);
                assert!(window.year.is_none());
            }
            Commands::Demo { .. } => panic!("expected render"),
        }
    }

    #[test]
    fn test_cli_parse_render_window() {
        let cli = Cli::try_parse_from([
            "tallytable",
            "render",
            "report.json",
            "--json",
            "--year",
            "2020",
            "--diff-year",
            "2019",
            "--show-diff",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Render {
                window: WindowArgs {
                    json: true,
                    year: Some(2020),
                    diff_year: Some(2019),
                    show_diff: true,
                },
                ..
            }
        ));
    }

    #[test]
    fn test_cli_parse_demo_default_top() {
        let cli = Cli::try_parse_from(["tallytable", "demo"]).unwrap();
        assert!(matches!(cli.command, Commands::Demo { top: 3, .. }));
    }

    #[test]
    fn test_window_args_override_options() {
        let mut report = Report::new(ReportOptions {
            target_year: 2018,
            diff_year: 2017,
            ..ReportOptions::default()
        });
        let window = WindowArgs {
            year: Some(2020),
            show_diff: true,
            ..WindowArgs::default()
        };
        window.apply(&mut report);
        assert_eq!(report.options().target_year, 2020);
        assert_eq!(report.options().diff_year, 2017);
        assert!(report.show_diff());
    }
}
