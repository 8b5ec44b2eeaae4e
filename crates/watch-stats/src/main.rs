mod bootstrap;
mod report;

use anyhow::Result;
use chrono::Utc;
use stats_core::settings::Settings;
use stats_core::time_utils::TimezoneHandler;
use stats_data::analysis::{analyze_history, AnalysisOptions};
use stats_data::classifier::ClassifierConfig;
use stats_data::reader::DedupPolicy;
use stats_data::summary::{SortField, StatsSummary};
use stats_ui::app::{App, ViewMode};

use crate::report::ReportOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("watch-stats v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Category: {}, Timezone: {}, Theme: {}",
        settings.view,
        settings.category,
        settings.timezone,
        settings.theme
    );

    let options = AnalysisOptions {
        dedup: DedupPolicy::from_name(&settings.dedup),
        classifier: ClassifierConfig::default(),
        durations: settings.duration_policy()?,
    };

    // Reading and aggregating is blocking file I/O plus CPU work.
    let inputs = settings.inputs.clone();
    let analysis =
        tokio::task::spawn_blocking(move || analyze_history(&inputs, &options)).await??;

    let meta = &analysis.metadata;
    tracing::info!(
        "Read {} records from {} files in {:.2}s; {} skipped, {} duplicates, {} rejected, {} retained",
        meta.records_read,
        meta.files_read,
        meta.load_time_seconds,
        meta.records_skipped,
        meta.duplicates_removed,
        meta.rejected(),
        meta.events_retained
    );

    let sort_field = SortField::from_name(&settings.sort);
    let sort_direction = if settings.reverse {
        sort_field.natural_direction().toggled()
    } else {
        sort_field.natural_direction()
    };

    match settings.view.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&analysis.result)?);
        }

        "report" => {
            let tz = TimezoneHandler::new(&settings.timezone).default_tz();
            let summary = StatsSummary::build(&analysis.result, Utc::now(), tz);
            let options = ReportOptions {
                view: settings.category_view(),
                search: settings.search.clone().unwrap_or_default(),
                sort_field,
                sort_direction,
                top: settings.top,
            };
            print!("{}", report::render_report(&analysis, &summary, &options));
        }

        view => {
            let app = App::new(
                &settings.theme,
                ViewMode::from_name(view),
                settings.timezone.clone(),
                analysis.result,
            )
            .with_listing(
                settings.category_view(),
                settings.search.clone(),
                sort_field,
                sort_direction,
            );

            // The event loop blocks on terminal polling.
            tokio::task::spawn_blocking(move || app.run()).await??;
        }
    }

    Ok(())
}
