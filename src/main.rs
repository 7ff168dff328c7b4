use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use tabscope::config::{default_config_path, ExplorerConfig};
use tabscope::domain::entities::dataset::{DatasetId, DatasetSort, Record};
use tabscope::domain::entities::view::{ActiveFilters, SortDirection, SortSpec};
use tabscope::infra::memory::repo::sample_drafts;
use tabscope::infra::sqlite::repo::SqliteRepo;
use tabscope::logging;
use tabscope::usecase::ports::repo::DatasetRepository;
use tabscope::usecase::services::catalog_service::{
    draft_preview, CatalogService, RECENT_DATASETS,
};
use tabscope::usecase::services::explore_service::{ExploreQuery, ExploreService, ExplorerView};
use tabscope::usecase::services::export_service::ExportService;

#[derive(Parser)]
#[command(name = "tabscope", about = "Explore tabular datasets", version)]
struct Cli {
    /// JSON config file. Defaults to the per-user config directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite catalog. Overrides `db_path` from the config file.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store the two demo datasets
    Seed,
    /// List stored datasets
    List {
        /// `created_date`, `-created_date` or empty for insertion order
        #[arg(long, default_value = "-created_date", allow_hyphen_values = true)]
        sort: DatasetSort,
    },
    /// Dataset, row and category counts plus the newest datasets
    Dashboard,
    /// Print one page of a dataset as CSV
    Explore {
        id: i64,
        #[command(flatten)]
        view: ViewArgs,
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Column statistics over the filtered rows
    Stats {
        id: i64,
        #[command(flatten)]
        view: ViewArgs,
        /// Single column; without it the leading summary columns are shown
        #[arg(long)]
        column: Option<String>,
    },
    /// Write the filtered rows to `<name>_filtered.csv`
    Export {
        id: i64,
        #[command(flatten)]
        view: ViewArgs,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(Args)]
struct ViewArgs {
    /// Case-insensitive text matched against every field
    #[arg(long, default_value = "")]
    search: String,
    /// Column filter as `column=value`; repeatable
    #[arg(long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, String)>,
    /// Column to sort by
    #[arg(long)]
    sort: Option<String>,
    /// Sort descending
    #[arg(long, requires = "sort")]
    desc: bool,
}

impl ViewArgs {
    fn query(&self, page: usize) -> ExploreQuery {
        let direction = if self.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        ExploreQuery {
            search_term: self.search.clone(),
            filters: self.filters.iter().cloned().collect::<ActiveFilters>(),
            sort: self
                .sort
                .as_ref()
                .map(|column| SortSpec::by(column.as_str(), direction))
                .unwrap_or_default(),
            page,
        }
    }
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(column, value)| (column.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected column=value, got `{raw}`"))
}

fn main() -> Result<()> {
    logging::init()?;
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };
    let config = ExplorerConfig::load(&config_path)?;
    let db_path = match &cli.db {
        Some(path) => path.clone(),
        None => config.resolved_db_path()?,
    };

    let repo: Arc<dyn DatasetRepository> = Arc::new(SqliteRepo::new(db_path));
    let catalog = CatalogService::new(repo.clone());
    catalog.init()?;

    match cli.command {
        Command::Seed => {
            for draft in sample_drafts() {
                println!("{} ({} rows)", draft.name, draft.rows.len());
                print_csv(&draft.columns, draft_preview(&draft, config.preview_rows))?;
            }
            let created = catalog.seed_samples()?;
            println!("stored {} datasets", created.len());
        }
        Command::List { sort } => {
            for dataset in catalog.list_datasets(sort)? {
                println!(
                    "#{}\t{}\t{}\t{} rows\t{}",
                    dataset.id,
                    dataset.name,
                    dataset.category_label(),
                    dataset.row_count,
                    dataset.created_date.format("%b %-d, %Y")
                );
            }
        }
        Command::Dashboard => {
            let (stats, breakdown) = catalog.dashboard()?;
            println!("datasets:    {}", stats.total_datasets);
            println!("rows:        {}", stats.total_rows);
            println!("categories:  {}", stats.categories);
            println!("last upload: {}", stats.last_upload);
            for entry in breakdown {
                println!("  {}: {}", entry.category, entry.count);
            }
            println!("recent:");
            for dataset in catalog.recent(RECENT_DATASETS)? {
                println!(
                    "  #{} {} ({})",
                    dataset.id,
                    dataset.name,
                    dataset.created_date.format("%b %-d, %Y")
                );
            }
        }
        Command::Explore { id, view, page } => {
            let explorer = ExploreService::new(repo.clone(), config.clone());
            let view = explorer.explore(DatasetId(id), &view.query(page))?;
            print_view(&view)?;
        }
        Command::Stats { id, view, column } => {
            let explorer = ExploreService::new(repo.clone(), config.clone());
            let query = view.query(1);
            let json = match column {
                Some(column) => {
                    let stats = explorer.column_stats(DatasetId(id), &column, &query)?;
                    serde_json::to_string_pretty(&stats)?
                }
                None => {
                    let summary = explorer.explore(DatasetId(id), &query)?.summary;
                    serde_json::to_string_pretty(&summary)?
                }
            };
            println!("{json}");
        }
        Command::Export { id, view, out_dir } => {
            let exporter = ExportService::new(repo.clone());
            let Some(file) = exporter.export(DatasetId(id), &view.query(1))? else {
                return Err(anyhow!("no rows match; nothing to export"));
            };
            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("failed to create {}", out_dir.display()))?;
            let path = out_dir.join(&file.file_name);
            std::fs::write(&path, &file.bytes)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = file.bytes.len(), "export written");
            println!("{}", path.display());
        }
    }

    Ok(())
}

fn print_view(view: &ExplorerView) -> Result<()> {
    println!(
        "{} [{}] page {}/{}, {} of {} rows",
        view.name,
        view.category_label,
        view.page,
        view.total_pages,
        view.filtered_count,
        view.declared_count
    );
    print_csv(&view.columns, &view.rows)?;
    if let Some(analysis) = &view.analysis {
        println!("summary: {}", analysis.summary);
        for insight in &analysis.insights {
            println!("  - {insight}");
        }
    }
    Ok(())
}

fn print_csv(columns: &[String], rows: &[Record]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout().lock());
    writer
        .write_record(columns)
        .context("failed to write header")?;
    for row in rows {
        let record = columns.iter().map(|column| {
            row.get(column)
                .map(|value| value.to_display_string())
                .unwrap_or_default()
        });
        writer.write_record(record).context("failed to write row")?;
    }
    writer.flush().context("failed to flush output")?;
    Ok(())
}
