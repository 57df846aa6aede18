use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    pagination::{range_summary, PageWindow},
    CatalogApi, CatalogClient, ControllerConfig, ControllerEvent, CourseListController,
    CourseListView, FilterState, PriceRange, PAGE_SIZE,
};
use shared::domain::SortKey;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, DEFAULT_CONFIG_FILE};

const PAGE_WINDOW_WIDTH: u32 = 5;

#[derive(Parser, Debug)]
#[command(about = "Browse the course catalog from the terminal")]
struct Cli {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    debounce_ms: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search courses with filters, sorting and paging.
    Browse(BrowseArgs),
    /// List course categories.
    Categories,
}

#[derive(Args, Debug)]
struct BrowseArgs {
    #[arg(long, default_value = "")]
    search: String,
    #[arg(long, default_value = "")]
    category: String,
    #[arg(long, default_value = "")]
    level: String,
    #[arg(long, default_value = "")]
    rating: String,
    #[arg(long)]
    min_price: Option<f64>,
    #[arg(long)]
    max_price: Option<f64>,
    #[arg(long, default_value_t = SortKey::Newest)]
    sort: SortKey,
    #[arg(long, default_value_t = 1)]
    page: u32,
}

impl BrowseArgs {
    fn filters(&self) -> FilterState {
        let defaults = PriceRange::default();
        FilterState {
            category: self.category.clone(),
            level: self.level.clone(),
            rating: self.rating.clone(),
            price_range: PriceRange {
                min: self.min_price.unwrap_or(defaults.min),
                max: self.max_price.unwrap_or(defaults.max),
            },
            search: self.search.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(&cli.config)?;
    if let Some(api_url) = cli.api_url {
        settings.api_url = api_url;
    }
    if let Some(debounce_ms) = cli.debounce_ms {
        settings.debounce_ms = debounce_ms;
    }
    info!(api_url = %settings.api_url, debounce_ms = settings.debounce_ms, "catalog: starting");

    let client = CatalogClient::with_timeout(&settings.api_url, settings.request_timeout())?;
    let api: Arc<dyn CatalogApi> = Arc::new(client);

    match cli.command {
        Command::Categories => {
            let categories = api
                .list_categories()
                .await
                .context("failed to list categories")?;
            for category in categories {
                println!("{}\t{}", category.id, category.name);
            }
        }
        Command::Browse(args) => {
            let controller = CourseListController::with_config(
                api,
                ControllerConfig {
                    debounce: settings.debounce(),
                },
            );
            let wait_limit = settings.request_timeout() + settings.debounce() * 2;
            let result = browse(&controller, &args, wait_limit).await;
            controller.unmount().await;
            print_view(&result?);
        }
    }

    Ok(())
}

async fn browse(
    controller: &Arc<CourseListController>,
    args: &BrowseArgs,
    wait_limit: Duration,
) -> Result<CourseListView> {
    let mut events = controller.subscribe_events();
    controller.mount().await;

    controller.set_filters(args.filters()).await;
    controller.set_sort(args.sort).await;
    let mut view = wait_until_settled(controller, &mut events, wait_limit).await?;

    if args.page != view.page.current_page {
        if !controller.set_page(args.page).await {
            bail!(
                "page {} is out of range (1..={})",
                args.page,
                view.pagination.total_pages.max(1)
            );
        }
        view = wait_until_settled(controller, &mut events, wait_limit).await?;
    }

    if let Some(error) = &view.categories_error {
        warn!(%error, "catalog: categories unavailable");
    }
    Ok(view)
}

/// Waits until the current state's query has been issued and answered.
async fn wait_until_settled(
    controller: &CourseListController,
    events: &mut broadcast::Receiver<ControllerEvent>,
    wait_limit: Duration,
) -> Result<CourseListView> {
    let expected = controller.current_query().await?.fingerprint();
    tokio::time::timeout(wait_limit, async {
        loop {
            let view = controller.snapshot().await;
            if view.last_issued.as_ref() == Some(&expected) && !view.loading {
                if let Some(error) = &view.error {
                    return Err(anyhow!("{error}"));
                }
                return Ok(view);
            }
            match events.recv().await {
                Ok(_) | Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => bail!("course list controller closed"),
            }
        }
    })
    .await
    .context("timed out waiting for course results")?
}

fn print_view(view: &CourseListView) {
    if view.courses.is_empty() {
        println!("No courses match these filters.");
        return;
    }

    for course in &view.courses {
        println!(
            "{:<40} {:<16} {:<12} ${:>8.2}  {:.1}*  {} enrolled",
            course.title,
            course.category,
            course.level,
            course.price,
            course.rating,
            course.enrolled_count
        );
    }

    let (first, last, total) = range_summary(&view.pagination, PAGE_SIZE);
    println!();
    println!("Showing {first}-{last} of {total} courses");

    let window = PageWindow::around(
        view.pagination.current_page,
        view.pagination.total_pages,
        PAGE_WINDOW_WIDTH,
    );
    let pages: Vec<String> = window
        .pages
        .iter()
        .map(|page| {
            if *page == window.current {
                format!("[{page}]")
            } else {
                page.to_string()
            }
        })
        .collect();
    println!(
        "{} {} {}",
        if window.has_previous { "<" } else { " " },
        pages.join(" "),
        if window.has_next { ">" } else { " " }
    );
}
