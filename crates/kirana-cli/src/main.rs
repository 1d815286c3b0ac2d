use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use kirana_core::{summarize_sales, Order};
use kirana_db::{ChangeBus, OrderStore, RangeFilter};

#[derive(Debug, Parser)]
#[command(name = "kirana-cli")]
#[command(about = "Kirana storefront operations console")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the most recent orders, newest first.
    Recent {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
    /// Sales and profit summary over a history window.
    Report {
        /// Window in days counted back from now.
        #[arg(long, conflicts_with_all = ["from", "to", "all"])]
        days: Option<i64>,
        /// Start of an explicit window (RFC 3339). Requires --to.
        #[arg(long, requires = "to")]
        from: Option<DateTime<Utc>>,
        /// End of an explicit window (RFC 3339). Requires --from.
        #[arg(long, requires = "from")]
        to: Option<DateTime<Utc>>,
        /// Everything on record, bounded by the configured row cap.
        #[arg(long)]
        all: bool,
    },
    /// Follow the live recent-orders feed until interrupted.
    Watch {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = kirana_core::load_app_config()?;
    let pool_config = kirana_db::PoolConfig::from_app_config(&config);
    let pool = kirana_db::connect_pool(&config.database_url, pool_config).await?;
    let orders = OrderStore::new(pool, ChangeBus::new(), config.report_max_rows);

    match cli.command {
        Commands::Recent { limit } => {
            let recent = orders.list_recent(limit).await?;
            if recent.is_empty() {
                println!("no orders yet");
            }
            for order in &recent {
                print_order_line(order);
            }
        }
        Commands::Report {
            days,
            from,
            to,
            all,
        } => {
            let filter = if all {
                RangeFilter::AllTime
            } else if let (Some(start), Some(end)) = (from, to) {
                RangeFilter::Between { start, end }
            } else {
                RangeFilter::LastDays(days.unwrap_or(7))
            };
            let window = orders.query_range(filter).await?;
            let summary = summarize_sales(&window);

            println!(
                "{} orders, revenue {}, profit {}",
                summary.orders, summary.revenue, summary.profit
            );
            for row in &summary.rows {
                println!(
                    "#{}  {}  {}  total {}  profit {}  ({})",
                    row.order_id,
                    row.placed_at.format("%Y-%m-%d %H:%M"),
                    row.customer,
                    row.total,
                    row.profit,
                    row.payment_method
                );
            }
        }
        Commands::Watch { limit } => {
            let mut feed = orders.subscribe_recent(limit);
            println!("watching the {limit} most recent orders (ctrl-c to stop)");
            while let Some(snapshot) = feed.recv().await {
                println!("--- {} ---", Utc::now().format("%H:%M:%S"));
                for order in &snapshot {
                    print_order_line(order);
                }
            }
        }
    }

    Ok(())
}

fn print_order_line(order: &Order) {
    println!(
        "#{}  {}  {}  {}  total {}  [{}]",
        order.id,
        order.created_at.format("%Y-%m-%d %H:%M"),
        order.customer_name,
        order.mobile,
        order.total,
        order.status
    );
}
