use std::sync::Arc;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use migration::MigratorTrait;
use tracing::info;

use common::utils::logging::{init_logging_default, init_logging_json};
use configs::AppConfig;
use service::blob::NoBlobStore;
use service::celebration_msg::repo::SeaOrmCelebrationMsgRepository;
use service::celebration_msg::{CelebrationMsgConfig, CelebrationMsgService};
use service::pagination::Pagination;

/// Maintenance tool for guest celebration messages.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Emit JSON logs
    #[arg(long, env = "LOG_JSON")]
    json_logs: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Apply pending schema migrations
    Migrate,
    /// Print one page of an invitation's messages as JSON
    List {
        #[arg(long)]
        user_id: i32,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        size: u32,
        /// Guest-facing projection instead of the owner view
        #[arg(long)]
        public: bool,
    },
    /// Remove a message by id, bypassing guest credentials
    Delete {
        #[arg(long)]
        id: i32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    if cli.json_logs {
        init_logging_json();
    } else {
        init_logging_default();
    }

    let cfg = AppConfig::load_and_validate()?;
    let db = models::db::connect_with_config(&cfg.database).await?;

    if let Action::Migrate = cli.action {
        migration::Migrator::up(&db, None).await?;
        info!("migrations applied");
        return Ok(());
    }

    let repo = Arc::new(SeaOrmCelebrationMsgRepository::new(db));
    // Listing and admin delete never reconcile images.
    let blobs = Arc::new(NoBlobStore);
    let svc = CelebrationMsgService::new(repo, blobs, CelebrationMsgConfig::from(&cfg.celebration));

    match cli.action {
        Action::Migrate => {}
        Action::List { user_id, page, size, public } => {
            let opts = Pagination::new(page, size);
            let out = if public {
                serde_json::to_string_pretty(&svc.list_for_guest(user_id, opts).await?)?
            } else {
                serde_json::to_string_pretty(&svc.list_for_owner(user_id, opts).await?)?
            };
            println!("{out}");
        }
        Action::Delete { id } => {
            let removed = svc.delete_by_admin(id).await?;
            println!("{}", serde_json::json!({ "id": id, "removed": removed }));
        }
    }
    Ok(())
}
