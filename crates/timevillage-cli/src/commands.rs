//! Command execution

use crate::config::AppConfig;
use crate::{CategoryAction, Commands, SyncAction};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use timevillage_core::{
    BuildingId, BuildingType, Category, CategoryId, Cell, Subscription, TimerView,
};
use timevillage_db::Store;
use timevillage_rules::{load_configured, AssetCache, CatalogOrigin, CatalogSlot};
use timevillage_session::Session;
use timevillage_sync::{AutoPush, CloudSync, HttpRemote, PullOutcome, StaticIdentity};
use tokio::sync::watch;

type Cloud = CloudSync<HttpRemote, StaticIdentity>;

/// Command failures
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Rules(#[from] timevillage_rules::Error),

    #[error(transparent)]
    Store(#[from] timevillage_db::Error),

    #[error(transparent)]
    Session(#[from] timevillage_session::Error),

    #[error(transparent)]
    Sync(#[from] timevillage_sync::Error),

    #[error("cloud sync is not configured")]
    CloudDisabled,
}

struct App {
    session: Arc<Session>,
    cloud: Option<Cloud>,
    auto_push: bool,
    config: AppConfig,
}

impl App {
    async fn open(config: AppConfig) -> Result<Self, CliError> {
        let loaded = load_configured(&config.rules).await?;
        if loaded.origin == CatalogOrigin::Builtin && config.rules.url.is_some() {
            eprintln!("Note: rules server unavailable, using bundled rules");
        }

        let store = match &config.database_path {
            Some(path) => Store::open(path)?,
            None => Store::in_memory()?,
        };
        let session = Arc::new(Session::open(
            Arc::new(store),
            loaded.catalog,
            config.session.clone(),
        )?);

        let (cloud, auto_push) = match &config.cloud {
            Some(cloud) => {
                let remote = Arc::new(HttpRemote::new(cloud)?);
                let identity = Arc::new(StaticIdentity::from(cloud.user_id.clone()));
                (
                    Some(CloudSync::new(session.clone(), remote, identity)),
                    cloud.auto_push,
                )
            }
            None => (None, false),
        };

        Ok(Self {
            session,
            cloud,
            auto_push,
            config,
        })
    }

    fn cloud(&self) -> Result<&Cloud, CliError> {
        self.cloud.as_ref().ok_or(CliError::CloudDisabled)
    }

    /// Bring in the cloud copy, then follow local changes
    ///
    /// A failed pull is logged and play continues on the local state.
    async fn start_cloud(&self) -> Option<AutoPush> {
        let cloud = self.cloud.as_ref()?;
        if !cloud.is_signed_in() {
            return None;
        }
        // failures are logged by the task
        let _ = cloud.spawn_pull().await;
        self.auto_push.then(|| cloud.spawn_autopush())
    }
}

/// Run one command against a freshly opened session
pub async fn run(command: Commands, config: AppConfig) -> Result<(), CliError> {
    let app = App::open(config).await?;
    let autopush = match command {
        Commands::Sync { .. } => None,
        _ => app.start_cloud().await,
    };

    let result = execute(&app, command).await;
    if let Some(autopush) = autopush {
        autopush.finish().await;
    }
    result
}

async fn execute(app: &App, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Status => status(&app.session)?,
        Commands::Rules => rules(&app.session),
        Commands::Track { category, seconds } => track(&app.session, &category, seconds).await?,
        Commands::Buy { kind, x, y } => {
            let building = app.session.buy(&BuildingType::new(kind), Cell::new(x, y))?;
            println!(
                "Built {} #{} at {}",
                building.kind,
                building.id.raw(),
                building.cell
            );
            print_balance(&app.session)?;
        }
        Commands::Upgrade { id } => {
            let building = app.session.upgrade(BuildingId::new(id))?;
            println!(
                "{} #{} is now level {}",
                building.kind,
                building.id.raw(),
                building.level
            );
            print_balance(&app.session)?;
        }
        Commands::Category { action } => category(&app.session, action)?,
        Commands::Nickname { name } => {
            app.session.set_nickname(&name)?;
            println!("Nickname set to {}", name.trim());
        }
        Commands::Preload => preload(app).await?,
        Commands::Sync { action } => match action {
            SyncAction::Push => {
                let doc = app.cloud()?.push().await?;
                println!("Pushed {} buildings", doc.buildings.len());
            }
            SyncAction::Pull => match app.cloud()?.pull().await? {
                PullOutcome::Seeded => println!("No cloud copy yet; uploaded the local village"),
                PullOutcome::Replaced { buildings } => {
                    println!("Replaced local village with cloud copy ({} buildings)", buildings)
                }
            },
        },
    }
    Ok(())
}

fn format_duration(seconds: u64) -> String {
    format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

fn print_balance(session: &Session) -> Result<(), CliError> {
    let ledger = session.ledger()?;
    println!("Balance: {}", format_duration(ledger.accumulated_time));
    Ok(())
}

fn status(session: &Session) -> Result<(), CliError> {
    let view = session.view()?;
    let state = session.state()?;
    let village = session.village();
    let catalog = session.catalog();

    println!("{}", view.nickname);
    println!("  Balance:  {}", format_duration(view.accumulated_time));
    println!("  Lifetime: {}", format_duration(view.global_time));
    println!("  Grid:     {0}x{0}", view.grid_size);
    println!();
    println!("Buildings:");
    for building in &view.buildings {
        let name = catalog
            .get(&building.kind)
            .map(|r| r.name(building.level).to_string())
            .unwrap_or_else(|| building.kind.to_string());
        let next = match village.check_upgrade(&state, building) {
            Ok(cost) => format!("upgrade {}", format_duration(cost)),
            Err(reason) => reason.to_string(),
        };
        println!(
            "  #{:<3} {:<10} {:<12} lvl {:<2} at {:<9} ({})",
            building.id.raw(),
            building.kind.as_str(),
            name,
            building.level,
            building.cell.to_string(),
            next
        );
    }
    println!();
    println!("Shop:");
    for kind in catalog.buildable_types() {
        let cost = catalog.cost(kind, 1).unwrap_or_default();
        let lock = if village.can_build_new(&state, kind) {
            String::new()
        } else {
            let unlock = catalog.get(kind).map(|r| r.unlock_at_main_level).unwrap_or(0);
            format!(" (unlocks at main level {})", unlock)
        };
        println!("  {:<10} {}{}", kind.as_str(), format_duration(cost), lock);
    }
    Ok(())
}

fn rules(session: &Session) {
    let catalog = session.catalog();
    for rules in catalog.buildings.values() {
        println!("{} (unlocks at main level {})", rules.kind, rules.unlock_at_main_level);
        for level in &rules.levels {
            let Some(entry) = catalog.entry(&rules.kind, level.level) else {
                continue;
            };
            let grid = entry
                .grid_size
                .map(|g| format!(" grid {0}x{0}", g))
                .unwrap_or_default();
            println!(
                "  lvl {:<2} {:<12} cost {}{} frames {} {}",
                entry.level,
                rules.name(entry.level),
                format_duration(entry.cost),
                grid,
                entry.frames,
                entry.asset.unwrap_or_default()
            );
        }
    }
}

async fn wait_for_elapsed(timer: &mut Subscription<TimerView>, target: u64) {
    while let Some(view) = timer.recv().await {
        if view.session_elapsed >= target {
            break;
        }
    }
}

async fn track(session: &Session, name: &str, seconds: Option<u64>) -> Result<(), CliError> {
    let existing = session
        .categories()?
        .into_iter()
        .find(|c| c.name.eq_ignore_ascii_case(name.trim()));
    let category = match existing {
        Some(category) => category,
        None => session.add_category(name, None)?,
    };

    let mut timer = session.subscribe_timer();
    session.start_timer(category.id)?;
    match seconds {
        Some(target) => {
            println!("Tracking {} for {}", category.name, format_duration(target));
            tokio::select! {
                _ = wait_for_elapsed(&mut timer, target) => {}
                _ = tokio::signal::ctrl_c() => {}
            }
        }
        None => {
            println!("Tracking {}; press Ctrl-C to stop", category.name);
            // an error here means no signal handler; stop right away
            let _ = tokio::signal::ctrl_c().await;
        }
    }

    match session.finish_timer()? {
        Some(credited) => println!("Committed {} to {}", format_duration(credited), category.name),
        None => println!("Nothing to commit"),
    }
    print_balance(session)
}

fn print_categories(categories: &[Category]) {
    for category in categories {
        println!(
            "  #{:<3} {:<20} {}",
            category.id.raw(),
            category.name,
            category.color_hex
        );
    }
}

fn category(session: &Session, action: CategoryAction) -> Result<(), CliError> {
    match action {
        CategoryAction::List => {}
        CategoryAction::Add { name, color } => {
            session.add_category(&name, color.as_deref())?;
        }
        CategoryAction::Rename { id, name } => {
            session.rename_category(CategoryId::new(id), &name)?;
        }
        CategoryAction::Color { id, color } => {
            session.recolor_category(CategoryId::new(id), &color)?;
        }
        CategoryAction::Move { id, direction } => {
            if !session.move_category(CategoryId::new(id), direction.into())? {
                println!("Already at that end of the list");
            }
        }
        CategoryAction::Delete { id } => {
            session.delete_category(CategoryId::new(id))?;
        }
    }
    print_categories(&session.categories()?);
    Ok(())
}

async fn preload(app: &App) -> Result<(), CliError> {
    let slot = CatalogSlot::new();
    slot.set(app.session.catalog().clone());

    let cache = AssetCache::new(256, Duration::from_millis(app.config.rules.timeout_ms))?;
    let (progress, mut updates) = watch::channel(0.0f32);
    let printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let value = *updates.borrow_and_update();
            println!("  {:>3.0}%", value * 100.0);
        }
    });

    let report = cache
        .preload_when_ready(
            &slot,
            app.config.rules.attempts,
            Duration::from_millis(app.config.rules.backoff_ms),
            &progress,
        )
        .await?;
    drop(progress);
    // ends once the sender is gone
    let _ = printer.await;

    println!("Loaded {} assets", report.loaded);
    for url in &report.failed {
        println!("  failed: {}", url);
    }
    Ok(())
}
