use clap::Parser;
use inventory_table::{cli, config, error, render, store};
use cli::{Cli, Commands, TableArgs};
use config::Config;
use error::{InventoryTableError, Result};
use inventory_table_common::{driver, LocationFilter, SortDirection, TableController};
use std::cell::RefCell;
use store::{FixedRole, JsonFileStore};
use tracing_subscriber::EnvFilter;

/// 表示条件に従ってコントローラを準備
async fn prepare(
    args: &TableArgs,
    config: &Config,
    store: &JsonFileStore,
) -> Result<RefCell<TableController>> {
    if !args.records.exists() {
        return Err(InventoryTableError::RecordsNotFound(
            args.records.display().to_string(),
        ));
    }

    let location = args
        .location
        .clone()
        .or_else(|| config.default_location.clone())
        .unwrap_or_default();
    let mut filter = LocationFilter::new(location);
    if let Some(id) = args.location_id {
        filter = filter.with_location_id(id);
    }

    let controller = RefCell::new(TableController::new(config.table.clone(), filter)?);

    let role = FixedRole(args.role.clone().or_else(|| config.default_role.clone()));
    driver::resolve_role(&controller, &role).await;
    driver::refresh(&controller, store).await?;

    if let Some(key) = args.sort {
        let wanted = SortDirection::from(args.direction);
        let mut c = controller.borrow_mut();
        c.request_sort(key);
        if c.state().sort.direction != wanted {
            c.request_sort(key);
        }
    }

    if let Some(page_size) = args.page_size {
        driver::change_page_size(&controller, store, page_size).await?;
    }
    if args.page > 0 {
        driver::change_page(&controller, store, args.page).await?;
    }

    for id in &args.select {
        controller.borrow_mut().toggle_selection(*id)?;
    }

    Ok(controller)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;

    match cli.command {
        Commands::Show { table } => {
            let store = JsonFileStore::new(&table.records);
            let controller = prepare(&table, &config, &store).await?;
            println!("{}", render::render_table(&controller.borrow().state()));
        }

        Commands::Audit { table, id } => {
            let store = JsonFileStore::new(&table.records);
            let controller = prepare(&table, &config, &store).await?;

            println!("- 監査を送信中... (ID: {})", id);
            let result = driver::perform_audit(&controller, &store, id, chrono::Utc::now()).await;
            println!("{}", render::render_table(&controller.borrow().state()));

            match result {
                Ok(state) => println!("✔ 監査完了: {:?}", state),
                Err(e) => return Err(e.into()),
            }
        }

        Commands::Config { page_size, show } => {
            let mut config = config;

            if let Some(size) = page_size {
                config.set_default_page_size(size)?;
                config.save()?;
                println!("✔ 既定のページサイズを {} に設定しました", size);
            }

            if show {
                println!("設定:");
                println!("  ページサイズ候補: {:?}", config.table.page_size_options);
                println!("  既定のページサイズ: {}", config.table.default_page_size);
                println!(
                    "  既定のソート: {} {}",
                    config.table.default_sort,
                    config.table.default_direction.as_str()
                );
                println!("  既定のロール: {}", config.default_role.as_deref().unwrap_or("未設定"));
                println!(
                    "  既定のロケーション: {}",
                    config.default_location.as_deref().unwrap_or("未設定")
                );
            }
        }
    }

    Ok(())
}
