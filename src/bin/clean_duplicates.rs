//! Command-line entry point for the duplicate cleanup. Dry-run by default;
//! pass --apply to delete.

use dotenv::dotenv;
use env_logger::Env;

use hotel_inventory_api::{cleanup, db};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let apply = std::env::args().any(|a| a == "--apply");
    let pool = db::get_db_pool().await;

    let removed = cleanup::clean_duplicate_accommodations(&pool, apply)
        .await
        .expect("accommodation cleanup failed")
        + cleanup::clean_duplicate_hotels(&pool, apply)
            .await
            .expect("hotel cleanup failed");

    if apply {
        log::info!("cleanup done, {} rows removed", removed);
    } else {
        log::info!(
            "dry run: {} rows would be removed; re-run with --apply to delete",
            removed
        );
    }
    Ok(())
}
