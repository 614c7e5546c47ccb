#![forbid(unsafe_code)]

use std::sync::Arc;

use anglers_journal::{
    storage::{CatchRepository, FileStorage},
    store::CatchStore,
    web, Config,
};
use dotenvy::dotenv;
use eyre::{Result, WrapErr};
use log::info;
use tokio::sync::Mutex;

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init_timed();
    dotenv().ok();

    let config = Config::load().wrap_err("Could not load configuration")?;

    info!("Keeping catches in {}", config.data_dir.display());
    let repository = CatchRepository::new(FileStorage::new(config.data_dir.clone()));
    let store = Arc::new(Mutex::new(CatchStore::initialize(
        repository,
        config.id_scheme,
    )));

    info!("Serving the journal on http://{}", config.bind);
    warp::serve(web::routes(store)).run(config.bind).await;

    Ok(())
}
