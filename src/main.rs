#[macro_use]
extern crate rocket;

use std::path::Path;
use std::sync::Arc;

use rocket::fairing::AdHoc;
use rocket::{Build, Rocket};

mod aura;
mod boot;
mod config;
mod db;
mod models;
mod routes;
mod seed;
mod store;


use config::Config;
use store::{AdminSeed, Store};

/// Seed sample content on ignite when the store is empty.
fn seed_fairing(admin: AdminSeed) -> AdHoc {
    AdHoc::try_on_ignite("Seed content", move |app| async move {
        let Some(store) = app.state::<Arc<dyn Store>>().cloned() else {
            return Ok(app);
        };
        match rocket::tokio::task::spawn_blocking(move || store.seed_defaults(&admin)).await {
            Ok(Ok(true)) => log::info!("Store was empty, sample content seeded"),
            Ok(Ok(false)) => {}
            // the site still serves whatever the store has
            Ok(Err(e)) => log::warn!("Seeding skipped: {}", e),
            Err(e) => {
                log::error!("Seed task failed: {}", e);
                return Err(app);
            }
        }
        Ok(app)
    })
}

/// Assemble the application around an opened store.
pub fn build_rocket(config: Config, store: Arc<dyn Store>) -> Rocket<Build> {
    let assistant = aura::Assistant::new(config.server.owner.clone());
    let admin = AdminSeed {
        username: config.admin.username.clone(),
        password: config.admin.password.clone(),
    };
    let auto_seed = config.seed.auto;

    let mut app = rocket::build()
        .manage(store)
        .manage(config)
        .manage(assistant)
        .attach(routes::Cors);
    if auto_seed {
        app = app.attach(seed_fairing(admin));
    }
    app.mount("/", routes![routes::preflight])
        .mount("/api", routes::api::routes())
        .mount("/api/auth", routes::auth::routes())
        .mount("/api/aura", routes::aura::routes())
        .mount("/edge", routes::edge::routes())
        .register("/", routes::catchers())
}

#[launch]
fn rocket() -> _ {
    env_logger::init();

    let config = match Config::load(Path::new(config::CONFIG_FILE)) {
        Ok(c) => c,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    // Boot check: create data directories, validate config
    boot::run(&config);

    let store = match store::open(&config) {
        Ok(s) => s,
        Err(e) => {
            log::error!("Failed to open {:?} store: {}", config.database.backend, e);
            std::process::exit(1);
        }
    };

    build_rocket(config, store)
}
