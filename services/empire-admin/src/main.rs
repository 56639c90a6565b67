//! Empire administration pages
//!
//! Demonstrates the realm-pages crate: admin-gated HTML pages, a gated
//! router, and a plain-text status page.

use chrono::{Duration, Utc};
use realm_pages::prelude::*;
use serde::Serialize;

#[derive(Serialize)]
struct Empire {
    name: String,
    stars: u32,
    population: i64,
    cash: f64,
}

fn empires() -> Vec<Empire> {
    vec![
        Empire {
            name: "The \"Old\" Hegemony".to_string(),
            stars: 1_204,
            population: 48_200_117_003,
            cash: 1_250_000.5,
        },
        Empire {
            name: "Ki'rath Collective".to_string(),
            stars: 87,
            population: 912_550,
            cash: -3_400.25,
        },
    ]
}

/// Admin overview of every empire in the realm
async fn admin_index(mut page: PageHandler) -> Result<PageHandler> {
    if !page.is_admin()? {
        return Ok(page);
    }

    let ctx = page
        .context()
        .with("empires", empires())
        .with_timestamp("generated", Utc::now())
        .with_timestamp("last_tick", Utc::now() - Duration::minutes(5));

    page.render("admin/index.html", ctx)?;
    Ok(page)
}

/// Reset confirmation; the whole router is gated by `require_admin`
async fn admin_reset(mut page: PageHandler) -> Result<PageHandler> {
    let ctx = page
        .context()
        .with("user", page.session().and_then(|s| s.user_id.clone()));
    page.render("admin/reset.html", ctx)?;
    Ok(page)
}

async fn status(mut page: PageHandler) -> PageHandler {
    let text = format!("OK {}", page.realm());
    page.write(&text);
    page
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_for_service("empire-admin")?;
    init_tracing(&config)?;

    tracing::info!("Starting empire admin pages");

    let state = AppState::from_config(config.clone())?;

    let gated = Router::new()
        .route("/admin/reset", get(admin_reset))
        .route("/realms/{realm}/admin/reset", get(admin_reset))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_admin,
        ));

    let app = Router::new()
        .route("/admin", get(admin_index))
        .route("/realms/{realm}/admin", get(admin_index))
        .route("/status", get(status))
        .route("/realms/{realm}/status", get(status))
        .merge(gated)
        .layer(create_memory_session_layer(&config.session))
        .with_state(state);

    Server::new(config).serve(app).await
}
