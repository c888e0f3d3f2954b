//! Shared setup for database-backed tests
//!
//! Requires `DATABASE_URL`; every test creates its own store with a random
//! slug so tests can share one database.

#![allow(dead_code)]

use std::time::Duration;

use pagekit_server::db::{
    self, Deadline, NewPage, NewStore, NewWidget, Page, PoolConfig, Store, UnitOfWork, Widget,
};
use pagekit_server::models::{PageName, PageRoute, StoreName, StoreSlug, WidgetType};
use pagekit_server::Engine;
use uuid::Uuid;

pub async fn engine() -> Engine {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("pagekit_server=debug")
        .with_test_writer()
        .try_init();

    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let pool = db::create_pool(&url, &PoolConfig::default())
        .await
        .expect("pool creation failed");
    db::migrations::run(&pool).await.expect("migrations failed");

    Engine::new(pool)
}

pub fn deadline() -> Deadline {
    Deadline::after(Duration::from_secs(10))
}

pub fn unique_slug(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &suffix[..12])
}

pub async fn store(engine: &Engine) -> Store {
    let input = NewStore {
        name: StoreName::new("Test Shop").unwrap(),
        slug: StoreSlug::new(&unique_slug("shop")).unwrap(),
    };
    engine.create_store(&deadline(), input).await.expect("create store")
}

pub fn new_page(name: &str, route: &str, is_home: bool) -> NewPage {
    NewPage {
        name: PageName::new(name).unwrap(),
        route: PageRoute::new(route).unwrap(),
        is_home,
    }
}

pub async fn page(engine: &Engine, store_id: Uuid, route: &str, is_home: bool) -> Page {
    engine
        .create_page(&deadline(), store_id, new_page("Page", route, is_home))
        .await
        .expect("create page")
}

pub async fn widget(engine: &Engine, page_id: Uuid, widget_type: WidgetType) -> Widget {
    let input = NewWidget {
        widget_type,
        config: None,
    };
    engine
        .create_widget(&deadline(), page_id, input)
        .await
        .expect("create widget")
}

/// Positions of a page's widgets in display order.
pub async fn positions(engine: &Engine, page_id: Uuid) -> Vec<(Uuid, i32)> {
    engine
        .list_widgets(&deadline(), page_id)
        .await
        .expect("list widgets")
        .into_iter()
        .map(|w| (w.id, w.position))
        .collect()
}

/// Home pages in a store, counted inside a transaction.
pub async fn home_count(engine: &Engine, store_id: Uuid) -> i64 {
    let mut uow = UnitOfWork::begin(engine.pool(), &deadline())
        .await
        .expect("begin");
    uow.pages().count_home(store_id).await.expect("count home pages")
}
