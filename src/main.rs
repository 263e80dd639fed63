use hitcount::prelude::*;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let store: Arc<dyn CounterStore> = Arc::new(SqliteStore::connect().await);
    App::new()
        .router(router())
        .inject(store)
        .inject(CounterConfig::from_env())
        .start()
        .await;
}
