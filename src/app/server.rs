use super::args::ServeArgs;
use super::setup;
use crate::service::{IngestService, QueryService};
use crate::storage::{LogStore, SledLogStore};
use crate::web::{self, Backend};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

pub async fn run(args: ServeArgs) -> Result<()> {
    let table = setup::resolve_table(args.table.as_deref())?;
    let max_message_len = setup::check_max_message_len(args.max_message_len)?;
    let addr = setup::bind_addr(&args.host, args.port)?;

    info!("Starting log service");
    info!("Data directory: {}", args.data_dir);
    info!("Table: {}", table);

    let db = setup::open_db(&args.data_dir)?;
    let store: Arc<dyn LogStore> = Arc::new(SledLogStore::new(db, &table)?);

    let backend = Arc::new(Backend {
        ingest: IngestService::new(store.clone(), max_message_len),
        query: QueryService::new(store),
    });

    web::start_server(backend, addr).await
}
