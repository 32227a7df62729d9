use tokio_util::sync::CancellationToken;
use tracing::info;

use tierlist_core::{RecordId, Scope};
use tierlist_engine::Role;
use tierlist_search::SearchQuery;

use super::{Context, Output};

pub async fn search(
    ctx: &Context,
    scope: &str,
    query: &SearchQuery,
    output: Output,
) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, cancelling search");
            on_interrupt.cancel();
        }
    });

    let result = ctx.service.search_records(&Scope::new(scope), query, &cancel).await;
    watcher.abort();
    output.page(&result?)
}

pub async fn show(ctx: &Context, id: u64, output: Output) -> anyhow::Result<()> {
    let record = ctx.service.get_record_by_id(RecordId(id)).await?;
    output.record(&record)
}

pub async fn top_role(
    ctx: &Context,
    scope: &str,
    role: Role,
    limit: usize,
    output: Output,
) -> anyhow::Result<()> {
    let records = ctx.service.top_records_by_role(&Scope::new(scope), role, limit).await?;
    output.records(&records)
}

pub async fn top_attr(
    ctx: &Context,
    scope: &str,
    symbol: &str,
    limit: usize,
    output: Output,
) -> anyhow::Result<()> {
    let records = ctx
        .service
        .top_records_by_attribute(&Scope::new(scope), symbol, limit)
        .await?;
    output.records(&records)
}

pub async fn analyze(ctx: &Context, scope: &str, output: Output) -> anyhow::Result<()> {
    let stats = ctx.service.attribute_analysis(&Scope::new(scope)).await?;
    output.stats(&stats)
}

pub async fn representatives(ctx: &Context, scope: &str, output: Output) -> anyhow::Result<()> {
    let records = ctx.service.representative_records(&Scope::new(scope)).await?;
    output.records(&records)
}
