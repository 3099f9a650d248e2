use bucket_facade::{create_store_from_env, ListOptions, MetadataPatch};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Backend chosen by STORAGE_BACKEND: memory (default), s3 or minio
    let store = create_store_from_env()?;
    println!("Using bucket '{}'", store.bucket());

    // Upload and read back
    store.put("demo/a.txt", "hello").await?;
    store.put("demo/b.txt", "world").await?;
    println!("demo/a.txt = {:?}", store.get_text("demo/a.txt").await?);

    // Patch metadata; the payload is kept
    store
        .put_head(
            "demo/a.txt",
            MetadataPatch::new().set("owner", "bob").set("revision", 1),
        )
        .await?;
    println!("demo/a.txt metadata = {:?}", store.get_head("demo/a.txt").await?);

    // Rename and list
    store.rename("demo/b.txt", "demo/c.txt").await?;
    let heads = store.get_heads(ListOptions::with_prefix("demo/")).await?;
    println!("{}", serde_json::to_string_pretty(&heads)?);

    // Clean up
    let response = store.delete_many(["demo/a.txt", "demo/c.txt"]).await?;
    println!("Deleted {} objects", response.deleted.len());
    for err in &response.errors {
        tracing::warn!(error = %err, "delete failed");
    }

    Ok(())
}
