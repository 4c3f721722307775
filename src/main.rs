use cart_store::{setup_tracing, CartConfig, CartSystem, NewLineItem};
use tracing::{info, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    setup_tracing();

    let config = CartConfig::from_env()?;
    info!(data_dir = %config.data_dir.display(), "Starting cart demo");

    let system = CartSystem::with_file_store(&config);
    let cart = system.cart_client.clone();

    let restored = cart.products().await?;
    info!(item_count = restored.len(), "Cart loaded");

    let mut updates = cart.subscribe();
    let watcher = tokio::spawn(
        async move {
            while updates.changed().await.is_ok() {
                let snapshot = updates.borrow_and_update().clone();
                info!(
                    version = snapshot.version,
                    items = snapshot.cart.len(),
                    quantity = snapshot.cart.total_quantity(),
                    "Cart re-rendered"
                );
            }
        }
        .instrument(tracing::info_span!("cart_view")),
    );

    let apple = NewLineItem::new("A", "Apple", "https://cdn.example.com/apple.png", 10.0);

    let span = tracing::info_span!("shopping");
    async {
        cart.add_to_cart(apple.clone()).await?;
        cart.add_to_cart(apple).await?;
        cart.decrement("A".to_string()).await?;
        let outcome = cart.decrement("A".to_string()).await?;
        info!(items = outcome.items().len(), "Shopping session finished");
        Ok::<_, cart_store::CartError>(())
    }
    .instrument(span)
    .await?;

    system.shutdown().await?;
    watcher.await?;

    info!("Cart demo completed successfully");
    Ok(())
}
