//! # Mock Framework
//!
//! Utilities for testing code that holds a [`CartClient`] without running a
//! real cart service.
//!
//! Use [`create_mock_client`] to get a client, the receiving end of its
//! mailbox and the publisher behind its snapshots. Then use helpers like
//! [`expect_add_to_cart`] to assert what the client sent and answer it.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};

use crate::cart_actor::CartError;
use crate::clients::CartClient;
use crate::domain::{CartSnapshot, LineItem, NewLineItem};
use crate::messages::{CartRequest, MutationOutcome};

pub type MutationResponder = oneshot::Sender<Result<MutationOutcome, CartError>>;

pub fn create_mock_client(
    buffer_size: usize,
) -> (
    CartClient,
    mpsc::Receiver<CartRequest>,
    watch::Sender<Arc<CartSnapshot>>,
) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    let (publisher, snapshots) = watch::channel(Arc::new(CartSnapshot::default()));
    (CartClient::new(sender, snapshots), receiver, publisher)
}

/// Helper to verify that the next message is an AddToCart request
pub async fn expect_add_to_cart(
    receiver: &mut mpsc::Receiver<CartRequest>,
) -> Option<(NewLineItem, MutationResponder)> {
    match receiver.recv().await {
        Some(CartRequest::AddToCart { item, respond_to }) => Some((item, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Increment request
pub async fn expect_increment(
    receiver: &mut mpsc::Receiver<CartRequest>,
) -> Option<(String, MutationResponder)> {
    match receiver.recv().await {
        Some(CartRequest::Increment { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Decrement request
pub async fn expect_decrement(
    receiver: &mut mpsc::Receiver<CartRequest>,
) -> Option<(String, MutationResponder)> {
    match receiver.recv().await {
        Some(CartRequest::Decrement { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a GetProducts request
pub async fn expect_get_products(
    receiver: &mut mpsc::Receiver<CartRequest>,
) -> Option<oneshot::Sender<Result<Vec<LineItem>, CartError>>> {
    match receiver.recv().await {
        Some(CartRequest::GetProducts { respond_to }) => Some(respond_to),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Cart, CartChange};

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver, _publisher) = create_mock_client(10);

        let add_task = tokio::spawn(async move {
            let item = NewLineItem::new("A", "Apple", "a.png", 10.0);
            client.add_to_cart(item).await
        });

        let (item, responder) = expect_add_to_cart(&mut receiver)
            .await
            .expect("Expected AddToCart request");
        assert_eq!(item.id, "A");

        let mut cart = Cart::new();
        let change = cart.add(item);
        let snapshot = Arc::new(CartSnapshot { version: 1, cart });
        responder
            .send(Ok(MutationOutcome { change, snapshot }))
            .unwrap();

        let outcome = add_task.await.unwrap().unwrap();
        assert_eq!(outcome.change, CartChange::Added);
        assert_eq!(outcome.items()[0].quantity, 1);
    }

    #[tokio::test]
    async fn increment_and_decrement_carry_the_id() {
        let (client, mut receiver, _publisher) = create_mock_client(10);

        let task = tokio::spawn(async move {
            let _ = client.increment("A".to_string()).await;
            client.decrement("B".to_string()).await
        });

        let (id, responder) = expect_increment(&mut receiver).await.expect("Expected Increment");
        assert_eq!(id, "A");
        drop(responder);

        let (id, responder) = expect_decrement(&mut receiver).await.expect("Expected Decrement");
        assert_eq!(id, "B");
        responder
            .send(Err(CartError::Codec("boom".to_string())))
            .unwrap();

        assert_eq!(task.await.unwrap().unwrap_err(), CartError::Codec("boom".to_string()));
    }

    #[tokio::test]
    async fn dropped_reply_is_a_communication_error() {
        let (client, mut receiver, _publisher) = create_mock_client(10);

        let task = tokio::spawn(async move { client.products().await });

        let responder = expect_get_products(&mut receiver).await.expect("Expected GetProducts");
        drop(responder);

        assert!(matches!(
            task.await.unwrap(),
            Err(CartError::ActorCommunicationError(_))
        ));
    }

    #[tokio::test]
    async fn closed_mailbox_is_out_of_scope() {
        let (client, receiver, _publisher) = create_mock_client(10);
        drop(receiver);

        assert!(!client.is_in_scope());
        assert!(matches!(
            client.products().await,
            Err(CartError::OutOfScope(_))
        ));
    }

    #[tokio::test]
    async fn published_snapshots_reach_subscribers() {
        let (client, _receiver, publisher) = create_mock_client(10);
        let mut updates = client.subscribe();

        let mut cart = Cart::new();
        cart.add(NewLineItem::new("A", "Apple", "a.png", 10.0));
        publisher.send_replace(Arc::new(CartSnapshot { version: 7, cart }));

        updates.changed().await.unwrap();
        assert_eq!(updates.borrow().version, 7);
        assert_eq!(client.current().cart.len(), 1);
    }
}
