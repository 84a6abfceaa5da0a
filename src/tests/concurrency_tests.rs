use crate::core::errors::SplitxError;
use crate::tests::{DelayedStorage, create_delayed_service, names};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn test_settlement_read_overlapping_a_new_expense_is_not_cached() {
    let service = Arc::new(create_delayed_service(DelayedStorage {
        transactions_delay: Duration::from_millis(50),
        ..Default::default()
    }));
    let group = service
        .create_group("Flat".to_string(), names(&["A", "B"]))
        .await
        .unwrap();

    let reader = {
        let service = Arc::clone(&service);
        let group_id = group.id.clone();
        tokio::spawn(async move { service.get_settlements(&group_id).await })
    };
    // the reader is now parked inside get_transactions
    sleep(Duration::from_millis(10)).await;
    service
        .add_expense(&group.id, dec!(100), "A", None, None)
        .await
        .unwrap();

    let overlapping = reader.await.unwrap().unwrap();
    assert!(overlapping.settlements.is_empty());

    let fresh = service.get_settlements(&group.id).await.unwrap();
    assert_eq!(fresh.settlements.len(), 1);
    assert_eq!(fresh.settlements[0].from, "B");
    assert_eq!(fresh.settlements[0].to, "A");
    assert_eq!(fresh.settlements[0].amount, dec!(50));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_joins_keep_every_member() {
    let service = Arc::new(create_delayed_service(DelayedStorage {
        group_delay: Duration::from_millis(50),
        update_delay: Duration::from_millis(50),
        ..Default::default()
    }));
    let group = service
        .create_group("Flat".to_string(), names(&["A"]))
        .await
        .unwrap();

    let joins: Vec<_> = ["B", "C"]
        .into_iter()
        .map(|name| {
            let service = Arc::clone(&service);
            let group_id = group.id.clone();
            tokio::spawn(async move { service.join_group(&group_id, name).await })
        })
        .collect();
    for join in joins {
        join.await.unwrap().unwrap();
    }

    let mut members = service.get_group(&group.id).await.unwrap().active_members();
    members.sort();
    assert_eq!(members, names(&["A", "B", "C"]));
}

#[tokio::test(start_paused = true)]
async fn test_join_racing_delete_does_not_revive_the_group() {
    let service = Arc::new(create_delayed_service(DelayedStorage {
        update_delay: Duration::from_millis(50),
        ..Default::default()
    }));
    let group = service
        .create_group("Flat".to_string(), names(&["A", "B"]))
        .await
        .unwrap();
    service
        .add_expense(&group.id, dec!(30), "A", None, None)
        .await
        .unwrap();

    let join = {
        let service = Arc::clone(&service);
        let group_id = group.id.clone();
        tokio::spawn(async move { service.join_group(&group_id, "C").await })
    };
    sleep(Duration::from_millis(10)).await;
    service.delete_group(&group.id).await.unwrap();

    let joined = join.await.unwrap();
    assert!(matches!(joined, Err(SplitxError::GroupNotFound(_))));
    assert!(matches!(
        service.get_group(&group.id).await,
        Err(SplitxError::GroupNotFound(_))
    ));
    assert!(service.list_groups().await.unwrap().is_empty());
}
