use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult, SubscriptionStore};
use crate::models::{SpendFilter, Subscription};

/// Process-local store with the same contract as the database backend.
#[derive(Clone, Default)]
pub struct InMemorySubscriptionStore {
    records: Arc<RwLock<HashMap<Uuid, Subscription>>>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn insert(&self, subscription: &Subscription) -> StoreResult<Subscription> {
        let mut records = self.records.write().await;
        if records.contains_key(&subscription.id) {
            return Err(StoreError::Duplicate(subscription.id));
        }
        records.insert(subscription.id, subscription.clone());
        Ok(subscription.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Subscription>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn update(&self, subscription: &Subscription) -> StoreResult<bool> {
        let mut records = self.records.write().await;
        let Some(stored) = records.get_mut(&subscription.id) else {
            return Ok(false);
        };
        // id, user_id and created_at are not writable through an update
        stored.service_name = subscription.service_name.clone();
        stored.price = subscription.price;
        stored.start_date = subscription.start_date;
        stored.end_date = subscription.end_date;
        stored.updated_at = subscription.updated_at;
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.records.write().await.remove(&id).is_some())
    }

    async fn list_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Subscription>> {
        let mut subscriptions: Vec<Subscription> = self
            .records
            .read()
            .await
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        subscriptions.sort_by(|a, b| {
            b.start_date
                .cmp(&a.start_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(subscriptions)
    }

    async fn sum_overlapping(&self, filter: &SpendFilter) -> StoreResult<i64> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|s| filter.matches(s))
            .map(|s| i64::from(s.price))
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn record(user_id: Uuid, created_at: DateTime<Utc>) -> Subscription {
        Subscription {
            id: Uuid::new_v4(),
            service_name: "Netflix".to_string(),
            price: 100,
            user_id,
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_date: None,
            created_at,
            updated_at: created_at,
        }
    }

    #[tokio::test]
    async fn test_list_breaks_start_date_ties() {
        let store = InMemorySubscriptionStore::new();
        let user_id = Uuid::new_v4();
        let early = Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 2, 5, 10, 0, 0).unwrap();

        let older = record(user_id, early);
        let newer = record(user_id, late);
        let mut twins = [record(user_id, early), record(user_id, early)];
        twins.sort_by_key(|s| s.id);
        for s in [&twins[1], &older, &newer, &twins[0]] {
            store.insert(s).await.unwrap();
        }

        let ids: Vec<Uuid> = store
            .list_by_user(user_id)
            .await
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        let mut same_created = vec![older.id, twins[0].id, twins[1].id];
        same_created.sort();
        let mut expected = vec![newer.id];
        expected.extend(same_created);
        assert_eq!(ids, expected);
    }
}
