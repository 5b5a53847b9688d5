use std::fmt;

use chrono::TimeDelta;

use crate::{
    bgg::{BggClient, BggError},
    config::Config,
    filter::CollectionFilter,
    management::SnapshotStore,
    types::{Buddy, CollectionEntry, Subtype},
    utils,
};

/// A user's collection, from a fresh snapshot or from the API.
///
/// On a fetch every older snapshot of the user is replaced. A user without a
/// logged collection gets an empty list, cached like any other result.
/// Upstream errors are returned and never cached.
pub async fn get_collection(
    client: &BggClient,
    store: &SnapshotStore,
    username: &str,
    cutoff: Option<TimeDelta>,
) -> Result<Vec<CollectionEntry>, BggError> {
    let username = username.trim();
    store
        .load_or_refresh(username, cutoff, utils::now(), || {
            client.fetch_collection(username)
        })
        .await
}

/// A user's geekbuddies, from a fresh snapshot or from the API.
pub async fn get_buddies(
    client: &BggClient,
    store: &SnapshotStore,
    username: &str,
    cutoff: Option<TimeDelta>,
) -> Result<Vec<Buddy>, BggError> {
    let username = username.trim();
    store
        .load_or_refresh(username, cutoff, utils::now(), || {
            client.fetch_buddies(username)
        })
        .await
}

/// A BoardGameGeek user together with their collection.
pub struct User {
    username: String,
    collection: Vec<CollectionEntry>,
}

impl User {
    /// Loads the user's collection.
    ///
    /// # Errors
    ///
    /// Fails when the API rejects the username or the collection cannot be
    /// retrieved.
    pub async fn load(
        client: &BggClient,
        store: &SnapshotStore,
        username: &str,
        cutoff: Option<TimeDelta>,
    ) -> Result<Self, BggError> {
        let username = username.trim().to_string();
        let collection = get_collection(client, store, &username, cutoff).await?;
        Ok(Self {
            username,
            collection,
        })
    }

    /// Builds a user from an already loaded collection.
    pub fn with_collection(username: &str, collection: Vec<CollectionEntry>) -> Self {
        Self {
            username: username.trim().to_string(),
            collection,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn collection(&self) -> &[CollectionEntry] {
        &self.collection
    }

    /// Re-fetches the collection regardless of snapshot age.
    pub async fn refresh_collection(
        &mut self,
        client: &BggClient,
        store: &SnapshotStore,
    ) -> Result<(), BggError> {
        self.collection =
            get_collection(client, store, &self.username, Some(TimeDelta::zero())).await?;
        Ok(())
    }

    /// The entries matching `filter`, in collection order.
    pub fn filter(&self, filter: &CollectionFilter) -> Vec<CollectionEntry> {
        filter.apply(&self.collection)
    }

    pub fn own(&self) -> Vec<CollectionEntry> {
        self.filter(&CollectionFilter {
            own: Some(true),
            ..Default::default()
        })
    }

    pub fn prevowned(&self) -> Vec<CollectionEntry> {
        self.filter(&CollectionFilter {
            prevowned: Some(true),
            ..Default::default()
        })
    }

    pub fn fortrade(&self) -> Vec<CollectionEntry> {
        self.filter(&CollectionFilter {
            fortrade: Some(true),
            ..Default::default()
        })
    }

    pub fn want(&self) -> Vec<CollectionEntry> {
        self.filter(&CollectionFilter {
            want: Some(true),
            ..Default::default()
        })
    }

    pub fn wanttoplay(&self) -> Vec<CollectionEntry> {
        self.filter(&CollectionFilter {
            wanttoplay: Some(true),
            ..Default::default()
        })
    }

    pub fn wanttobuy(&self) -> Vec<CollectionEntry> {
        self.filter(&CollectionFilter {
            wanttobuy: Some(true),
            ..Default::default()
        })
    }

    pub fn wishlist(&self) -> Vec<CollectionEntry> {
        self.filter(&CollectionFilter {
            wishlist: Some(true),
            ..Default::default()
        })
    }

    pub fn preordered(&self) -> Vec<CollectionEntry> {
        self.filter(&CollectionFilter {
            preordered: Some(true),
            ..Default::default()
        })
    }

    pub fn has_rating(&self) -> Vec<CollectionEntry> {
        self.filter(&CollectionFilter {
            has_rating: Some(true),
            ..Default::default()
        })
    }

    pub fn has_comment(&self) -> Vec<CollectionEntry> {
        self.filter(&CollectionFilter {
            has_comment: Some(true),
            ..Default::default()
        })
    }

    pub fn base(&self) -> Vec<CollectionEntry> {
        self.filter(&CollectionFilter {
            subtype: Some(Subtype::BoardGame),
            ..Default::default()
        })
    }

    pub fn expansion(&self) -> Vec<CollectionEntry> {
        self.filter(&CollectionFilter {
            subtype: Some(Subtype::Expansion),
            ..Default::default()
        })
    }

    /// The user's geekbuddies, cached in the buddies snapshot directory.
    pub async fn geekbuddies(
        &self,
        client: &BggClient,
        config: &Config,
        cutoff: Option<TimeDelta>,
    ) -> Result<Vec<Buddy>, BggError> {
        let store = SnapshotStore::new(config.buddies_dir());
        get_buddies(client, &store, &self.username, cutoff).await
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BGG User: {}", self.username)
    }
}
