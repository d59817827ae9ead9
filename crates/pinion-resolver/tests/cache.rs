mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{root, v, MemoryFeed};
use futures_util::future::join_all;
use pinion_core::config::SearchConfig;
use pinion_core::PackageName;
use pinion_resolver::{FeedCache, ManifestStore, Resolver};

fn feed() -> MemoryFeed {
    MemoryFeed::new()
        .package("a", "1.0", &[("b", ">= 1.0")])
        .package("a", "2.0", &[("b", ">= 2.0")])
        .package("b", "1.0", &[])
        .package("b", "2.0", &[])
}

#[tokio::test]
async fn concurrent_listings_share_one_feed_call() {
    let feed = feed().delay(Duration::from_millis(20));
    let cache = FeedCache::new(&feed, None);
    let a = PackageName::from("a");

    let results = join_all((0..8).map(|_| cache.list_versions(&a))).await;

    assert_eq!(feed.list_calls("a"), 1);
    for result in &results {
        assert_eq!(result.as_ref().unwrap().len(), 2);
    }
    assert_eq!(cache.stats().version_calls, 1);
}

#[tokio::test]
async fn concurrent_manifest_fetches_share_one_feed_call() {
    let feed = feed().delay(Duration::from_millis(20));
    let cache = FeedCache::new(&feed, None);
    let a = PackageName::from("a");
    let version = v("1.0");

    let results = join_all((0..8).map(|_| cache.fetch_manifest(&a, &version))).await;

    assert_eq!(feed.fetch_calls("a", "1.0"), 1);
    let first = results[0].as_ref().unwrap();
    for result in &results {
        assert!(Arc::ptr_eq(first, result.as_ref().unwrap()));
    }
}

#[tokio::test]
async fn failures_are_shared_too() {
    let feed = feed().unavailable("a").delay(Duration::from_millis(5));
    let cache = FeedCache::new(&feed, None);
    let a = PackageName::from("a");

    let results = join_all((0..4).map(|_| cache.list_versions(&a))).await;

    assert_eq!(feed.list_calls("a"), 1);
    assert!(results.iter().all(Result::is_err));
    assert!(cache.list_versions(&a).await.is_err());
    assert_eq!(feed.list_calls("a"), 1);
}

#[tokio::test]
async fn resolution_asks_feed_at_most_once_per_key() {
    let feed = MemoryFeed::new()
        .package("p", "1.0", &[("y", ">= 1.0"), ("z", ">= 0.1")])
        .package("p", "2.0", &[("y", ">= 1.0"), ("z", ">= 1.0")])
        .package("y", "1.0", &[])
        .package("z", "0.5", &[])
        .package("z", "1.0", &[("q", ">= 5.0")])
        .package("q", "1.0", &[]);
    let resolver = Resolver::new(feed, SearchConfig::default());

    let (resolution, stats) = resolver.resolve_with_stats(vec![root("p", "*")]).await.unwrap();

    assert!(resolution.is_ok());
    let feed = resolver.feed();
    for name in ["p", "y", "z", "q"] {
        assert_eq!(feed.list_calls(name), 1, "{name} listed more than once");
    }
    // z 1.0 is tried in both branches of p but fetched once
    assert_eq!(feed.fetch_calls("z", "1.0"), 1);
    assert_eq!(stats.cache.manifest_calls, feed.total_fetch_calls());
}

#[tokio::test]
async fn prefetch_disabled_fetches_only_tried_candidates() {
    let config = SearchConfig {
        prefetch: 0,
        ..SearchConfig::default()
    };
    let resolver = Resolver::new(feed(), config);

    let resolution = resolver.resolve(vec![root("a", "*")]).await.unwrap();

    assert!(resolution.is_ok());
    assert_eq!(resolver.feed().fetch_calls("a", "1.0"), 0);
    assert_eq!(resolver.feed().fetch_calls("b", "1.0"), 0);
    assert_eq!(resolver.feed().total_fetch_calls(), 2);
}

#[tokio::test]
async fn manifests_persist_across_runs() {
    let dir = tempfile::tempdir().unwrap();

    let first = Resolver::new(feed(), SearchConfig::default())
        .with_store(ManifestStore::new(dir.path()));
    let (resolution, stats) = first.resolve_with_stats(vec![root("a", "*")]).await.unwrap();
    assert!(resolution.is_ok());
    assert!(stats.cache.manifest_calls > 0);
    assert_eq!(stats.cache.store_hits, 0);

    let store = ManifestStore::new(dir.path());
    assert!(store.get(&PackageName::from("a"), &v("2.0")).is_some());

    let second = Resolver::new(feed(), SearchConfig::default()).with_store(store);
    let (again, stats) = second.resolve_with_stats(vec![root("a", "*")]).await.unwrap();

    assert_eq!(resolution, again);
    assert_eq!(stats.cache.manifest_calls, 0);
    assert_eq!(second.feed().total_fetch_calls(), 0);
    assert!(stats.cache.store_hits > 0);
    // versions are never persisted
    assert_eq!(second.feed().list_calls("a"), 1);
}
