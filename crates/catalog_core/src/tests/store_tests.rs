use super::*;
use crate::test_support::{genre, ids, movie};

#[test]
fn starts_empty_and_loading() {
    let store = CollectionStore::new();
    let state = store.snapshot();
    assert!(state.movies.is_empty());
    assert!(state.genres.is_empty());
    assert!(state.loading);
    assert_eq!(state.sort_toggles, SortToggles::default());
    assert!(state.selected_genre.is_none());
    assert!(state.last_error.is_none());
}

#[test]
fn replacements_swap_the_whole_field() {
    let store = CollectionStore::new();
    store.replace_movies(vec![movie(1, None, None), movie(2, None, None)]);
    store.replace_movies(vec![movie(3, None, None)]);
    store.replace_genres(vec![genre("a", "Action")]);
    store.set_loading(false);

    assert_eq!(ids(&store.movies()), vec![3]);
    assert_eq!(store.genres(), vec![genre("a", "Action")]);
    assert!(!store.is_loading());
}

#[test]
fn old_snapshots_are_not_affected_by_later_updates() {
    let store = CollectionStore::new();
    store.replace_movies(vec![movie(1, None, None)]);
    let before = store.snapshot();

    store.replace_movies(vec![movie(2, None, None)]);

    assert_eq!(ids(&before.movies), vec![1]);
    assert_eq!(ids(&store.snapshot().movies), vec![2]);
}

#[test]
fn only_the_latest_ticket_commits() {
    let store = CollectionStore::new();
    let stale = store.begin_movie_fetch();
    let latest = store.begin_movie_fetch();
    assert!(latest.generation() > stale.generation());

    assert!(store.commit_movies(latest, vec![movie(2, None, None)], Some("b".into())));
    assert!(!store.commit_movies(stale, vec![movie(1, None, None)], Some("a".into())));

    let state = store.snapshot();
    assert_eq!(ids(&state.movies), vec![2]);
    assert_eq!(state.selected_genre, Some("b".into()));
    assert!(!state.loading);
}

#[test]
fn stale_commit_leaves_loading_raised_for_the_pending_fetch() {
    let store = CollectionStore::new();
    let stale = store.begin_movie_fetch();
    let _pending = store.begin_movie_fetch();

    assert!(!store.commit_movies(stale, vec![movie(1, None, None)], None));
    assert!(store.is_loading());
}

#[test]
fn failed_fetch_keeps_movies_and_records_error() {
    let store = CollectionStore::new();
    store.replace_movies(vec![movie(1, None, None)]);
    let ticket = store.begin_movie_fetch();

    assert!(store.fail_movies(ticket, "request to /movies failed"));

    let state = store.snapshot();
    assert_eq!(ids(&state.movies), vec![1]);
    assert!(!state.loading);
    assert_eq!(state.last_error.as_deref(), Some("request to /movies failed"));
}

#[test]
fn successful_commit_clears_last_error() {
    let store = CollectionStore::new();
    store.record_error("boom");
    let ticket = store.begin_movie_fetch();
    store.commit_movies(ticket, Vec::new(), None);
    assert!(store.last_error().is_none());
}

#[test]
fn clearing_the_filter_abandons_in_flight_fetches() {
    let store = CollectionStore::new();
    let ticket = store.begin_movie_fetch();
    assert!(store.commit_movies(ticket, vec![movie(1, None, None)], Some("a".into())));

    let in_flight = store.begin_genre_fetch();
    store.clear_genre_filter();

    assert!(!store.commit_movies(in_flight, vec![movie(9, None, None)], Some("b".into())));
    let state = store.snapshot();
    assert_eq!(ids(&state.movies), vec![1]);
    assert!(state.selected_genre.is_none());
    assert!(!state.loading);
}

#[test]
fn clearing_the_filter_keeps_a_pending_catalog_fetch() {
    let store = CollectionStore::new();
    let catalog = store.begin_movie_fetch();
    store.clear_genre_filter();

    assert!(store.is_loading());
    assert!(store.commit_movies(catalog, vec![movie(1, None, None), movie(2, None, None)], None));
    let state = store.snapshot();
    assert_eq!(ids(&state.movies), vec![1, 2]);
    assert!(state.selected_genre.is_none());
    assert!(!state.loading);
}

#[test]
fn genre_fetch_supersedes_a_pending_catalog_fetch() {
    let store = CollectionStore::new();
    let catalog = store.begin_movie_fetch();
    let genre = store.begin_genre_fetch();
    store.clear_genre_filter();

    assert!(!store.commit_movies(genre, vec![movie(7, None, None)], Some("a".into())));
    assert!(!store.commit_movies(catalog, vec![movie(1, None, None)], None));
    assert!(store.movies().is_empty());
    assert!(!store.is_loading());
}

#[test]
fn apply_sort_replaces_movies_and_toggles_together() {
    let store = CollectionStore::new();
    store.replace_movies(vec![
        movie(1, Some(5.0), Some("2020-01-01")),
        movie(2, Some(8.0), Some("2021-01-01")),
    ]);

    assert_eq!(store.apply_sort(SortKey::Rating), Direction::Ascending);
    let state = store.snapshot();
    assert_eq!(ids(&state.movies), vec![2, 1]);
    assert_eq!(state.sort_toggles.rating, Direction::Descending);

    assert_eq!(store.apply_sort(SortKey::Rating), Direction::Descending);
    assert_eq!(ids(&store.movies()), vec![1, 2]);
}

#[tokio::test]
async fn subscribers_observe_each_replacement() {
    let store = CollectionStore::new();
    let mut rx = store.subscribe();

    store.replace_movies(vec![movie(4, None, None)]);
    rx.changed().await.expect("changed");
    assert_eq!(ids(&rx.borrow_and_update().movies), vec![4]);

    let ticket = store.begin_movie_fetch();
    rx.changed().await.expect("changed");
    assert!(rx.borrow_and_update().loading);

    store.commit_movies(ticket, Vec::new(), None);
    rx.changed().await.expect("changed");
    assert!(!rx.borrow_and_update().loading);
}

#[tokio::test]
async fn superseded_commit_does_not_notify_subscribers() {
    let store = CollectionStore::new();
    let stale = store.begin_movie_fetch();
    let _latest = store.begin_movie_fetch();
    let rx = store.subscribe();

    store.commit_movies(stale, vec![movie(1, None, None)], None);
    assert!(!rx.has_changed().expect("sender alive"));
}
