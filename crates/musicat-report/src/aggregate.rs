//! Aggregation engine: ranks a catalog snapshot into report sections.
//!
//! Every ranked section is a bounded top-K list. Ties are broken by display
//! name and then id, so the same snapshot always yields the same bundle.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use chrono::{DateTime, Datelike, Duration, FixedOffset, Utc};
use uuid::Uuid;

use musicat_db::entities::{album, track, user::UserRole};

use crate::clock::Clock;
use crate::error::ReportError;
use crate::sections::{
    AlbumPlaysRow, AlbumRatingRow, AlbumYearRow, CommentedTrackRow, GenreStatsRow,
    PerformerAlbumsRow, PlaylistPopularityRow, ReportBundle, RoleCountRow, Totals,
    TrackDurationRow, TrackPlaysRow, TrackRatingRow, UserActivityRow,
};
use crate::snapshot::{CatalogSnapshot, CatalogSource};

pub const TOP_BY_PLAYS_LIMIT: usize = 20;
pub const TOP_BY_ALBUMS_LIMIT: usize = 20;
pub const RATING_LIMIT: usize = 20;
pub const GENRE_LIMIT: usize = 15;
pub const ACTIVE_USERS_LIMIT: usize = 15;
pub const DURATION_LIMIT: usize = 10;
pub const YEAR_LIMIT: usize = 10;
pub const MOST_COMMENTED_LIMIT: usize = 15;
pub const PLAYLIST_LIMIT: usize = 15;

/// Width of the "new in the last N days" counters.
pub const RECENT_WINDOW_DAYS: i64 = 30;

/// Load the current catalog from `source` and aggregate it.
///
/// A failed read aborts the whole report; there is no partial bundle.
pub async fn generate_report<S, C>(source: &S, clock: &C) -> Result<ReportBundle, ReportError>
where
    S: CatalogSource + ?Sized,
    C: Clock + ?Sized,
{
    let started = Instant::now();
    let snapshot = source.load_snapshot().await.map_err(|e| {
        tracing::error!(error = %e, "failed to load catalog for report");
        ReportError::Database(e)
    })?;

    let bundle = aggregate(&snapshot, clock.now());

    tracing::debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        sections = ?bundle.section_sizes(),
        "report aggregated"
    );

    Ok(bundle)
}

/// Running sum of 1-5 rating values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct RatingTally {
    sum: i64,
    count: i64,
}

impl RatingTally {
    fn add(&mut self, value: i16) {
        self.sum += i64::from(value);
        self.count += 1;
    }

    fn merge(&mut self, other: RatingTally) {
        self.sum += other.sum;
        self.count += other.count;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum as f64 / self.count as f64)
    }
}

/// Lookup tables built once per snapshot.
struct CatalogIndex<'a> {
    albums: HashMap<Uuid, &'a album::Model>,
    artist_names: HashMap<Uuid, &'a str>,
    group_names: HashMap<Uuid, &'a str>,
    user_logins: HashMap<Uuid, &'a str>,
    track_ratings: HashMap<Uuid, RatingTally>,
    album_ratings: HashMap<Uuid, RatingTally>,
    comments_per_track: HashMap<Uuid, i64>,
}

impl<'a> CatalogIndex<'a> {
    fn new(snapshot: &'a CatalogSnapshot) -> Self {
        let mut track_ratings: HashMap<Uuid, RatingTally> = HashMap::new();
        for r in &snapshot.track_ratings {
            track_ratings.entry(r.track_id).or_default().add(r.value);
        }

        let mut album_ratings: HashMap<Uuid, RatingTally> = HashMap::new();
        for r in &snapshot.album_ratings {
            album_ratings.entry(r.album_id).or_default().add(r.value);
        }

        Self {
            albums: snapshot.albums.iter().map(|a| (a.id, a)).collect(),
            artist_names: snapshot
                .artists
                .iter()
                .map(|a| (a.id, a.name.as_str()))
                .collect(),
            group_names: snapshot
                .groups
                .iter()
                .map(|g| (g.id, g.name.as_str()))
                .collect(),
            user_logins: snapshot
                .users
                .iter()
                .map(|u| (u.id, u.login.as_str()))
                .collect(),
            track_ratings,
            album_ratings,
            comments_per_track: count_by(snapshot.comments.iter().map(|c| c.track_id)),
        }
    }

    fn album_name(&self, track: &track::Model) -> Option<String> {
        track
            .album_id
            .and_then(|id| self.albums.get(&id))
            .map(|a| a.name.clone())
    }

    fn performer(&self, album: &album::Model) -> Option<String> {
        album
            .artist_id
            .and_then(|id| self.artist_names.get(&id))
            .or_else(|| album.group_id.and_then(|id| self.group_names.get(&id)))
            .map(|name| name.to_string())
    }
}

fn count_by(keys: impl Iterator<Item = Uuid>) -> HashMap<Uuid, i64> {
    let mut counts = HashMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

/// Sort with `cmp` and keep the first `limit` rows.
fn top_k<T>(mut rows: Vec<T>, limit: usize, cmp: impl FnMut(&T, &T) -> Ordering) -> Vec<T> {
    rows.sort_by(cmp);
    rows.truncate(limit);
    rows
}

fn is_recent(at: &DateTime<FixedOffset>, cutoff: DateTime<Utc>) -> bool {
    at.with_timezone(&Utc) >= cutoff
}

fn len_i64<T>(items: &[T]) -> i64 {
    items.len() as i64
}

/// Rank a snapshot into a [`ReportBundle`]. Pure: same input, same output.
pub fn aggregate(snapshot: &CatalogSnapshot, now: DateTime<Utc>) -> ReportBundle {
    let index = CatalogIndex::new(snapshot);

    let (best_rated_tracks, worst_rated_tracks) = rated_tracks(snapshot, &index);
    let (longest_tracks, shortest_tracks) = tracks_by_duration(snapshot, &index);

    ReportBundle {
        generated_at: now,
        totals: totals(snapshot, now),
        top_tracks_by_plays: top_tracks_by_plays(snapshot, &index),
        top_albums_by_plays: top_albums_by_plays(snapshot, &index),
        top_artists_by_albums: top_performers(
            snapshot.artists.iter().map(|a| (a.id, a.name.as_str())),
            snapshot.albums.iter().filter_map(|a| a.artist_id),
        ),
        top_groups_by_albums: top_performers(
            snapshot.groups.iter().map(|g| (g.id, g.name.as_str())),
            snapshot.albums.iter().filter_map(|a| a.group_id),
        ),
        best_rated_tracks,
        worst_rated_tracks,
        best_rated_albums: best_rated_albums(snapshot, &index),
        genre_statistics: genre_statistics(snapshot, &index),
        most_active_users: most_active_users(snapshot),
        longest_tracks,
        shortest_tracks,
        albums_by_year: albums_by_year(snapshot, &index),
        most_commented_tracks: most_commented_tracks(snapshot, &index),
        users_by_role: users_by_role(snapshot),
        popular_playlists: popular_playlists(snapshot, &index),
    }
}

fn totals(snapshot: &CatalogSnapshot, now: DateTime<Utc>) -> Totals {
    let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);

    Totals {
        users: len_i64(&snapshot.users),
        tracks: len_i64(&snapshot.tracks),
        albums: len_i64(&snapshot.albums),
        artists: len_i64(&snapshot.artists),
        groups: len_i64(&snapshot.groups),
        playlists: len_i64(&snapshot.playlists),
        comments: len_i64(&snapshot.comments),
        track_ratings: len_i64(&snapshot.track_ratings),
        album_ratings: len_i64(&snapshot.album_ratings),
        genres: len_i64(&snapshot.genres),
        new_users_30d: snapshot
            .users
            .iter()
            .filter(|u| is_recent(&u.registration_date, cutoff))
            .count() as i64,
        new_playlists_30d: snapshot
            .playlists
            .iter()
            .filter(|p| is_recent(&p.created_at, cutoff))
            .count() as i64,
        new_comments_30d: snapshot
            .comments
            .iter()
            .filter(|c| is_recent(&c.created_at, cutoff))
            .count() as i64,
    }
}

fn top_tracks_by_plays(snapshot: &CatalogSnapshot, index: &CatalogIndex) -> Vec<TrackPlaysRow> {
    let rows = snapshot
        .tracks
        .iter()
        .map(|t| TrackPlaysRow {
            track_id: t.id,
            track: t.name.clone(),
            album: index.album_name(t),
            play_count: t.play_count,
        })
        .collect();

    top_k(rows, TOP_BY_PLAYS_LIMIT, |a, b| {
        b.play_count
            .cmp(&a.play_count)
            .then_with(|| a.track.cmp(&b.track))
            .then_with(|| a.track_id.cmp(&b.track_id))
    })
}

fn top_albums_by_plays(snapshot: &CatalogSnapshot, index: &CatalogIndex) -> Vec<AlbumPlaysRow> {
    let mut per_album: HashMap<Uuid, (i64, i64)> = HashMap::new();
    for t in &snapshot.tracks {
        if let Some(album_id) = t.album_id {
            let entry = per_album.entry(album_id).or_default();
            entry.0 += 1;
            entry.1 += t.play_count;
        }
    }

    let rows = snapshot
        .albums
        .iter()
        .map(|a| {
            let (track_count, total_plays) = per_album.get(&a.id).copied().unwrap_or_default();
            AlbumPlaysRow {
                album_id: a.id,
                album: a.name.clone(),
                performer: index.performer(a),
                track_count,
                total_plays,
            }
        })
        .collect();

    top_k(rows, TOP_BY_PLAYS_LIMIT, |a, b| {
        b.total_plays
            .cmp(&a.total_plays)
            .then_with(|| a.album.cmp(&b.album))
            .then_with(|| a.album_id.cmp(&b.album_id))
    })
}

fn top_performers<'a>(
    performers: impl Iterator<Item = (Uuid, &'a str)>,
    credited: impl Iterator<Item = Uuid>,
) -> Vec<PerformerAlbumsRow> {
    let counts = count_by(credited);
    let rows = performers
        .map(|(id, name)| PerformerAlbumsRow {
            id,
            name: name.to_string(),
            album_count: counts.get(&id).copied().unwrap_or(0),
        })
        .collect();

    top_k(rows, TOP_BY_ALBUMS_LIMIT, |a, b| {
        b.album_count
            .cmp(&a.album_count)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    })
}

/// Best and worst rated tracks; unrated tracks appear in neither.
fn rated_tracks(
    snapshot: &CatalogSnapshot,
    index: &CatalogIndex,
) -> (Vec<TrackRatingRow>, Vec<TrackRatingRow>) {
    let rated: Vec<TrackRatingRow> = snapshot
        .tracks
        .iter()
        .filter_map(|t| {
            let tally = index.track_ratings.get(&t.id)?;
            Some(TrackRatingRow {
                track_id: t.id,
                track: t.name.clone(),
                album: index.album_name(t),
                average: tally.mean()?,
                rating_count: tally.count,
            })
        })
        .collect();

    let best = top_k(rated.clone(), RATING_LIMIT, |a, b| {
        b.average
            .total_cmp(&a.average)
            .then_with(|| b.rating_count.cmp(&a.rating_count))
            .then_with(|| a.track.cmp(&b.track))
            .then_with(|| a.track_id.cmp(&b.track_id))
    });
    let worst = top_k(rated, RATING_LIMIT, |a, b| {
        a.average
            .total_cmp(&b.average)
            .then_with(|| b.rating_count.cmp(&a.rating_count))
            .then_with(|| a.track.cmp(&b.track))
            .then_with(|| a.track_id.cmp(&b.track_id))
    });

    (best, worst)
}

fn best_rated_albums(snapshot: &CatalogSnapshot, index: &CatalogIndex) -> Vec<AlbumRatingRow> {
    let rows = snapshot
        .albums
        .iter()
        .filter_map(|a| {
            let tally = index.album_ratings.get(&a.id)?;
            Some(AlbumRatingRow {
                album_id: a.id,
                album: a.name.clone(),
                performer: index.performer(a),
                average: tally.mean()?,
                rating_count: tally.count,
            })
        })
        .collect();

    top_k(rows, RATING_LIMIT, |a, b| {
        b.average
            .total_cmp(&a.average)
            .then_with(|| b.rating_count.cmp(&a.rating_count))
            .then_with(|| a.album.cmp(&b.album))
            .then_with(|| a.album_id.cmp(&b.album_id))
    })
}

/// Track count and mean track rating per genre. A genre without tracks or
/// without ratings still gets a row, with no mean.
fn genre_statistics(snapshot: &CatalogSnapshot, index: &CatalogIndex) -> Vec<GenreStatsRow> {
    let mut per_genre: HashMap<Uuid, (i64, RatingTally)> = HashMap::new();
    for tg in &snapshot.track_genres {
        let entry = per_genre.entry(tg.genre_id).or_default();
        entry.0 += 1;
        if let Some(tally) = index.track_ratings.get(&tg.track_id) {
            entry.1.merge(*tally);
        }
    }

    let rows = snapshot
        .genres
        .iter()
        .map(|g| {
            let (track_count, tally) = per_genre.get(&g.id).copied().unwrap_or_default();
            GenreStatsRow {
                genre_id: g.id,
                genre: g.name.clone(),
                track_count,
                average_rating: tally.mean(),
            }
        })
        .collect();

    top_k(rows, GENRE_LIMIT, |a, b| {
        b.track_count
            .cmp(&a.track_count)
            .then_with(|| a.genre.cmp(&b.genre))
            .then_with(|| a.genre_id.cmp(&b.genre_id))
    })
}

fn most_active_users(snapshot: &CatalogSnapshot) -> Vec<UserActivityRow> {
    let playlists = count_by(snapshot.playlists.iter().map(|p| p.user_id));
    let comments = count_by(snapshot.comments.iter().map(|c| c.user_id));
    let ratings = count_by(
        snapshot
            .track_ratings
            .iter()
            .map(|r| r.user_id)
            .chain(snapshot.album_ratings.iter().map(|r| r.user_id)),
    );

    let rows = snapshot
        .users
        .iter()
        .map(|u| UserActivityRow {
            user_id: u.id,
            login: u.login.clone(),
            playlist_count: playlists.get(&u.id).copied().unwrap_or(0),
            comment_count: comments.get(&u.id).copied().unwrap_or(0),
            rating_count: ratings.get(&u.id).copied().unwrap_or(0),
        })
        .collect();

    top_k(rows, ACTIVE_USERS_LIMIT, |a, b| {
        b.playlist_count
            .cmp(&a.playlist_count)
            .then_with(|| a.login.cmp(&b.login))
            .then_with(|| a.user_id.cmp(&b.user_id))
    })
}

/// Longest and shortest tracks; tracks with unknown duration are skipped.
fn tracks_by_duration(
    snapshot: &CatalogSnapshot,
    index: &CatalogIndex,
) -> (Vec<TrackDurationRow>, Vec<TrackDurationRow>) {
    let timed: Vec<TrackDurationRow> = snapshot
        .tracks
        .iter()
        .filter_map(|t| {
            Some(TrackDurationRow {
                track_id: t.id,
                track: t.name.clone(),
                album: index.album_name(t),
                duration_secs: t.duration_secs?,
            })
        })
        .collect();

    let longest = top_k(timed.clone(), DURATION_LIMIT, |a, b| {
        b.duration_secs
            .cmp(&a.duration_secs)
            .then_with(|| a.track.cmp(&b.track))
            .then_with(|| a.track_id.cmp(&b.track_id))
    });
    let shortest = top_k(timed, DURATION_LIMIT, |a, b| {
        a.duration_secs
            .cmp(&b.duration_secs)
            .then_with(|| a.track.cmp(&b.track))
            .then_with(|| a.track_id.cmp(&b.track_id))
    });

    (longest, shortest)
}

/// Most recently released albums; undated albums are skipped.
fn albums_by_year(snapshot: &CatalogSnapshot, index: &CatalogIndex) -> Vec<AlbumYearRow> {
    let dated = snapshot
        .albums
        .iter()
        .filter_map(|a| {
            Some(AlbumYearRow {
                album_id: a.id,
                album: a.name.clone(),
                performer: index.performer(a),
                year: a.release_date?.year(),
            })
        })
        .collect();

    top_k(dated, YEAR_LIMIT, |a, b| {
        b.year
            .cmp(&a.year)
            .then_with(|| a.album.cmp(&b.album))
            .then_with(|| a.album_id.cmp(&b.album_id))
    })
}

fn most_commented_tracks(
    snapshot: &CatalogSnapshot,
    index: &CatalogIndex,
) -> Vec<CommentedTrackRow> {
    let rows = snapshot
        .tracks
        .iter()
        .filter_map(|t| {
            let comment_count = index.comments_per_track.get(&t.id).copied()?;
            Some(CommentedTrackRow {
                track_id: t.id,
                track: t.name.clone(),
                album: index.album_name(t),
                comment_count,
            })
        })
        .collect();

    top_k(rows, MOST_COMMENTED_LIMIT, |a, b| {
        b.comment_count
            .cmp(&a.comment_count)
            .then_with(|| a.track.cmp(&b.track))
            .then_with(|| a.track_id.cmp(&b.track_id))
    })
}

fn users_by_role(snapshot: &CatalogSnapshot) -> Vec<RoleCountRow> {
    let mut per_role: BTreeMap<UserRole, i64> = BTreeMap::new();
    for u in &snapshot.users {
        *per_role.entry(u.role).or_insert(0) += 1;
    }

    let mut rows: Vec<RoleCountRow> = per_role
        .into_iter()
        .map(|(role, user_count)| RoleCountRow { role, user_count })
        .collect();
    rows.sort_by(|a, b| b.user_count.cmp(&a.user_count).then_with(|| a.role.cmp(&b.role)));
    rows
}

fn popular_playlists(
    snapshot: &CatalogSnapshot,
    index: &CatalogIndex,
) -> Vec<PlaylistPopularityRow> {
    let track_counts = count_by(snapshot.playlist_tracks.iter().map(|pt| pt.playlist_id));

    let rows = snapshot
        .playlists
        .iter()
        .map(|p| PlaylistPopularityRow {
            playlist_id: p.id,
            playlist: p.name.clone(),
            owner: index
                .user_logins
                .get(&p.user_id)
                .map(|login| login.to_string())
                .unwrap_or_default(),
            track_count: track_counts.get(&p.id).copied().unwrap_or(0),
        })
        .collect();

    top_k(rows, PLAYLIST_LIMIT, |a, b| {
        b.track_count
            .cmp(&a.track_count)
            .then_with(|| a.playlist.cmp(&b.playlist))
            .then_with(|| a.playlist_id.cmp(&b.playlist_id))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::fixtures::{now, sample_catalog, CatalogBuilder};
    use sea_orm::DbErr;

    #[test]
    fn test_tracks_ranked_by_plays() {
        let bundle = aggregate(&sample_catalog(), now());
        let plays: Vec<i64> = bundle
            .top_tracks_by_plays
            .iter()
            .map(|r| r.play_count)
            .collect();
        assert_eq!(plays, vec![50, 10, 0]);
        assert_eq!(bundle.top_tracks_by_plays[0].track, "So What");
        assert_eq!(
            bundle.top_tracks_by_plays[0].album.as_deref(),
            Some("Kind of Blue")
        );
    }

    #[test]
    fn test_play_ties_break_by_name() {
        let mut c = CatalogBuilder::new();
        c.track("Zulu", None, 7, None);
        c.track("Alpha", None, 7, None);
        c.track("Mike", None, 9, None);
        let bundle = aggregate(&c.build(), now());

        let names: Vec<&str> = bundle
            .top_tracks_by_plays
            .iter()
            .map(|r| r.track.as_str())
            .collect();
        assert_eq!(names, vec!["Mike", "Alpha", "Zulu"]);
    }

    #[test]
    fn test_top_lists_are_bounded() {
        let mut c = CatalogBuilder::new();
        let u = c.user("rater", UserRole::User, 1);
        for i in 0..30 {
            let t = c.track(&format!("Track {i:02}"), None, i, Some(100 + i as i32));
            c.rate_track(u, t, (i % 5 + 1) as i16);
        }
        let bundle = aggregate(&c.build(), now());

        assert_eq!(bundle.top_tracks_by_plays.len(), TOP_BY_PLAYS_LIMIT);
        assert_eq!(bundle.best_rated_tracks.len(), RATING_LIMIT);
        assert_eq!(bundle.worst_rated_tracks.len(), RATING_LIMIT);
        assert_eq!(bundle.longest_tracks.len(), DURATION_LIMIT);
        assert_eq!(bundle.shortest_tracks.len(), DURATION_LIMIT);
        assert_eq!(bundle.top_tracks_by_plays[0].play_count, 29);
        assert_eq!(bundle.longest_tracks[0].duration_secs, 129);
        assert_eq!(bundle.shortest_tracks[0].duration_secs, 100);
    }

    #[test]
    fn test_unrated_tracks_excluded_from_rating_sections() {
        let bundle = aggregate(&sample_catalog(), now());

        assert_eq!(bundle.best_rated_tracks.len(), 2);
        assert!(bundle.best_rated_tracks.iter().all(|r| r.track != "Opener"));
        assert_eq!(bundle.best_rated_tracks[0].track, "So What");
        assert_eq!(bundle.best_rated_tracks[0].average, 4.5);
        assert_eq!(bundle.best_rated_tracks[0].rating_count, 2);
        assert_eq!(bundle.worst_rated_tracks[0].track, "Blue in Green");
        assert_eq!(bundle.worst_rated_tracks[0].average, 2.0);
    }

    #[test]
    fn test_equal_means_prefer_more_ratings() {
        let mut c = CatalogBuilder::new();
        let a = c.user("a", UserRole::User, 1);
        let b = c.user("b", UserRole::User, 1);
        let once = c.track("Once", None, 0, None);
        let twice = c.track("Twice", None, 0, None);
        c.rate_track(a, once, 4);
        c.rate_track(a, twice, 4);
        c.rate_track(b, twice, 4);
        let bundle = aggregate(&c.build(), now());

        assert_eq!(bundle.best_rated_tracks[0].track, "Twice");
        assert_eq!(bundle.worst_rated_tracks[0].track, "Twice");
    }

    #[test]
    fn test_album_sections() {
        let bundle = aggregate(&sample_catalog(), now());

        let top = &bundle.top_albums_by_plays[0];
        assert_eq!(top.album, "Kind of Blue");
        assert_eq!(top.performer.as_deref(), Some("Miles Davis"));
        assert_eq!(top.track_count, 2);
        assert_eq!(top.total_plays, 60);
        // Group-credited albums fall back to the group name.
        assert_eq!(
            bundle.top_albums_by_plays[1].performer.as_deref(),
            Some("The Quartet")
        );

        assert_eq!(bundle.best_rated_albums.len(), 1);
        assert_eq!(bundle.best_rated_albums[0].average, 5.0);

        assert_eq!(bundle.top_artists_by_albums[0].name, "Miles Davis");
        assert_eq!(bundle.top_artists_by_albums[0].album_count, 1);
        assert_eq!(bundle.top_groups_by_albums[0].name, "The Quartet");
    }

    #[test]
    fn test_albums_by_year_skips_unknown_dates() {
        let mut c = CatalogBuilder::new();
        for year in 2000..2015 {
            c.album(&format!("Album {year}"), None, None, Some(year));
        }
        c.album("Another 2014", None, None, Some(2014));
        c.album("Undated", None, None, None);
        let bundle = aggregate(&c.build(), now());

        let rows = &bundle.albums_by_year;
        assert_eq!(rows.len(), YEAR_LIMIT);
        assert!(rows.iter().all(|r| r.album != "Undated"));
        // Same year: name order.
        assert_eq!((rows[0].year, rows[0].album.as_str()), (2014, "Album 2014"));
        assert_eq!((rows[1].year, rows[1].album.as_str()), (2014, "Another 2014"));
        assert_eq!(rows[9].year, 2006);
        assert!(rows.windows(2).all(|w| w[0].year >= w[1].year));
    }

    #[test]
    fn test_albums_by_year_names_performer() {
        let bundle = aggregate(&sample_catalog(), now());
        let years: Vec<(i32, Option<&str>)> = bundle
            .albums_by_year
            .iter()
            .map(|r| (r.year, r.performer.as_deref()))
            .collect();
        assert_eq!(
            years,
            vec![(2021, Some("The Quartet")), (1959, Some("Miles Davis"))]
        );
    }

    #[test]
    fn test_genre_statistics() {
        let bundle = aggregate(&sample_catalog(), now());

        assert_eq!(bundle.genre_statistics.len(), 2);
        let jazz = &bundle.genre_statistics[0];
        assert_eq!(jazz.genre, "Jazz");
        assert_eq!(jazz.track_count, 2);
        // (5 + 4 + 2) / 3
        assert!((jazz.average_rating.unwrap() - 11.0 / 3.0).abs() < 1e-9);

        let polka = &bundle.genre_statistics[1];
        assert_eq!(polka.track_count, 0);
        assert_eq!(polka.average_rating, None);
    }

    #[test]
    fn test_user_activity_and_roles() {
        let bundle = aggregate(&sample_catalog(), now());

        let alice = bundle
            .most_active_users
            .iter()
            .find(|u| u.login == "alice")
            .unwrap();
        assert_eq!(alice.playlist_count, 1);
        assert_eq!(alice.comment_count, 1);
        assert_eq!(alice.rating_count, 2);
        // alice and bob tie on one playlist each; name order decides.
        assert_eq!(bundle.most_active_users[0].login, "alice");
        assert_eq!(bundle.most_active_users[1].login, "bob");

        assert_eq!(
            bundle.users_by_role,
            vec![
                RoleCountRow {
                    role: UserRole::User,
                    user_count: 2
                },
                RoleCountRow {
                    role: UserRole::Admin,
                    user_count: 1
                },
            ]
        );
    }

    #[test]
    fn test_comments_and_playlists() {
        let bundle = aggregate(&sample_catalog(), now());

        let commented: Vec<(&str, i64)> = bundle
            .most_commented_tracks
            .iter()
            .map(|r| (r.track.as_str(), r.comment_count))
            .collect();
        assert_eq!(commented, vec![("So What", 2), ("Opener", 1)]);

        assert_eq!(bundle.popular_playlists[0].playlist, "Late night");
        assert_eq!(bundle.popular_playlists[0].owner, "alice");
        assert_eq!(bundle.popular_playlists[0].track_count, 2);
        assert_eq!(bundle.popular_playlists[1].track_count, 0);
    }

    #[test]
    fn test_totals_and_recent_window() {
        let bundle = aggregate(&sample_catalog(), now());
        let totals = &bundle.totals;

        assert_eq!(totals.users, 3);
        assert_eq!(totals.tracks, 3);
        assert_eq!(totals.albums, 2);
        assert_eq!(totals.artists, 1);
        assert_eq!(totals.groups, 1);
        assert_eq!(totals.genres, 2);
        assert_eq!(totals.track_ratings, 3);
        assert_eq!(totals.album_ratings, 1);
        assert_eq!(totals.comments, 3);
        assert_eq!(totals.new_users_30d, 1);
        assert_eq!(totals.new_playlists_30d, 1);
        assert_eq!(totals.new_comments_30d, 2);
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let mut c = CatalogBuilder::new();
        c.user("edge", UserRole::User, RECENT_WINDOW_DAYS);
        c.user("old", UserRole::User, RECENT_WINDOW_DAYS + 1);
        let bundle = aggregate(&c.build(), now());
        assert_eq!(bundle.totals.new_users_30d, 1);
    }

    #[test]
    fn test_empty_catalog() {
        let bundle = aggregate(&CatalogSnapshot::default(), now());
        assert_eq!(bundle.totals, Totals::default());
        assert!(bundle.top_tracks_by_plays.is_empty());
        assert!(bundle.users_by_role.is_empty());
        assert_eq!(bundle.generated_at, now());
    }

    #[tokio::test]
    async fn test_generate_report_is_repeatable() {
        let snapshot = sample_catalog();
        let clock = FixedClock(now());

        let first = generate_report(&snapshot, &clock).await.unwrap();
        let second = generate_report(&snapshot, &clock).await.unwrap();
        assert_eq!(first, second);
    }

    struct FailingSource;

    #[async_trait::async_trait]
    impl CatalogSource for FailingSource {
        async fn load_snapshot(&self) -> Result<CatalogSnapshot, DbErr> {
            Err(DbErr::Custom("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_generate_report_propagates_read_failure() {
        let err = generate_report(&FailingSource, &FixedClock(now()))
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Database(_)));
    }
}
