//! Small catalog builder shared by the unit tests.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use musicat_db::entities::{
    album, album_rating, artist, comment, genre, group, playlist, playlist_track, track,
    track_genre, track_rating, user, user::UserRole,
};

use crate::snapshot::CatalogSnapshot;

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

pub struct CatalogBuilder {
    pub snapshot: CatalogSnapshot,
    now: DateTime<Utc>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self {
            snapshot: CatalogSnapshot::default(),
            now: now(),
        }
    }

    fn days_ago(&self, days: i64) -> chrono::DateTime<chrono::FixedOffset> {
        (self.now - Duration::days(days)).fixed_offset()
    }

    pub fn user(&mut self, login: &str, role: UserRole, registered_days_ago: i64) -> Uuid {
        let id = Uuid::new_v4();
        self.snapshot.users.push(user::Model {
            id,
            login: login.to_string(),
            email: format!("{login}@example.com"),
            date_of_birth: None,
            avatar_url: None,
            role,
            registration_date: self.days_ago(registered_days_ago),
        });
        id
    }

    pub fn artist(&mut self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.snapshot.artists.push(artist::Model {
            id,
            name: name.to_string(),
            biography: None,
            avatar_url: None,
        });
        id
    }

    pub fn group(&mut self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.snapshot.groups.push(group::Model {
            id,
            name: name.to_string(),
            description: None,
            photo_url: None,
        });
        id
    }

    pub fn album(
        &mut self,
        name: &str,
        artist_id: Option<Uuid>,
        group_id: Option<Uuid>,
        year: Option<i32>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.snapshot.albums.push(album::Model {
            id,
            name: name.to_string(),
            artist_id,
            group_id,
            release_date: year.and_then(|y| NaiveDate::from_ymd_opt(y, 3, 1)),
            cover_url: None,
            created_at: self.days_ago(100),
        });
        id
    }

    pub fn genre(&mut self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.snapshot.genres.push(genre::Model {
            id,
            name: name.to_string(),
        });
        id
    }

    pub fn track(
        &mut self,
        name: &str,
        album_id: Option<Uuid>,
        plays: i64,
        duration_secs: Option<i32>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.snapshot.tracks.push(track::Model {
            id,
            name: name.to_string(),
            album_id,
            duration_secs,
            file_url: None,
            play_count: plays,
            created_at: self.days_ago(100),
        });
        id
    }

    pub fn tag(&mut self, track_id: Uuid, genre_id: Uuid) {
        self.snapshot
            .track_genres
            .push(track_genre::Model { track_id, genre_id });
    }

    pub fn playlist(&mut self, owner: Uuid, name: &str, created_days_ago: i64) -> Uuid {
        let id = Uuid::new_v4();
        self.snapshot.playlists.push(playlist::Model {
            id,
            user_id: owner,
            name: name.to_string(),
            description: None,
            is_public: true,
            created_at: self.days_ago(created_days_ago),
        });
        id
    }

    pub fn add_to_playlist(&mut self, playlist_id: Uuid, track_id: Uuid) {
        let position = self
            .snapshot
            .playlist_tracks
            .iter()
            .filter(|pt| pt.playlist_id == playlist_id)
            .count() as i32;
        let added_at = self.days_ago(1);
        self.snapshot.playlist_tracks.push(playlist_track::Model {
            playlist_id,
            track_id,
            position,
            added_at,
        });
    }

    pub fn rate_track(&mut self, user_id: Uuid, track_id: Uuid, value: i16) {
        let rated_at = self.days_ago(2);
        self.snapshot.track_ratings.push(track_rating::Model {
            id: Uuid::new_v4(),
            user_id,
            track_id,
            value,
            rated_at,
        });
    }

    pub fn rate_album(&mut self, user_id: Uuid, album_id: Uuid, value: i16) {
        let rated_at = self.days_ago(2);
        self.snapshot.album_ratings.push(album_rating::Model {
            id: Uuid::new_v4(),
            user_id,
            album_id,
            value,
            rated_at,
        });
    }

    pub fn comment(&mut self, user_id: Uuid, track_id: Uuid, created_days_ago: i64) {
        let created_at = self.days_ago(created_days_ago);
        self.snapshot.comments.push(comment::Model {
            id: Uuid::new_v4(),
            user_id,
            track_id,
            text: "nice".to_string(),
            created_at,
        });
    }

    pub fn build(self) -> CatalogSnapshot {
        self.snapshot
    }
}

/// A catalog with something in every section.
pub fn sample_catalog() -> CatalogSnapshot {
    let mut c = CatalogBuilder::new();
    let admin = c.user("root", UserRole::Admin, 400);
    let alice = c.user("alice", UserRole::User, 3);
    let bob = c.user("bob", UserRole::User, 45);

    let miles = c.artist("Miles Davis");
    let quartet = c.group("The Quartet");
    let kind = c.album("Kind of Blue", Some(miles), None, Some(1959));
    let live = c.album("Live at the Club", None, Some(quartet), Some(2021));

    let jazz = c.genre("Jazz");
    c.genre("Polka");

    let so_what = c.track("So What", Some(kind), 50, Some(562));
    let blue = c.track("Blue in Green", Some(kind), 10, Some(337));
    let opener = c.track("Opener", Some(live), 0, None);
    c.tag(so_what, jazz);
    c.tag(blue, jazz);

    c.rate_track(alice, so_what, 5);
    c.rate_track(bob, so_what, 4);
    c.rate_track(bob, blue, 2);
    c.rate_album(alice, kind, 5);

    c.comment(alice, so_what, 1);
    c.comment(bob, so_what, 60);
    c.comment(admin, opener, 10);

    let mix = c.playlist(alice, "Late night", 5);
    c.add_to_playlist(mix, so_what);
    c.add_to_playlist(mix, blue);
    c.playlist(bob, "Empty", 90);

    c.build()
}
