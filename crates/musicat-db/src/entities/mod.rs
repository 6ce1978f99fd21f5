pub mod album;
pub mod album_rating;
pub mod artist;
pub mod artist_group;
pub mod comment;
pub mod genre;
pub mod group;
pub mod playlist;
pub mod playlist_track;
pub mod track;
pub mod track_genre;
pub mod track_rating;
pub mod user;

/// Inclusive bounds of a rating value.
pub const RATING_MIN: i16 = 1;
pub const RATING_MAX: i16 = 5;

/// Whether `value` is an acceptable rating for a track or album.
pub fn is_valid_rating(value: i16) -> bool {
    (RATING_MIN..=RATING_MAX).contains(&value)
}
