//! Typed report sections.
//!
//! Each section row implements [`ReportRow`] with a fixed column count, so the
//! header a renderer writes and the cells it receives can never disagree.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use musicat_db::entities::user::UserRole;

/// A single rendered value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Cell {
    Text(String),
    Integer(i64),
    /// Mean rating; `None` when nothing was rated.
    Rating(Option<f64>),
}

impl Cell {
    pub fn display(&self) -> String {
        match self {
            Cell::Text(text) => text.clone(),
            Cell::Integer(n) => n.to_string(),
            Cell::Rating(Some(avg)) => format!("{avg:.2}"),
            Cell::Rating(None) => "n/a".to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::Text(text.to_string())
    }
}

impl From<Option<&String>> for Cell {
    fn from(text: Option<&String>) -> Self {
        Cell::Text(text.cloned().unwrap_or_default())
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Integer(n)
    }
}

/// One row of a section with exactly `N` columns.
pub trait ReportRow<const N: usize> {
    const COLUMNS: [&'static str; N];

    fn cells(&self) -> [Cell; N];
}

/// Title shown in documents and the (31-char max) worksheet name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionInfo {
    pub title: &'static str,
    pub sheet: &'static str,
}

pub const GENERAL_STATISTICS: SectionInfo = SectionInfo {
    title: "General statistics",
    sheet: "General statistics",
};
pub const TOP_TRACKS_BY_PLAYS: SectionInfo = SectionInfo {
    title: "Top 20 tracks by plays",
    sheet: "Top tracks",
};
pub const TOP_ALBUMS_BY_PLAYS: SectionInfo = SectionInfo {
    title: "Top 20 albums by plays",
    sheet: "Top albums",
};
pub const TOP_ARTISTS_BY_ALBUMS: SectionInfo = SectionInfo {
    title: "Top 20 artists by album count",
    sheet: "Top artists",
};
pub const TOP_GROUPS_BY_ALBUMS: SectionInfo = SectionInfo {
    title: "Top 20 groups by album count",
    sheet: "Top groups",
};
pub const BEST_RATED_TRACKS: SectionInfo = SectionInfo {
    title: "Best rated tracks",
    sheet: "Best tracks",
};
pub const WORST_RATED_TRACKS: SectionInfo = SectionInfo {
    title: "Worst rated tracks",
    sheet: "Worst tracks",
};
pub const BEST_RATED_ALBUMS: SectionInfo = SectionInfo {
    title: "Best rated albums",
    sheet: "Best albums",
};
pub const GENRE_STATISTICS: SectionInfo = SectionInfo {
    title: "Genre statistics",
    sheet: "Genres",
};
pub const MOST_ACTIVE_USERS: SectionInfo = SectionInfo {
    title: "Most active users",
    sheet: "Active users",
};
pub const LONGEST_TRACKS: SectionInfo = SectionInfo {
    title: "Longest tracks",
    sheet: "Longest tracks",
};
pub const SHORTEST_TRACKS: SectionInfo = SectionInfo {
    title: "Shortest tracks",
    sheet: "Shortest tracks",
};
pub const ALBUMS_BY_YEAR: SectionInfo = SectionInfo {
    title: "Albums by release year",
    sheet: "Albums by year",
};
pub const MOST_COMMENTED_TRACKS: SectionInfo = SectionInfo {
    title: "Most commented tracks",
    sheet: "Most commented",
};
pub const USERS_BY_ROLE: SectionInfo = SectionInfo {
    title: "Users by role",
    sheet: "Users by role",
};
pub const POPULAR_PLAYLISTS: SectionInfo = SectionInfo {
    title: "Popular playlists",
    sheet: "Popular playlists",
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticRow {
    pub metric: &'static str,
    pub value: i64,
}

impl ReportRow<2> for StatisticRow {
    const COLUMNS: [&'static str; 2] = ["Metric", "Value"];

    fn cells(&self) -> [Cell; 2] {
        [self.metric.into(), self.value.into()]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackPlaysRow {
    pub track_id: Uuid,
    pub track: String,
    pub album: Option<String>,
    pub play_count: i64,
}

impl ReportRow<3> for TrackPlaysRow {
    const COLUMNS: [&'static str; 3] = ["Track", "Album", "Plays"];

    fn cells(&self) -> [Cell; 3] {
        [
            self.track.as_str().into(),
            self.album.as_ref().into(),
            self.play_count.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlbumPlaysRow {
    pub album_id: Uuid,
    pub album: String,
    /// Artist name, or the group's when the album has no artist.
    pub performer: Option<String>,
    pub track_count: i64,
    pub total_plays: i64,
}

impl ReportRow<4> for AlbumPlaysRow {
    const COLUMNS: [&'static str; 4] = ["Album", "Performer", "Tracks", "Total plays"];

    fn cells(&self) -> [Cell; 4] {
        [
            self.album.as_str().into(),
            self.performer.as_ref().into(),
            self.track_count.into(),
            self.total_plays.into(),
        ]
    }
}

/// Artist or group with the number of albums credited to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformerAlbumsRow {
    pub id: Uuid,
    pub name: String,
    pub album_count: i64,
}

impl ReportRow<2> for PerformerAlbumsRow {
    const COLUMNS: [&'static str; 2] = ["Name", "Albums"];

    fn cells(&self) -> [Cell; 2] {
        [self.name.as_str().into(), self.album_count.into()]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackRatingRow {
    pub track_id: Uuid,
    pub track: String,
    pub album: Option<String>,
    pub average: f64,
    pub rating_count: i64,
}

impl ReportRow<4> for TrackRatingRow {
    const COLUMNS: [&'static str; 4] = ["Track", "Album", "Average rating", "Ratings"];

    fn cells(&self) -> [Cell; 4] {
        [
            self.track.as_str().into(),
            self.album.as_ref().into(),
            Cell::Rating(Some(self.average)),
            self.rating_count.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlbumRatingRow {
    pub album_id: Uuid,
    pub album: String,
    pub performer: Option<String>,
    pub average: f64,
    pub rating_count: i64,
}

impl ReportRow<4> for AlbumRatingRow {
    const COLUMNS: [&'static str; 4] = ["Album", "Performer", "Average rating", "Ratings"];

    fn cells(&self) -> [Cell; 4] {
        [
            self.album.as_str().into(),
            self.performer.as_ref().into(),
            Cell::Rating(Some(self.average)),
            self.rating_count.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreStatsRow {
    pub genre_id: Uuid,
    pub genre: String,
    pub track_count: i64,
    pub average_rating: Option<f64>,
}

impl ReportRow<3> for GenreStatsRow {
    const COLUMNS: [&'static str; 3] = ["Genre", "Tracks", "Average rating"];

    fn cells(&self) -> [Cell; 3] {
        [
            self.genre.as_str().into(),
            self.track_count.into(),
            Cell::Rating(self.average_rating),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserActivityRow {
    pub user_id: Uuid,
    pub login: String,
    pub playlist_count: i64,
    pub comment_count: i64,
    /// Track and album ratings combined.
    pub rating_count: i64,
}

impl ReportRow<4> for UserActivityRow {
    const COLUMNS: [&'static str; 4] = ["User", "Playlists", "Comments", "Ratings"];

    fn cells(&self) -> [Cell; 4] {
        [
            self.login.as_str().into(),
            self.playlist_count.into(),
            self.comment_count.into(),
            self.rating_count.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackDurationRow {
    pub track_id: Uuid,
    pub track: String,
    pub album: Option<String>,
    pub duration_secs: i32,
}

impl ReportRow<4> for TrackDurationRow {
    const COLUMNS: [&'static str; 4] = ["Track", "Album", "Duration", "Seconds"];

    fn cells(&self) -> [Cell; 4] {
        [
            self.track.as_str().into(),
            self.album.as_ref().into(),
            Cell::Text(format_duration(self.duration_secs)),
            i64::from(self.duration_secs).into(),
        ]
    }
}

/// A dated album, listed by release year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlbumYearRow {
    pub album_id: Uuid,
    pub album: String,
    pub performer: Option<String>,
    pub year: i32,
}

impl ReportRow<3> for AlbumYearRow {
    const COLUMNS: [&'static str; 3] = ["Year", "Album", "Performer"];

    fn cells(&self) -> [Cell; 3] {
        [
            i64::from(self.year).into(),
            self.album.as_str().into(),
            self.performer.as_ref().into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentedTrackRow {
    pub track_id: Uuid,
    pub track: String,
    pub album: Option<String>,
    pub comment_count: i64,
}

impl ReportRow<3> for CommentedTrackRow {
    const COLUMNS: [&'static str; 3] = ["Track", "Album", "Comments"];

    fn cells(&self) -> [Cell; 3] {
        [
            self.track.as_str().into(),
            self.album.as_ref().into(),
            self.comment_count.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleCountRow {
    pub role: UserRole,
    pub user_count: i64,
}

impl ReportRow<2> for RoleCountRow {
    const COLUMNS: [&'static str; 2] = ["Role", "Users"];

    fn cells(&self) -> [Cell; 2] {
        [self.role.as_str().into(), self.user_count.into()]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaylistPopularityRow {
    pub playlist_id: Uuid,
    pub playlist: String,
    pub owner: String,
    pub track_count: i64,
}

impl ReportRow<3> for PlaylistPopularityRow {
    const COLUMNS: [&'static str; 3] = ["Playlist", "Owner", "Tracks"];

    fn cells(&self) -> [Cell; 3] {
        [
            self.playlist.as_str().into(),
            self.owner.as_str().into(),
            self.track_count.into(),
        ]
    }
}

/// Whole-catalog counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    pub users: i64,
    pub tracks: i64,
    pub albums: i64,
    pub artists: i64,
    pub groups: i64,
    pub playlists: i64,
    pub comments: i64,
    pub track_ratings: i64,
    pub album_ratings: i64,
    pub genres: i64,
    pub new_users_30d: i64,
    pub new_playlists_30d: i64,
    pub new_comments_30d: i64,
}

impl Totals {
    pub fn rows(&self) -> Vec<StatisticRow> {
        [
            ("Users", self.users),
            ("Tracks", self.tracks),
            ("Albums", self.albums),
            ("Artists", self.artists),
            ("Groups", self.groups),
            ("Playlists", self.playlists),
            ("Comments", self.comments),
            ("Track ratings", self.track_ratings),
            ("Album ratings", self.album_ratings),
            ("Genres", self.genres),
            ("New users (30 days)", self.new_users_30d),
            ("New playlists (30 days)", self.new_playlists_30d),
            ("New comments (30 days)", self.new_comments_30d),
        ]
        .into_iter()
        .map(|(metric, value)| StatisticRow { metric, value })
        .collect()
    }
}

/// Everything one report run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportBundle {
    pub generated_at: DateTime<Utc>,
    pub totals: Totals,
    pub top_tracks_by_plays: Vec<TrackPlaysRow>,
    pub top_albums_by_plays: Vec<AlbumPlaysRow>,
    pub top_artists_by_albums: Vec<PerformerAlbumsRow>,
    pub top_groups_by_albums: Vec<PerformerAlbumsRow>,
    pub best_rated_tracks: Vec<TrackRatingRow>,
    pub worst_rated_tracks: Vec<TrackRatingRow>,
    pub best_rated_albums: Vec<AlbumRatingRow>,
    pub genre_statistics: Vec<GenreStatsRow>,
    pub most_active_users: Vec<UserActivityRow>,
    pub longest_tracks: Vec<TrackDurationRow>,
    pub shortest_tracks: Vec<TrackDurationRow>,
    pub albums_by_year: Vec<AlbumYearRow>,
    pub most_commented_tracks: Vec<CommentedTrackRow>,
    pub users_by_role: Vec<RoleCountRow>,
    pub popular_playlists: Vec<PlaylistPopularityRow>,
}

/// Receives the sections of a bundle in report order.
pub trait SectionSink {
    type Error;

    fn section<R, const N: usize>(
        &mut self,
        info: &SectionInfo,
        rows: &[R],
    ) -> Result<(), Self::Error>
    where
        R: ReportRow<N>;
}

impl ReportBundle {
    /// Feed every section, general statistics first, to `sink`.
    pub fn write_sections<S: SectionSink>(&self, sink: &mut S) -> Result<(), S::Error> {
        sink.section(&GENERAL_STATISTICS, &self.totals.rows())?;
        sink.section(&TOP_TRACKS_BY_PLAYS, &self.top_tracks_by_plays)?;
        sink.section(&TOP_ALBUMS_BY_PLAYS, &self.top_albums_by_plays)?;
        sink.section(&TOP_ARTISTS_BY_ALBUMS, &self.top_artists_by_albums)?;
        sink.section(&TOP_GROUPS_BY_ALBUMS, &self.top_groups_by_albums)?;
        sink.section(&BEST_RATED_TRACKS, &self.best_rated_tracks)?;
        sink.section(&WORST_RATED_TRACKS, &self.worst_rated_tracks)?;
        sink.section(&BEST_RATED_ALBUMS, &self.best_rated_albums)?;
        sink.section(&GENRE_STATISTICS, &self.genre_statistics)?;
        sink.section(&MOST_ACTIVE_USERS, &self.most_active_users)?;
        sink.section(&LONGEST_TRACKS, &self.longest_tracks)?;
        sink.section(&SHORTEST_TRACKS, &self.shortest_tracks)?;
        sink.section(&ALBUMS_BY_YEAR, &self.albums_by_year)?;
        sink.section(&MOST_COMMENTED_TRACKS, &self.most_commented_tracks)?;
        sink.section(&USERS_BY_ROLE, &self.users_by_role)?;
        sink.section(&POPULAR_PLAYLISTS, &self.popular_playlists)?;
        Ok(())
    }

    /// `(section title, row count)` pairs, for logging.
    pub fn section_sizes(&self) -> Vec<(&'static str, usize)> {
        let mut counter = SizeCounter(Vec::new());
        match self.write_sections(&mut counter) {
            Ok(()) => counter.0,
            Err(never) => match never {},
        }
    }
}

struct SizeCounter(Vec<(&'static str, usize)>);

impl SectionSink for SizeCounter {
    type Error = std::convert::Infallible;

    fn section<R, const N: usize>(
        &mut self,
        info: &SectionInfo,
        rows: &[R],
    ) -> Result<(), Self::Error>
    where
        R: ReportRow<N>,
    {
        self.0.push((info.title, rows.len()));
        Ok(())
    }
}

/// `m:ss`, or `h:mm:ss` from one hour up.
pub fn format_duration(secs: i32) -> String {
    let secs = secs.max(0);
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_bundle() -> ReportBundle {
        ReportBundle {
            generated_at: Utc::now(),
            totals: Totals::default(),
            top_tracks_by_plays: vec![],
            top_albums_by_plays: vec![],
            top_artists_by_albums: vec![],
            top_groups_by_albums: vec![],
            best_rated_tracks: vec![],
            worst_rated_tracks: vec![],
            best_rated_albums: vec![],
            genre_statistics: vec![],
            most_active_users: vec![],
            longest_tracks: vec![],
            shortest_tracks: vec![],
            albums_by_year: vec![],
            most_commented_tracks: vec![],
            users_by_role: vec![],
            popular_playlists: vec![],
        }
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Text("Abbey Road".into()).display(), "Abbey Road");
        assert_eq!(Cell::Integer(42).display(), "42");
        assert_eq!(Cell::Rating(Some(4.0)).display(), "4.00");
        assert_eq!(Cell::Rating(Some(10.0 / 3.0)).display(), "3.33");
        assert_eq!(Cell::Rating(None).display(), "n/a");
    }

    #[test]
    fn test_missing_album_renders_as_empty_text() {
        let row = TrackPlaysRow {
            track_id: Uuid::new_v4(),
            track: "Loose single".into(),
            album: None,
            play_count: 3,
        };
        assert_eq!(row.cells()[1], Cell::Text(String::new()));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(205), "3:25");
        assert_eq!(format_duration(3600), "1:00:00");
        assert_eq!(format_duration(3725), "1:02:05");
        assert_eq!(format_duration(-4), "0:00");
    }

    #[test]
    fn test_totals_rows_order() {
        let totals = Totals {
            users: 3,
            new_comments_30d: 9,
            ..Default::default()
        };
        let rows = totals.rows();
        assert_eq!(rows.len(), 13);
        assert_eq!(rows[0], StatisticRow { metric: "Users", value: 3 });
        assert_eq!(rows[12].metric, "New comments (30 days)");
        assert_eq!(rows[12].value, 9);
    }

    #[test]
    fn test_sections_come_in_report_order() {
        let sizes = empty_bundle().section_sizes();
        let titles: Vec<&str> = sizes.iter().map(|(t, _)| *t).collect();
        assert_eq!(titles.len(), 16);
        assert_eq!(titles[0], "General statistics");
        assert_eq!(titles[1], "Top 20 tracks by plays");
        assert_eq!(titles[15], "Popular playlists");
        // General statistics always has its fixed metric rows.
        assert_eq!(sizes[0].1, 13);
        assert!(sizes[1..].iter().all(|(_, n)| *n == 0));
    }

    #[test]
    fn test_sheet_names_fit_workbook_limits() {
        let mut names = Vec::new();
        struct Names<'a>(&'a mut Vec<&'static str>);
        impl SectionSink for Names<'_> {
            type Error = ();
            fn section<R, const N: usize>(
                &mut self,
                info: &SectionInfo,
                _rows: &[R],
            ) -> Result<(), ()>
            where
                R: ReportRow<N>,
            {
                self.0.push(info.sheet);
                Ok(())
            }
        }
        empty_bundle().write_sections(&mut Names(&mut names)).unwrap();

        for name in &names {
            assert!(name.len() <= 31, "sheet name too long: {name}");
            assert!(!name.contains(['[', ']', ':', '*', '?', '/', '\\']));
        }
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_bundle_serializes_sections() {
        let json = serde_json::to_value(empty_bundle()).unwrap();
        assert!(json["top_tracks_by_plays"].is_array());
        assert_eq!(json["totals"]["users"], 0);
    }
}
