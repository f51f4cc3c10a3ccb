use serde::Deserialize;
use thiserror::Error;

/// Base of the public playlist link, used when a payload only carries the id.
const PLAYLIST_URL_BASE: &str = "https://open.spotify.com/playlist/";

/// Per-song reconciliation outcome as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultType {
    Match,
    CloseMatch,
    #[serde(rename = "COVER_ORIGINAL", alias = "COVER_OR_INSTRUMENTAL_MATCH")]
    CoverOrInstrumentalMatch,
    Skipped,
    NotFound,
}

impl ResultType {
    /// Whether the song ended up in the playlist.
    pub fn is_found(self) -> bool {
        matches!(
            self,
            ResultType::Match | ResultType::CloseMatch | ResultType::CoverOrInstrumentalMatch
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            ResultType::Match => "Match",
            ResultType::CloseMatch => "Close Match",
            ResultType::CoverOrInstrumentalMatch => "Cover Original",
            ResultType::Skipped => "Skipped",
            ResultType::NotFound => "Not Found",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedTrack {
    pub name: String,
    pub disc_number: Option<u32>,
    pub duration_ms: Option<u64>,
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackOutcome {
    /// 1-based position in the setlist.
    pub index: u32,
    pub source_song_name: String,
    pub source_artist_name: String,
    pub result_type: ResultType,
    /// Present if and only if `result_type.is_found()`.
    pub matched_track: Option<MatchedTrack>,
}

impl TrackOutcome {
    /// Name to show for the row: the matched track if any, else the setlist entry.
    pub fn display_name(&self) -> &str {
        self.matched_track
            .as_ref()
            .map(|track| track.name.as_str())
            .unwrap_or(&self.source_song_name)
    }
}

/// Normalized outcome of a completed job, independent of the transport that delivered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultModel {
    pub artist_name: String,
    pub event_date: String,
    pub city: String,
    pub venue: Option<String>,
    pub playlist_id: String,
    pub playlist_url: String,
    pub elapsed_ms: u64,
    /// The server handed back an already existing playlist for this setlist.
    pub reused: bool,
    /// Setlist order. Empty when the server only reported a missed-song count.
    pub tracks: Vec<TrackOutcome>,
    pub missed_count: usize,
}

impl ResultModel {
    pub fn from_payload(payload: &serde_json::Value) -> Result<Self, PayloadError> {
        let raw = RawPayload::deserialize(payload).map_err(PayloadError::Shape)?;
        raw.normalize()
    }

    pub fn found_count(&self) -> usize {
        self.tracks
            .iter()
            .filter(|track| track.result_type.is_found())
            .count()
    }

    pub fn total_count(&self) -> usize {
        self.tracks.len()
    }

    /// Elapsed time in seconds with one decimal, e.g. `1.5s`.
    pub fn elapsed_display(&self) -> String {
        format!("{:.1}s", self.elapsed_ms as f64 / 1000.0)
    }
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload does not have the expected shape: {0}")]
    Shape(#[source] serde_json::Error),
    #[error("payload is missing `{0}`")]
    MissingField(&'static str),
    #[error("payload field `{0}` is out of range")]
    OutOfRange(&'static str),
    #[error("payload has neither `searchResults` nor `missedSongs`")]
    MissingOutcomes,
    #[error("song {index} is reported as found but carries no matched track")]
    MissingMatchedTrack { index: u32 },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPayload {
    search_results: Option<Vec<RawSearchResult>>,
    missed_songs: Option<RawMissedSongs>,
    playlist_id: Option<String>,
    playlist_url: Option<String>,
    /// Milliseconds; some servers send it as a float.
    time_taken: Option<f64>,
    artist_name: Option<String>,
    event_date: Option<String>,
    city: Option<String>,
    venue: Option<String>,
    setlist: Option<RawSetlist>,
    #[serde(default)]
    reused: bool,
}

/// Nested event block as emitted by newer servers.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSetlist {
    artist_name: Option<String>,
    event_date: Option<String>,
    city: Option<String>,
    venue: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSearchResult {
    result_type: ResultType,
    song: RawSong,
    search_result: Option<RawTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSong {
    index: u32,
    song_name: String,
    artist_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTrack {
    name: String,
    disc_number: Option<u32>,
    duration_ms: Option<u64>,
    href: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawMissedSongs {
    Count(usize),
    Songs(Vec<RawMissedSong>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMissedSong {
    index: u32,
    song_name: String,
}

impl RawPayload {
    fn normalize(self) -> Result<ResultModel, PayloadError> {
        let (nested_artist, nested_date, nested_city, nested_venue) = match self.setlist {
            Some(setlist) => (
                setlist.artist_name,
                setlist.event_date,
                setlist.city,
                setlist.venue,
            ),
            None => (None, None, None, None),
        };

        let artist_name = self
            .artist_name
            .or(nested_artist)
            .ok_or(PayloadError::MissingField("artistName"))?;
        let event_date = self
            .event_date
            .or(nested_date)
            .ok_or(PayloadError::MissingField("eventDate"))?;
        let city = self
            .city
            .or(nested_city)
            .ok_or(PayloadError::MissingField("city"))?;
        let playlist_id = self
            .playlist_id
            .filter(|id| !id.is_empty())
            .ok_or(PayloadError::MissingField("playlistId"))?;
        let playlist_url = self
            .playlist_url
            .unwrap_or_else(|| format!("{PLAYLIST_URL_BASE}{playlist_id}"));
        let elapsed_ms = self
            .time_taken
            .ok_or(PayloadError::MissingField("timeTaken"))
            .and_then(elapsed_millis)?;

        let (tracks, missed_count) = match (self.search_results, self.missed_songs) {
            (Some(results), _) => {
                let tracks = results
                    .into_iter()
                    .map(|result| result.into_outcome(&artist_name))
                    .collect::<Result<Vec<_>, _>>()?;
                let missed = tracks
                    .iter()
                    .filter(|track| !track.result_type.is_found())
                    .count();
                (tracks, missed)
            }
            (None, Some(RawMissedSongs::Count(count))) => (Vec::new(), count),
            (None, Some(RawMissedSongs::Songs(songs))) => {
                let tracks: Vec<_> = songs
                    .into_iter()
                    .map(|song| TrackOutcome {
                        index: song.index,
                        source_song_name: song.song_name,
                        source_artist_name: artist_name.clone(),
                        result_type: ResultType::NotFound,
                        matched_track: None,
                    })
                    .collect();
                let missed = tracks.len();
                (tracks, missed)
            }
            (None, None) => return Err(PayloadError::MissingOutcomes),
        };

        Ok(ResultModel {
            artist_name,
            event_date,
            city,
            venue: self.venue.or(nested_venue),
            playlist_id,
            playlist_url,
            elapsed_ms,
            reused: self.reused,
            tracks,
            missed_count,
        })
    }
}

fn elapsed_millis(time_taken: f64) -> Result<u64, PayloadError> {
    if !time_taken.is_finite() || time_taken < 0.0 {
        return Err(PayloadError::OutOfRange("timeTaken"));
    }
    Ok(time_taken.round() as u64)
}

impl RawSearchResult {
    fn into_outcome(self, fallback_artist: &str) -> Result<TrackOutcome, PayloadError> {
        let index = self.song.index;
        let matched_track = if self.result_type.is_found() {
            let track = self
                .search_result
                .ok_or(PayloadError::MissingMatchedTrack { index })?;
            Some(MatchedTrack {
                name: track.name,
                disc_number: track.disc_number,
                duration_ms: track.duration_ms,
                href: track.href,
            })
        } else {
            None
        };

        Ok(TrackOutcome {
            index,
            source_song_name: self.song.song_name,
            source_artist_name: self
                .song
                .artist_name
                .unwrap_or_else(|| fallback_artist.to_string()),
            result_type: self.result_type,
            matched_track,
        })
    }
}
