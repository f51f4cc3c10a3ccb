use pretty_assertions::assert_eq;
use serde_json::json;
use setlist_core::{MatchedTrack, PayloadError, ResultModel, ResultType, ResultView, TrackOutcome};

fn base_payload(search_results: serde_json::Value) -> serde_json::Value {
    json!({
        "searchResults": search_results,
        "playlistId": "p1",
        "playlistUrl": "https://open.spotify.com/playlist/p1",
        "timeTaken": 1500,
        "artistName": "X",
        "eventDate": "2024-01-01",
        "city": "Y"
    })
}

#[test]
fn parses_full_search_results_in_setlist_order() {
    let payload = base_payload(json!([
        {
            "resultType": "MATCH",
            "song": { "index": 1, "songName": "A", "artistName": "X" },
            "searchResult": {
                "name": "A (Remastered)",
                "discNumber": 1,
                "durationMs": 201000,
                "href": "https://api.spotify.com/v1/tracks/a"
            }
        },
        {
            "resultType": "CLOSE_MATCH",
            "song": { "index": 2, "songName": "B" },
            "searchResult": { "name": "B - Live" }
        },
        {
            "resultType": "COVER_ORIGINAL",
            "song": { "index": 3, "songName": "C", "artistName": "Other" },
            "searchResult": { "name": "C" }
        },
        {
            "resultType": "SKIPPED",
            "song": { "index": 4, "songName": "Intro Tape" },
            "searchResult": null
        },
        {
            "resultType": "NOT_FOUND",
            "song": { "index": 5, "songName": "E" }
        }
    ]));

    let model = ResultModel::from_payload(&payload).expect("valid payload");

    assert_eq!(model.artist_name, "X");
    assert_eq!(model.event_date, "2024-01-01");
    assert_eq!(model.city, "Y");
    assert_eq!(model.playlist_id, "p1");
    assert_eq!(model.elapsed_ms, 1500);
    assert_eq!(model.elapsed_display(), "1.5s");
    assert!(!model.reused);

    let indices: Vec<_> = model.tracks.iter().map(|t| t.index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4, 5]);
    assert_eq!(model.found_count(), 3);
    assert_eq!(model.total_count(), 5);
    assert_eq!(model.missed_count, 2);

    assert_eq!(
        model.tracks[0],
        TrackOutcome {
            index: 1,
            source_song_name: "A".to_string(),
            source_artist_name: "X".to_string(),
            result_type: ResultType::Match,
            matched_track: Some(MatchedTrack {
                name: "A (Remastered)".to_string(),
                disc_number: Some(1),
                duration_ms: Some(201000),
                href: Some("https://api.spotify.com/v1/tracks/a".to_string()),
            }),
        }
    );
    // Missing song artist falls back to the setlist artist.
    assert_eq!(model.tracks[1].source_artist_name, "X");
    assert_eq!(model.tracks[2].source_artist_name, "Other");
    assert_eq!(
        model.tracks[2].result_type,
        ResultType::CoverOrInstrumentalMatch
    );

    for track in &model.tracks {
        assert_eq!(
            track.matched_track.is_some(),
            track.result_type.is_found(),
            "track {}",
            track.index
        );
    }
}

#[test]
fn empty_search_results_is_a_valid_result() {
    let model = ResultModel::from_payload(&base_payload(json!([]))).expect("valid payload");
    assert!(model.tracks.is_empty());
    assert_eq!(model.missed_count, 0);

    let view = ResultView::from_model(&model);
    assert_eq!(view.summary, "Playlist created with 0 of 0 songs in ~1.5s");
    assert!(view.rows.is_empty());
}

#[test]
fn fractional_time_taken_is_rounded_to_millis() {
    let mut payload = base_payload(json!([]));
    payload["timeTaken"] = json!(1500.0);
    let model = ResultModel::from_payload(&payload).expect("valid payload");
    assert_eq!(model.elapsed_ms, 1500);
    assert_eq!(model.elapsed_display(), "1.5s");

    payload["timeTaken"] = json!(2349.6);
    let model = ResultModel::from_payload(&payload).expect("valid payload");
    assert_eq!(model.elapsed_ms, 2350);
    assert_eq!(model.elapsed_display(), "2.4s");
}

#[test]
fn negative_time_taken_is_malformed() {
    let mut payload = base_payload(json!([]));
    payload["timeTaken"] = json!(-1.0);
    assert!(matches!(
        ResultModel::from_payload(&payload),
        Err(PayloadError::OutOfRange("timeTaken"))
    ));
}

#[test]
fn index_gaps_are_tolerated() {
    let payload = base_payload(json!([
        { "resultType": "MATCH", "song": { "index": 1, "songName": "A" }, "searchResult": { "name": "A" } },
        { "resultType": "MATCH", "song": { "index": 4, "songName": "D" }, "searchResult": { "name": "D" } }
    ]));

    let model = ResultModel::from_payload(&payload).expect("valid payload");
    let indices: Vec<_> = model.tracks.iter().map(|t| t.index).collect();
    assert_eq!(indices, vec![1, 4]);
}

#[test]
fn unmatched_songs_never_carry_a_matched_track() {
    let payload = base_payload(json!([
        { "resultType": "SKIPPED", "song": { "index": 1, "songName": "A" }, "searchResult": { "name": "A" } }
    ]));

    let model = ResultModel::from_payload(&payload).expect("valid payload");
    assert_eq!(model.tracks[0].matched_track, None);
}

#[test]
fn found_song_without_track_is_malformed() {
    let payload = base_payload(json!([
        { "resultType": "MATCH", "song": { "index": 7, "songName": "A" }, "searchResult": null }
    ]));

    let err = ResultModel::from_payload(&payload).unwrap_err();
    assert!(matches!(err, PayloadError::MissingMatchedTrack { index: 7 }));
}

#[test]
fn missing_required_fields_are_malformed() {
    let mut payload = base_payload(json!([]));
    payload.as_object_mut().unwrap().remove("playlistId");
    assert!(matches!(
        ResultModel::from_payload(&payload),
        Err(PayloadError::MissingField("playlistId"))
    ));

    let mut payload = base_payload(json!([]));
    payload.as_object_mut().unwrap().remove("timeTaken");
    assert!(matches!(
        ResultModel::from_payload(&payload),
        Err(PayloadError::MissingField("timeTaken"))
    ));

    let mut payload = base_payload(json!([]));
    payload.as_object_mut().unwrap().remove("searchResults");
    assert!(matches!(
        ResultModel::from_payload(&payload),
        Err(PayloadError::MissingOutcomes)
    ));

    assert!(matches!(
        ResultModel::from_payload(&json!("not an object")),
        Err(PayloadError::Shape(_))
    ));
}

#[test]
fn unknown_result_type_is_malformed() {
    let payload = base_payload(json!([
        { "resultType": "MAYBE", "song": { "index": 1, "songName": "A" } }
    ]));
    assert!(matches!(
        ResultModel::from_payload(&payload),
        Err(PayloadError::Shape(_))
    ));
}

#[test]
fn nested_setlist_block_and_derived_playlist_url() {
    let payload = json!({
        "setlist": {
            "artistName": "Band",
            "eventDate": "2023-06-01",
            "city": "Berlin",
            "venue": "Waldbühne",
            "songs": []
        },
        "playlistId": "abc",
        "searchResults": [],
        "timeTaken": 900,
        "reused": true
    });

    let model = ResultModel::from_payload(&payload).expect("valid payload");
    assert_eq!(model.artist_name, "Band");
    assert_eq!(model.city, "Berlin");
    assert_eq!(model.venue.as_deref(), Some("Waldbühne"));
    assert_eq!(model.playlist_url, "https://open.spotify.com/playlist/abc");
    assert_eq!(model.elapsed_display(), "0.9s");
    assert!(model.reused);

    let view = ResultView::from_model(&model);
    assert_eq!(view.headline, "Band @ Waldbühne, Berlin (2023-06-01)");
}

#[test]
fn missed_songs_array_becomes_not_found_tracks() {
    let payload = json!({
        "missedSongs": [
            { "index": 2, "songName": "B" },
            { "index": 5, "songName": "E" }
        ],
        "playlistId": "p1",
        "timeTaken": 2000,
        "artistName": "X",
        "eventDate": "2024-01-01",
        "city": "Y"
    });

    let model = ResultModel::from_payload(&payload).expect("valid payload");
    assert_eq!(model.missed_count, 2);
    assert_eq!(model.tracks.len(), 2);
    assert!(model
        .tracks
        .iter()
        .all(|t| t.result_type == ResultType::NotFound && t.matched_track.is_none()));
    assert_eq!(model.tracks[1].source_song_name, "E");
    assert_eq!(model.tracks[1].source_artist_name, "X");
}

#[test]
fn missed_songs_count_is_accepted() {
    let payload = json!({
        "missedSongs": 3,
        "playlistId": "p1",
        "timeTaken": 2000,
        "artistName": "X",
        "eventDate": "2024-01-01",
        "city": "Y"
    });

    let model = ResultModel::from_payload(&payload).expect("valid payload");
    assert!(model.tracks.is_empty());
    assert_eq!(model.missed_count, 3);

    let view = ResultView::from_model(&model);
    assert_eq!(
        view.summary,
        "Playlist created in ~2.0s, 3 songs could not be found"
    );
}

#[test]
fn rows_use_matched_name_and_human_labels() {
    let payload = base_payload(json!([
        { "resultType": "CLOSE_MATCH", "song": { "index": 1, "songName": "a" }, "searchResult": { "name": "A!" } },
        { "resultType": "NOT_FOUND", "song": { "index": 2, "songName": "b" } }
    ]));

    let view = ResultView::from_model(&ResultModel::from_payload(&payload).unwrap());
    assert_eq!(view.rows[0].name, "A!");
    assert_eq!(view.rows[0].label, "Close Match");
    assert!(view.rows[0].is_match);
    assert_eq!(view.rows[1].name, "b");
    assert_eq!(view.rows[1].label, "Not Found");
    assert!(!view.rows[1].is_match);
    assert_eq!(view.summary, "Playlist created with 1 of 2 songs in ~1.5s");
}
