//! Compatibility score between two listeners

/// Weighted taste-compatibility score on a 0..=100 scale.
///
/// Each category saturates on its own: 10 common artists max out the artist
/// component (50 points), 5 common albums the album component (30), 5 common
/// tracks the track component (20). More than 20 common artists earns a
/// 5-point bonus, so the sum is clamped after rounding.
pub fn compatibility_score(common_artists: usize, common_albums: usize, common_tracks: usize) -> u8 {
    let artists = (common_artists as f64 / 10.0 * 50.0).min(50.0);
    let albums = (common_albums as f64 / 5.0 * 30.0).min(30.0);
    let tracks = (common_tracks as f64 / 5.0 * 20.0).min(20.0);

    let mut score = artists + albums + tracks;
    if common_artists > 20 {
        score += 5.0;
    }
    score.round().clamp(0.0, 100.0) as u8
}
