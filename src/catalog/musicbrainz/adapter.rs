//! Adapter layer: Convert MusicBrainz DTOs to domain models
//!
//! This is the ONLY place where MusicBrainz DTO types are converted to domain
//! types. If MusicBrainz changes their response format, only this file and
//! dto.rs need to change.

use super::dto;
use crate::catalog::domain::ReleaseInfo;

/// Release descriptor for a release search hit
pub fn release_info(release: &dto::Release) -> ReleaseInfo {
    ReleaseInfo {
        title: release.title.clone(),
        id: Some(release.id.clone()),
        artist: build_artist_string(&release.artist_credit),
        year: release.date.as_deref().and_then(year_of),
    }
}

/// Release descriptor for the release a recording hit appears on
pub fn recording_release_info(
    recording: &dto::Recording,
    release: &dto::RecordingRelease,
) -> ReleaseInfo {
    ReleaseInfo {
        title: release.title.clone().unwrap_or_default(),
        id: release.id.clone(),
        artist: build_artist_string(&recording.artist_credit),
        year: release.date.as_deref().and_then(year_of),
    }
}

/// First release of a recording, if it carries an ID
pub fn first_release(recording: &dto::Recording) -> Option<(&dto::RecordingRelease, &str)> {
    let release = recording.releases.first()?;
    let id = release.id.as_deref().filter(|id| !id.is_empty())?;
    Some((release, id))
}

/// Build a combined artist string from artist credits
fn build_artist_string(credits: &[dto::ArtistCredit]) -> Option<String> {
    if credits.is_empty() {
        return None;
    }

    let mut result = String::new();
    for credit in credits {
        // Use credited name if available, otherwise official name
        let name = credit.name.as_ref().unwrap_or(&credit.artist.name);
        result.push_str(name);

        if let Some(ref join) = credit.joinphrase {
            result.push_str(join);
        }
    }

    Some(result)
}

/// "1975-10-31" -> "1975"
fn year_of(date: &str) -> Option<String> {
    let year = date.get(..4)?;
    year.chars()
        .all(|c| c.is_ascii_digit())
        .then(|| year.to_string())
}
