//! The daily digest: a 24-hour summary of census, admissions, discharges and
//! observation notes, rendered to HTML and mailed to the configured
//! recipients.
//!
//! Invocation is gated by a static bearer key (`trigger_key`) so that an
//! external scheduler can call `POST /internal/digest` once a day.

use std::collections::HashMap;

use askama::Template;
use axum::{
  Json,
  extract::{Query, State},
  http::{HeaderMap, header},
  response::{Html, IntoResponse, Response},
};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use haven_api::ApiError;
use haven_core::{
  event::{EventDetail, EventKind, EventQuery},
  note::{NoteKind, NoteQuery},
  scope::HouseScope,
  store::HousingStore,
};
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest as _, Sha256};
use uuid::Uuid;

use crate::{AppState, error::Error};

pub const WINDOW_HOURS: i64 = 24;

pub struct CensusRow {
  pub house:    String,
  pub occupied: u32,
  pub total:    u32,
  pub percent:  String,
  pub active:   u32,
}

pub struct AdmissionRow {
  pub at:          String,
  pub resident:    String,
  pub house:       String,
  pub readmission: bool,
}

pub struct DischargeRow {
  pub at:       String,
  pub resident: String,
  pub house:    String,
  pub reason:   String,
}

pub struct ObservationRow {
  pub at:       String,
  pub house:    String,
  /// Empty when the note is not about one resident.
  pub resident: String,
  pub shift:    String,
  pub body:     String,
}

#[derive(Template)]
#[template(path = "digest.html")]
pub struct Digest {
  pub subject:      String,
  pub since:        String,
  pub until:        String,
  pub census:       Vec<CensusRow>,
  pub admissions:   Vec<AdmissionRow>,
  pub discharges:   Vec<DischargeRow>,
  pub observations: Vec<ObservationRow>,
}

fn stamp(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn lookup(names: &HashMap<Uuid, String>, id: Option<Uuid>) -> String {
  id.and_then(|id| names.get(&id).cloned())
    .unwrap_or_else(|| "unknown".to_owned())
}

impl Digest {
  /// Gather everything that happened in the 24 hours ending at `now`.
  pub async fn build<S: HousingStore>(store: &S, now: DateTime<Utc>) -> Result<Self, S::Error> {
    let since = now - Duration::hours(WINDOW_HOURS);

    let houses: HashMap<Uuid, String> = store
      .list_houses()
      .await?
      .into_iter()
      .map(|h| (h.house_id, h.name))
      .collect();
    let residents: HashMap<Uuid, String> = store
      .list_residents(None)
      .await?
      .into_iter()
      .map(|r| (r.resident_id, r.full_name()))
      .collect();

    let census = store
      .census()
      .await?
      .into_iter()
      .map(|c| CensusRow {
        percent:  format!("{:.0}%", c.occupancy_percent()),
        house:    c.house_name,
        occupied: c.occupied_beds,
        total:    c.total_beds,
        active:   c.active_residents,
      })
      .collect();

    let events = store
      .list_events(EventQuery {
        kinds: vec![EventKind::Admission, EventKind::Discharge],
        since: Some(since),
        ..Default::default()
      })
      .await?;

    let mut admissions = Vec::new();
    let mut discharges = Vec::new();
    for event in events.into_iter().filter(|e| e.occurred_at <= now) {
      let at = stamp(event.occurred_at);
      let resident = lookup(&residents, Some(event.resident_id));
      let house = lookup(&houses, event.house_id);
      match event.detail {
        EventDetail::Admission { readmission, .. } => {
          admissions.push(AdmissionRow { at, resident, house, readmission })
        }
        EventDetail::Discharge { reason, .. } => {
          discharges.push(DischargeRow { at, resident, house, reason })
        }
        _ => {}
      }
    }

    let observations = store
      .list_notes(NoteQuery {
        kind:  NoteKind::Observation,
        scope: HouseScope::All,
        since: Some(since),
        limit: None,
      })
      .await?
      .into_iter()
      .filter(|n| n.created_at <= now)
      .map(|n| ObservationRow {
        at:       stamp(n.created_at),
        house:    lookup(&houses, Some(n.house_id)),
        resident: n
          .resident_id
          .map(|id| lookup(&residents, Some(id)))
          .unwrap_or_default(),
        shift:    n.shift,
        body:     n.body,
      })
      .collect();

    Ok(Self {
      subject: format!("Haven daily digest for {}", now.format("%Y-%m-%d")),
      since: stamp(since),
      until: stamp(now),
      census,
      admissions,
      discharges,
      observations,
    })
  }
}

// ─── Trigger endpoint ────────────────────────────────────────────────────────

/// Require `Authorization: Bearer <trigger_key>`. An empty configured key
/// rejects every request.
pub fn check_trigger_key(headers: &HeaderMap, expected: &str) -> Result<(), Error> {
  let presented = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .ok_or(Error::Unauthorized)?;

  if expected.is_empty() || !keys_match(presented.trim(), expected) {
    return Err(Error::Unauthorized);
  }
  Ok(())
}

/// Constant-time comparison over fixed-length digests of both keys.
fn keys_match(presented: &str, expected: &str) -> bool {
  let presented = Sha256::digest(presented.as_bytes());
  let expected = Sha256::digest(expected.as_bytes());
  presented
    .iter()
    .zip(expected.iter())
    .fold(0u8, |acc, (a, b)| acc | (a ^ b))
    == 0
}

#[derive(Debug, Default, Deserialize)]
pub struct TriggerParams {
  #[serde(default)]
  pub dry_run: bool,
}

/// `POST /internal/digest[?dry_run=true]`
///
/// With `dry_run` the rendered HTML is returned instead of being sent.
pub async fn trigger<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  Query(params): Query<TriggerParams>,
) -> Result<Response, Error>
where
  S: HousingStore + 'static,
{
  check_trigger_key(&headers, &state.config.trigger_key)?;

  let digest = Digest::build(state.store.as_ref(), Utc::now())
    .await
    .map_err(ApiError::store)?;
  let html = digest.render()?;

  if params.dry_run {
    return Ok(Html(html).into_response());
  }

  let recipients = state.mailer.send(&digest.subject, &html).await?;
  tracing::info!(
    recipients,
    admissions = digest.admissions.len(),
    discharges = digest.discharges.len(),
    observations = digest.observations.len(),
    "daily digest sent"
  );
  Ok(Json(json!({ "sent": true, "recipients": recipients })).into_response())
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn with_auth(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    headers
  }

  #[test]
  fn trigger_key_must_match_exactly() {
    assert!(check_trigger_key(&with_auth("Bearer s3cret"), "s3cret").is_ok());
    assert!(check_trigger_key(&with_auth("Bearer s3cre"), "s3cret").is_err());
    assert!(check_trigger_key(&with_auth("Bearer s3cretX"), "s3cret").is_err());
    assert!(check_trigger_key(&with_auth("s3cret"), "s3cret").is_err());
    assert!(check_trigger_key(&HeaderMap::new(), "s3cret").is_err());
  }

  #[test]
  fn empty_configured_key_rejects_everything() {
    assert!(check_trigger_key(&with_auth("Bearer "), "").is_err());
  }
}
