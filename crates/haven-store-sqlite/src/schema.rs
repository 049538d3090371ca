//! SQL schema for the Haven SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS houses (
    house_id    TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    gender      TEXT NOT NULL,      -- 'men' | 'women' | 'coed'
    address     TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS rooms (
    room_id     TEXT PRIMARY KEY,
    house_id    TEXT NOT NULL REFERENCES houses(house_id),
    label       TEXT NOT NULL,
    capacity    INTEGER NOT NULL CHECK (capacity >= 0),
    created_at  TEXT NOT NULL
);

-- Occupancy columns are written only by resident transitions.
CREATE TABLE IF NOT EXISTS beds (
    bed_id      TEXT PRIMARY KEY,
    room_id     TEXT NOT NULL REFERENCES rooms(room_id),
    label       TEXT NOT NULL,
    is_occupied INTEGER NOT NULL DEFAULT 0,
    occupied_by TEXT,               -- resident_id; no FK so deletes never cascade
    created_at  TEXT NOT NULL,
    CHECK ((is_occupied = 1) = (occupied_by IS NOT NULL))
);

CREATE TABLE IF NOT EXISTS residents (
    resident_id             TEXT PRIMARY KEY,
    first_name              TEXT NOT NULL,
    last_name               TEXT NOT NULL,
    date_of_birth           TEXT,
    gender                  TEXT,
    phone                   TEXT,
    email                   TEXT,
    emergency_contact_name  TEXT,
    emergency_contact_phone TEXT,
    status                  TEXT NOT NULL,   -- 'Active' | 'Discharged' | 'Pending'
    level_of_care           TEXT NOT NULL,
    admission_date          TEXT NOT NULL,
    discharge_date          TEXT,
    house_id                TEXT REFERENCES houses(house_id),
    room_id                 TEXT REFERENCES rooms(room_id),
    bed_id                  TEXT REFERENCES beds(bed_id),
    is_active               INTEGER NOT NULL,
    admitted_at             TEXT,
    discharged_at           TEXT,
    created_at              TEXT NOT NULL,
    CHECK (is_active = (status = 'Active'))
);

-- Append-only. resident_id has no FK: deleting a resident orphans its history.
CREATE TABLE IF NOT EXISTS resident_events (
    event_id     TEXT PRIMARY KEY,
    resident_id  TEXT NOT NULL,
    house_id     TEXT,
    event_type   TEXT NOT NULL,      -- discriminant of EventDetail
    detail_json  TEXT NOT NULL,      -- JSON payload (inner data only)
    notes        TEXT,
    details_json TEXT,
    recorded_by  TEXT,
    occurred_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS staff (
    staff_id    TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    role        TEXT NOT NULL,
    email       TEXT NOT NULL UNIQUE COLLATE NOCASE,
    pin_hash    TEXT,                -- argon2 PHC string
    house_id    TEXT REFERENCES houses(house_id),
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS notes (
    note_id      TEXT PRIMARY KEY,
    kind         TEXT NOT NULL,      -- 'turnover' | 'observation'
    house_id     TEXT NOT NULL REFERENCES houses(house_id),
    resident_id  TEXT,
    shift        TEXT NOT NULL,
    body         TEXT NOT NULL,
    submitted_by TEXT,
    created_at   TEXT NOT NULL
);

-- Append-only. No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS audit_log (
    audit_id     TEXT PRIMARY KEY,
    action       TEXT NOT NULL,
    details_json TEXT NOT NULL,
    staff_id     TEXT,
    recorded_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS rooms_house_idx        ON rooms(house_id);
CREATE INDEX IF NOT EXISTS beds_room_idx          ON beds(room_id);
CREATE INDEX IF NOT EXISTS beds_occupied_by_idx   ON beds(occupied_by);
CREATE INDEX IF NOT EXISTS residents_status_idx   ON residents(status);
CREATE INDEX IF NOT EXISTS residents_bed_idx      ON residents(bed_id);
CREATE INDEX IF NOT EXISTS events_resident_idx    ON resident_events(resident_id);
CREATE INDEX IF NOT EXISTS events_occurred_idx    ON resident_events(occurred_at);
CREATE INDEX IF NOT EXISTS notes_house_kind_idx   ON notes(house_id, kind, created_at);
CREATE INDEX IF NOT EXISTS audit_recorded_idx     ON audit_log(recorded_at);

PRAGMA user_version = 1;
";
