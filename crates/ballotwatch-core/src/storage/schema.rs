// election_dt / last_polled are stored as UTC RFC 3339 with a trailing 'Z',
// so lexicographic order on the column equals chronological order.
pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS elections (
    id            TEXT PRIMARY KEY,
    office_name   TEXT NOT NULL,
    office_level  TEXT NOT NULL CHECK (office_level IN ('Federal','State','Local')),
    state         TEXT NOT NULL,
    election_dt   TEXT NOT NULL,
    is_special    INTEGER NOT NULL DEFAULT 0,
    description   TEXT,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS candidates (
    id            TEXT PRIMARY KEY,
    election_id   TEXT NOT NULL REFERENCES elections(id) ON DELETE CASCADE,
    name          TEXT NOT NULL,
    party         TEXT NOT NULL,
    incumbent     INTEGER NOT NULL DEFAULT 0,
    poll_pct      REAL NOT NULL DEFAULT 0,
    intent_pct    REAL NOT NULL DEFAULT 0,
    endorsements  INTEGER NOT NULL DEFAULT 0,
    last_polled   TEXT
);

CREATE INDEX IF NOT EXISTS idx_elections_dt ON elections(election_dt);
CREATE INDEX IF NOT EXISTS idx_candidates_election ON candidates(election_id);
"#;
