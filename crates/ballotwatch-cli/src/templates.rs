pub const SEED_EXAMPLE: &str = r#"elections:
  - id: oh-us-senate-2026
    office_name: US Senate
    office_level: Federal
    state: OH
    election_dt: 2026-11-03T12:00:00Z
    is_special: false
    candidates:
      - id: oh-us-senate-2026-jones
        name: B. Jones
        party: Republican
        incumbent: true
        poll_pct: 48.5
        endorsements: 14
      - id: oh-us-senate-2026-smith
        name: A. Smith
        party: Democratic
        poll_pct: 44.0
        endorsements: 11
  - id: tx-governor-2026
    office_name: Governor
    office_level: State
    state: TX
    election_dt: 2026-11-03T13:00:00Z
    is_special: false
    description: Gubernatorial general election
    candidates: []
  - id: ca-sf-mayor-2026
    office_name: Mayor of San Francisco
    office_level: Local
    state: CA
    election_dt: 2026-09-15T14:00:00Z
    is_special: true
    candidates: []
"#;
