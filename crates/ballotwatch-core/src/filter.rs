use crate::model::{Election, FilterOptions, FILTER_WILDCARD};

/// Narrow a snapshot by party, state and election type. All three filters
/// are ANDed; each is either the wildcard "all" or a case-insensitive match.
/// Party matches when at least one candidate carries it, state matches
/// exactly, type matches as a substring. Input order is preserved.
pub fn apply_filters(elections: &[Election], filters: &FilterOptions) -> Vec<Election> {
    elections
        .iter()
        .filter(|e| matches_party(e, &filters.party))
        .filter(|e| matches_state(e, &filters.state))
        .filter(|e| matches_type(e, &filters.election_type))
        .cloned()
        .collect()
}

fn is_wildcard(filter: &str) -> bool {
    filter.eq_ignore_ascii_case(FILTER_WILDCARD)
}

fn matches_party(election: &Election, party: &str) -> bool {
    if is_wildcard(party) {
        return true;
    }
    election
        .candidates
        .iter()
        .any(|c| c.party.eq_ignore_ascii_case(party))
}

fn matches_state(election: &Election, state: &str) -> bool {
    is_wildcard(state) || election.state.eq_ignore_ascii_case(state)
}

fn matches_type(election: &Election, election_type: &str) -> bool {
    if is_wildcard(election_type) {
        return true;
    }
    election
        .kind
        .to_lowercase()
        .contains(&election_type.to_lowercase())
}
