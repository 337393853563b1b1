//! Static NBA franchise table.
//!
//! Lookups fail with `NotFound`; an unresolved team is never replaced by a
//! fallback franchise.

use crate::types::{PropError, Team};

const fn team(id: u32, abbreviation: &'static str, full_name: &'static str) -> Team {
    Team { id, abbreviation, full_name }
}

pub const TEAMS: &[Team] = &[
    team(1610612737, "ATL", "Atlanta Hawks"),
    team(1610612738, "BOS", "Boston Celtics"),
    team(1610612739, "CLE", "Cleveland Cavaliers"),
    team(1610612740, "NOP", "New Orleans Pelicans"),
    team(1610612741, "CHI", "Chicago Bulls"),
    team(1610612742, "DAL", "Dallas Mavericks"),
    team(1610612743, "DEN", "Denver Nuggets"),
    team(1610612744, "GSW", "Golden State Warriors"),
    team(1610612745, "HOU", "Houston Rockets"),
    team(1610612746, "LAC", "LA Clippers"),
    team(1610612747, "LAL", "Los Angeles Lakers"),
    team(1610612748, "MIA", "Miami Heat"),
    team(1610612749, "MIL", "Milwaukee Bucks"),
    team(1610612750, "MIN", "Minnesota Timberwolves"),
    team(1610612751, "BKN", "Brooklyn Nets"),
    team(1610612752, "NYK", "New York Knicks"),
    team(1610612753, "ORL", "Orlando Magic"),
    team(1610612754, "IND", "Indiana Pacers"),
    team(1610612755, "PHI", "Philadelphia 76ers"),
    team(1610612756, "PHX", "Phoenix Suns"),
    team(1610612757, "POR", "Portland Trail Blazers"),
    team(1610612758, "SAC", "Sacramento Kings"),
    team(1610612759, "SAS", "San Antonio Spurs"),
    team(1610612760, "OKC", "Oklahoma City Thunder"),
    team(1610612761, "TOR", "Toronto Raptors"),
    team(1610612762, "UTA", "Utah Jazz"),
    team(1610612763, "MEM", "Memphis Grizzlies"),
    team(1610612764, "WAS", "Washington Wizards"),
    team(1610612765, "DET", "Detroit Pistons"),
    team(1610612766, "CHA", "Charlotte Hornets"),
];

/// ESPN uses short codes for a handful of franchises.
const ESPN_ALIASES: &[(&str, &str)] = &[
    ("GS", "GSW"),
    ("NY", "NYK"),
    ("SA", "SAS"),
    ("NO", "NOP"),
    ("UTAH", "UTA"),
    ("WSH", "WAS"),
];

/// Look a team up by full name, case-insensitively.
pub fn find_by_full_name(name: &str) -> Result<&'static Team, PropError> {
    let name = name.trim();
    TEAMS
        .iter()
        .find(|t| t.full_name.eq_ignore_ascii_case(name))
        .ok_or_else(|| PropError::not_found("Team", name))
}

/// Look a team up by NBA abbreviation, case-insensitively.
pub fn find_by_abbreviation(code: &str) -> Result<&'static Team, PropError> {
    let code = code.trim();
    TEAMS
        .iter()
        .find(|t| t.abbreviation.eq_ignore_ascii_case(code))
        .ok_or_else(|| PropError::not_found("Team", code))
}

/// Accept either a full name or an abbreviation.
pub fn resolve(name_or_code: &str) -> Result<&'static Team, PropError> {
    find_by_abbreviation(name_or_code).or_else(|_| find_by_full_name(name_or_code))
}

/// Map an ESPN team code to the NBA code. Unknown codes pass through uppercased.
pub fn from_espn_code(code: &str) -> String {
    let upper = code.trim().to_uppercase();
    ESPN_ALIASES
        .iter()
        .find(|(espn, _)| *espn == upper)
        .map_or(upper.clone(), |(_, nba)| nba.to_string())
}

/// Map an NBA team code to the code ESPN uses in its URLs.
pub fn to_espn_code(code: &str) -> String {
    let upper = code.trim().to_uppercase();
    ESPN_ALIASES
        .iter()
        .find(|(_, nba)| *nba == upper)
        .map_or(upper.clone(), |(espn, _)| espn.to_string())
}
