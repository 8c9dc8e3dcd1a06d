//! Setup: validate the inputs for a fresh tournament document.

use crate::models::TournamentError;

/// Trimmed tournament name. Must not be empty.
pub fn tournament_name(name: &str) -> Result<&str, TournamentError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TournamentError::InvalidTournamentName);
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_name() {
        assert_eq!(tournament_name("  Cup "), Ok("Cup"));
    }

    #[test]
    fn rejects_blank_name() {
        assert_eq!(tournament_name("   "), Err(TournamentError::InvalidTournamentName));
    }
}
