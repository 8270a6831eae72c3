use std::cmp::Ordering;
use super::types::Player;

/// Sort key used for players without a usable jersey number
const NO_NUMBER: u64 = u64::MAX;

/// Parses a jersey number to its numeric value.
/// Missing or unparsable numbers get a sentinel that sorts after every real number.
pub fn jersey_value(number: Option<&str>) -> u64 {
    number
        .and_then(|n| n.trim().parse::<u64>().ok())
        .unwrap_or(NO_NUMBER)
}

/// Printed length of the jersey number, 0 when there is none
fn jersey_width(number: Option<&str>) -> usize {
    number.map(|n| n.len()).unwrap_or(0)
}

/// Display order for the roster: numeric jersey value ascending, players without a
/// number last. Equal values put the longer printed number first ("07" before "7").
pub fn compare_players(a: &Player, b: &Player) -> Ordering {
    let value_a = jersey_value(a.number.as_deref());
    let value_b = jersey_value(b.number.as_deref());
    value_a.cmp(&value_b).then_with(|| {
        jersey_width(b.number.as_deref()).cmp(&jersey_width(a.number.as_deref()))
    })
}

/// Returns the players in display order. The sort is stable, so remaining ties keep roster order.
pub fn sort_roster(players: &[Player]) -> Vec<Player> {
    let mut sorted = players.to_vec();
    sorted.sort_by(compare_players);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str, number: Option<&str>) -> Player {
        Player::persisted(id, format!("Player {}", id), number.map(str::to_string))
    }

    #[test]
    fn players_without_number_sort_last() {
        let roster = vec![
            player("a", Some("10")),
            player("b", Some("2")),
            player("c", Some("2")),
            player("d", None),
        ];
        let ids: Vec<String> = sort_roster(&roster).into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn longer_representation_wins_numeric_tie() {
        let roster = vec![player("plain", Some("7")), player("padded", Some("07"))];
        let sorted = sort_roster(&roster);
        assert_eq!(sorted[0].id, "padded");
        assert_eq!(sorted[1].id, "plain");
    }

    #[test]
    fn unparsable_number_is_treated_as_missing() {
        let roster = vec![player("odd", Some("x9")), player("nine", Some("9"))];
        let sorted = sort_roster(&roster);
        assert_eq!(sorted[0].id, "nine");
        assert_eq!(jersey_value(Some("x9")), NO_NUMBER);
    }

    #[test]
    fn real_numbers_sort_numerically_not_lexically() {
        let roster = vec![player("a", Some("100")), player("b", Some("99")), player("c", Some("1"))];
        let ids: Vec<String> = sort_roster(&roster).into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }
}
