use askama::Template;
use serde::Serialize;

use crate::directory::Team;
use crate::planner::{LineupPlanner, Player, QUARTER_CAPACITY};

/// What the generic card renderer needs to know about one kind of item
pub struct CardRenderer<T> {
    pub create_card: fn(&T) -> askama::Result<String>,
    pub id_of: fn(&T) -> String,
}

pub struct Card {
    pub id: String,
    pub markup: String,
}

#[derive(Template)]
#[template(path = "fragments/cards.html")]
struct CardsTemplate {
    cards: Vec<Card>,
}

#[derive(Template)]
#[template(path = "fragments/player_card.html")]
struct PlayerCardTemplate {
    label: String,
    is_temporary: bool,
}

#[derive(Template)]
#[template(path = "fragments/quarter.html")]
struct QuarterTemplate {
    index: usize,
    number: usize,
    occupied: usize,
    capacity: usize,
    is_full: bool,
    cards: String,
}

/// Renders a list of items as cards, each wrapped in a container carrying its id
pub fn render_cards<T>(items: &[T], renderer: &CardRenderer<T>) -> askama::Result<String> {
    let cards = items
        .iter()
        .map(|item| {
            Ok(Card {
                id: (renderer.id_of)(item),
                markup: (renderer.create_card)(item)?,
            })
        })
        .collect::<askama::Result<Vec<_>>>()?;
    CardsTemplate { cards }.render()
}

/// Formats a player for display: "#7 Ana", plus "(temp)" for temporary players
pub fn format_player_label(player: &Player) -> String {
    let label = match player.number.as_deref() {
        Some(number) => format!("#{} {}", number, player.name),
        None => player.name.clone(),
    };
    if player.is_temporary {
        format!("{} (temp)", label)
    } else {
        label
    }
}

fn player_card(player: &Player) -> askama::Result<String> {
    PlayerCardTemplate {
        label: format_player_label(player),
        is_temporary: player.is_temporary,
    }
    .render()
}

fn player_id(player: &Player) -> String {
    player.id.clone()
}

pub const PLAYER_CARDS: CardRenderer<Player> = CardRenderer {
    create_card: player_card,
    id_of: player_id,
};

/// One quarter resolved against the roster.
/// `occupied` counts every assigned id, including ones no longer on the roster,
/// so it matches the capacity the planner enforces.
#[derive(Debug, Clone, Serialize)]
pub struct QuarterView {
    pub index: usize,
    pub players: Vec<Player>,
    pub occupied: usize,
    pub is_full: bool,
}

/// Resolves every quarter's ids to players. Ids missing from the roster are skipped.
pub fn quarter_views(planner: &LineupPlanner) -> Vec<QuarterView> {
    planner
        .quarters()
        .iter()
        .enumerate()
        .map(|(index, ids)| QuarterView {
            index,
            players: ids
                .iter()
                .filter_map(|id| planner.find_player(id).cloned())
                .collect(),
            occupied: ids.len(),
            is_full: planner.is_quarter_full(index),
        })
        .collect()
}

pub fn render_roster(planner: &LineupPlanner) -> askama::Result<String> {
    render_cards(&planner.sorted_roster(), &PLAYER_CARDS)
}

/// Renders one quarter's drop zone, or None if the index is out of range
pub fn render_quarter(planner: &LineupPlanner, index: usize) -> askama::Result<Option<String>> {
    let Some(view) = quarter_views(planner).into_iter().nth(index) else {
        return Ok(None);
    };
    let template = QuarterTemplate {
        index: view.index,
        number: view.index + 1,
        occupied: view.occupied,
        capacity: QUARTER_CAPACITY,
        is_full: view.is_full,
        cards: render_cards(&view.players, &PLAYER_CARDS)?,
    };
    template.render().map(Some)
}

/// Prints a team's roster in display order
pub fn print_roster(team: &Team, players: &[Player]) {
    println!("\n=== {} Roster ===", team.name);
    println!("Total players: {}", players.len());
    for player in players {
        println!("  {} (ID: {})", format_player_label(player), player.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_show_number_and_temporary_flag() {
        let mut planner = LineupPlanner::default();
        let guest = planner.add_temporary_player("Ana", Some("7"));
        assert_eq!(format_player_label(&guest), "#7 Ana (temp)");
        let plain = Player::persisted("1", "Lea", None);
        assert_eq!(format_player_label(&plain), "Lea");
    }

    #[test]
    fn generic_renderer_uses_capability_record() {
        struct Badge {
            code: &'static str,
        }
        let renderer = CardRenderer::<Badge> {
            create_card: |b| Ok(format!("<b>{}</b>", b.code)),
            id_of: |b| b.code.to_string(),
        };
        let html = render_cards(&[Badge { code: "u12" }, Badge { code: "u14" }], &renderer).unwrap();
        assert!(html.contains("<div class=\"card\" data-id=\"u12\"><b>u12</b></div>"));
        assert!(html.contains("<div class=\"card\" data-id=\"u14\"><b>u14</b></div>"));
        assert!(html.find("u12").unwrap() < html.find("u14").unwrap());
    }

    #[test]
    fn player_names_and_ids_are_escaped() {
        let player = Player::persisted("x\"1", "<Bob>", None);
        let html = render_cards(&[player], &PLAYER_CARDS).unwrap();
        assert!(!html.contains("x\"1"));
        assert!(!html.contains("<Bob>"));
        assert!(html.contains("&lt;Bob&gt;"));
    }

    #[test]
    fn temporary_players_get_their_own_class() {
        let mut planner = LineupPlanner::default();
        planner.add_temporary_player("Ana", None);
        let html = render_roster(&planner).unwrap();
        assert!(html.contains("class=\"player temporary\""));
    }

    #[test]
    fn dangling_assignments_are_skipped_but_still_occupy_a_slot() {
        let mut planner = LineupPlanner::default();
        planner.set_roster(vec![
            Player::persisted("1", "Lea", Some("10".to_string())),
            Player::persisted("2", "Tom", Some("2".to_string())),
        ]);
        planner.assign_to_quarter(0, "1");
        planner.assign_to_quarter(0, "2");
        planner.set_roster(vec![Player::persisted("1", "Lea", Some("10".to_string()))]);

        let views = quarter_views(&planner);
        assert_eq!(views[0].players.len(), 1);
        assert_eq!(views[0].players[0].name, "Lea");
        assert_eq!(views[0].occupied, 2);

        let html = render_quarter(&planner, 0).unwrap().unwrap();
        assert!(html.contains("Quarter 1 (2/5)"));
        assert!(!html.contains("Tom"));
        assert!(render_quarter(&planner, 7).unwrap().is_none());
    }

    #[test]
    fn full_flag_and_heading_agree() {
        let mut planner = LineupPlanner::default();
        planner.set_roster(vec![Player::persisted("1", "Lea", None)]);
        for id in ["1", "gone-2", "gone-3", "gone-4", "gone-5"] {
            planner.assign_to_quarter(0, id);
        }
        let view = &quarter_views(&planner)[0];
        assert!(view.is_full);
        assert_eq!(view.occupied, QUARTER_CAPACITY);

        let html = render_quarter(&planner, 0).unwrap().unwrap();
        assert!(html.contains("class=\"quarter full\""));
        assert!(html.contains("(5/5)"));
    }

    #[test]
    fn roster_renders_in_display_order() {
        let mut planner = LineupPlanner::default();
        planner.set_roster(vec![
            Player::persisted("1", "Lea", Some("10".to_string())),
            Player::persisted("2", "Tom", Some("2".to_string())),
        ]);
        let html = render_roster(&planner).unwrap();
        let tom = html.find("Tom").unwrap();
        let lea = html.find("Lea").unwrap();
        assert!(tom < lea);
    }
}
