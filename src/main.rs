use lineup_planner::config::Config;
use lineup_planner::directory::{CsvDirectory, TeamDirectory};
use lineup_planner::display::print_roster;
use lineup_planner::planner::sort_roster;
use lineup_planner::web;

const USAGE: &str = "Usage:\n  lineup-planner web [port]\n  lineup-planner roster <team_id>";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("web") => {
            let config = Config::from_env(args.get(2).map(String::as_str));
            log::info!("Reading team data from {}", config.data_dir.display());
            println!("Access the planner at http://localhost:{}/lineup", config.port);
            web::start_server(config).await?;
        }
        Some("roster") => {
            let Some(team_id) = args.get(2) else {
                eprintln!("{}", USAGE);
                std::process::exit(2);
            };
            let config = Config::from_env(None);
            let directory = CsvDirectory::new(&config.data_dir);
            let team = directory
                .team(team_id)?
                .ok_or_else(|| format!("Team {} not found in {}", team_id, config.data_dir.display()))?;
            let roster = directory.roster(&team.id)?;
            print_roster(&team, &sort_roster(&roster));
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }

    Ok(())
}
