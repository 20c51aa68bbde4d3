//! Team management commands

use clap::{Args, Subcommand};
use rota_core::{Team, TeamMember};

use super::{active_label, print_json, Services};

/// Team management commands
#[derive(Args, Debug)]
pub struct TeamArgs {
    #[command(subcommand)]
    pub command: TeamCommand,
}

#[derive(Subcommand, Debug)]
pub enum TeamCommand {
    /// Create a team and register its members
    Add {
        /// Team name
        team: String,

        /// Member as ID:NAME, or ID:NAME:inactive
        #[arg(short, long = "member", value_parser = parse_member)]
        members: Vec<TeamMember>,
    },

    /// Show a team and its members
    Show {
        /// Team name
        team: String,
    },

    /// List all teams
    #[command(visible_alias = "ls")]
    List,
}

impl TeamArgs {
    /// Execute the team command
    pub async fn execute(&self, services: &Services, json: bool) -> anyhow::Result<()> {
        match &self.command {
            TeamCommand::Add { team, members } => {
                let team = services.teams.create_team(team, members.clone()).await?;
                if json {
                    return print_json(&team);
                }
                println!("Created team {}", team.team_name);
                print_members(&team);
            }
            TeamCommand::Show { team } => {
                let team = services.teams.get_team(team).await?;
                if json {
                    return print_json(&team);
                }
                println!("Team {}", team.team_name);
                print_members(&team);
            }
            TeamCommand::List => {
                let teams = services.teams.list_teams().await?;
                if json {
                    return print_json(&teams);
                }
                if teams.is_empty() {
                    println!("No teams");
                }
                for team in &teams {
                    let active = team.members.iter().filter(|m| m.is_active).count();
                    println!(
                        "{:<20} {} members ({} active)",
                        team.team_name,
                        team.members.len(),
                        active
                    );
                }
            }
        }
        Ok(())
    }
}

fn print_members(team: &Team) {
    if team.members.is_empty() {
        println!("  (no members)");
        return;
    }
    for member in &team.members {
        println!(
            "  {:<12} {:<24} {}",
            member.user_id,
            member.username,
            active_label(member.is_active)
        );
    }
}

/// Parse `ID:NAME[:active|inactive]`
fn parse_member(s: &str) -> Result<TeamMember, String> {
    let mut parts = s.splitn(3, ':');
    let user_id = parts.next().unwrap_or_default().trim();
    let username = parts.next().map(str::trim).unwrap_or_default();

    if user_id.is_empty() || username.is_empty() {
        return Err(format!("expected ID:NAME[:inactive], got '{}'", s));
    }

    let is_active = match parts.next().map(str::trim) {
        None | Some("active") => true,
        Some("inactive") => false,
        Some(other) => {
            return Err(format!(
                "unknown member state '{}', expected 'active' or 'inactive'",
                other
            ))
        }
    };

    Ok(TeamMember::new(user_id, username, is_active))
}
