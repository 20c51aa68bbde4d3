//! User commands: activation, review listings and team deactivation

use clap::{ArgAction, Args, Subcommand};
use serde_json::json;

use super::{active_label, print_json, Services};

/// User commands
#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Set a user's active flag (open reviews are left as they are)
    SetActive {
        /// User ID
        user_id: String,

        /// New active flag
        #[arg(long, action = ArgAction::Set)]
        active: bool,
    },

    /// List pull requests a user is assigned to review
    Reviews {
        /// User ID
        user_id: String,
    },

    /// Deactivate team members and hand their open reviews to active teammates
    Deactivate {
        /// Team the users belong to
        #[arg(short, long)]
        team: String,

        /// Users to deactivate
        #[arg(required = true)]
        user_ids: Vec<String>,
    },
}

impl UserArgs {
    /// Execute the user command
    pub async fn execute(&self, services: &Services, json: bool) -> anyhow::Result<()> {
        match &self.command {
            UserCommand::SetActive { user_id, active } => {
                let user = services.users.set_is_active(user_id, *active).await?;
                if json {
                    return print_json(&user);
                }
                println!(
                    "{} ({}) in team {} is now {}",
                    user.user_id,
                    user.username,
                    user.team_name,
                    active_label(user.is_active)
                );
            }
            UserCommand::Reviews { user_id } => {
                let reviews = services.users.get_user_reviews(user_id).await?;
                if json {
                    return print_json(&reviews);
                }
                if reviews.pull_requests.is_empty() {
                    println!("{} has no assigned reviews", reviews.user_id);
                    return Ok(());
                }
                println!("Reviews assigned to {}:", reviews.user_id);
                for pr in &reviews.pull_requests {
                    println!(
                        "  {:<12} {:<8} {} (by {})",
                        pr.pull_request_id, pr.status, pr.pull_request_name, pr.author_id
                    );
                }
            }
            UserCommand::Deactivate { team, user_ids } => {
                let deactivated = services
                    .pull_requests
                    .deactivate_team_users_and_reassign(team, user_ids)
                    .await?;
                if json {
                    return print_json(&json!({
                        "team_name": team,
                        "deactivated_user_ids": deactivated,
                    }));
                }
                if deactivated.is_empty() {
                    println!("No active members of {} matched", team);
                } else {
                    println!("Deactivated in {}: {}", team, deactivated.join(", "));
                }
            }
        }
        Ok(())
    }
}
