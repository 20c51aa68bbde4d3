//! Pull request commands

use clap::{Args, Subcommand};
use rota_core::PullRequest;
use serde_json::json;

use super::{print_json, Services};

/// Pull request commands
#[derive(Args, Debug)]
pub struct PrArgs {
    #[command(subcommand)]
    pub command: PrCommand,
}

#[derive(Subcommand, Debug)]
pub enum PrCommand {
    /// Open a pull request and assign reviewers from the author's team
    Create {
        /// Pull request ID
        pr_id: String,

        /// Pull request title
        name: String,

        /// Author user ID
        #[arg(short, long)]
        author: String,
    },

    /// Mark a pull request as merged (repeating is a no-op)
    Merge {
        /// Pull request ID
        pr_id: String,
    },

    /// Replace one reviewer with another active teammate
    Reassign {
        /// Pull request ID
        pr_id: String,

        /// Reviewer to replace
        #[arg(short, long)]
        old_reviewer: String,
    },
}

impl PrArgs {
    /// Execute the pull request command
    pub async fn execute(&self, services: &Services, json: bool) -> anyhow::Result<()> {
        match &self.command {
            PrCommand::Create {
                pr_id,
                name,
                author,
            } => {
                let pr = services
                    .pull_requests
                    .create_pull_request(pr_id, name, author)
                    .await?;
                if json {
                    return print_json(&pr);
                }
                print_pull_request(&pr);
            }
            PrCommand::Merge { pr_id } => {
                let pr = services.pull_requests.merge_pull_request(pr_id).await?;
                if json {
                    return print_json(&pr);
                }
                print_pull_request(&pr);
            }
            PrCommand::Reassign {
                pr_id,
                old_reviewer,
            } => {
                let (pr, replaced_by) = services
                    .pull_requests
                    .reassign_reviewer(pr_id, old_reviewer)
                    .await?;
                if json {
                    return print_json(&json!({
                        "pr": pr,
                        "replaced_by": replaced_by,
                    }));
                }
                println!("Replaced {} with {}", old_reviewer, replaced_by);
                print_pull_request(&pr);
            }
        }
        Ok(())
    }
}

fn print_pull_request(pr: &PullRequest) {
    println!("{} [{}] {}", pr.pull_request_id, pr.status, pr.pull_request_name);
    println!("  author:    {}", pr.author_id);
    if pr.assigned_reviewers.is_empty() {
        println!("  reviewers: (none)");
    } else {
        println!("  reviewers: {}", pr.assigned_reviewers.join(", "));
    }
    println!("  created:   {}", pr.created_at.to_rfc3339());
    if let Some(merged_at) = pr.merged_at {
        println!("  merged:    {}", merged_at.to_rfc3339());
    }
}
