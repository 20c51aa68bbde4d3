//! Reviewer statistics command

use super::{print_json, Services};

/// Print review assignment counts per reviewer
pub async fn execute(services: &Services, json: bool) -> anyhow::Result<()> {
    let stats = services.stats.get_reviewer_stats().await?;
    if json {
        return print_json(&stats);
    }

    if stats.is_empty() {
        println!("No review assignments yet");
        return Ok(());
    }

    println!("{:<16} REVIEWS", "REVIEWER");
    for stat in &stats {
        println!("{:<16} {}", stat.user_id, stat.review_count);
    }
    Ok(())
}
