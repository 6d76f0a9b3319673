//! `adapta classify` — show the task type chosen for a query.

use adapta_core::AgentConfig;

use super::build_planner;

pub fn run(config: &AgentConfig, query: &str) -> Result<(), String> {
    let planner = build_planner(config)?;
    let classifier = planner.classifier();

    let task_type = classifier.classify(query);
    println!("🏷️  Task type: {}", task_type);
    match classifier.matched_rule(query) {
        Some((_, pattern)) => println!("   Matched rule: {}", pattern),
        None => println!("   Matched rule: none (fallback)"),
    }
    if classifier.needs_live_info(query) {
        println!("   Live information requested");
    }
    Ok(())
}
