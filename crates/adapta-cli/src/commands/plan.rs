//! `adapta plan` — show the plan a query would run.

use adapta_core::AgentConfig;

use super::{build_planner, truncate};

pub fn run(config: &AgentConfig, query: &str) -> Result<(), String> {
    let planned = build_planner(config)?.analyze(query);

    println!("📋 Plan for {} query", planned.task_type);
    if planned.live_search_injected {
        println!("   (web search added for live information)");
    }
    println!();
    println!("┌─────┬──────────────────────────┬────────────────────────────────┐");
    println!("│ #   │ Tool                     │ Action                         │");
    println!("├─────┼──────────────────────────┼────────────────────────────────┤");
    for step in &planned.plan {
        println!(
            "│ {:<3} │ {:<24} │ {:<30} │",
            step.ordinal + 1,
            truncate(&step.label(), 24),
            truncate(&step.action, 30)
        );
    }
    println!("└─────┴──────────────────────────┴────────────────────────────────┘");
    println!();
    println!("Tools: {}", planned.tool_summary.join(" → "));
    Ok(())
}
