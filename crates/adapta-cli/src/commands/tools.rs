//! `adapta tools` — list the built-in tools.

use adapta_core::AgentConfig;

use super::truncate;

pub fn list(config: &AgentConfig) -> Result<(), String> {
    let registry = adapta_tools::default_registry(config);

    println!("┌────────────────┬────────────────────────────────────────────────────────────┐");
    println!("│ Tool           │ Description                                                │");
    println!("├────────────────┼────────────────────────────────────────────────────────────┤");
    for tool in registry.descriptors() {
        println!(
            "│ {:<14} │ {:<58} │",
            truncate(&tool.name, 14),
            truncate(&tool.description, 58)
        );
    }
    println!("└────────────────┴────────────────────────────────────────────────────────────┘");
    println!("Timeout per call: {}s", registry.timeout().as_secs());
    Ok(())
}
