//! `adapta rules` — classifier rule files.

use adapta_core::workflow::{Classifier, ClassifierRules};

/// Parse and compile a rules file without running anything.
pub fn validate(file: &str) -> Result<(), String> {
    let rules = ClassifierRules::from_file(file).map_err(|e| e.to_string())?;
    Classifier::new(&rules).map_err(|e| e.to_string())?;

    println!("✅ Rules file '{}' is valid", file);
    println!("   Rule sets: {}", rules.rule_sets.len());
    println!("   Patterns: {}", rules.pattern_count());
    for (i, set) in rules.rule_sets.iter().enumerate() {
        println!("   {}. {} ({} patterns)", i + 1, set.task_type, set.patterns.len());
    }
    println!("   Live-info keywords: {}", rules.live_info_keywords.join(", "));
    Ok(())
}
