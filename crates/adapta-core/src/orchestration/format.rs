//! Output formatter — renders a finished run as a text report.

use crate::state::RunState;

const RULE: &str = "============================================================";

pub fn format_report(state: &RunState) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\nADAPTA RESPONSE\n{}\n", RULE, RULE));
    out.push_str(&format!("Task Type: {}\n", state.task_type()));
    let tools = if state.tools_used.is_empty() {
        "none".to_string()
    } else {
        state.tools_used.join(", ")
    };
    out.push_str(&format!("Tools Used: {}\n", tools));
    match state.quality_score {
        Some(score) => out.push_str(&format!("Quality Score: {:.1}/10\n", score)),
        None => out.push_str("Quality Score: n/a\n"),
    }
    out.push_str(&format!("Steps: {}\n", state.step_log.len()));
    if state.retry_count > 0 {
        out.push_str(&format!("Retries: {}\n", state.retry_count));
    }
    if let Some(exit) = state.exit.filter(|e| e.is_low_confidence()) {
        out.push_str(&format!(
            "Note: LOW CONFIDENCE ({}), the answer did not pass the quality check\n",
            exit.as_str()
        ));
    }

    out.push_str(&format!("\nANSWER:\n{}\n", state.final_answer));

    if !state.processing_steps.is_empty() {
        out.push_str("\nPROCESSING STEPS:\n");
        for (i, step) in state.processing_steps.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, step));
        }
    }

    if !state.step_log.is_empty() {
        out.push_str("\nWORKFLOW EXECUTION:\n");
        for record in &state.step_log {
            let mark = if record.succeeded { "✅" } else { "❌" };
            out.push_str(&format!("  {} {}: {}", mark, record.tool, record.action));
            if let Some(error) = &record.error {
                out.push_str(&format!(" ({})", error));
            }
            out.push('\n');
        }
    }

    if !state.errors.is_empty() {
        out.push_str("\nERRORS:\n");
        for error in &state.errors {
            out.push_str(&format!("  - {}\n", error));
        }
    }

    out.push_str(RULE);
    out
}
