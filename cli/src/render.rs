// Human-readable output for verdicts and detection results

use colored::*;
use trustprobe_core::evidence::ERROR_KEY;
use trustprobe_core::{DetectionResult, EvidenceValue, Verdict};

pub fn evidence(value: &EvidenceValue) -> ColoredString {
    match value {
        EvidenceValue::Bool(true) => "yes".bright_yellow(),
        EvidenceValue::Bool(false) => "no".normal(),
        EvidenceValue::Int(n) => n.to_string().bright_cyan(),
        EvidenceValue::List(items) if items.is_empty() => "(none)".dimmed(),
        EvidenceValue::List(items) => items.join(", ").bright_cyan(),
        EvidenceValue::Error { error } => format!("error: {}", error).red(),
    }
}

pub fn verdict(verdict: &Verdict) {
    println!("{}", "Trust Signals".bold());
    println!("  Platform:   {}", verdict.platform.to_string().bright_cyan());
    println!("  OS:         {}", verdict.os_version);
    let label = if verdict.is_mock {
        "MOCKED".red().bold()
    } else {
        "genuine".green().bold()
    };
    println!("  Verdict:    {}", label);
    println!();

    println!("{}", "Evidence".bold());
    for (key, value) in verdict.details.iter().filter(|(key, _)| *key != ERROR_KEY) {
        println!("  {:<24} {}", key, evidence(value));
    }

    if let Some(EvidenceValue::Error { error }) = verdict.details.get(ERROR_KEY) {
        println!();
        println!("  {} {}", "⚠".yellow(), error);
    }
}

pub fn detection(result: &DetectionResult) {
    if let Some(ref error) = result.error {
        println!("  {} Detection unavailable: {}", "⚠".yellow(), error);
        return;
    }

    if !result.detected {
        println!("  {} No matches", "✓".green());
        return;
    }

    println!("{} ({})", "Matches".bold(), result.count);
    for app in &result.matches {
        println!("  {} {}", "•".red(), app);
    }
}
