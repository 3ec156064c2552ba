use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use recovery_profiles::{Profile, ProfileCollection};
use serde_json::json;

use crate::checks::CheckResult;

pub fn generate_console_report(
    writer: &mut dyn Write,
    results: &[CheckResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "📊 Check Results Summary".bright_cyan().bold())?;
    writeln!(writer, "{}", "========================".cyan())?;

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    writeln!(writer, "Total checks: {total}")?;
    writeln!(writer, "Passed: {}", passed.to_string().green())?;
    writeln!(writer, "Failed: {}", (total - passed).to_string().red())?;
    writeln!(writer, "Total time: {total_duration:?}")?;
    writeln!(writer)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(writer, "{status} {} ({:?})", result.name.bold(), result.duration)?;
        if let Some(failure) = &result.failure {
            writeln!(writer, "   {}", failure.red())?;
        }
    }
    Ok(())
}

pub fn generate_json_report(writer: &mut dyn Write, results: &[CheckResult]) -> Result<()> {
    let report = json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "passed": results.iter().all(|r| r.passed),
        "results": results,
    });
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

pub fn write_profile(writer: &mut dyn Write, name: &str, profile: &Profile, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *writer, profile)?;
        writeln!(writer)?;
        return Ok(());
    }
    writeln!(writer, "{}", name.bright_cyan().bold())?;
    for (key, value) in profile.iter() {
        writeln!(writer, "  {key:36} {value}")?;
    }
    Ok(())
}

pub fn write_profile_names(
    writer: &mut dyn Write,
    profiles: &ProfileCollection,
    active: &str,
    json: bool,
) -> Result<()> {
    if json {
        let names: Vec<&String> = profiles.keys().collect();
        serde_json::to_writer_pretty(&mut *writer, &json!({ "active": active, "profiles": names }))?;
        writeln!(writer)?;
        return Ok(());
    }
    for name in profiles.keys() {
        if name == active {
            writeln!(writer, "* {}", name.green().bold())?;
        } else {
            writeln!(writer, "  {name}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn sample_results() -> Vec<CheckResult> {
        vec![
            CheckResult {
                name: "missing-profile".to_string(),
                passed: true,
                duration: Duration::from_millis(2),
                failure: None,
            },
            CheckResult {
                name: "bulk-round-trip".to_string(),
                passed: false,
                duration: Duration::from_millis(3),
                failure: Some("bulk update dropped an unrelated profile".to_string()),
            },
        ]
    }

    #[test]
    fn json_report_flags_overall_failure() {
        let mut buf = Vec::new();
        generate_json_report(&mut buf, &sample_results()).unwrap();
        let parsed: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed["passed"], Value::Bool(false));
        assert_eq!(parsed["results"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn console_report_lists_failures() {
        colored::control::set_override(false);
        let mut buf = Vec::new();
        generate_console_report(&mut buf, &sample_results(), Duration::from_millis(5)).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Passed: 1"));
        assert!(text.contains("❌ FAIL bulk-round-trip"));
        assert!(text.contains("bulk update dropped an unrelated profile"));
    }

    #[test]
    fn profile_listing_marks_the_active_profile() {
        colored::control::set_override(false);
        let mut profiles = ProfileCollection::new();
        profiles.insert("Default".to_string(), Profile::new());
        profiles.insert("Gritty".to_string(), Profile::new());
        let mut buf = Vec::new();
        write_profile_names(&mut buf, &profiles, "Gritty", false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "  Default\n* Gritty\n");
    }
}
