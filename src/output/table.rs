use crate::model::ScanReport;
use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct ParamRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Parameter")]
    name: String,
    #[tabled(rename = "Reflected")]
    reflected: String,
}

pub fn print_table(report: &ScanReport) -> Result<()> {
    println!();
    println!(
        "Scanned {} at: {}",
        report.url,
        report.scanned_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    if report.parameters.is_empty() {
        println!("No parameters found.");
        return Ok(());
    }

    println!("Found {} parameters:", report.parameters.len());
    println!();

    let rows: Vec<ParamRow> = report
        .parameters
        .iter()
        .enumerate()
        .map(|(i, name)| ParamRow {
            index: i + 1,
            name: truncate(name, 60),
            reflected: match &report.reflections {
                Some(reflections) if reflections.contains(name) => "yes".to_string(),
                Some(_) => "no".to_string(),
                None => "-".to_string(),
            },
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);

    if let Some(reflections) = &report.reflections {
        println!();
        println!(
            "{} of {} parameters reflected their marker.",
            reflections.len(),
            report.parameters.len()
        );
    }

    Ok(())
}

/// Prints a bare list of names, one per line.
pub fn print_list(names: &[String]) {
    if names.is_empty() {
        println!("No entries.");
        return;
    }
    for name in names {
        println!("{}", name);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly_ten", 11), "exactly_ten");
        assert_eq!(truncate("a_rather_long_name", 10), "a_rathe...");
    }
}
