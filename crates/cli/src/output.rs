use console::style;
use domain::{PatentRecord, RetrievalResult};

const MISSING: &str = "N/A";

pub fn print_candidates(result: &RetrievalResult) {
    if result.is_empty() {
        println!("{}", style("No similar patents found.").yellow());
        return;
    }

    println!(
        "{}",
        style(format!("Similar patents ({})", result.len())).cyan().bold()
    );
    for (position, hit) in result.iter().enumerate() {
        println!(
            "{}",
            format_candidate(position + 1, &hit.record, Some(hit.distance))
        );
    }
    if result.is_partial() {
        println!(
            "{}",
            style("Index returned rows outside the corpus; the list may be short.").yellow()
        );
    }
}

pub fn format_candidate(
    position: usize,
    record: &PatentRecord,
    distance: Option<f32>,
) -> String {
    let mut line = format!(
        "{:>2}. {} [{}] {}",
        position,
        style(record.title().unwrap_or(MISSING)).bold(),
        record.publication_number().unwrap_or(MISSING),
        style(record.date().unwrap_or(MISSING)).dim(),
    );
    if let Some(distance) = distance {
        line.push_str(&format!(" {}", style(format!("d={distance:.4}")).dim()));
    }
    line
}

pub fn print_analysis(text: &str) {
    println!();
    println!("{}", style("Analysis").green().bold());
    println!("{text}");
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_candidate_uses_fallbacks() {
        console::set_colors_enabled(false);
        let record = PatentRecord::default();
        assert_eq!(format_candidate(1, &record, None), " 1. N/A [N/A] N/A");

        let record = PatentRecord::new("Kettle", "abs", "US1", "2019-03-01");
        assert_eq!(
            format_candidate(12, &record, Some(0.5)),
            "12. Kettle [US1] 2019-03-01 d=0.5000"
        );
    }
}
