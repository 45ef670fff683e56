use crate::schedule::{candidates::parse_candidate, summarize, Availability, Schedule};

/// Formats a candidate for humans, e.g. "Wed 2025-01-01 10:00 UTC"
pub fn format_candidate(candidate: &str) -> String {
    match parse_candidate(candidate) {
        Some(dt) => dt.format("%a %Y-%m-%d %H:%M UTC").to_string(),
        None => candidate.to_string(),
    }
}

/// One line per schedule: id, title, option and response counts
pub fn format_schedule_line(schedule: &Schedule) -> String {
    format!(
        "{}  {}  ({} option{})",
        schedule.id,
        schedule.title,
        schedule.candidates.len(),
        if schedule.candidates.len() == 1 { "" } else { "s" }
    )
}

/// Renders the availability grid: a row per candidate, a column per participant
pub fn render_schedule(schedule: &Schedule) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n=== {} ===\n", schedule.title));
    if let Some(description) = &schedule.description {
        out.push_str(description);
        out.push('\n');
    }
    out.push_str(&format!(
        "{} option(s), {} response(s)\n\n",
        schedule.candidates.len(),
        schedule.responses.len()
    ));

    let labels: Vec<String> = schedule
        .candidates
        .iter()
        .map(|c| format_candidate(c))
        .collect();
    let width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    out.push_str(&format!("{:width$}", "", width = width));
    for response in &schedule.responses {
        out.push_str(&format!(" | {}", response.name));
    }
    out.push_str(" | ◯ △ ✕\n");

    for (candidate, (label, summary)) in schedule
        .candidates
        .iter()
        .zip(labels.iter().zip(summarize(schedule)))
    {
        out.push_str(&format!("{:width$}", label, width = width));
        for response in &schedule.responses {
            let answer = response.answers.get(candidate).copied().unwrap_or_default();
            let cell_width = response.name.chars().count();
            out.push_str(&format!(" | {:cell_width$}", answer.symbol(), cell_width = cell_width));
        }
        out.push_str(&format!(
            " | {} {} {}\n",
            summary.available, summary.maybe, summary.unavailable
        ));
    }

    if schedule.responses.is_empty() {
        out.push_str("\nNobody has responded yet.\n");
    }

    let comments: Vec<_> = schedule
        .responses
        .iter()
        .filter_map(|r| r.comment.as_ref().map(|c| (r.name.as_str(), c)))
        .collect();
    if !comments.is_empty() {
        out.push_str("\nComments:\n");
        for (name, comment) in comments {
            out.push_str(&format!("  - {}: {}\n", name, comment));
        }
    }

    out.push_str("\nLegend:");
    for availability in Availability::ALL {
        out.push_str(&format!(" {} {}", availability.symbol(), availability));
    }
    out.push('\n');
    out
}

/// Prints a schedule grid to stdout
pub fn print_schedule(schedule: &Schedule) {
    print!("{}", render_schedule(schedule));
}
