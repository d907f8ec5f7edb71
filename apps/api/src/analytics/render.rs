use crate::analytics::aggregate::AnalyticsReport;
use crate::models::feedback::Vote;

/// Renders the analytics report as a markdown document.
pub fn render_report_md(report: &AnalyticsReport) -> String {
    let mut md = String::from("# Page Feedback Analytics\n\n");
    if report.stats.is_empty() {
        md.push_str("No feedback data collected yet.\n\n");
        md.push_str(
            "Navigate through documentation pages and submit feedback to see analytics here.\n",
        );
        return md;
    }

    md.push_str(&format!(
        "**Overall:** {} votes, {:.0}% satisfied\n\n",
        report.totals.total_count, report.totals.satisfaction_percent
    ));

    md.push_str("## Page Statistics\n\n");
    md.push_str("| Page | 👍 Positive | 👎 Negative | Total | Satisfaction |\n");
    md.push_str("|---|---:|---:|---:|---|\n");
    for stat in &report.stats {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {:.0}% ({}) |\n",
            escape_cell(&stat.pathname),
            stat.positive_count,
            stat.negative_count,
            stat.total_count,
            stat.satisfaction_percent,
            stat.band.as_str()
        ));
    }

    md.push_str("\n## Recent Feedback\n\n");
    for event in &report.recent {
        let icon = match event.vote {
            Vote::Positive => "👍",
            Vote::Negative => "👎",
        };
        md.push_str(&format!(
            "- {icon} {} at {}\n",
            escape_inline(&event.pathname),
            event.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    md
}

fn escape_cell(text: &str) -> String {
    escape_inline(text).replace('|', "\\|")
}

/// Backslash-escapes characters that would start inline markdown.
fn escape_inline(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '>') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
