//! Plain-text rendering for the terminal.

use classpulse_core::analytics::{
    ComparisonOutcome, MetricsBundle, MonthComparison, RankingEntry, RankingMetric,
    TrailingWindow,
};
use classpulse_core::format::{format_delta, format_percent, round1};
use classpulse_core::InstructorRef;

const WIDTH: usize = 60;

fn header(title: &str) {
    println!();
    println!("╭{}╮", "─".repeat(WIDTH));
    println!("│{:^60}│", title);
    println!("╰{}╯", "─".repeat(WIDTH));
    println!();
}

pub fn print_report(instructor: &InstructorRef, bundle: &MetricsBundle) {
    header(&format!("{} - {}", instructor.name, bundle.period_label));

    if bundle.sessions == 0 {
        println!("  No sessions found for this period.");
        println!();
    } else {
        println!("SUMMARY");
        println!(
            "   Sessions:  {:<12} Attendees: {}",
            bundle.sessions, bundle.total_attendees
        );
        println!(
            "   Average:   {:<12} Per month: {:.1}",
            format!("{:.1}", bundle.avg_attendees),
            bundle.sessions_per_month
        );
        println!(
            "   Variety:   {:<12} Payout:    {:.2}",
            format_percent(bundle.variety),
            bundle.payout.total
        );
        println!();

        let p = &bundle.punctuality;
        println!("PUNCTUALITY");
        println!("   Rate:        {}", format_percent(p.rate));
        println!(
            "   On time: {}   Minor delay: {}   Major delay: {}   Undetermined: {}",
            p.on_time, p.minor_delay, p.major_delay, p.undetermined
        );
        println!();

        println!("CLASS TYPES");
        for share in &bundle.distribution.shares {
            println!(
                "   {:<6} {:>4}  {:>6}",
                share.class_type.as_str(),
                share.count,
                format_percent(share.percentage)
            );
        }
        println!();

        let score = &bundle.score;
        println!("SCORE");
        println!("   {:.1} ({})", score.score, score.tier.label());
        println!(
            "   Punctuality {:.1} | Attendance {:.1} | Frequency {:.1} | Cost {:.1}",
            score.components.punctuality,
            score.components.attendance,
            score.components.frequency,
            score.components.cost
        );
        println!();
    }

    let trends = &bundle.trends;
    if !trends.months.is_empty() {
        println!("MONTHLY TREND");
        for month in &trends.months {
            println!(
                "   {:<16} {:>3} sessions  avg {:>5.1}  on time {:>6}",
                month.label,
                month.sessions,
                month.avg_attendees,
                format_percent(month.punctuality_rate)
            );
        }
        println!(
            "   Trend: attendance {}  punctuality {}  sessions {}",
            format_delta(trends.attendees_trend),
            format_delta(trends.punctuality_trend),
            format_delta(trends.sessions_trend)
        );
        println!();
    }

    if let Some(cohort) = &bundle.cohort {
        println!("VS PEERS ({} instructors)", cohort.cohort.peer_count);
        println!(
            "   Attendance {}  Punctuality {}  Sessions {}  Variety {}",
            format_delta(cohort.avg_attendees),
            format_delta(cohort.punctuality),
            format_delta(cohort.sessions_per_month),
            format_delta(cohort.variety)
        );
        println!();
    }

    match &bundle.comparison {
        Some(ComparisonOutcome::Computed(comparison)) => print_comparison(comparison),
        Some(ComparisonOutcome::Insufficient(insufficient)) => {
            println!("COMPARISON");
            println!("   No data: {}", insufficient.reason);
            println!();
        }
        None => {}
    }
}

fn print_comparison(comparison: &MonthComparison) {
    let (current, baseline, changes) = (
        &comparison.current,
        &comparison.baseline,
        &comparison.changes,
    );
    println!("COMPARISON: {} vs {}", current.label, baseline.label);
    let rows = [
        (
            "Avg attendees",
            round1(current.avg_attendees),
            round1(baseline.avg_attendees),
            changes.avg_attendees,
        ),
        (
            "Punctuality",
            round1(current.punctuality.rate),
            round1(baseline.punctuality.rate),
            changes.punctuality,
        ),
        (
            "Sessions",
            current.sessions as f64,
            baseline.sessions as f64,
            changes.sessions,
        ),
        (
            "Variety",
            round1(current.variety),
            round1(baseline.variety),
            changes.variety,
        ),
        (
            "Score",
            current.score.score,
            baseline.score.score,
            changes.score,
        ),
    ];
    for (name, now, before, change) in rows {
        println!(
            "   {:<14} {:>8} {:>8}  {}",
            name,
            now,
            before,
            format_delta(change)
        );
    }
    println!("   Overall change: {}", format_delta(changes.headline));
    println!();
}

pub fn print_ranking(metric: RankingMetric, window: &TrailingWindow, entries: &[RankingEntry]) {
    header(&format!("Ranking by {}", metric.label()));
    println!(
        "   {} to {} ({} days)",
        window.start(),
        window.as_of,
        window.days
    );
    println!();

    if entries.is_empty() {
        println!("  No sessions found in this window.");
        println!();
        return;
    }

    for entry in entries {
        println!(
            "   {:>2}. {:<20} {:>4} sessions  avg {:>5.1}  on time {:>6}  {:>5.1}/month",
            entry.position,
            entry.instructor.name,
            entry.sessions,
            entry.avg_attendees,
            format_percent(entry.punctuality),
            entry.sessions_per_month
        );
    }
    println!();
}
