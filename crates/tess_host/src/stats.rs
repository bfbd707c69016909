//! Report printing for experiment statistics.

use tess_core::decoder::Pass;
use tess_core::experiment::ExperimentStats;

fn percent(rate: Option<f64>) -> String {
    match rate {
        Some(r) => format!("{:.2}%", r * 100.0),
        None => "n/a".to_string(),
    }
}

/// Prints acceptance, logical success, the check distribution of accepted
/// shots, and where rejected shots were rejected.
pub fn print_report(stats: &ExperimentStats) {
    println!("\nDecoding Results");
    println!("Shots:          {}", stats.shots);
    println!(
        "Accepted:       {} ({})",
        stats.accepted,
        percent(stats.acceptance_rate())
    );
    println!(
        "Logical passed: {} ({} of shots, {} of accepted)",
        stats.logical_passed,
        percent(stats.logical_rate()),
        percent(stats.logical_rate_given_accepted())
    );
    match stats.average_fraction() {
        Some(f) => println!("Avg fraction:   {:.4}", f),
        None => println!("Avg fraction:   undefined (no accepted shots)"),
    }

    if stats.accepted > 0 {
        println!("Successful checks (accepted shots):");
        for (checks, &count) in stats
            .check_histogram
            .iter()
            .enumerate()
            .take(stats.max_checks + 1)
        {
            println!("[{}/{}]: {}", checks, stats.max_checks, count);
        }
    }

    if stats.rejected() > 0 {
        println!("Rejections by pass:");
        for pass in Pass::ALL {
            let count = stats.rejected_at(pass);
            if count > 0 {
                println!("{:>8}: {}", format!("{pass:?}"), count);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_rates_print_as_na() {
        assert_eq!(percent(None), "n/a");
        assert_eq!(percent(Some(0.5)), "50.00%");
    }
}
