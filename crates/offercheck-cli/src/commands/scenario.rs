use crate::OutputFormat;
use anyhow::{Result, bail};
use console::style;
use offercheck_core::Scenario;

/// Print randomised flow inputs without touching a browser
pub fn execute(seed: Option<u64>, count: usize, format: OutputFormat) -> Result<()> {
    if count == 0 {
        bail!("--count must be at least 1");
    }

    let scenarios = generate(seed, count)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&scenarios)?),
        OutputFormat::Pretty => {
            for (i, scenario) in scenarios.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print_pretty(i + 1, scenario);
            }
        }
    }

    Ok(())
}

/// With a seed, scenario `i` uses `seed + i` so each one can be replayed alone
pub fn generate(seed: Option<u64>, count: usize) -> Result<Vec<Scenario>> {
    (0..count)
        .map(|i| {
            let scenario = match seed {
                Some(seed) => Scenario::seeded(seed.wrapping_add(i as u64))?,
                None => Scenario::random()?,
            };
            Ok(scenario)
        })
        .collect()
}

fn print_pretty(number: usize, scenario: &Scenario) {
    match scenario.seed {
        Some(seed) => println!("{} (seed {})", style(format!("Scenario {}", number)).bold(), seed),
        None => println!("{}", style(format!("Scenario {}", number)).bold()),
    }
    println!("  Departure airport: #{}", scenario.airport_index);
    println!("  Destination:       #{}", scenario.destination_index);
    println!(
        "  Child birth date:  year #{}, month #{}, day #{}",
        scenario.birth_date.year_index,
        scenario.birth_date.month_index,
        scenario.birth_date.day_index
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_with_seed_is_replayable() {
        let batch = generate(Some(100), 3).unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[2], Scenario::seeded(102).unwrap());
    }

    #[test]
    fn test_generate_without_seed_leaves_seed_empty() {
        let batch = generate(None, 2).unwrap();
        assert!(batch.iter().all(|s| s.seed.is_none()));
    }
}
