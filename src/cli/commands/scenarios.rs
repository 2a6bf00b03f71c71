//! Built-in scenario listing.

use crate::cli::args::{OutputFormat, ScenariosArgs};
use crate::error::Result;
use crate::scenario::list_scenarios;

/// Lists the built-in scenarios.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run(args: &ScenariosArgs) -> Result<()> {
    let scenarios = list_scenarios();
    match args.format {
        OutputFormat::Human => {
            let width = scenarios.iter().map(|s| s.name.len()).max().unwrap_or(0);
            for scenario in scenarios {
                println!("{:<width$}  {}", scenario.name, scenario.description);
            }
            println!();
            println!("Run one with: anchornav simulate --builtin <NAME>");
        }
        OutputFormat::Json => {
            let items: Vec<_> = scenarios
                .iter()
                .map(|s| serde_json::json!({ "name": s.name, "description": s.description }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
    }
    Ok(())
}
