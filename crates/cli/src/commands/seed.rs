//! Catalog seeding.

use vitrine_store::AppState;

/// Seed the catalog. `AppState::initialize` already seeds an empty
/// store, so without `--force` this just reports the current count.
///
/// # Errors
///
/// Returns an error if the reseed fails to persist.
#[allow(clippy::print_stdout)]
pub fn run(state: &AppState, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if force {
        state.products().reset()?;
        println!("Catalog reseeded.");
    }
    println!("{} products in catalog.", state.products().all().len());
    Ok(())
}
