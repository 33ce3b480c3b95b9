//! Stock workflow command.

use vitrine_core::ProductId;
use vitrine_store::AppState;

/// Apply a stock increment through the workflow.
///
/// # Errors
///
/// Returns the workflow's policy error verbatim so the user sees which
/// rule was violated.
#[allow(clippy::print_stdout)]
pub fn add(state: &AppState, id: &str, amount: u32) -> Result<(), Box<dyn std::error::Error>> {
    let id = ProductId::new(id);
    let updated = state.stock().apply(&id, amount)?;

    println!(
        "{}: stock {} (+{})",
        updated.name,
        updated.stock,
        amount
    );
    Ok(())
}
