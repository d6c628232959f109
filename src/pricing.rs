//! Per-model token prices used for the informational cost estimate.
//!
//! Prices are USD per one million tokens (input, output). Models not in the
//! table are reported with a cost of `0.0`; the estimate is never used to
//! make decisions.

/// `(model prefix, input $/1M, output $/1M)`. Longest prefix wins.
const PRICES: &[(&str, f64, f64)] = &[
    ("gpt-4.1-nano", 0.10, 0.40),
    ("gpt-4.1-mini", 0.40, 1.60),
    ("gpt-4.1", 2.00, 8.00),
    ("gpt-4o-mini", 0.15, 0.60),
    ("gpt-4o", 2.50, 10.00),
    ("gpt-3.5-turbo", 0.50, 1.50),
    ("claude-sonnet-4", 3.00, 15.00),
    ("claude-haiku-4", 0.80, 4.00),
    ("gemini-2.0-flash", 0.10, 0.40),
    ("gemini-2.5-pro", 1.25, 10.00),
];

/// Look up the `(input, output)` price for a model, if known.
pub fn price_for(model: &str) -> Option<(f64, f64)> {
    PRICES
        .iter()
        .filter(|(prefix, _, _)| model.starts_with(prefix))
        .max_by_key(|(prefix, _, _)| prefix.len())
        .map(|&(_, input, output)| (input, output))
}

/// Estimated USD cost of one call.
pub fn estimate_cost(model: &str, prompt_tokens: u64, completion_tokens: u64) -> f64 {
    match price_for(model) {
        Some((input, output)) => {
            (prompt_tokens as f64 * input + completion_tokens as f64 * output) / 1_000_000.0
        }
        None => 0.0,
    }
}
