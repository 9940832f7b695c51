use anyhow::Result;
use colored::Colorize;
use nse_spread_engine::{
    analyze_spreads, build_candidates, logging, rank_spreads, OptionChainService,
};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();

    let symbol = std::env::args().nth(1).unwrap_or_else(|| "NIFTY".to_string());

    println!("{}", "=".repeat(60).blue());
    println!("{}", "NSE Bear Put Spread Engine".green().bold());
    println!("{}", "=".repeat(60).blue());
    println!();

    let service = OptionChainService::new()?;

    // Step 1: Fetch the ATM-windowed option chain
    println!("{}", format!("Step 1: Fetching option chain for {}...", symbol).cyan());
    let snapshot = service.get_option_chain(&symbol).await?;
    println!(
        "{} {} @ {:.2} (expiry {}), {} strikes in window",
        "✓".green(),
        snapshot.symbol.yellow(),
        snapshot.underlying_value,
        snapshot.expiry_date,
        snapshot.rows.len()
    );
    println!();

    for row in &snapshot.rows {
        let put = match &row.put {
            Some(put) if put.is_tradable() => put,
            _ => continue,
        };
        let liquidity = if put.passes_liquidity_filter() {
            "liquid".green()
        } else {
            "thin".red()
        };
        println!(
            "  {:>9.1}  PE {:>8.2}  vol {:>7}  OI {:>8}  {}",
            row.strike_price, put.last_price, put.volume, put.open_interest, liquidity
        );
    }
    println!();

    // Step 2: Pair candidates and compute metrics
    println!("{}", "Step 2: Analyzing bear put spreads...".cyan());
    let candidates = build_candidates(&snapshot, 3);
    let analyses = analyze_spreads(&candidates, None)?;
    println!(
        "{} {} candidate pairs analyzed",
        "✓".green(),
        analyses.len()
    );
    println!();

    // Step 3: Rank and show the best
    println!("{}", "Step 3: Ranked spreads (top 5)".cyan());
    let ranked = rank_spreads(analyses);
    if ranked.is_empty() {
        println!("{} No liquid debit spreads in the current window", "✗".red());
        return Ok(());
    }

    for (idx, analysis) in ranked.iter().take(5).enumerate() {
        let m = &analysis.metrics;
        println!(
            "  {}. {} {:.0}/{:.0}  debit {:>8.2}  max P/L {:>8.2}/{:>8.2}  BE {:>9.2}  R:R {}",
            idx + 1,
            "BUY/SELL".yellow(),
            analysis.candidate.long_put.strike,
            analysis.candidate.short_put.strike,
            m.net_debit,
            m.max_profit,
            m.max_loss,
            m.breakeven,
            m.risk_reward
                .map(|rr| format!("{:.2}", rr))
                .unwrap_or_else(|| "-".to_string()),
        );
    }

    println!();
    println!("{}", "=".repeat(60).blue());
    println!("{}", "Done!".green().bold());
    println!("{}", "=".repeat(60).blue());

    Ok(())
}
