use anyhow::Context;
use fairdraw_sim::{ScenarioConfig, SimRunner};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let scenarios = match std::env::args().nth(1) {
        Some(path) => vec![ScenarioConfig::from_json_file(&path)
            .with_context(|| format!("loading scenario from {path}"))?],
        None => ScenarioConfig::all_presets(),
    };

    let runner = SimRunner::new();
    let mut all_passed = true;

    for scenario in &scenarios {
        let result = runner.run_scenario(scenario).await?;
        let summary = &result.summary;

        println!("\n━━━ {} ━━━", result.scenario_name);
        println!("  {}", scenario.description);
        println!("  Rounds:    {}", summary.total_rounds);
        println!("  Finalized: {}", summary.finalized);
        println!("  Expired:   {}", summary.expired);
        println!("  Events:    {}", summary.events_emitted);
        println!("  Runtime:   {:.2}ms", summary.total_runtime_ms);
        println!("  Status:    {}", if summary.passed { "PASS" } else { "FAIL" });
        for reason in &summary.failure_reasons {
            println!("    - {}", reason);
        }
        all_passed &= summary.passed;
    }

    if !all_passed {
        anyhow::bail!("one or more scenarios failed");
    }
    Ok(())
}
