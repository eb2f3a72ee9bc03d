use cartpole_pg::logging::DisplayLogger;
use cartpole_pg::torch::{parse_hidden_sizes, MlpConfig};
use cartpole_pg::{Error, TrainHook, Trainer, TrainerConfig};
use std::path::PathBuf;

/// Prints a progress line per iteration.
struct Progress;

impl TrainHook for Progress {
    fn on_iteration_start(&mut self, iteration: usize, total_iterations: usize) {
        println!("Iteration {} / {}", iteration + 1, total_iterations);
    }
}

fn main() -> Result<(), Error> {
    // Optional comma-separated hidden layer sizes, e.g. "128" or "64,64"
    let policy = match std::env::args().nth(1) {
        Some(arg) => MlpConfig {
            hidden_sizes: parse_hidden_sizes(&arg)?,
        },
        None => MlpConfig::default(),
    };
    let config = TrainerConfig {
        policy,
        num_threads: num_cpus::get(),
        ..TrainerConfig::default()
    };
    println!("Training Config\n{:#?}\n", config);

    let mut trainer = Trainer::new(config, 0)?;
    let mut logger = DisplayLogger::default();
    for report in trainer.iterations(&mut Progress, &mut logger) {
        let report = report?;
        println!(
            "  mean steps per game: {:.1}  ({:.0} steps/s)",
            report.mean_length(),
            report.steps_per_second()
        );
    }
    drop(logger);

    let evaluation = trainer.evaluate(500)?;
    println!("Evaluation game: {} steps", evaluation.len());

    let mut save_dir: PathBuf = ["data", "cartpole-reinforce"].iter().collect();
    save_dir.push(chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string());
    std::fs::create_dir_all(&save_dir)?;
    let path = save_dir.join("policy.ot");
    trainer.policy().save(&path)?;
    println!("Saved policy to {:?}", path);
    Ok(())
}
