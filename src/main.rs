// Command-line entry point; all orchestration lives in the library.
//   ferrite-harness --dataset-folder data/cifar --epochs 10
//   ferrite-harness --dataset-folder data/cifar --multi-run 5
//   ferrite-harness --dataset-folder data/cifar --hyper-param-optim grid.json
//   SIGOPT_API_TOKEN=... ferrite-harness --dataset-folder data/cifar --sig-opt space.json
use clap::Parser;

use ferrite_harness::{Args, Configuration, HarnessError, RunMe, RunnerRegistry};

fn main() {
    let args = Args::parse();
    let mut config = match Configuration::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    match RunMe::new(RunnerRegistry::with_defaults()).main(&mut config) {
        Ok(()) => {}
        // Already logged with its backtrace by `RunMe::execute`.
        Err(HarnessError::ExecutionFailed(_)) => std::process::exit(-1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
