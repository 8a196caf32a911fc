use rand::Rng;
use tracing::{info, warn};

use crate::config::Configuration;
use crate::error::Result;

/// The resolved execution environment of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionEnv {
    pub seed: u64,
    /// Always `"cpu"`: the numeric core has no accelerator backend.
    pub device: String,
}

/// Resolves the seed and the device from the configuration.
///
/// A missing seed is drawn at random and logged so the run can be
/// reproduced with `--seed`.
pub fn set_up_env(config: &Configuration) -> Result<ExecutionEnv> {
    let seed = match config.get_opt_u64("seed")? {
        Some(seed) => seed,
        None => {
            let seed = rand::thread_rng().gen::<u32>() as u64;
            info!("No seed given, using random seed {seed}");
            seed
        }
    };

    if !config.get_bool("no_cuda")? {
        if let Some(gpu) = config.get_opt_str("gpu_id")? {
            warn!("Accelerator {gpu} requested but only CPU execution is available");
        }
    }

    info!(seed, device = "cpu", "Execution environment ready");
    Ok(ExecutionEnv { seed, device: "cpu".to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_args;

    #[test]
    fn explicit_seed_is_kept() {
        let cfg = Configuration::from_args(&parse_args(["x", "--seed", "42"]).unwrap()).unwrap();
        assert_eq!(set_up_env(&cfg).unwrap(), ExecutionEnv { seed: 42, device: "cpu".into() });
    }

    #[test]
    fn gpu_request_still_runs_on_cpu() {
        let cfg = Configuration::from_args(&parse_args(["x", "--gpu-id", "0"]).unwrap()).unwrap();
        assert_eq!(set_up_env(&cfg).unwrap().device, "cpu");
    }
}
