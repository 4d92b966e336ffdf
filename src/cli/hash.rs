use std::io::BufRead;

use clap::Args;

use crate::core::{hash_password, HashParams};
use crate::Result;

/// Print the argon2id hash of a password
#[derive(Args, Debug)]
pub struct HashPasswordCommand {
    /// Password to hash. Read from stdin when omitted
    #[arg(long, env = "HRGATE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Memory cost in KiB
    #[arg(long, env = "HRGATE_ARGON2_M")]
    pub memory_kib: Option<u32>,
    /// Number of iterations
    #[arg(long, env = "HRGATE_ARGON2_T")]
    pub iterations: Option<u32>,
    /// Degree of parallelism
    #[arg(long, env = "HRGATE_ARGON2_P")]
    pub parallelism: Option<u32>,
}

impl HashPasswordCommand {
    pub fn run(self) -> Result<()> {
        let defaults = HashParams::default();
        let params = HashParams {
            memory_kib: self.memory_kib.unwrap_or(defaults.memory_kib),
            iterations: self.iterations.unwrap_or(defaults.iterations),
            parallelism: self.parallelism.unwrap_or(defaults.parallelism),
        };

        let password = match self.password {
            Some(password) => password,
            None => {
                let mut line = String::new();
                std::io::stdin().lock().read_line(&mut line)?;
                line.trim_end_matches(['\r', '\n']).to_owned()
            }
        };

        println!("{}", hash_password(&password, &params)?);
        Ok(())
    }
}
