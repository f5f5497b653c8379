//! Built-in Synthetic Operations
//!
//! Selected on the command line with `--op`:
//! - `spin:<rounds>` – CPU-bound arithmetic, no memory traffic
//! - `sleep:<duration>` – blocks the worker, e.g. `sleep:1ms`
//! - `checksum:<bytes>` – hashes a per-task input buffer with FxHash and
//!   stores the digest with leading zero bytes stripped (variable length)

use crate::config::ParabenchConfig;
use parabench_core::{Operation, OperationError};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Parsed `--op` value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpSpec {
    /// LCG rounds per invocation
    Spin {
        /// Rounds
        rounds: u64,
    },
    /// Sleep per invocation
    Sleep {
        /// Sleep length
        duration: Duration,
    },
    /// FxHash over a buffer of this many bytes
    Checksum {
        /// Input size
        bytes: usize,
    },
}

impl FromStr for OpSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, arg) = s
            .split_once(':')
            .ok_or_else(|| format!("Expected <kind>:<arg>, got '{}'", s))?;

        match kind {
            "spin" => {
                let rounds = arg
                    .parse()
                    .map_err(|_| format!("Invalid spin rounds: {}", arg))?;
                Ok(OpSpec::Spin { rounds })
            }
            "sleep" => {
                let nanos = ParabenchConfig::parse_duration(arg).map_err(|e| e.to_string())?;
                Ok(OpSpec::Sleep {
                    duration: Duration::from_nanos(nanos),
                })
            }
            "checksum" => match arg.parse::<usize>() {
                Ok(bytes) if bytes > 0 => Ok(OpSpec::Checksum { bytes }),
                _ => Err(format!("Invalid checksum size: {}", arg)),
            },
            other => Err(format!(
                "Unknown operation: {} (expected spin, sleep or checksum)",
                other
            )),
        }
    }
}

impl fmt::Display for OpSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpSpec::Spin { rounds } => write!(f, "spin:{}", rounds),
            OpSpec::Sleep { duration } => write!(f, "sleep:{:?}", duration),
            OpSpec::Checksum { bytes } => write!(f, "checksum:{}", bytes),
        }
    }
}

/// Bind `$op` to the concrete operation for `$spec` and evaluate `$body`
macro_rules! with_operation {
    ($spec:expr, |$op:ident| $body:expr) => {
        match $spec {
            $crate::ops::OpSpec::Spin { rounds } => {
                let $op = &$crate::ops::SpinOperation::new(rounds);
                $body
            }
            $crate::ops::OpSpec::Sleep { duration } => {
                let $op = &$crate::ops::SleepOperation::new(duration);
                $body
            }
            $crate::ops::OpSpec::Checksum { bytes } => {
                let $op = &$crate::ops::ChecksumOperation::new(bytes);
                $body
            }
        }
    };
}
pub(crate) use with_operation;

/// CPU-bound arithmetic loop
#[derive(Debug, Clone)]
pub struct SpinOperation {
    rounds: u64,
    name: String,
}

impl SpinOperation {
    /// Spin for `rounds` LCG steps per invocation
    pub fn new(rounds: u64) -> Self {
        Self {
            rounds,
            name: format!("spin:{}", rounds),
        }
    }
}

impl Operation for SpinOperation {
    type Context = ();
    type Task = u64;

    fn name(&self) -> &str {
        &self.name
    }

    fn new_context(&self) -> Result<(), OperationError> {
        Ok(())
    }

    fn prepare_task(&self, index: usize) -> Result<u64, OperationError> {
        Ok(index as u64)
    }

    fn execute(&self, _ctx: &mut (), state: &mut u64) -> Result<(), OperationError> {
        let mut x = *state;
        for _ in 0..self.rounds {
            x = x
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
        }
        *state = std::hint::black_box(x);
        Ok(())
    }
}

/// Sleeps for a fixed duration
#[derive(Debug, Clone)]
pub struct SleepOperation {
    duration: Duration,
    name: String,
}

impl SleepOperation {
    /// Sleep for `duration` per invocation
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            name: format!("sleep:{:?}", duration),
        }
    }
}

impl Operation for SleepOperation {
    type Context = ();
    type Task = ();

    fn name(&self) -> &str {
        &self.name
    }

    fn new_context(&self) -> Result<(), OperationError> {
        Ok(())
    }

    fn prepare_task(&self, _index: usize) -> Result<(), OperationError> {
        Ok(())
    }

    fn execute(&self, _ctx: &mut (), _task: &mut ()) -> Result<(), OperationError> {
        std::thread::sleep(self.duration);
        Ok(())
    }
}

/// Input and output buffers for one checksum task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumTask {
    /// Bytes to hash, filled with the task index pattern
    pub input: Vec<u8>,
    /// Big-endian digest without leading zero bytes
    pub digest: Vec<u8>,
}

/// FxHash over a per-task buffer
#[derive(Debug, Clone)]
pub struct ChecksumOperation {
    bytes: usize,
    name: String,
}

impl ChecksumOperation {
    /// Hash `bytes` bytes per invocation
    pub fn new(bytes: usize) -> Self {
        Self {
            bytes,
            name: format!("checksum:{}", bytes),
        }
    }
}

impl Operation for ChecksumOperation {
    type Context = ();
    type Task = ChecksumTask;

    fn name(&self) -> &str {
        &self.name
    }

    fn new_context(&self) -> Result<(), OperationError> {
        Ok(())
    }

    fn prepare_task(&self, index: usize) -> Result<ChecksumTask, OperationError> {
        let mut input = vec![(index & 0xff) as u8; self.bytes];
        // Distinct inputs even when index patterns repeat
        for (slot, byte) in input.iter_mut().zip(index.to_le_bytes()) {
            *slot ^= byte.rotate_left(3);
        }
        Ok(ChecksumTask {
            input,
            digest: Vec::with_capacity(8),
        })
    }

    fn execute(&self, _ctx: &mut (), task: &mut ChecksumTask) -> Result<(), OperationError> {
        let hash = fxhash::hash64(&task.input);
        let bytes = hash.to_be_bytes();
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
        // Capacity reserved in prepare_task
        task.digest.clear();
        task.digest.extend_from_slice(&bytes[start..]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parabench_core::{PhaseConfig, run_phase_with_tasks, summarize_lengths};

    #[test]
    fn test_parse_specs() {
        assert_eq!("spin:500".parse::<OpSpec>(), Ok(OpSpec::Spin { rounds: 500 }));
        assert_eq!(
            "sleep:1ms".parse::<OpSpec>(),
            Ok(OpSpec::Sleep {
                duration: Duration::from_millis(1)
            })
        );
        assert_eq!("checksum:256".parse::<OpSpec>(), Ok(OpSpec::Checksum { bytes: 256 }));
    }

    #[test]
    fn test_parse_errors() {
        assert!("spin".parse::<OpSpec>().is_err());
        assert!("spin:lots".parse::<OpSpec>().is_err());
        assert!("checksum:0".parse::<OpSpec>().is_err());
        assert!("sleep:forever".parse::<OpSpec>().is_err());
        assert!("sign:falcon".parse::<OpSpec>().is_err());
    }

    #[test]
    fn test_spin_is_deterministic() {
        let op = SpinOperation::new(1000);
        let (mut a, mut b) = (op.prepare_task(7).unwrap(), op.prepare_task(7).unwrap());
        op.execute(&mut (), &mut a).unwrap();
        op.execute(&mut (), &mut b).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, 7);
    }

    #[test]
    fn test_checksum_outputs() {
        let op = ChecksumOperation::new(64);
        let run = run_phase_with_tasks(&op, &PhaseConfig::pooled(4, 200)).unwrap();

        assert_eq!(run.measurement.failed_operations, 0);
        assert!(run.tasks.iter().all(|t| (1..=8).contains(&t.digest.len())));

        let lengths = summarize_lengths(run.tasks.iter().map(|t| t.digest.len())).unwrap();
        assert_eq!(lengths.count, 200);
        assert!(lengths.max <= 8);
    }

    #[test]
    fn test_dispatch_macro() {
        let names: Vec<String> = ["spin:1", "sleep:1us", "checksum:4"]
            .iter()
            .map(|s| {
                let spec: OpSpec = s.parse().unwrap();
                with_operation!(spec, |op| op.name().to_string())
            })
            .collect();
        assert_eq!(names, vec!["spin:1", "sleep:1µs", "checksum:4"]);
    }
}
