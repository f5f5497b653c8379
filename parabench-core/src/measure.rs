//! High-Precision Timing
//!
//! Phase boundaries are taken from the monotonic `std::time::Instant`. On
//! x86_64 (RDTSCP) and AArch64 (CNTVCT_EL0) a hardware tick counter is read
//! alongside, which reports the same interval in CPU-counter units.

use std::io;
use std::time::Duration;

#[cfg(target_arch = "x86_64")]
#[inline(always)]
fn read_ticks() -> u64 {
    // SAFETY: RDTSCP is available on all x86_64 CPUs since ~2006 and waits
    // for prior instructions to retire before reading the counter.
    unsafe {
        let mut _aux: u32 = 0;
        std::arch::x86_64::__rdtscp(&mut _aux)
    }
}

#[cfg(target_arch = "aarch64")]
#[inline(always)]
fn read_ticks() -> u64 {
    let cnt: u64;
    // SAFETY: CNTVCT_EL0 is readable from EL0 on all AArch64 implementations.
    unsafe {
        std::arch::asm!("mrs {}, cntvct_el0", out(reg) cnt, options(nostack, nomem));
    }
    cnt
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
#[inline(always)]
fn read_ticks() -> u64 {
    0
}

/// Whether this platform provides a hardware tick counter
pub const HAS_TICK_COUNTER: bool = cfg!(target_arch = "x86_64") || cfg!(target_arch = "aarch64");

/// Monotonic instant paired with a hardware tick reading
#[derive(Debug, Clone, Copy)]
pub struct Instant {
    instant: std::time::Instant,
    ticks: u64,
}

impl Instant {
    /// Capture current instant
    #[inline(always)]
    pub fn now() -> Self {
        let ticks = read_ticks();
        Self {
            instant: std::time::Instant::now(),
            ticks,
        }
    }

    /// Wall-clock time elapsed since this instant
    #[inline(always)]
    pub fn elapsed(&self) -> Duration {
        self.instant.elapsed()
    }

    /// Wall-clock interval from `earlier` to `self`
    #[inline(always)]
    pub fn duration_since(&self, earlier: Instant) -> Duration {
        self.instant.duration_since(earlier.instant)
    }

    /// Tick-counter interval from `earlier` to `self` (0 without a counter)
    #[inline(always)]
    pub fn ticks_since(&self, earlier: Instant) -> u64 {
        self.ticks.saturating_sub(earlier.ticks)
    }

    /// Raw tick count (non-zero on x86_64 and aarch64)
    #[inline(always)]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

/// Number of CPUs available to this process (at least 1)
pub fn available_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Restrict the calling thread to a single CPU.
///
/// CPUs past the end of the kernel affinity mask are rejected with
/// `InvalidInput`; a CPU that is offline or outside the process cpuset
/// surfaces the OS error.
#[cfg(target_os = "linux")]
pub fn pin_to_cpu(cpu: usize) -> io::Result<()> {
    if cpu >= libc::CPU_SETSIZE as usize {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("cpu {cpu} does not fit in an affinity mask"),
        ));
    }

    // SAFETY: the all-zero cpu_set_t is the empty mask, `cpu` was bounds
    // checked above, and pid 0 addresses the calling thread.
    let rc = unsafe {
        let mut mask: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_SET(cpu, &mut mask);
        libc::sched_setaffinity(0, std::mem::size_of_val(&mask), &mask)
    };

    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// No affinity control here; always succeeds
#[cfg(not(target_os = "linux"))]
pub fn pin_to_cpu(_cpu: usize) -> io::Result<()> {
    Ok(())
}
