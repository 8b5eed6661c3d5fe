use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::cmd::read::read_target;
use crate::cmd::StreamArgs;
use crate::exit::{CliError, CliResult, FAILURE, INTERNAL, SUCCESS, USAGE};
use crate::output::{print_reading, OutputFormat};

pub fn run(args: StreamArgs, format: OutputFormat) -> CliResult<i32> {
    let period = poll_period(args.rate_hz)?;
    let mut imu = args.connect.connect()?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;
    let mut missed = 0usize;
    let mut next = Instant::now();

    while running.load(Ordering::SeqCst) {
        let (ok, value) = read_target(&mut imu, args.target)?;
        if !ok {
            missed += 1;
            warn!(target_name = args.target.name(), "no reply");
        }
        print_reading(args.target.name(), ok, &value, format);

        printed += 1;
        if args.count.is_some_and(|count| printed >= count) {
            break;
        }

        next += period;
        let now = Instant::now();
        if next > now {
            std::thread::sleep(next - now);
        } else {
            // Fell behind: resume pacing from now.
            next = now;
        }
    }

    info!(printed, missed, "stream stopped");
    imu.disconnect();
    if printed > 0 && missed == printed {
        eprintln!("error: no replies from {}", args.target.name());
        return Ok(FAILURE);
    }
    Ok(SUCCESS)
}

fn poll_period(rate_hz: f64) -> CliResult<Duration> {
    if !rate_hz.is_finite() || rate_hz <= 0.0 {
        return Err(CliError::new(USAGE, "--rate-hz must be greater than zero"));
    }
    Ok(Duration::from_nanos((1e9 / rate_hz).round() as u64))
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_period_from_rate() {
        assert_eq!(poll_period(50.0).unwrap(), Duration::from_millis(20));
        assert_eq!(poll_period(0.5).unwrap(), Duration::from_secs(2));
    }

    #[test]
    fn poll_period_rejects_non_positive_rates() {
        assert!(poll_period(0.0).is_err());
        assert!(poll_period(-5.0).is_err());
        assert!(poll_period(f64::NAN).is_err());
    }
}
