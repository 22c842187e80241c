use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::constants::DONGLE_CYCLE_SECONDS;
use crate::error::{JigError, JigResult};
use crate::link::LinkFactory;
use crate::progress::CancelToken;

/// Background loop that keeps power-cycling the USB radio dongle.
pub struct DongleKeepalive;

/// Owner of a running keepalive loop. Dropping it shuts the loop down.
pub struct KeepaliveHandle {
    cancel: CancelToken,
    worker: Option<JoinHandle<u64>>,
}

impl DongleKeepalive {
    pub fn start(
        links: Arc<dyn LinkFactory>,
        interval: Duration,
    ) -> JigResult<KeepaliveHandle> {
        let cancel = CancelToken::new();
        let token = cancel.clone();

        let worker = thread::Builder::new()
            .name("dongle-keepalive".to_string())
            .spawn(move || {
                let mut cycles: u64 = 0;
                while !token.is_cancelled() {
                    match links.cycle_dongle(DONGLE_CYCLE_SECONDS) {
                        Ok(()) => cycles += 1,
                        Err(e) => warn!("Dongle cycle failed: {}", e),
                    }
                    if token.wait_timeout(interval) {
                        break;
                    }
                }
                debug!("Keepalive stopped after {} cycle(s)", cycles);
                cycles
            })
            .map_err(|e| JigError::Communication(format!("Failed to start keepalive: {}", e)))?;

        info!("Dongle keepalive started ({:?} interval)", interval);
        Ok(KeepaliveHandle {
            cancel,
            worker: Some(worker),
        })
    }
}

impl KeepaliveHandle {
    /// Stop the loop and wait for it to exit. Returns the number of
    /// successful dongle cycles.
    pub fn shutdown(mut self) -> u64 {
        self.stop()
    }

    fn stop(&mut self) -> u64 {
        self.cancel.cancel();
        match self.worker.take().map(JoinHandle::join) {
            Some(Ok(cycles)) => cycles,
            Some(Err(_)) => {
                warn!("Keepalive loop panicked");
                0
            }
            None => 0,
        }
    }
}

impl Drop for KeepaliveHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Instant;

    use super::*;
    use crate::link::RobotLink;
    use crate::robot_id::RobotId;

    #[derive(Default)]
    struct CountingDongle(AtomicU64);

    impl LinkFactory for CountingDongle {
        fn connect_local(&self) -> JigResult<Box<dyn RobotLink>> {
            Err(JigError::Communication("no robot".into()))
        }
        fn connect(&self, _id: &RobotId) -> JigResult<Box<dyn RobotLink>> {
            Err(JigError::Communication("no robot".into()))
        }
        fn cycle_dongle(&self, seconds: u8) -> JigResult<()> {
            assert_eq!(seconds, 2);
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn shutdown_is_prompt_and_acknowledged() {
        let dongle = Arc::new(CountingDongle::default());
        let handle = DongleKeepalive::start(dongle.clone(), Duration::from_secs(1)).unwrap();
        thread::sleep(Duration::from_millis(100));

        let start = Instant::now();
        let cycles = handle.shutdown();
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(cycles, dongle.0.load(Ordering::SeqCst));
        assert!(cycles >= 1);
    }
}
