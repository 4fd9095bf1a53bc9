// TimeSource-Adapter
//
// Die Epoche läuft zwischen zwei Synchronisationen über die Uptime
// (embassy Instant) weiter.

use clock_core::{SyncError, SyncedEpoch, TimeSource};
use embassy_time::Instant;

use crate::{EpochCell, SyncSignal};

pub struct SntpClock {
    requests: &'static SyncSignal,
    epoch: &'static EpochCell,
}

impl SntpClock {
    pub fn new(requests: &'static SyncSignal, epoch: &'static EpochCell) -> Self {
        Self { requests, epoch }
    }

    fn synced(&self) -> SyncedEpoch {
        self.epoch.lock(|cell| cell.get())
    }
}

impl TimeSource for SntpClock {
    /// Stößt den SNTP Task an; das Ergebnis erscheint asynchron in `EpochCell`
    fn sync_now(&mut self) -> Result<(), SyncError> {
        if self.requests.signaled() {
            return Err(SyncError::Busy);
        }
        self.requests.signal(());
        Ok(())
    }

    fn epoch_seconds(&self) -> i64 {
        self.synced().now(Instant::now().as_millis())
    }

    fn is_synced(&self) -> bool {
        self.synced().is_synced()
    }
}
