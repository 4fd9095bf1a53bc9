//! Time Synchronization Policy
//!
//! Entscheidet, wann die Epoche neu vom Zeitserver geholt wird.
//!
//! Trigger (nach Priorität):
//! 1. Client-Verbindung hergestellt
//! 2. Zeitzone geändert
//! 3. Zu jeder vollen lokalen Stunde (Minute 0)
//!
//! Ein fehlgeschlagener Sync wird nicht wiederholt; der nächste reguläre
//! Trigger holt ihn nach.

use crate::clock::LocalTime;

/// Toleranzfenster für den stündlichen Resync in Sekunden
///
/// Ganze Minute 0: ein verspäteter Zyklus verpasst den Stundenwechsel nicht.
pub const RESYNC_WINDOW_SECS: u8 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncReason {
    Connected,
    TimezoneChanged,
    HourlyResync,
}

impl SyncReason {
    fn precedence(self) -> u8 {
        match self {
            SyncReason::Connected => 0,
            SyncReason::TimezoneChanged => 1,
            SyncReason::HourlyResync => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncPolicy {
    pending: Option<SyncReason>,
    last_resync_hour: Option<i64>,
}

impl SyncPolicy {
    pub const fn new() -> Self {
        Self {
            pending: None,
            last_resync_hour: None,
        }
    }

    /// Trigger 1: Client-Verbindung steht
    pub fn on_connected(&mut self) {
        self.request(SyncReason::Connected);
    }

    /// Trigger 2: Zeitzone vom Portal geändert
    pub fn on_timezone_changed(&mut self) {
        self.request(SyncReason::TimezoneChanged);
    }

    pub fn pending(&self) -> Option<SyncReason> {
        self.pending
    }

    /// Prüft den Stunden-Trigger und liefert den fälligen Sync (höchstens einen)
    ///
    /// Jeder Stundenwechsel löst genau einmal aus, egal wie viele Zyklen in
    /// das Toleranzfenster fallen.
    pub fn evaluate(&mut self, local: &LocalTime) -> Option<SyncReason> {
        let in_window = local.minute == 0 && local.second < RESYNC_WINDOW_SECS;
        if in_window && self.last_resync_hour != Some(local.hour_start_epoch) {
            self.last_resync_hour = Some(local.hour_start_epoch);
            self.request(SyncReason::HourlyResync);
        }

        self.pending.take()
    }

    // Mehrere Trigger im selben Zyklus ergeben einen Sync mit dem wichtigsten Grund
    fn request(&mut self, reason: SyncReason) {
        self.pending = match self.pending {
            Some(pending) if pending.precedence() <= reason.precedence() => Some(pending),
            _ => Some(reason),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Timezone;

    fn at(epoch: i64) -> LocalTime {
        LocalTime::from_epoch(epoch, Timezone::utc())
    }

    // 2023-11-14 23:00:00 UTC
    const TOP_OF_HOUR: i64 = 1_700_002_800;

    #[test]
    fn test_no_sync_mid_hour() {
        let mut policy = SyncPolicy::new();
        assert_eq!(policy.evaluate(&at(1_700_000_000)), None);
    }

    #[test]
    fn test_hourly_resync_fires_once() {
        let mut policy = SyncPolicy::new();
        assert_eq!(policy.evaluate(&at(TOP_OF_HOUR)), Some(SyncReason::HourlyResync));
        assert_eq!(policy.evaluate(&at(TOP_OF_HOUR)), None);
        assert_eq!(policy.evaluate(&at(TOP_OF_HOUR + 1)), None);
        assert_eq!(policy.evaluate(&at(TOP_OF_HOUR + 59)), None);
    }

    #[test]
    fn test_hourly_resync_tolerates_late_cycle() {
        let mut policy = SyncPolicy::new();
        assert_eq!(policy.evaluate(&at(TOP_OF_HOUR - 1)), None);
        assert_eq!(policy.evaluate(&at(TOP_OF_HOUR + 3)), Some(SyncReason::HourlyResync));
    }

    #[test]
    fn test_hourly_resync_next_hour() {
        let mut policy = SyncPolicy::new();
        assert!(policy.evaluate(&at(TOP_OF_HOUR)).is_some());
        assert_eq!(policy.evaluate(&at(TOP_OF_HOUR + 60)), None);
        assert_eq!(
            policy.evaluate(&at(TOP_OF_HOUR + 3_600)),
            Some(SyncReason::HourlyResync)
        );
    }

    #[test]
    fn test_triggers_merge_by_precedence() {
        let mut policy = SyncPolicy::new();
        policy.on_timezone_changed();
        policy.on_connected();
        assert_eq!(policy.evaluate(&at(TOP_OF_HOUR)), Some(SyncReason::Connected));
        // Stunde ist durch den zusammengefassten Sync erledigt
        assert_eq!(policy.evaluate(&at(TOP_OF_HOUR + 5)), None);
    }

    #[test]
    fn test_timezone_change_requests_sync() {
        let mut policy = SyncPolicy::new();
        policy.on_timezone_changed();
        assert_eq!(policy.pending(), Some(SyncReason::TimezoneChanged));
        assert_eq!(
            policy.evaluate(&at(1_700_000_000)),
            Some(SyncReason::TimezoneChanged)
        );
        assert_eq!(policy.pending(), None);
    }
}
